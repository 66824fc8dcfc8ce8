//! Test fixtures.

use flate2::write::GzEncoder;
use flate2::Compression;
use tar::{Builder, Header};

/// Build an in-memory `.tar.gz` from `(path, content)` pairs.
///
/// Files are written with mode 0755 so scripts such as `configure` stay
/// executable after extraction.
pub fn tarball(files: &[(&str, &str)]) -> Vec<u8> {
    let mut data = Vec::new();
    {
        let encoder = GzEncoder::new(&mut data, Compression::default());
        let mut builder = Builder::new(encoder);

        for (path, content) in files {
            let mut header = Header::new_gnu();
            header.set_path(path).unwrap();
            header.set_size(content.len() as u64);
            header.set_mode(0o755);
            header.set_cksum();
            builder.append(&header, content.as_bytes()).unwrap();
        }

        builder.into_inner().unwrap().finish().unwrap();
    }
    data
}

/// Source tarball for `<stem>-<version>` with a single file at its root.
pub fn versioned_tarball(stem: &str, version: &str, file: &str) -> Vec<u8> {
    let path = format!("{}-{}/{}", stem, version, file);
    tarball(&[(path.as_str(), version)])
}
