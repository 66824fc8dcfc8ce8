//! Tarball extraction.

use std::fs::File;
use std::path::Path;

use flate2::read::GzDecoder;
use tar::Archive;

use crate::error::ProvisionError;
use crate::util::fs::ensure_dir;

/// Extract a gzip-compressed tarball into `dest`.
///
/// Entries keep their archive paths, so a tarball with a versioned
/// top-level directory produces `dest/<name>-<version>/...`. Entries that
/// would land outside `dest` are rejected.
pub fn extract_tarball(archive: &Path, dest: &Path) -> Result<(), ProvisionError> {
    let extract_err = |message: String| ProvisionError::Extract {
        archive: archive.to_path_buf(),
        message,
    };

    let file = File::open(archive).map_err(|e| ProvisionError::fs("open", archive, e))?;
    ensure_dir(dest)?;

    let mut tarball = Archive::new(GzDecoder::new(file));
    tarball.set_preserve_mtime(true);

    let entries = tarball
        .entries()
        .map_err(|e| extract_err(format!("failed to read entries: {}", e)))?;

    for entry in entries {
        let mut entry = entry.map_err(|e| extract_err(format!("failed to read entry: {}", e)))?;
        let entry_path = entry
            .path()
            .map_err(|e| extract_err(format!("invalid entry path: {}", e)))?
            .into_owned();

        // `unpack_in` refuses paths escaping `dest` and reports them as `false`.
        let unpacked = entry.unpack_in(dest).map_err(|e| {
            extract_err(format!("failed to unpack {}: {}", entry_path.display(), e))
        })?;
        if !unpacked {
            return Err(extract_err(format!(
                "entry escapes destination directory: {}",
                entry_path.display()
            )));
        }
    }

    tracing::debug!("extracted {} into {}", archive.display(), dest.display());
    Ok(())
}
