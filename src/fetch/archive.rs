//! Header-only libraries shipped as tarballs.

use crate::core::dependency::{render_url, ArchiveLibrary};
use crate::error::ProvisionError;
use crate::sources::archive::extract_tarball;
use crate::util::fs::{ensure_dir, remove_file, replace_dir};

use super::FetchContext;

/// Download the tarball, unpack it next to the install directory and rename
/// the versioned top-level directory into place.
///
/// The extracted directory name is assumed to be `<stem>-<version>`; it is
/// not validated. If upstream changes its layout the rename fails.
pub(super) fn install(dep: &ArchiveLibrary, ctx: &FetchContext<'_>) -> Result<(), ProvisionError> {
    let url = render_url(&dep.url_template, &dep.version)?;
    ensure_dir(&dep.tmp_dir)?;

    let extracted = dep.extracted_dir_name();
    let archive = dep.tmp_dir.join(format!("{}.tar.gz", extracted));

    tracing::info!("Fetching {} {}", dep.name, dep.version);
    ctx.downloader.download(&url, &archive)?;

    extract_tarball(&archive, &dep.extract_root)?;
    remove_file(&archive)?;

    replace_dir(&dep.extract_root.join(&extracted), &dep.install_dir)
}
