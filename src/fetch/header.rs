//! Single-file header download.

use crate::core::dependency::{render_url, HeaderAsset};
use crate::error::ProvisionError;
use crate::util::fs::{ensure_dir, remove_dir_all_if_exists};

use super::FetchContext;

/// Download the header straight into its install directory.
///
/// The directory is emptied first so no marker from another version
/// survives next to the new header.
pub(super) fn install(dep: &HeaderAsset, ctx: &FetchContext<'_>) -> Result<(), ProvisionError> {
    let url = render_url(&dep.url_template, &dep.version)?;
    remove_dir_all_if_exists(&dep.install_dir)?;
    ensure_dir(&dep.install_dir)?;

    tracing::info!("Fetching {} {}", dep.name, dep.version);
    ctx.downloader
        .download(&url, &dep.install_dir.join(&dep.file_name))
}
