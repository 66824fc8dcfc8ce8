//! Static data files.
//!
//! These have no version: an existing file counts as installed, and picking
//! up new upstream content means deleting the file by hand.

use crate::core::dependency::{render_url, StaticDataAsset};
use crate::error::ProvisionError;

use super::FetchContext;

pub(super) fn install(
    dep: &StaticDataAsset,
    ctx: &FetchContext<'_>,
) -> Result<(), ProvisionError> {
    let url = render_url(&dep.url, "")?;

    tracing::info!("Fetching {}", dep.name);
    ctx.downloader.download(&url, &dep.path)
}
