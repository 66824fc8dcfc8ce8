//! Remote sources.
//!
//! Downloading files over HTTP and unpacking the tarballs they yield.

pub mod archive;
pub mod http;

pub use archive::extract_tarball;
pub use http::{Downloader, HttpDownloader};
