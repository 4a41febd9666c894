//! Archive extraction
//!
//! Extracts gzipped tarballs (the format GitHub's codeload endpoint serves)
//! into a scratch directory. Zip input is rejected outright rather than
//! half-supported.

use flate2::read::GzDecoder;
use quartex_core::error::{Error, Result};
use std::fs::File;
use std::path::Path;
use tar::Archive;
use tracing::debug;

/// Extract an archive file into `dest_dir`
///
/// Supports `.tar.gz`/`.tgz` (and bare `.tar`). The tar crate refuses
/// entries that would escape the destination, so extraction itself cannot
/// traverse outside `dest_dir`.
pub fn extract_archive(archive_path: &Path, dest_dir: &Path) -> Result<()> {
    let file_name = archive_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();

    debug!("Extracting {:?} into {:?}", archive_path, dest_dir);
    std::fs::create_dir_all(dest_dir)?;

    if file_name.ends_with(".zip") {
        return Err(Error::extension_with_suggestion(
            format!("zip archives are not supported: {file_name}"),
            "repackage the extension as a .tar.gz archive",
        ));
    }

    let file = File::open(archive_path)?;

    let result = if file_name.ends_with(".tar") {
        Archive::new(file).unpack(dest_dir)
    } else {
        // Default to gzip: codeload tarball URLs have no file extension at all
        Archive::new(GzDecoder::new(file)).unpack(dest_dir)
    };

    result.map_err(|e| {
        Error::extension(format!(
            "failed to extract archive {}: {}",
            archive_path.display(),
            e
        ))
    })
}
