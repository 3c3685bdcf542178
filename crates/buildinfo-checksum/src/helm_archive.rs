//! Safe extraction of Helm chart `.tgz` archives.
//!
//! Chart tarballs are gzip-compressed tar archives; extracting them safely
//! means rejecting any entry whose path would escape the destination
//! directory before a single byte is written to disk.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use flate2::read::GzDecoder;
use tar::Archive;

use buildinfo_util::errors::BuildInfoError;
use buildinfo_util::fs::require_within_root_uncreated;

/// Extract a Helm `.tgz` archive into `dest_dir`, validating every entry
/// path against `dest_dir` before writing it. `dest_dir` is created if it
/// doesn't exist.
pub fn extract_chart_archive(archive_path: &Path, dest_dir: &Path) -> Result<(), BuildInfoError> {
    std::fs::create_dir_all(dest_dir).map_err(BuildInfoError::Io)?;

    let file = File::open(archive_path).map_err(BuildInfoError::Io)?;
    let decoder = GzDecoder::new(file);
    let mut archive = Archive::new(decoder);

    for entry in archive.entries().map_err(BuildInfoError::Io)? {
        let mut entry = entry.map_err(BuildInfoError::Io)?;
        let entry_path = entry.path().map_err(BuildInfoError::Io)?.into_owned();
        let target = require_within_root_uncreated(dest_dir, &entry_path)?;

        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent).map_err(BuildInfoError::Io)?;
        }
        entry.unpack(&target).map_err(BuildInfoError::Io)?;
    }

    Ok(())
}

/// Read a single named file out of a `.tgz` archive without extracting the
/// rest (used to pull just `Chart.yaml` for identification). Entry paths
/// are still validated against the archive's own directory, the same way
/// `extract_chart_archive` validates against `dest_dir` — nothing is
/// written to disk here, but a malicious entry path shouldn't even be
/// trusted well enough to compare or log unchecked.
pub fn read_archive_member(archive_path: &Path, member_suffix: &str) -> Result<Option<Vec<u8>>, BuildInfoError> {
    let root = archive_path.parent().unwrap_or_else(|| Path::new("."));

    let file = File::open(archive_path).map_err(BuildInfoError::Io)?;
    let decoder = GzDecoder::new(file);
    let mut archive = Archive::new(decoder);

    for entry in archive.entries().map_err(BuildInfoError::Io)? {
        let mut entry = entry.map_err(BuildInfoError::Io)?;
        let entry_path = entry.path().map_err(BuildInfoError::Io)?.into_owned();
        require_within_root_uncreated(root, &entry_path)?;

        if entry_path.to_string_lossy().ends_with(member_suffix) {
            let mut buf = Vec::new();
            entry.read_to_end(&mut buf).map_err(BuildInfoError::Io)?;
            return Ok(Some(buf));
        }
    }
    Ok(None)
}
