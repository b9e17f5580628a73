//! Bundle verification

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use zip::ZipArchive;

use super::{BundleVerification, IssueSeverity};
use crate::config::{IMAGES_DIR_NAME, MANIFEST_FILE_NAME};
use crate::error::Result;
use crate::export::ExportRecord;

/// Check that an archive is a consumable bundle.
///
/// A missing or unreadable archive is reported through the result, not as an
/// `Err`.
pub fn verify_bundle(archive_path: &Path) -> Result<BundleVerification> {
    if !archive_path.exists() {
        return Ok(BundleVerification::cannot_open(format!(
            "Archive not found: {}",
            archive_path.display()
        )));
    }

    let file = match File::open(archive_path) {
        Ok(f) => f,
        Err(e) => {
            return Ok(BundleVerification::cannot_open(format!(
                "Cannot open archive: {}",
                e
            )))
        }
    };

    let mut archive = match ZipArchive::new(file) {
        Ok(a) => a,
        Err(e) => {
            return Ok(BundleVerification::cannot_open(format!(
                "Invalid ZIP archive: {}",
                e
            )))
        }
    };

    let mut result = BundleVerification::valid();
    let mut entries = HashSet::new();

    for i in 0..archive.len() {
        let entry = archive.by_index(i)?;
        let name = entry.name().to_string();

        if entry.enclosed_name().is_none() || name.split('/').any(|part| part == "..") {
            result.add_issue(
                IssueSeverity::Error,
                "Path traversal detected".to_string(),
                Some(name),
            );
            continue;
        }

        if !entry.is_dir() {
            result.file_count += 1;
            result.total_size += entry.size();
            entries.insert(name);
        }
    }

    let records = match read_manifest(&mut archive) {
        Ok(Some(records)) => records,
        Ok(None) => {
            result.add_issue(
                IssueSeverity::Error,
                "Manifest missing".to_string(),
                Some(MANIFEST_FILE_NAME.to_string()),
            );
            return Ok(result);
        }
        Err(message) => {
            result.add_issue(
                IssueSeverity::Error,
                message,
                Some(MANIFEST_FILE_NAME.to_string()),
            );
            return Ok(result);
        }
    };

    result.record_count = records.len();
    let mut seen_ids = HashSet::new();
    let mut referenced = HashSet::new();

    for record in &records {
        if !seen_ids.insert(record.id) {
            result.add_issue(
                IssueSeverity::Warning,
                format!("Duplicate record id {}", record.id),
                None,
            );
        }

        let expected_prefix = format!("{}/{}/", IMAGES_DIR_NAME, record.id);
        for (kind, path) in record.image_paths() {
            result.image_count += 1;
            referenced.insert(path.to_string());

            if !entries.contains(path) {
                result.add_issue(
                    IssueSeverity::Error,
                    format!("{} image of '{}' is not in the archive", kind, record.name),
                    Some(path.to_string()),
                );
            } else if !path.starts_with(&expected_prefix) {
                result.add_issue(
                    IssueSeverity::Warning,
                    format!("{} image of '{}' is outside its game directory", kind, record.name),
                    Some(path.to_string()),
                );
            }
        }
    }

    let mut unreferenced: Vec<&String> = entries
        .iter()
        .filter(|name| name.as_str() != MANIFEST_FILE_NAME && !referenced.contains(*name))
        .collect();
    unreferenced.sort();
    for name in unreferenced {
        result.add_issue(
            IssueSeverity::Info,
            "File not referenced by the manifest".to_string(),
            Some(name.clone()),
        );
    }

    Ok(result)
}

/// Read and parse the manifest; `Ok(None)` when the archive has none
fn read_manifest<R: Read + std::io::Seek>(
    archive: &mut ZipArchive<R>,
) -> std::result::Result<Option<Vec<ExportRecord>>, String> {
    let mut entry = match archive.by_name(MANIFEST_FILE_NAME) {
        Ok(entry) => entry,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(format!("Cannot read manifest: {}", e)),
    };

    let mut content = String::new();
    entry
        .read_to_string(&mut content)
        .map_err(|e| format!("Cannot read manifest: {}", e))?;

    serde_json::from_str(&content)
        .map(Some)
        .map_err(|e| format!("Invalid manifest: {}", e))
}
