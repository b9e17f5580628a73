//! Manifest serialization and archive creation/extraction

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::{debug, warn};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::PackSummary;
use crate::config::MANIFEST_FILE_NAME;
use crate::error::{Error, Result};
use crate::export::ExportRecord;

/// Serialize records into the manifest document
pub fn render_manifest(records: &[ExportRecord]) -> Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// Write the manifest into `staging_root`, zip the whole tree to `archive_path`
/// and remove the staging tree.
///
/// The archive is written to a `.part` file first and renamed into place once
/// complete. On failure the partial file is removed and the staging tree is
/// left as is.
pub fn pack(records: &[ExportRecord], staging_root: &Path, archive_path: &Path) -> Result<PackSummary> {
    let manifest = render_manifest(records)?;
    let manifest_sha256 = format!("{:x}", Sha256::digest(manifest.as_bytes()));

    fs::create_dir_all(staging_root)?;
    fs::write(staging_root.join(MANIFEST_FILE_NAME), &manifest)?;

    if archive_path.exists() {
        fs::remove_file(archive_path)?;
    }
    if let Some(parent) = archive_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let part_path = partial_path(archive_path);
    let files_archived = match write_archive(staging_root, &part_path)
        .and_then(|count| fs::rename(&part_path, archive_path).map(|_| count).map_err(Error::from))
    {
        Ok(count) => count,
        Err(e) => {
            if part_path.exists() {
                if let Err(remove_err) = fs::remove_file(&part_path) {
                    warn!("Failed to remove {}: {}", part_path.display(), remove_err);
                }
            }
            return Err(e);
        }
    };

    let archive_size = fs::metadata(archive_path)?.len();

    // The archive is committed at this point; a leftover staging tree is
    // cleared again by the next run.
    if let Err(e) = fs::remove_dir_all(staging_root) {
        warn!("Failed to remove staging directory {}: {}", staging_root.display(), e);
    }

    Ok(PackSummary {
        manifest_sha256,
        files_archived,
        archive_size,
    })
}

/// Temporary name the archive is written under
pub fn partial_path(archive_path: &Path) -> PathBuf {
    let mut name = archive_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".part");
    archive_path.with_file_name(name)
}

/// Zip every directory and file under `source` into `dest`.
///
/// Entries are walked in file-name order with `/` separators relative to
/// `source`. Returns the number of files written.
pub fn write_archive(source: &Path, dest: &Path) -> Result<usize> {
    if !source.is_dir() {
        return Err(Error::Other(format!(
            "Source path does not exist: {}",
            source.display()
        )));
    }

    let file = File::create(dest)?;
    let mut zip = ZipWriter::new(file);

    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(6));

    let mut files_archived = 0usize;

    for entry in WalkDir::new(source).sort_by_file_name() {
        let entry = entry.map_err(|e| Error::Other(e.to_string()))?;
        if entry.path() == source {
            continue;
        }

        let relative_path = archive_name(source, entry.path());

        if entry.file_type().is_dir() {
            zip.add_directory(relative_path + "/", options)?;
        } else if entry.file_type().is_file() {
            add_file_to_zip(&mut zip, entry.path(), &relative_path, options)?;
            files_archived += 1;
        }
    }

    zip.finish()?;
    debug!("Archived {} files into {}", files_archived, dest.display());

    Ok(files_archived)
}

fn archive_name(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

/// Add a file to a zip archive
fn add_file_to_zip<W: Write + std::io::Seek>(
    zip: &mut ZipWriter<W>,
    file_path: &Path,
    archive_path: &str,
    options: SimpleFileOptions,
) -> Result<u64> {
    let mut file = File::open(file_path)?;
    let file_size = file.metadata()?.len();

    zip.start_file(archive_path, options)?;

    let mut buffer = vec![0u8; 64 * 1024];
    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        zip.write_all(&buffer[..bytes_read])?;
    }

    Ok(file_size)
}

/// Extract a bundle archive into `dest`. Returns the number of files written.
///
/// Entries whose names would escape `dest` are skipped.
pub fn extract_bundle(archive_path: &Path, dest: &Path) -> Result<usize> {
    let file = File::open(archive_path)?;
    let mut archive = ZipArchive::new(file)?;

    fs::create_dir_all(dest)?;

    let mut files_extracted = 0usize;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let outpath = match entry.enclosed_name() {
            Some(path) => dest.join(path),
            None => {
                warn!("Skipping unsafe archive entry: {}", entry.name());
                continue;
            }
        };

        if entry.is_dir() {
            fs::create_dir_all(&outpath)?;
        } else {
            if let Some(parent) = outpath.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut outfile = File::create(&outpath)?;
            std::io::copy(&mut entry, &mut outfile)?;
            files_extracted += 1;
        }
    }

    Ok(files_extracted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use uuid::Uuid;

    fn staging_with_image(root: &Path) -> PathBuf {
        let staging = root.join("staging");
        let image_dir = staging.join("images").join("g1");
        fs::create_dir_all(&image_dir).unwrap();
        fs::write(image_dir.join("cover.png"), b"png").unwrap();
        staging
    }

    #[test]
    fn test_pack_and_extract() {
        let temp_dir = tempdir().unwrap();
        let staging = staging_with_image(temp_dir.path());
        let archive = temp_dir.path().join("out").join("bundle.zip");
        let records = vec![ExportRecord {
            id: Uuid::from_u128(1),
            name: "Game".to_string(),
            ..Default::default()
        }];

        let summary = pack(&records, &staging, &archive).unwrap();

        assert!(archive.is_file());
        assert!(!staging.exists());
        assert!(!partial_path(&archive).exists());
        assert_eq!(summary.files_archived, 2);
        assert_eq!(summary.archive_size, fs::metadata(&archive).unwrap().len());

        let extracted = temp_dir.path().join("extracted");
        assert_eq!(extract_bundle(&archive, &extracted).unwrap(), 2);
        assert_eq!(
            fs::read(extracted.join("images/g1/cover.png")).unwrap(),
            b"png"
        );
        let manifest = fs::read_to_string(extracted.join(MANIFEST_FILE_NAME)).unwrap();
        assert_eq!(manifest, render_manifest(&records).unwrap());
    }

    #[test]
    fn test_pack_replaces_existing_archive() {
        let temp_dir = tempdir().unwrap();
        let archive = temp_dir.path().join("bundle.zip");
        fs::write(&archive, b"stale contents that are not a zip").unwrap();

        let staging = staging_with_image(temp_dir.path());
        pack(&[], &staging, &archive).unwrap();

        let reader = ZipArchive::new(File::open(&archive).unwrap()).unwrap();
        assert!(reader.file_names().any(|n| n == MANIFEST_FILE_NAME));
    }

    #[test]
    fn test_failed_pack_keeps_staging_and_leaves_no_archive() {
        let temp_dir = tempdir().unwrap();
        let staging = staging_with_image(temp_dir.path());
        // A directory squatting on the temporary name makes archive creation fail
        let archive = temp_dir.path().join("bundle.zip");
        fs::create_dir_all(partial_path(&archive)).unwrap();

        let result = pack(&[], &staging, &archive);

        assert!(result.is_err());
        assert!(staging.join(MANIFEST_FILE_NAME).is_file());
        assert!(staging.join("images/g1/cover.png").is_file());
        assert!(!archive.exists());
    }

    #[test]
    fn test_manifest_hash_is_stable() {
        let temp_dir = tempdir().unwrap();
        let records = vec![ExportRecord {
            id: Uuid::from_u128(9),
            name: "Same".to_string(),
            ..Default::default()
        }];

        let first = pack(
            &records,
            &staging_with_image(temp_dir.path()),
            &temp_dir.path().join("a.zip"),
        )
        .unwrap();
        let second = pack(
            &records,
            &staging_with_image(temp_dir.path()),
            &temp_dir.path().join("b.zip"),
        )
        .unwrap();

        assert_eq!(first.manifest_sha256, second.manifest_sha256);
        assert_eq!(first.manifest_sha256.len(), 64);
    }

    #[test]
    fn test_partial_path() {
        assert_eq!(
            partial_path(Path::new("/app/MobileExport.zip")),
            Path::new("/app/MobileExport.zip.part")
        );
    }
}
