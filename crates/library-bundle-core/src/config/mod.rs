//! Configuration and export path layout

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Name of the manifest written at the bundle root
pub const MANIFEST_FILE_NAME: &str = "library.json";
/// Directory holding the staged images inside the bundle
pub const IMAGES_DIR_NAME: &str = "images";
/// File name of the produced archive
pub const ARCHIVE_FILE_NAME: &str = "MobileExport.zip";
/// Directory the bundle is assembled in before compression
pub const STAGING_DIR_NAME: &str = "MobileExportTemp";

const APP_DIR_NAME: &str = "library-bundle";

/// Configuration for library-bundle
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Host configuration directory (parent of the content store)
    pub configuration_path: Option<PathBuf>,
    /// Host application directory (receives the archive)
    pub application_path: Option<PathBuf>,
    /// JSON snapshot of the library database
    pub library_snapshot: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            configuration_path: None,
            application_path: dirs::data_local_dir().map(|p| p.join(APP_DIR_NAME)),
            library_snapshot: None,
        }
    }
}

impl Config {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join(APP_DIR_NAME).join("config.json"))
    }

    /// Load config from disk, falling back to defaults if not found
    pub fn load() -> Self {
        Self::config_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    /// Load config from a specific file, falling back to defaults
    pub fn load_from(path: &Path) -> Self {
        std::fs::read_to_string(path)
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default()
    }

    /// Save config to disk
    pub fn save(&self) -> std::io::Result<()> {
        if let Some(path) = Self::config_path() {
            self.save_to(&path)?;
        }
        Ok(())
    }

    /// Save config to a specific file
    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        std::fs::write(path, content)
    }

    /// Get the content store root that image paths are relative to
    pub fn content_store_path(&self) -> Option<PathBuf> {
        self.configuration_path
            .as_ref()
            .map(|p| p.join("library").join("files"))
    }

    /// Get the destination archive path
    pub fn archive_path(&self) -> Option<PathBuf> {
        self.application_path
            .as_ref()
            .map(|p| p.join(ARCHIVE_FILE_NAME))
    }

    /// Resolve every path an export run needs
    pub fn export_paths(&self) -> Result<ExportPaths> {
        let content_root = self
            .content_store_path()
            .ok_or_else(|| Error::Config("configuration path is not set".to_string()))?;
        let application_path = self
            .application_path
            .as_ref()
            .ok_or_else(|| Error::Config("application path is not set".to_string()))?;

        Ok(ExportPaths::new(content_root, application_path))
    }
}

/// Filesystem locations used by one export run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPaths {
    /// Root the stored image paths are relative to
    pub content_root: PathBuf,
    /// Directory the bundle is assembled in
    pub staging_root: PathBuf,
    /// Final archive location
    pub archive_path: PathBuf,
}

impl ExportPaths {
    /// Standard layout: staging directory and archive both live in `application_path`
    pub fn new(content_root: impl Into<PathBuf>, application_path: &Path) -> Self {
        Self {
            content_root: content_root.into(),
            staging_root: application_path.join(STAGING_DIR_NAME),
            archive_path: application_path.join(ARCHIVE_FILE_NAME),
        }
    }

    /// Directory holding the per-game image directories
    pub fn images_root(&self) -> PathBuf {
        self.staging_root.join(IMAGES_DIR_NAME)
    }

    /// Manifest location inside the staging tree
    pub fn manifest_path(&self) -> PathBuf {
        self.staging_root.join(MANIFEST_FILE_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_export_paths_layout() {
        let config = Config {
            configuration_path: Some(PathBuf::from("/host/config")),
            application_path: Some(PathBuf::from("/host/app")),
            library_snapshot: None,
        };

        let paths = config.export_paths().unwrap();
        assert_eq!(paths.content_root, Path::new("/host/config/library/files"));
        assert_eq!(paths.staging_root, Path::new("/host/app/MobileExportTemp"));
        assert_eq!(paths.archive_path, Path::new("/host/app/MobileExport.zip"));
        assert_eq!(
            paths.manifest_path(),
            Path::new("/host/app/MobileExportTemp/library.json")
        );
        assert_eq!(paths.images_root(), Path::new("/host/app/MobileExportTemp/images"));
    }

    #[test]
    fn test_missing_configuration_path_is_config_error() {
        let config = Config {
            configuration_path: None,
            application_path: Some(PathBuf::from("/host/app")),
            library_snapshot: None,
        };

        assert!(matches!(config.export_paths(), Err(Error::Config(_))));
    }

    #[test]
    fn test_save_and_load_from() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("config.json");
        let config = Config {
            configuration_path: Some(PathBuf::from("/a")),
            application_path: Some(PathBuf::from("/b")),
            library_snapshot: Some(PathBuf::from("/c/library.json")),
        };

        config.save_to(&path).unwrap();
        let loaded = Config::load_from(&path);
        assert_eq!(loaded.configuration_path, config.configuration_path);
        assert_eq!(loaded.library_snapshot, config.library_snapshot);
    }

    #[test]
    fn test_load_from_missing_file_uses_defaults() {
        let temp_dir = tempdir().unwrap();
        let loaded = Config::load_from(&temp_dir.path().join("nope.json"));
        assert!(loaded.configuration_path.is_none());
    }
}
