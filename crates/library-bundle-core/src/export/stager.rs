//! Staging of game images into the bundle tree

use std::fs;
use std::path::{Component, Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};

use super::record::{ExportRecord, ImageKind};
use crate::config::IMAGES_DIR_NAME;
use crate::source::SourceGame;

/// Counters collected while staging images
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StagingStats {
    /// Images copied into the bundle
    pub staged: usize,
    /// Images referenced by a game but absent from the content store
    pub missing: usize,
    /// Images that exist but could not be copied
    pub failed: usize,
}

/// Bundle-relative image paths produced for one game
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StagedImages {
    pub cover_image: Option<String>,
    pub background_image: Option<String>,
    pub icon: Option<String>,
}

impl StagedImages {
    fn set(&mut self, kind: ImageKind, path: String) {
        match kind {
            ImageKind::Cover => self.cover_image = Some(path),
            ImageKind::Background => self.background_image = Some(path),
            ImageKind::Icon => self.icon = Some(path),
        }
    }

    /// Check if no image was staged
    pub fn is_empty(&self) -> bool {
        self.cover_image.is_none() && self.background_image.is_none() && self.icon.is_none()
    }

    /// Write these paths into a record's image fields
    pub fn apply_to(self, record: &mut ExportRecord) {
        record.set_image(ImageKind::Cover, self.cover_image);
        record.set_image(ImageKind::Background, self.background_image);
        record.set_image(ImageKind::Icon, self.icon);
    }
}

/// Copies game images from the content store into `images/<game-id>/`
///
/// Every failure here is per image: it is logged, counted and the image is
/// left out of the bundle. Nothing aborts the run.
pub struct AssetStager {
    content_root: PathBuf,
    images_root: PathBuf,
    stats: StagingStats,
}

impl AssetStager {
    /// Create a stager reading from `content_root` and writing under `images_root`
    pub fn new(content_root: impl AsRef<Path>, images_root: impl AsRef<Path>) -> Self {
        Self {
            content_root: content_root.as_ref().to_path_buf(),
            images_root: images_root.as_ref().to_path_buf(),
            stats: StagingStats::default(),
        }
    }

    /// Counters for everything staged so far
    pub fn stats(&self) -> StagingStats {
        self.stats
    }

    /// Stage the cover, background and icon of one game
    pub fn stage(&mut self, game: &SourceGame) -> StagedImages {
        let game_dir = self.images_root.join(game.id.to_string());
        let mut dir_created = false;
        let mut staged = StagedImages::default();

        for &kind in ImageKind::all() {
            let stored = match stored_image(game, kind) {
                Some(path) if !path.trim().is_empty() => path,
                _ => continue,
            };

            let source_path = match resolve_content_path(&self.content_root, stored) {
                Some(path) if path.is_file() => path,
                _ => {
                    warn!("{} image for '{}' not found: {}", kind, game.name, stored);
                    self.stats.missing += 1;
                    continue;
                }
            };

            if !dir_created {
                if let Err(e) = fs::create_dir_all(&game_dir) {
                    warn!("Failed to create {}: {}", game_dir.display(), e);
                    self.stats.failed += 1;
                    continue;
                }
                dir_created = true;
            }

            let file_name = staged_file_name(kind, stored);
            match fs::copy(&source_path, game_dir.join(&file_name)) {
                Ok(_) => {
                    debug!("Staged {} for '{}'", file_name, game.name);
                    staged.set(kind, format!("{}/{}/{}", IMAGES_DIR_NAME, game.id, file_name));
                    self.stats.staged += 1;
                }
                Err(e) => {
                    warn!(
                        "Failed to copy {} image for '{}' from {}: {}",
                        kind,
                        game.name,
                        source_path.display(),
                        e
                    );
                    self.stats.failed += 1;
                }
            }
        }

        // Games without a single staged image get no directory at all
        if dir_created && staged.is_empty() {
            if let Err(e) = fs::remove_dir_all(&game_dir) {
                warn!("Failed to remove {}: {}", game_dir.display(), e);
            }
        }

        staged
    }
}

fn stored_image(game: &SourceGame, kind: ImageKind) -> Option<&str> {
    match kind {
        ImageKind::Cover => game.cover_image.as_deref(),
        ImageKind::Background => game.background_image.as_deref(),
        ImageKind::Icon => game.icon.as_deref(),
    }
}

/// Join a stored relative path onto the content root.
///
/// Both `/` and `\` count as separators. Paths that are absolute or climb out
/// of the root resolve to `None`.
fn resolve_content_path(content_root: &Path, stored: &str) -> Option<PathBuf> {
    let mut resolved = content_root.to_path_buf();
    for part in stored.split(['/', '\\']).filter(|p| !p.is_empty()) {
        match Path::new(part).components().next() {
            Some(Component::Normal(_)) => resolved.push(part),
            Some(Component::CurDir) => {}
            _ => return None,
        }
    }
    if stored.starts_with(['/', '\\']) || resolved == content_root {
        return None;
    }
    Some(resolved)
}

/// `<kind>.<ext>` using the extension of the stored path
fn staged_file_name(kind: ImageKind, stored: &str) -> String {
    let name = stored.rsplit(['/', '\\']).next().unwrap_or(stored);
    match Path::new(name).extension().and_then(|e| e.to_str()) {
        Some(ext) if !ext.is_empty() => format!("{}.{}", kind.file_stem(), ext),
        _ => kind.file_stem().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use uuid::Uuid;

    struct Store {
        _temp_dir: tempfile::TempDir,
        content_root: PathBuf,
        images_root: PathBuf,
    }

    impl Store {
        fn new() -> Self {
            let temp_dir = tempdir().unwrap();
            let content_root = temp_dir.path().join("files");
            let images_root = temp_dir.path().join("staging").join("images");
            fs::create_dir_all(&content_root).unwrap();
            fs::create_dir_all(&images_root).unwrap();
            Self {
                _temp_dir: temp_dir,
                content_root,
                images_root,
            }
        }

        fn add(&self, relative: &str, content: &[u8]) {
            let path = self.content_root.join(relative);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }

        fn stager(&self) -> AssetStager {
            AssetStager::new(&self.content_root, &self.images_root)
        }
    }

    #[test]
    fn test_cover_only_stages_single_file() {
        let store = Store::new();
        store.add("abc/cover-art.jpg", b"jpeg");
        let game = SourceGame {
            cover_image: Some("abc/cover-art.jpg".to_string()),
            background_image: Some("abc/missing.png".to_string()),
            ..SourceGame::new(Uuid::from_u128(1), "Game")
        };

        let mut stager = store.stager();
        let staged = stager.stage(&game);

        let game_dir = store.images_root.join(game.id.to_string());
        assert_eq!(
            staged.cover_image,
            Some(format!("images/{}/cover.jpg", game.id))
        );
        assert_eq!(staged.background_image, None);
        assert_eq!(staged.icon, None);
        assert_eq!(fs::read_dir(&game_dir).unwrap().count(), 1);
        assert_eq!(fs::read(game_dir.join("cover.jpg")).unwrap(), b"jpeg");
        assert_eq!(
            stager.stats(),
            StagingStats {
                staged: 1,
                missing: 1,
                failed: 0
            }
        );
    }

    #[test]
    fn test_no_images_creates_no_directory() {
        let store = Store::new();
        let game = SourceGame {
            icon: Some("nowhere/icon.ico".to_string()),
            ..SourceGame::new(Uuid::from_u128(2), "Game")
        };

        let staged = store.stager().stage(&game);

        assert!(staged.is_empty());
        assert!(!store.images_root.join(game.id.to_string()).exists());
    }

    #[test]
    fn test_all_kinds_share_one_directory() {
        let store = Store::new();
        store.add("g/a.png", b"a");
        store.add("g/b.jpeg", b"b");
        store.add("g/c.ico", b"c");
        let game = SourceGame {
            cover_image: Some("g/a.png".to_string()),
            background_image: Some("g/b.jpeg".to_string()),
            icon: Some("g\\c.ico".to_string()),
            ..SourceGame::new(Uuid::from_u128(3), "Game")
        };

        let staged = store.stager().stage(&game);

        let dir = store.images_root.join(game.id.to_string());
        assert!(dir.join("cover.png").is_file());
        assert!(dir.join("background.jpeg").is_file());
        assert!(dir.join("icon.ico").is_file());
        assert_eq!(staged.icon, Some(format!("images/{}/icon.ico", game.id)));
    }

    #[test]
    fn test_copy_failure_does_not_stop_other_kinds() {
        let store = Store::new();
        store.add("g/front.png", b"cover");
        store.add("g/back.jpg", b"background");
        let game = SourceGame {
            cover_image: Some("g/front.png".to_string()),
            background_image: Some("g/back.jpg".to_string()),
            ..SourceGame::new(Uuid::from_u128(4), "Game")
        };
        // A directory at the destination makes the cover copy fail
        let game_dir = store.images_root.join(game.id.to_string());
        fs::create_dir_all(game_dir.join("cover.png")).unwrap();

        let mut stager = store.stager();
        let staged = stager.stage(&game);

        assert_eq!(staged.cover_image, None);
        assert_eq!(
            staged.background_image,
            Some(format!("images/{}/background.jpg", game.id))
        );
        assert_eq!(fs::read(game_dir.join("background.jpg")).unwrap(), b"background");
        assert_eq!(
            stager.stats(),
            StagingStats {
                staged: 1,
                missing: 0,
                failed: 1
            }
        );
    }

    #[test]
    fn test_every_copy_failing_removes_game_directory() {
        let store = Store::new();
        store.add("g/front.png", b"cover");
        store.add("g/small.ico", b"icon");
        let game = SourceGame {
            cover_image: Some("g/front.png".to_string()),
            icon: Some("g/small.ico".to_string()),
            ..SourceGame::new(Uuid::from_u128(5), "Game")
        };
        let game_dir = store.images_root.join(game.id.to_string());
        fs::create_dir_all(game_dir.join("cover.png")).unwrap();
        fs::create_dir_all(game_dir.join("icon.ico")).unwrap();

        let mut stager = store.stager();
        let staged = stager.stage(&game);

        assert!(staged.is_empty());
        assert_eq!(stager.stats().failed, 2);
        assert!(!game_dir.exists());

        // The next game is staged normally
        store.add("h/front.png", b"next");
        let next = SourceGame {
            cover_image: Some("h/front.png".to_string()),
            ..SourceGame::new(Uuid::from_u128(6), "Next")
        };
        assert!(stager.stage(&next).cover_image.is_some());
        assert_eq!(stager.stats().staged, 1);
    }

    #[test]
    fn test_staged_file_name() {
        assert_eq!(staged_file_name(ImageKind::Cover, "x/y.jpg"), "cover.jpg");
        assert_eq!(staged_file_name(ImageKind::Icon, "x\\y.PNG"), "icon.PNG");
        assert_eq!(staged_file_name(ImageKind::Background, "x/noext"), "background");
        assert_eq!(staged_file_name(ImageKind::Cover, "x.dir/noext"), "cover");
    }

    #[test]
    fn test_resolve_content_path_stays_inside_root() {
        let root = Path::new("/store/files");
        assert_eq!(
            resolve_content_path(root, "a/b.png"),
            Some(PathBuf::from("/store/files/a/b.png"))
        );
        assert_eq!(
            resolve_content_path(root, "a\\b.png"),
            Some(PathBuf::from("/store/files/a/b.png"))
        );
        assert_eq!(resolve_content_path(root, "../etc/passwd"), None);
        assert_eq!(resolve_content_path(root, "/etc/passwd"), None);
        assert_eq!(resolve_content_path(root, "./"), None);
    }
}
