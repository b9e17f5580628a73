//! Denormalized export record written to the manifest

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Kind of image attached to a game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageKind {
    Cover,
    Background,
    Icon,
}

impl ImageKind {
    /// Get all image kinds, in staging order
    pub fn all() -> &'static [ImageKind] {
        &[ImageKind::Cover, ImageKind::Background, ImageKind::Icon]
    }

    /// Base file name of the staged copy (extension is kept from the source)
    pub fn file_stem(&self) -> &'static str {
        match self {
            ImageKind::Cover => "cover",
            ImageKind::Background => "background",
            ImageKind::Icon => "icon",
        }
    }
}

impl fmt::Display for ImageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.file_stem())
    }
}

/// One game, with every id reference resolved to a display name
///
/// Field order here is the field order of the manifest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExportRecord {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// Total playtime in seconds
    pub playtime: u64,
    pub last_played: Option<DateTime<Utc>>,
    pub added: Option<DateTime<Utc>>,
    /// Release day at midnight, written as `YYYY-MM-DDT00:00:00`
    pub release_date: Option<NaiveDateTime>,
    pub modified: Option<DateTime<Utc>>,
    pub hidden: bool,
    pub favorite: bool,
    pub is_installed: bool,
    pub install_directory: Option<String>,

    pub source: Option<String>,
    pub completion_status: Option<String>,

    #[serde(rename = "Platform", default)]
    pub platforms: Vec<String>,
    #[serde(default)]
    pub developers: Vec<String>,
    #[serde(default)]
    pub publishers: Vec<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub series: Vec<String>,
    #[serde(rename = "AgeRating", default)]
    pub age_ratings: Vec<String>,

    /// Link name to URL
    #[serde(default)]
    pub links: BTreeMap<String, String>,

    pub cover_image: Option<String>,
    pub background_image: Option<String>,
    pub icon: Option<String>,

    pub community_score: Option<i32>,
    pub critic_score: Option<i32>,
    pub user_score: Option<i32>,
}

impl ExportRecord {
    /// Bundle-relative path of one image, if staged
    pub fn image(&self, kind: ImageKind) -> Option<&str> {
        match kind {
            ImageKind::Cover => self.cover_image.as_deref(),
            ImageKind::Background => self.background_image.as_deref(),
            ImageKind::Icon => self.icon.as_deref(),
        }
    }

    /// Set the bundle-relative path of one image
    pub fn set_image(&mut self, kind: ImageKind, path: Option<String>) {
        match kind {
            ImageKind::Cover => self.cover_image = path,
            ImageKind::Background => self.background_image = path,
            ImageKind::Icon => self.icon = path,
        }
    }

    /// All staged image paths of this record
    pub fn image_paths(&self) -> impl Iterator<Item = (ImageKind, &str)> + '_ {
        ImageKind::all()
            .iter()
            .filter_map(move |&kind| self.image(kind).map(|path| (kind, path)))
    }
}
