//! Data models for the source library

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

/// Category of a lookup table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LookupCategory {
    Platforms,
    /// Shared by the developer and publisher roles
    Companies,
    Genres,
    Tags,
    Features,
    Series,
    AgeRatings,
    Sources,
    CompletionStatuses,
}

impl LookupCategory {
    /// Get all lookup categories
    pub fn all() -> &'static [LookupCategory] {
        &[
            LookupCategory::Platforms,
            LookupCategory::Companies,
            LookupCategory::Genres,
            LookupCategory::Tags,
            LookupCategory::Features,
            LookupCategory::Series,
            LookupCategory::AgeRatings,
            LookupCategory::Sources,
            LookupCategory::CompletionStatuses,
        ]
    }

    /// Get user-friendly label
    pub fn label(&self) -> &'static str {
        match self {
            LookupCategory::Platforms => "platforms",
            LookupCategory::Companies => "companies",
            LookupCategory::Genres => "genres",
            LookupCategory::Tags => "tags",
            LookupCategory::Features => "features",
            LookupCategory::Series => "series",
            LookupCategory::AgeRatings => "age ratings",
            LookupCategory::Sources => "sources",
            LookupCategory::CompletionStatuses => "completion statuses",
        }
    }
}

impl fmt::Display for LookupCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A named entry of a lookup table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedEntity {
    pub id: Uuid,
    pub name: String,
}

impl NamedEntity {
    pub fn new(id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// A named web link attached to a game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameLink {
    pub name: String,
    pub url: String,
}

impl GameLink {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// A game as stored in the source library
///
/// Id-reference fields point into the lookup tables exposed by a
/// [`LibrarySource`](super::LibrarySource). Image fields are paths relative to
/// the content store root.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceGame {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub install_directory: Option<String>,
    pub is_installed: bool,
    pub hidden: bool,
    pub favorite: bool,

    pub community_score: Option<i32>,
    pub critic_score: Option<i32>,
    pub user_score: Option<i32>,

    pub release_date: Option<NaiveDate>,
    pub last_activity: Option<DateTime<Utc>>,
    pub added: Option<DateTime<Utc>>,
    pub modified: Option<DateTime<Utc>>,

    /// Total time played, stored in the snapshot format as whole seconds
    #[serde(with = "duration_secs")]
    pub playtime: Duration,

    #[serde(deserialize_with = "null_as_empty")]
    pub platform_ids: Vec<Uuid>,
    #[serde(deserialize_with = "null_as_empty")]
    pub developer_ids: Vec<Uuid>,
    #[serde(deserialize_with = "null_as_empty")]
    pub publisher_ids: Vec<Uuid>,
    #[serde(deserialize_with = "null_as_empty")]
    pub genre_ids: Vec<Uuid>,
    #[serde(deserialize_with = "null_as_empty")]
    pub tag_ids: Vec<Uuid>,
    #[serde(deserialize_with = "null_as_empty")]
    pub feature_ids: Vec<Uuid>,
    #[serde(deserialize_with = "null_as_empty")]
    pub series_ids: Vec<Uuid>,
    #[serde(deserialize_with = "null_as_empty")]
    pub age_rating_ids: Vec<Uuid>,

    pub source_id: Option<Uuid>,
    pub completion_status_id: Option<Uuid>,

    #[serde(deserialize_with = "null_as_empty")]
    pub links: Vec<GameLink>,

    pub cover_image: Option<String>,
    pub background_image: Option<String>,
    pub icon: Option<String>,
}

impl SourceGame {
    /// Create a game with the given id and name and every other field empty
    pub fn new(id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Treats an explicit `null` list the same as a missing one
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

mod duration_secs {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_secs(
            Option::<u64>::deserialize(deserializer)?.unwrap_or(0),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_lists_deserialize_as_empty() {
        let json = r#"{
            "id": "00000000-0000-0000-0000-000000000001",
            "name": "Test",
            "tag_ids": null,
            "links": null,
            "playtime": 90
        }"#;

        let game: SourceGame = serde_json::from_str(json).unwrap();
        assert!(game.tag_ids.is_empty());
        assert!(game.genre_ids.is_empty());
        assert!(game.links.is_empty());
        assert_eq!(game.playtime, Duration::from_secs(90));
    }

    #[test]
    fn test_lookup_category_labels() {
        assert_eq!(LookupCategory::all().len(), 9);
        assert_eq!(LookupCategory::AgeRatings.to_string(), "age ratings");
    }
}
