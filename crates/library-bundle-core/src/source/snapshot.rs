//! JSON snapshot of a library database
//!
//! A snapshot is a plain dump of the games and every lookup table:
//!
//! ```json
//! {
//!   "games": [{ "id": "...", "name": "...", "genre_ids": ["..."] }],
//!   "genres": [{ "id": "...", "name": "RPG" }]
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{InMemoryLibrary, LookupCategory, NamedEntity, SourceGame};
use crate::error::{Error, Result};

/// Serializable dump of a library database
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LibrarySnapshot {
    pub games: Vec<SourceGame>,
    pub platforms: Vec<NamedEntity>,
    pub companies: Vec<NamedEntity>,
    pub genres: Vec<NamedEntity>,
    pub tags: Vec<NamedEntity>,
    pub features: Vec<NamedEntity>,
    pub series: Vec<NamedEntity>,
    pub age_ratings: Vec<NamedEntity>,
    pub sources: Vec<NamedEntity>,
    pub completion_statuses: Vec<NamedEntity>,
}

impl LibrarySnapshot {
    /// Parse a snapshot from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Source(format!("Invalid snapshot: {}", e)))
    }

    /// Load a snapshot file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Source(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&content)
    }

    /// Save the snapshot as pretty-printed JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Entries of the table for `category`
    pub fn table(&self, category: LookupCategory) -> &[NamedEntity] {
        match category {
            LookupCategory::Platforms => &self.platforms,
            LookupCategory::Companies => &self.companies,
            LookupCategory::Genres => &self.genres,
            LookupCategory::Tags => &self.tags,
            LookupCategory::Features => &self.features,
            LookupCategory::Series => &self.series,
            LookupCategory::AgeRatings => &self.age_ratings,
            LookupCategory::Sources => &self.sources,
            LookupCategory::CompletionStatuses => &self.completion_statuses,
        }
    }

    /// Mutable entries of the table for `category`
    pub fn table_mut(&mut self, category: LookupCategory) -> &mut Vec<NamedEntity> {
        match category {
            LookupCategory::Platforms => &mut self.platforms,
            LookupCategory::Companies => &mut self.companies,
            LookupCategory::Genres => &mut self.genres,
            LookupCategory::Tags => &mut self.tags,
            LookupCategory::Features => &mut self.features,
            LookupCategory::Series => &mut self.series,
            LookupCategory::AgeRatings => &mut self.age_ratings,
            LookupCategory::Sources => &mut self.sources,
            LookupCategory::CompletionStatuses => &mut self.completion_statuses,
        }
    }
}

impl From<LibrarySnapshot> for InMemoryLibrary {
    fn from(mut snapshot: LibrarySnapshot) -> Self {
        let mut library = InMemoryLibrary::new();
        for &category in LookupCategory::all() {
            for entity in std::mem::take(snapshot.table_mut(category)) {
                library.add_entity(category, entity);
            }
        }
        for game in snapshot.games {
            library.add_game(game);
        }
        library
    }
}

impl From<&InMemoryLibrary> for LibrarySnapshot {
    fn from(library: &InMemoryLibrary) -> Self {
        let mut snapshot = LibrarySnapshot {
            games: library.game_list().to_vec(),
            ..Default::default()
        };
        for &category in LookupCategory::all() {
            *snapshot.table_mut(category) = library.entities(category);
        }
        snapshot
    }
}

/// Load a snapshot file straight into an [`InMemoryLibrary`]
pub fn load_snapshot(path: &Path) -> Result<InMemoryLibrary> {
    LibrarySnapshot::load(path).map(InMemoryLibrary::from)
}
