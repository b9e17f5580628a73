//! In-memory library source

use std::collections::HashMap;

use uuid::Uuid;

use super::{LibrarySource, LookupCategory, NamedEntity, SourceGame};
use crate::error::Result;

/// Library held entirely in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryLibrary {
    games: Vec<SourceGame>,
    tables: HashMap<LookupCategory, HashMap<Uuid, String>>,
}

impl InMemoryLibrary {
    /// Create an empty library
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a game (builder style)
    pub fn with_game(mut self, game: SourceGame) -> Self {
        self.add_game(game);
        self
    }

    /// Add a lookup table entry (builder style)
    pub fn with_entity(
        mut self,
        category: LookupCategory,
        id: Uuid,
        name: impl Into<String>,
    ) -> Self {
        self.add_entity(category, NamedEntity::new(id, name));
        self
    }

    /// Add a game
    pub fn add_game(&mut self, game: SourceGame) {
        self.games.push(game);
    }

    /// Add a lookup table entry, replacing any entry with the same id
    pub fn add_entity(&mut self, category: LookupCategory, entity: NamedEntity) {
        self.tables
            .entry(category)
            .or_default()
            .insert(entity.id, entity.name);
    }

    /// Number of games in the library
    pub fn len(&self) -> usize {
        self.games.len()
    }

    /// Check if the library has no games
    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    /// Games in insertion order
    pub fn game_list(&self) -> &[SourceGame] {
        &self.games
    }

    /// Number of entries in one lookup table
    pub fn table_len(&self, category: LookupCategory) -> usize {
        self.tables.get(&category).map(|t| t.len()).unwrap_or(0)
    }

    /// Entries of one lookup table, sorted by name then id
    pub fn entities(&self, category: LookupCategory) -> Vec<NamedEntity> {
        let mut entities: Vec<NamedEntity> = self
            .tables
            .get(&category)
            .map(|table| {
                table
                    .iter()
                    .map(|(id, name)| NamedEntity::new(*id, name.clone()))
                    .collect()
            })
            .unwrap_or_default();
        entities.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        entities
    }
}

impl LibrarySource for InMemoryLibrary {
    fn games(&self) -> Result<Vec<SourceGame>> {
        Ok(self.games.clone())
    }

    fn lookup(&self, category: LookupCategory, id: &Uuid) -> Option<String> {
        self.tables.get(&category)?.get(id).cloned()
    }
}
