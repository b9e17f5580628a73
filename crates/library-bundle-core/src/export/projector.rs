//! Projection of source games into export records

use std::collections::BTreeMap;

use tracing::debug;
use uuid::Uuid;

use super::record::ExportRecord;
use crate::source::{LibrarySource, LookupCategory, SourceGame};

/// Builds [`ExportRecord`]s by resolving a game's id references
///
/// Ids that do not resolve are dropped and counted, never reported as errors:
/// lookup entries get deleted while games keep pointing at them.
pub struct RecordProjector<'a> {
    source: &'a dyn LibrarySource,
    unresolved: usize,
}

impl<'a> RecordProjector<'a> {
    /// Create a projector resolving names through `source`
    pub fn new(source: &'a dyn LibrarySource) -> Self {
        Self {
            source,
            unresolved: 0,
        }
    }

    /// Number of ids that failed to resolve so far
    pub fn unresolved_ids(&self) -> usize {
        self.unresolved
    }

    /// Project one game. Image fields are left unset; staging fills them in.
    pub fn project(&mut self, game: &SourceGame) -> ExportRecord {
        ExportRecord {
            id: game.id,
            name: game.name.clone(),
            description: game.description.clone(),
            playtime: game.playtime.as_secs(),
            last_played: game.last_activity,
            added: game.added,
            release_date: game.release_date.and_then(|d| d.and_hms_opt(0, 0, 0)),
            modified: game.modified,
            hidden: game.hidden,
            favorite: game.favorite,
            is_installed: game.is_installed,
            install_directory: game.install_directory.clone(),

            source: self.resolve_one(LookupCategory::Sources, game.source_id.as_ref()),
            completion_status: self.resolve_one(
                LookupCategory::CompletionStatuses,
                game.completion_status_id.as_ref(),
            ),

            platforms: self.resolve_all(LookupCategory::Platforms, &game.platform_ids),
            developers: self.resolve_all(LookupCategory::Companies, &game.developer_ids),
            publishers: self.resolve_all(LookupCategory::Companies, &game.publisher_ids),
            genres: self.resolve_all(LookupCategory::Genres, &game.genre_ids),
            tags: self.resolve_all(LookupCategory::Tags, &game.tag_ids),
            features: self.resolve_all(LookupCategory::Features, &game.feature_ids),
            series: self.resolve_all(LookupCategory::Series, &game.series_ids),
            age_ratings: self.resolve_all(LookupCategory::AgeRatings, &game.age_rating_ids),

            links: collect_links(game),

            cover_image: None,
            background_image: None,
            icon: None,

            community_score: game.community_score,
            critic_score: game.critic_score,
            user_score: game.user_score,
        }
    }

    /// Resolve a list of ids, keeping source order and duplicates
    fn resolve_all(&mut self, category: LookupCategory, ids: &[Uuid]) -> Vec<String> {
        let mut names = Vec::with_capacity(ids.len());
        for id in ids {
            match self.source.lookup(category, id) {
                Some(name) => names.push(name),
                None => self.note_unresolved(category, id),
            }
        }
        names
    }

    /// Resolve an optional single id; a nil id means the field is absent
    fn resolve_one(&mut self, category: LookupCategory, id: Option<&Uuid>) -> Option<String> {
        let id = id.filter(|id| !id.is_nil())?;
        let name = self.source.lookup(category, id);
        if name.is_none() {
            self.note_unresolved(category, id);
        }
        name
    }

    fn note_unresolved(&mut self, category: LookupCategory, id: &Uuid) {
        debug!("Unresolved id {} in {}", id, category);
        self.unresolved += 1;
    }
}

/// Project a single game without keeping resolution statistics
pub fn project(game: &SourceGame, lookups: &dyn LibrarySource) -> ExportRecord {
    RecordProjector::new(lookups).project(game)
}

/// Link name to URL; a repeated name keeps the last URL
fn collect_links(game: &SourceGame) -> BTreeMap<String, String> {
    let mut links = BTreeMap::new();
    for link in &game.links {
        links.insert(link.name.clone(), link.url.clone());
    }
    links
}
