//! Read-only access to the game library being exported
//!
//! The exporter never talks to a storage engine directly. Everything it needs
//! goes through [`LibrarySource`]: enumerate the games, and resolve an id in
//! one of the lookup tables to its display name.
//!
//! - [`InMemoryLibrary`] - HashMap-backed source for hosts that already hold the data
//! - [`LibrarySnapshot`] - JSON snapshot format that loads into an [`InMemoryLibrary`]

mod memory;
mod model;
mod snapshot;

pub use memory::*;
pub use model::*;
pub use snapshot::*;

use crate::error::Result;
use uuid::Uuid;

/// Read-only capability over a game library database
pub trait LibrarySource {
    /// Every game in the library, unfiltered and unpaged.
    ///
    /// A failure here aborts the whole export.
    fn games(&self) -> Result<Vec<SourceGame>>;

    /// Display name of `id` in the `category` table, `None` if it is unknown
    fn lookup(&self, category: LookupCategory, id: &Uuid) -> Option<String>;
}
