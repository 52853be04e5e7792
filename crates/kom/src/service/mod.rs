//! Backend service traits and implementations
//!
//! The read queue and the models only talk to the backend through these
//! traits, so the HTTP client, the in-memory backend and the SQLite store
//! are interchangeable.

mod memory;
mod sqlite;
mod traits;

pub use memory::InMemoryKomBackend;
pub use sqlite::SqliteReadMarkingStore;
pub use traits::{ConferenceService, ReadMarkingStore, SessionService, TextService};
