//! Kom crate - Client data layer for LysKOM conference systems
//!
//! This crate provides platform-independent forum reading functionality:
//! - Domain models (Text, Recipient, read-markings, Session)
//! - Backend service traits with in-memory and SQLite implementations
//! - An httpkom REST client
//! - The read queue, which orders unread texts depth-first by comment thread
//!
//! This crate has zero UI dependencies. Service calls are synchronous so
//! the crate can be driven from any executor or plain threads.

pub mod config;
pub mod error;
pub mod httpkom;
pub mod models;
pub mod queue;
pub mod service;

pub use crate::config::{ServerConfig, SessionFile};
pub use error::{KomError, QueueError, Result};
pub use httpkom::HttpkomClient;
pub use models::{
    AuthContext, Author, ClientInfo, CommentLink, CommentType, ConfNo, GlobalReadMarking,
    LocalReadMarking, LocalTextNo, PersNo, Recipient, RecipientList, RecipientType, Session, Text,
    TextBuilder, TextNo, UnreadConference, UnreadConferences, unread_text_nos,
};
pub use queue::{AdvanceStep, QueueEvent, QueueObserver, ReadQueue};
pub use service::{
    ConferenceService, InMemoryKomBackend, ReadMarkingStore, SessionService,
    SqliteReadMarkingStore, TextService,
};
