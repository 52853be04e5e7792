//! Backend service trait definitions

use crate::error::Result;
use crate::models::{
    ConfNo, GlobalReadMarking, LocalReadMarking, LocalTextNo, Session, Text, TextNo,
    UnreadConferences,
};

/// Fetching and creating texts
///
/// Implementations do no retrying or caching; every call goes to the backend.
pub trait TextService: Send + Sync {
    /// Fetch the full record for a text
    fn fetch_text(&self, text_no: TextNo) -> Result<Text>;

    /// Create a new text from a draft, returning its assigned number
    fn create_text(&self, text: &Text) -> Result<TextNo>;
}

/// Persistence of read-markings
///
/// Global and local markings live under separate keys. Writes overwrite,
/// deletes of missing markings succeed.
pub trait ReadMarkingStore: Send + Sync {
    /// Create or overwrite the global marking for a text
    fn save_global_read_marking(&self, marking: &GlobalReadMarking) -> Result<()>;

    /// Remove the global marking for a text
    fn delete_global_read_marking(&self, text_no: TextNo) -> Result<()>;

    fn get_global_read_marking(&self, text_no: TextNo) -> Result<Option<GlobalReadMarking>>;

    /// Create or overwrite the marking at `(conf_no, local_text_no)`
    fn save_local_read_marking(&self, marking: &LocalReadMarking) -> Result<()>;

    fn delete_local_read_marking(&self, conf_no: ConfNo, local_text_no: LocalTextNo)
    -> Result<()>;

    /// List the markings of a conference, ordered by local text number
    fn list_local_read_markings(&self, conf_no: ConfNo) -> Result<Vec<LocalReadMarking>>;
}

/// Server-side login sessions
pub trait SessionService: Send + Sync {
    /// Log in with the name and password of `session`
    fn create_session(&self, session: &Session) -> Result<Session>;

    fn get_session(&self, session_id: &str) -> Result<Session>;

    fn delete_session(&self, session_id: &str) -> Result<()>;
}

/// Unread summaries for the logged-in person
pub trait ConferenceService: Send + Sync {
    fn list_unread_conferences(&self) -> Result<UnreadConferences>;
}
