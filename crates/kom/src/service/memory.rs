//! In-memory backend implementation
//!
//! Implements every service trait without a server. Used by tests and for
//! offline development; failures can be injected per text.

use log::debug;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

use super::{ConferenceService, ReadMarkingStore, SessionService, TextService};
use crate::error::{KomError, Result};
use crate::models::{
    ConfNo, GlobalReadMarking, LocalReadMarking, LocalTextNo, PersNo, Session, Text, TextNo,
    UnreadConferences,
};

fn poisoned<T>(_: PoisonError<T>) -> KomError {
    KomError::Storage {
        message: "in-memory backend lock poisoned".to_string(),
    }
}

struct Person {
    pers_no: PersNo,
    password: String,
}

/// In-memory implementation of all backend services
pub struct InMemoryKomBackend {
    texts: RwLock<BTreeMap<TextNo, Text>>,
    /// Texts whose fetch fails with a network error
    failing_texts: RwLock<HashSet<TextNo>>,
    /// Every fetch attempt, in call order
    fetch_log: RwLock<Vec<TextNo>>,
    global_markings: RwLock<HashMap<TextNo, GlobalReadMarking>>,
    local_markings: RwLock<BTreeMap<(ConfNo, LocalTextNo), LocalReadMarking>>,
    persons: RwLock<HashMap<String, Person>>,
    sessions: RwLock<HashMap<String, Session>>,
    next_session: AtomicU64,
    unread_conferences: RwLock<UnreadConferences>,
}

impl InMemoryKomBackend {
    /// Create a new empty backend
    pub fn new() -> Self {
        Self {
            texts: RwLock::new(BTreeMap::new()),
            failing_texts: RwLock::new(HashSet::new()),
            fetch_log: RwLock::new(Vec::new()),
            global_markings: RwLock::new(HashMap::new()),
            local_markings: RwLock::new(BTreeMap::new()),
            persons: RwLock::new(HashMap::new()),
            sessions: RwLock::new(HashMap::new()),
            next_session: AtomicU64::new(1),
            unread_conferences: RwLock::new(UnreadConferences::default()),
        }
    }

    /// Store a fetched text under its number
    pub fn insert_text(&self, text: Text) -> Result<()> {
        let Some(text_no) = text.text_no() else {
            return Err(KomError::validation("cannot store a text without number"));
        };
        self.texts.write().map_err(poisoned)?.insert(text_no, text);
        Ok(())
    }

    /// Make fetches of `text_no` fail until [`Self::heal_text`] is called
    pub fn fail_text(&self, text_no: TextNo) -> Result<()> {
        self.failing_texts.write().map_err(poisoned)?.insert(text_no);
        Ok(())
    }

    pub fn heal_text(&self, text_no: TextNo) -> Result<()> {
        self.failing_texts.write().map_err(poisoned)?.remove(&text_no);
        Ok(())
    }

    /// Text numbers fetched so far, in call order
    pub fn fetch_log(&self) -> Result<Vec<TextNo>> {
        Ok(self.fetch_log.read().map_err(poisoned)?.clone())
    }

    pub fn register_person(
        &self,
        pers_name: impl Into<String>,
        password: impl Into<String>,
        pers_no: PersNo,
    ) -> Result<()> {
        self.persons.write().map_err(poisoned)?.insert(
            pers_name.into(),
            Person {
                pers_no,
                password: password.into(),
            },
        );
        Ok(())
    }

    pub fn set_unread_conferences(&self, confs: UnreadConferences) -> Result<()> {
        *self.unread_conferences.write().map_err(poisoned)? = confs;
        Ok(())
    }
}

impl Default for InMemoryKomBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl TextService for InMemoryKomBackend {
    fn fetch_text(&self, text_no: TextNo) -> Result<Text> {
        self.fetch_log.write().map_err(poisoned)?.push(text_no);

        if self.failing_texts.read().map_err(poisoned)?.contains(&text_no) {
            return Err(KomError::Network {
                message: format!("injected failure fetching text {}", text_no),
            });
        }

        self.texts
            .read()
            .map_err(poisoned)?
            .get(&text_no)
            .cloned()
            .ok_or_else(|| KomError::not_found(format!("text {}", text_no)))
    }

    fn create_text(&self, text: &Text) -> Result<TextNo> {
        let mut texts = self.texts.write().map_err(poisoned)?;
        let text_no = texts
            .keys()
            .next_back()
            .map_or(TextNo(1), |last| TextNo(last.0 + 1));
        texts.insert(text_no, text.clone().with_text_no(text_no));
        debug!("Created text {} in memory", text_no);
        Ok(text_no)
    }
}

impl ReadMarkingStore for InMemoryKomBackend {
    fn save_global_read_marking(&self, marking: &GlobalReadMarking) -> Result<()> {
        self.global_markings
            .write()
            .map_err(poisoned)?
            .insert(marking.text_no, *marking);
        Ok(())
    }

    fn delete_global_read_marking(&self, text_no: TextNo) -> Result<()> {
        self.global_markings.write().map_err(poisoned)?.remove(&text_no);
        Ok(())
    }

    fn get_global_read_marking(&self, text_no: TextNo) -> Result<Option<GlobalReadMarking>> {
        Ok(self
            .global_markings
            .read()
            .map_err(poisoned)?
            .get(&text_no)
            .copied())
    }

    fn save_local_read_marking(&self, marking: &LocalReadMarking) -> Result<()> {
        self.local_markings
            .write()
            .map_err(poisoned)?
            .insert(marking.key(), marking.clone());
        Ok(())
    }

    fn delete_local_read_marking(
        &self,
        conf_no: ConfNo,
        local_text_no: LocalTextNo,
    ) -> Result<()> {
        self.local_markings
            .write()
            .map_err(poisoned)?
            .remove(&(conf_no, local_text_no));
        Ok(())
    }

    fn list_local_read_markings(&self, conf_no: ConfNo) -> Result<Vec<LocalReadMarking>> {
        let markings = self.local_markings.read().map_err(poisoned)?;
        Ok(markings
            .range((conf_no, LocalTextNo(0))..=(conf_no, LocalTextNo(u32::MAX)))
            .map(|(_, rm)| rm.clone())
            .collect())
    }
}

impl SessionService for InMemoryKomBackend {
    fn create_session(&self, session: &Session) -> Result<Session> {
        let persons = self.persons.read().map_err(poisoned)?;
        let person = persons
            .get(&session.pers_name)
            .filter(|p| session.password.as_deref() == Some(p.password.as_str()))
            .ok_or(KomError::AuthRequired)?;

        let id = format!("session-{}", self.next_session.fetch_add(1, Ordering::Relaxed));
        let created = Session {
            id: Some(id.clone()),
            pers_name: session.pers_name.clone(),
            password: None,
            pers_no: Some(person.pers_no),
            client: session.client.clone(),
        };
        self.sessions
            .write()
            .map_err(poisoned)?
            .insert(id, created.clone());
        Ok(created)
    }

    fn get_session(&self, session_id: &str) -> Result<Session> {
        self.sessions
            .read()
            .map_err(poisoned)?
            .get(session_id)
            .cloned()
            .ok_or_else(|| KomError::not_found(format!("session {}", session_id)))
    }

    fn delete_session(&self, session_id: &str) -> Result<()> {
        self.sessions
            .write()
            .map_err(poisoned)?
            .remove(session_id)
            .map(|_| ())
            .ok_or_else(|| KomError::not_found(format!("session {}", session_id)))
    }
}

impl ConferenceService for InMemoryKomBackend {
    fn list_unread_conferences(&self) -> Result<UnreadConferences> {
        Ok(self.unread_conferences.read().map_err(poisoned)?.clone())
    }
}
