//! Unread summary per conference

use serde::{Deserialize, Serialize};

use super::ConfNo;

/// A conference with unread texts for the logged-in person
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnreadConference {
    pub conf_no: ConfNo,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub no_of_unread: u32,
}

/// Unread conferences in the order the server lists them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnreadConferences {
    pub confs: Vec<UnreadConference>,
}

impl UnreadConferences {
    pub fn new(confs: Vec<UnreadConference>) -> Self {
        Self { confs }
    }

    pub fn get(&self, conf_no: ConfNo) -> Option<&UnreadConference> {
        self.confs.iter().find(|c| c.conf_no == conf_no)
    }

    pub fn total_unread(&self) -> u64 {
        self.confs.iter().map(|c| u64::from(c.no_of_unread)).sum()
    }

    /// Where to start reading: the first listed conference with unread texts
    pub fn first_with_unread(&self) -> Option<&UnreadConference> {
        self.confs.iter().find(|c| c.no_of_unread > 0)
    }

    pub fn is_empty(&self) -> bool {
        self.confs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.confs.len()
    }
}
