//! Read-markings: whether a text has been read
//!
//! A global marking covers a text everywhere; a local marking is keyed by a
//! conference and the text's local number in it. The two are stored under
//! different resources and are never interchangeable.

use serde::{Deserialize, Serialize};

use super::{ConfNo, LocalTextNo, TextNo};

/// Read-marking for a text across all conferences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalReadMarking {
    pub text_no: TextNo,
    pub unread: bool,
}

impl GlobalReadMarking {
    /// A marking recording the text as read
    pub fn read(text_no: TextNo) -> Self {
        Self {
            text_no,
            unread: false,
        }
    }
}

/// Read-marking for a text within one conference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalReadMarking {
    pub conf_no: ConfNo,
    pub local_text_no: LocalTextNo,
    pub text_no: TextNo,
    pub unread: bool,
}

impl LocalReadMarking {
    pub fn new(conf_no: ConfNo, local_text_no: LocalTextNo, text_no: TextNo, unread: bool) -> Self {
        Self {
            conf_no,
            local_text_no,
            text_no,
            unread,
        }
    }

    /// Key identifying the marking's resource
    pub fn key(&self) -> (ConfNo, LocalTextNo) {
        (self.conf_no, self.local_text_no)
    }
}

/// Text numbers of the unread entries, in listing order
pub fn unread_text_nos(markings: &[LocalReadMarking]) -> Vec<TextNo> {
    markings
        .iter()
        .filter(|rm| rm.unread)
        .map(|rm| rm.text_no)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_marking_is_not_unread() {
        let rm = GlobalReadMarking::read(TextNo(42));
        assert_eq!(rm.text_no, TextNo(42));
        assert!(!rm.unread);
    }

    #[test]
    fn test_unread_text_nos_filters_read_entries() {
        let markings = vec![
            LocalReadMarking::new(ConfNo(1), LocalTextNo(1), TextNo(100), true),
            LocalReadMarking::new(ConfNo(1), LocalTextNo(2), TextNo(101), false),
            LocalReadMarking::new(ConfNo(1), LocalTextNo(3), TextNo(102), true),
        ];
        assert_eq!(unread_text_nos(&markings), vec![TextNo(100), TextNo(102)]);
    }

    #[test]
    fn test_local_marking_json_shape() {
        let rm: LocalReadMarking = serde_json::from_str(
            r#"{"conf_no": 3, "local_text_no": 17, "text_no": 1234, "unread": true}"#,
        )
        .unwrap();
        assert_eq!(rm.key(), (ConfNo(3), LocalTextNo(17)));
        assert!(rm.unread);
    }
}
