//! Recipients of a text

use serde::{Deserialize, Serialize};

use super::ConfNo;
use crate::error::{KomError, Result};

/// How a conference receives a text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecipientType {
    To,
    Cc,
    Bcc,
    Comment,
}

/// A single recipient entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    #[serde(rename = "type")]
    pub recipient_type: RecipientType,
    pub conf_no: ConfNo,
    /// Display name, filled in by the server when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conf_name: Option<String>,
}

impl Recipient {
    pub fn new(recipient_type: RecipientType, conf_no: ConfNo) -> Self {
        Self {
            recipient_type,
            conf_no,
            conf_name: None,
        }
    }

    pub fn with_name(mut self, conf_name: impl Into<String>) -> Self {
        self.conf_name = Some(conf_name.into());
        self
    }

    /// Parse one recipient from its backend representation
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!(self)
    }
}

/// Ordered collection of recipients owned by a text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipientList(Vec<Recipient>);

impl RecipientList {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Rebuild a list from raw backend entries
    ///
    /// Each entry is parsed on its own; the first malformed entry fails the
    /// whole list with its position in the message.
    pub fn from_json_entries(entries: Vec<serde_json::Value>) -> Result<Self> {
        let recipients = entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| {
                Recipient::from_json(entry).map_err(|e| KomError::Parse {
                    message: format!("recipient_list[{}]: {}", index, e),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self(recipients))
    }

    pub fn to_json_entries(&self) -> Vec<serde_json::Value> {
        self.0.iter().map(Recipient::to_json).collect()
    }

    pub fn push(&mut self, recipient: Recipient) {
        self.0.push(recipient);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Recipient> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Recipients of the given type, in list order
    pub fn of_type(&self, recipient_type: RecipientType) -> impl Iterator<Item = &Recipient> {
        self.0
            .iter()
            .filter(move |r| r.recipient_type == recipient_type)
    }
}

impl From<Vec<Recipient>> for RecipientList {
    fn from(recipients: Vec<Recipient>) -> Self {
        Self(recipients)
    }
}

impl<'a> IntoIterator for &'a RecipientList {
    type Item = &'a Recipient;
    type IntoIter = std::slice::Iter<'a, Recipient>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_recipient_without_name() {
        let r = Recipient::from_json(json!({"type": "cc", "conf_no": 12})).unwrap();
        assert_eq!(r.recipient_type, RecipientType::Cc);
        assert_eq!(r.conf_no, ConfNo(12));
        assert_eq!(r.conf_name, None);
    }

    #[test]
    fn test_parse_list_reports_bad_entry_index() {
        let entries = vec![
            json!({"type": "to", "conf_no": 5}),
            json!({"type": "sideways", "conf_no": 6}),
        ];
        let err = RecipientList::from_json_entries(entries).unwrap_err();
        assert!(err.to_string().contains("recipient_list[1]"));
    }

    #[test]
    fn test_of_type_keeps_order() {
        let list = RecipientList::from(vec![
            Recipient::new(RecipientType::To, ConfNo(1)),
            Recipient::new(RecipientType::Cc, ConfNo(2)),
            Recipient::new(RecipientType::To, ConfNo(3)),
        ]);
        let to: Vec<ConfNo> = list.of_type(RecipientType::To).map(|r| r.conf_no).collect();
        assert_eq!(to, vec![ConfNo(1), ConfNo(3)]);
    }

    #[test]
    fn test_serialized_entry_omits_missing_name() {
        let r = Recipient::new(RecipientType::Bcc, ConfNo(9));
        assert_eq!(r.to_json(), json!({"type": "bcc", "conf_no": 9}));
    }
}
