//! Text model representing one LysKOM message

use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::{ConfNo, GlobalReadMarking, PersNo, Recipient, RecipientList, RecipientType, TextNo};
use crate::error::{KomError, Result};
use crate::service::{ReadMarkingStore, TextService};

/// Relation between two texts in a comment link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentType {
    Comment,
    Footnote,
}

/// One entry of a comment-to or comment-in list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentLink {
    #[serde(rename = "type")]
    pub comment_type: CommentType,
    pub text_no: TextNo,
}

impl CommentLink {
    pub fn comment(text_no: TextNo) -> Self {
        Self {
            comment_type: CommentType::Comment,
            text_no,
        }
    }

    pub fn footnote(text_no: TextNo) -> Self {
        Self {
            comment_type: CommentType::Footnote,
            text_no,
        }
    }
}

/// Author of a text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub pers_no: PersNo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pers_name: Option<String>,
}

/// Backend representation of a text
#[derive(Debug, Serialize, Deserialize)]
struct TextRepr {
    #[serde(default)]
    text_no: Option<TextNo>,
    #[serde(default)]
    creation_time: Option<String>,
    #[serde(default)]
    author: Option<Author>,
    #[serde(default)]
    comment_to_list: Option<Vec<CommentLink>>,
    #[serde(default)]
    comment_in_list: Option<Vec<CommentLink>>,
    #[serde(default)]
    content_type: Option<String>,
    #[serde(default)]
    subject: String,
    #[serde(default)]
    body: String,
    #[serde(default)]
    recipient_list: Option<Vec<serde_json::Value>>,
}

/// A text (message) in a LysKOM conference
///
/// A text is either a draft (no `text_no` yet) or a record fetched from the
/// server. Content fields can only be changed on drafts.
#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    text_no: Option<TextNo>,
    creation_time: Option<String>,
    author: Option<Author>,
    comment_to_list: Option<Vec<CommentLink>>,
    comment_in_list: Option<Vec<CommentLink>>,
    content_type: Option<String>,
    subject: String,
    body: String,
    recipient_list: RecipientList,
}

impl Text {
    /// Create an empty, unsent text
    pub fn draft() -> Self {
        Self {
            text_no: None,
            creation_time: None,
            author: None,
            comment_to_list: None,
            comment_in_list: None,
            content_type: None,
            subject: String::new(),
            body: String::new(),
            recipient_list: RecipientList::new(),
        }
    }

    /// Create a text builder for a record with a known number
    pub fn builder(text_no: TextNo) -> TextBuilder {
        TextBuilder::new(text_no)
    }

    /// Parse a text from its backend representation
    ///
    /// A missing or null `recipient_list` gives an empty list.
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        let repr: TextRepr = serde_json::from_value(value)?;
        let recipient_list =
            RecipientList::from_json_entries(repr.recipient_list.unwrap_or_default())?;

        Ok(Self {
            text_no: repr.text_no,
            creation_time: repr.creation_time,
            author: repr.author,
            comment_to_list: repr.comment_to_list,
            comment_in_list: repr.comment_in_list,
            content_type: repr.content_type,
            subject: repr.subject,
            body: repr.body,
            recipient_list,
        })
    }

    /// Serialize to the backend representation
    pub fn to_json(&self) -> serde_json::Value {
        let repr = TextRepr {
            text_no: self.text_no,
            creation_time: self.creation_time.clone(),
            author: self.author.clone(),
            comment_to_list: self.comment_to_list.clone(),
            comment_in_list: self.comment_in_list.clone(),
            content_type: self.content_type.clone(),
            subject: self.subject.clone(),
            body: self.body.clone(),
            recipient_list: Some(self.recipient_list.to_json_entries()),
        };
        serde_json::json!(repr)
    }

    pub fn text_no(&self) -> Option<TextNo> {
        self.text_no
    }

    /// True until the text has been submitted
    pub fn is_new(&self) -> bool {
        self.text_no.is_none()
    }

    pub fn creation_time(&self) -> Option<&str> {
        self.creation_time.as_deref()
    }

    pub fn author(&self) -> Option<&Author> {
        self.author.as_ref()
    }

    pub fn comment_to_list(&self) -> &[CommentLink] {
        self.comment_to_list.as_deref().unwrap_or_default()
    }

    pub fn comment_in_list(&self) -> &[CommentLink] {
        self.comment_in_list.as_deref().unwrap_or_default()
    }

    /// Texts commenting on this one, in list order
    pub fn comment_in_text_nos(&self) -> Vec<TextNo> {
        self.comment_in_list().iter().map(|c| c.text_no).collect()
    }

    /// Texts this one comments on, in list order
    pub fn comment_to_text_nos(&self) -> Vec<TextNo> {
        self.comment_to_list().iter().map(|c| c.text_no).collect()
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn recipient_list(&self) -> &RecipientList {
        &self.recipient_list
    }

    pub fn set_subject(&mut self, subject: impl Into<String>) -> Result<()> {
        self.ensure_draft("subject")?;
        self.subject = subject.into();
        Ok(())
    }

    pub fn set_body(&mut self, body: impl Into<String>) -> Result<()> {
        self.ensure_draft("body")?;
        self.body = body.into();
        Ok(())
    }

    pub fn set_content_type(&mut self, content_type: impl Into<String>) -> Result<()> {
        self.ensure_draft("content type")?;
        self.content_type = Some(content_type.into());
        Ok(())
    }

    pub fn add_recipient(&mut self, recipient: Recipient) -> Result<()> {
        self.ensure_draft("recipient list")?;
        self.recipient_list.push(recipient);
        Ok(())
    }

    /// Turn this draft into a comment to `other`
    ///
    /// Only `to` recipients are copied; `cc` and `bcc` recipients of the
    /// commented text do not receive the comment.
    pub fn make_comment_to(&mut self, other: &Text) -> Result<()> {
        self.ensure_draft("comment links")?;
        let other_no = other
            .text_no
            .ok_or_else(|| KomError::validation("cannot comment on an unsent text"))?;

        for recipient in other.recipient_list.of_type(RecipientType::To) {
            self.recipient_list.push(recipient.clone());
        }
        self.comment_to_list = Some(vec![CommentLink::comment(other_no)]);
        self.subject = other.subject.clone();
        Ok(())
    }

    /// Submit a draft, storing the text number the server assigned
    pub fn submit(&mut self, service: &dyn TextService) -> Result<TextNo> {
        self.ensure_draft("text")?;
        if self.recipient_list.is_empty() {
            return Err(KomError::validation("a text needs at least one recipient"));
        }

        let text_no = service.create_text(self)?;
        info!("Submitted new text {}", text_no);
        self.text_no = Some(text_no);
        Ok(text_no)
    }

    /// Mark the text as read in every conference
    pub fn mark_as_read_global(&self, store: &dyn ReadMarkingStore) -> Result<()> {
        let text_no = self.require_text_no()?;
        debug!("Marking text {} as read", text_no);
        store.save_global_read_marking(&GlobalReadMarking::read(text_no))
    }

    /// Mark the text as unread by removing its global read-marking
    pub fn mark_as_unread_global(&self, store: &dyn ReadMarkingStore) -> Result<()> {
        let text_no = self.require_text_no()?;
        debug!("Marking text {} as unread", text_no);
        store.delete_global_read_marking(text_no)
    }

    /// Conferences receiving this text
    pub fn recipient_conferences(&self) -> Vec<ConfNo> {
        self.recipient_list.iter().map(|r| r.conf_no).collect()
    }

    pub(crate) fn with_text_no(mut self, text_no: TextNo) -> Self {
        self.text_no = Some(text_no);
        self
    }

    fn ensure_draft(&self, what: &str) -> Result<()> {
        match self.text_no {
            Some(no) => Err(KomError::validation(format!(
                "cannot change {} of submitted text {}",
                what, no
            ))),
            None => Ok(()),
        }
    }

    fn require_text_no(&self) -> Result<TextNo> {
        self.text_no
            .ok_or_else(|| KomError::validation("text has not been submitted"))
    }
}

/// Builder for texts with a known number
pub struct TextBuilder {
    text: Text,
}

impl TextBuilder {
    fn new(text_no: TextNo) -> Self {
        Self {
            text: Text::draft().with_text_no(text_no),
        }
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.text.subject = subject.into();
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.text.body = body.into();
        self
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.text.content_type = Some(content_type.into());
        self
    }

    pub fn creation_time(mut self, creation_time: impl Into<String>) -> Self {
        self.text.creation_time = Some(creation_time.into());
        self
    }

    pub fn author(mut self, author: Author) -> Self {
        self.text.author = Some(author);
        self
    }

    pub fn comment_to(mut self, links: Vec<CommentLink>) -> Self {
        self.text.comment_to_list = Some(links);
        self
    }

    /// Comments on this text, given as plain comment links
    pub fn comments(mut self, text_nos: &[u32]) -> Self {
        self.text.comment_in_list = Some(
            text_nos
                .iter()
                .map(|&no| CommentLink::comment(TextNo(no)))
                .collect(),
        );
        self
    }

    pub fn comment_in(mut self, links: Vec<CommentLink>) -> Self {
        self.text.comment_in_list = Some(links);
        self
    }

    pub fn recipient(mut self, recipient: Recipient) -> Self {
        self.text.recipient_list.push(recipient);
        self
    }

    pub fn build(self) -> Text {
        self.text
    }
}
