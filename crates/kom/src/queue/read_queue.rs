//! Depth-first read queue over unread texts
//!
//! The queue keeps a set of pending unread text numbers and a stack of
//! thread branches that have been seen but not yet visited. Each advancement
//! either pops the stack (continuing the current thread) or starts a new
//! thread at the lowest pending text number. Comments of a fetched text are
//! pushed in reverse so they pop first-to-last.
//!
//! Advancing is split in two so the fetch can run anywhere:
//!
//! ```text
//! begin_advance()  ->  AdvanceStep::Fetch(no)   (pending/stack updated)
//!      ... fetch text `no`, other queue calls may interleave ...
//! complete_advance(no, result)                   (stack pushed, current set)
//! ```
//!
//! Only one advancement may be in flight; a second `begin_advance` fails
//! with [`QueueError::Busy`].

use log::{debug, info, warn};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::{Arc, mpsc};

use super::{QueueEvent, QueueObserver};
use crate::error::{KomError, QueueError};
use crate::models::{ConfNo, Text, TextNo, unread_text_nos};
use crate::service::{ReadMarkingStore, TextService};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AdvanceState {
    Idle,
    Advancing {
        text_no: TextNo,
        /// Popped from the thread stack rather than picked from the unread set
        from_stack: bool,
        /// Was in the unread set when picked
        was_unread: bool,
        /// Removed from the unread set by a caller while being fetched
        withdrawn: bool,
    },
}

/// What the caller has to do after [`ReadQueue::begin_advance`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceStep {
    /// Fetch this text and pass the result to [`ReadQueue::complete_advance`]
    Fetch(TextNo),
    /// Nothing left to read; the current text is now `None`
    Exhausted,
}

/// Queue deciding the order in which unread texts are read
pub struct ReadQueue {
    unread: BTreeSet<TextNo>,
    thread_stack: Vec<TextNo>,
    current: Option<Text>,
    state: AdvanceState,
    observers: Vec<Arc<dyn QueueObserver>>,
}

impl ReadQueue {
    /// Create a queue over the given unread texts; duplicates are collapsed
    pub fn new(unread: impl IntoIterator<Item = TextNo>) -> Self {
        Self {
            unread: unread.into_iter().collect(),
            thread_stack: Vec::new(),
            current: None,
            state: AdvanceState::Idle,
            observers: Vec::new(),
        }
    }

    /// Create a queue over the unread texts of one conference
    pub fn for_conference(store: &dyn ReadMarkingStore, conf_no: ConfNo) -> Result<Self, KomError> {
        let markings = store.list_local_read_markings(conf_no)?;
        let unread = unread_text_nos(&markings);
        info!("Conference {} has {} unread texts", conf_no, unread.len());
        Ok(Self::new(unread))
    }

    /// Subscribe an observer to every subsequent event
    pub fn subscribe(&mut self, observer: Arc<dyn QueueObserver>) {
        self.observers.push(observer);
    }

    /// Subscribe with a channel receiving every subsequent event
    pub fn subscribe_channel(&mut self) -> mpsc::Receiver<QueueEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribe(Arc::new(tx));
        rx
    }

    /// Add unread texts
    ///
    /// The current text and a text being fetched are never re-added.
    pub fn add_unread(&mut self, text_nos: impl IntoIterator<Item = TextNo>) {
        let current_no = self.current.as_ref().and_then(Text::text_no);
        let in_flight = self.in_flight();

        let mut added = Vec::new();
        for text_no in text_nos {
            if Some(text_no) == current_no || Some(text_no) == in_flight {
                debug!("Not re-adding text {}, it is being read", text_no);
                continue;
            }
            if self.unread.insert(text_no) {
                added.push(text_no);
            }
        }

        debug!("Added {} unread texts, {} pending", added.len(), self.unread.len());
        self.emit(QueueEvent::Added(added));
    }

    /// Remove a text from the unread set, e.g. after it was read elsewhere
    pub fn remove_unread(&mut self, text_no: TextNo) {
        self.unread.remove(&text_no);

        if let AdvanceState::Advancing {
            text_no: in_flight,
            withdrawn,
        } = &mut self.state
            && *in_flight == text_no
        {
            debug!("Text {} withdrawn while being fetched", text_no);
            *withdrawn = true;
        }

        self.emit(QueueEvent::Removed(text_no));
    }

    /// Give up on a text: it leaves the unread set and the thread stack
    ///
    /// Used after a fetch failure the caller does not want retried. Comments
    /// of a dropped text are never reached through it.
    pub fn drop_text(&mut self, text_no: TextNo) {
        let depth = self.thread_stack.len();
        self.thread_stack.retain(|&no| no != text_no);
        if self.thread_stack.len() != depth {
            debug!("Dropped text {} from the thread stack", text_no);
        }
        self.remove_unread(text_no);
    }

    /// The text being read, if any
    pub fn current(&self) -> Option<&Text> {
        self.current.as_ref()
    }

    /// The text being read, starting the queue if nothing has been read yet
    pub fn first(&mut self, service: &dyn TextService) -> Result<Option<&Text>, QueueError> {
        if self.current.is_none() && !self.unread.is_empty() && !self.is_advancing() {
            self.advance(service)?;
        }
        Ok(self.current.as_ref())
    }

    /// Move to the next text, fetching it with `service`
    pub fn advance(&mut self, service: &dyn TextService) -> Result<Option<&Text>, QueueError> {
        match self.begin_advance()? {
            AdvanceStep::Exhausted => Ok(None),
            AdvanceStep::Fetch(text_no) => {
                let fetched = service.fetch_text(text_no);
                self.complete_advance(text_no, fetched)
            }
        }
    }

    /// Pick the next text to read
    ///
    /// The chosen text leaves the unread set immediately. When nothing is
    /// left, the current text is cleared and `Changed(None)` is emitted.
    pub fn begin_advance(&mut self) -> Result<AdvanceStep, QueueError> {
        if let AdvanceState::Advancing { text_no, .. } = self.state {
            return Err(QueueError::Busy { in_flight: text_no });
        }

        let next = match self.thread_stack.pop() {
            Some(text_no) => {
                debug!("Continuing thread with text {}", text_no);
                Some((text_no, true))
            }
            None => {
                let start = self.unread.first().copied();
                match start {
                    Some(text_no) => debug!("Starting new thread at text {}", text_no),
                    None => debug!("No unread texts left"),
                }
                start.map(|text_no| (text_no, false))
            }
        };

        let Some((text_no, from_stack)) = next else {
            self.current = None;
            self.emit(QueueEvent::Changed(None));
            return Ok(AdvanceStep::Exhausted);
        };

        let was_unread = self.unread.contains(&text_no);
        self.remove_unread(text_no);
        self.state = AdvanceState::Advancing {
            text_no,
            from_stack,
            was_unread,
            withdrawn: false,
        };
        Ok(AdvanceStep::Fetch(text_no))
    }

    /// Finish the advancement started by [`Self::begin_advance`]
    ///
    /// On success the text's comments are queued ahead of the rest of the
    /// thread and the text becomes current. On failure the current text is
    /// kept, the text goes back into the unread set (unless it was removed
    /// while in flight) and the fetch error is returned.
    pub fn complete_advance(
        &mut self,
        text_no: TextNo,
        fetched: Result<Text, KomError>,
    ) -> Result<Option<&Text>, QueueError> {
        let (from_stack, was_unread, withdrawn) = match self.state {
            AdvanceState::Idle => return Err(QueueError::NotAdvancing),
            AdvanceState::Advancing {
                text_no: expected, ..
            } if expected != text_no => {
                return Err(QueueError::UnexpectedText {
                    expected,
                    got: text_no,
                });
            }
            AdvanceState::Advancing {
                from_stack,
                was_unread,
                withdrawn,
                ..
            } => (from_stack, was_unread, withdrawn),
        };
        self.state = AdvanceState::Idle;

        match fetched {
            Ok(text) => {
                let comments = text.comment_in_text_nos();
                self.thread_stack.extend(comments.iter().rev());
                debug!(
                    "Text {} has {} comments, thread depth now {}",
                    text_no,
                    comments.len(),
                    self.thread_stack.len()
                );

                self.current = Some(text);
                self.emit(QueueEvent::Changed(Some(text_no)));
                Ok(self.current.as_ref())
            }
            Err(source) => {
                warn!("Failed to fetch text {}: {}", text_no, source);
                // The text keeps its place: a thread branch goes back on the
                // stack, and only texts that were unread return to the set
                if !withdrawn {
                    if from_stack {
                        self.thread_stack.push(text_no);
                    }
                    if was_unread {
                        self.unread.insert(text_no);
                    }
                }

                let current_no = self.current.as_ref().and_then(Text::text_no);
                self.emit(QueueEvent::Changed(current_no));
                Err(QueueError::Fetch { text_no, source })
            }
        }
    }

    /// True when no unread texts are pending
    ///
    /// Only the pending set counts: the queue can still have thread
    /// branches left and a current text. Use [`Self::is_exhausted`] to ask
    /// whether anything at all is left to read.
    pub fn is_empty(&self) -> bool {
        self.unread.is_empty()
    }

    /// Number of pending unread texts, not counting the current text
    pub fn len(&self) -> usize {
        self.unread.len()
    }

    /// True when the queue has been read to the end
    pub fn is_exhausted(&self) -> bool {
        self.unread.is_empty()
            && self.thread_stack.is_empty()
            && self.current.is_none()
            && !self.is_advancing()
    }

    /// True while a fetch started by [`Self::begin_advance`] is outstanding
    pub fn is_advancing(&self) -> bool {
        matches!(self.state, AdvanceState::Advancing { .. })
    }

    /// The text being fetched, if an advancement is in flight
    pub fn in_flight(&self) -> Option<TextNo> {
        match self.state {
            AdvanceState::Idle => None,
            AdvanceState::Advancing { text_no, .. } => Some(text_no),
        }
    }

    /// Number of thread branches waiting on the stack
    pub fn thread_depth(&self) -> usize {
        self.thread_stack.len()
    }

    /// True when `text_no` is in the pending unread set
    pub fn contains(&self, text_no: TextNo) -> bool {
        self.unread.contains(&text_no)
    }

    fn emit(&self, event: QueueEvent) {
        for observer in &self.observers {
            observer.on_event(&event);
        }
    }
}

impl Default for ReadQueue {
    fn default() -> Self {
        Self::new(std::iter::empty())
    }
}

impl fmt::Debug for ReadQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadQueue")
            .field("unread", &self.unread)
            .field("thread_stack", &self.thread_stack)
            .field("current", &self.current.as_ref().and_then(Text::text_no))
            .field("state", &self.state)
            .field("observers", &self.observers.len())
            .finish()
    }
}
