//! Domain models for LysKOM entities

mod conference;
mod ids;
mod read_marking;
mod recipient;
mod session;
mod text;

pub use conference::{UnreadConference, UnreadConferences};
pub use ids::{ConfNo, LocalTextNo, PersNo, TextNo};
pub use read_marking::{GlobalReadMarking, LocalReadMarking, unread_text_nos};
pub use recipient::{Recipient, RecipientList, RecipientType};
pub use session::{AuthContext, ClientInfo, Session};
pub use text::{Author, CommentLink, CommentType, Text, TextBuilder};
