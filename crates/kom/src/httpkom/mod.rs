//! httpkom integration
//!
//! This module provides:
//! - Resource paths of the httpkom REST API
//! - Response wrapper types
//! - An HTTP client implementing the backend service traits

mod client;

pub use client::HttpkomClient;

/// httpkom response types
pub mod api {
    use serde::Deserialize;

    use crate::models::{LocalReadMarking, TextNo};

    /// Response from creating a text
    #[derive(Debug, Deserialize)]
    pub struct CreatedText {
        pub text_no: TextNo,
    }

    /// Response from listing the read-markings of a conference
    #[derive(Debug, Deserialize)]
    pub struct ReadMarkingsResponse {
        #[serde(default)]
        pub rms: Vec<LocalReadMarking>,
    }
}

/// Resource paths, relative to the server base URL
///
/// Identifiers are percent-encoded before being embedded.
pub mod paths {
    use urlencoding::encode;

    use crate::models::{ConfNo, LocalTextNo, TextNo};

    pub fn texts() -> String {
        "texts/".to_string()
    }

    pub fn text(text_no: TextNo) -> String {
        format!("texts/{}", encode(&text_no.to_string()))
    }

    pub fn global_read_marking(text_no: TextNo) -> String {
        format!("texts/{}/read-marking", encode(&text_no.to_string()))
    }

    pub fn local_read_marking(conf_no: ConfNo, local_text_no: LocalTextNo) -> String {
        format!(
            "conferences/{}/texts/{}/read-marking",
            encode(&conf_no.to_string()),
            encode(&local_text_no.to_string())
        )
    }

    pub fn read_markings(conf_no: ConfNo) -> String {
        format!("conferences/{}/read-markings/", encode(&conf_no.to_string()))
    }

    pub fn unread_conferences() -> String {
        "conferences/unread/".to_string()
    }

    pub fn sessions() -> String {
        "sessions/".to_string()
    }

    pub fn session(session_id: &str) -> String {
        format!("sessions/{}", encode(session_id))
    }

}
