//! httpkom HTTP client
//!
//! Implements the backend service traits over the httpkom REST API.
//! Uses synchronous HTTP (ureq) to be executor-agnostic.

use log::debug;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use ureq::http::Response;
use ureq::{Agent, Body};
use url::Url;

use super::api::{CreatedText, ReadMarkingsResponse};
use super::paths;
use crate::config::ServerConfig;
use crate::error::{KomError, Result};
use crate::models::{
    AuthContext, ConfNo, GlobalReadMarking, LocalReadMarking, LocalTextNo, Session, Text, TextNo,
    UnreadConferences,
};
use crate::service::{ConferenceService, ReadMarkingStore, SessionService, TextService};

/// Client for an httpkom server
pub struct HttpkomClient {
    agent: Agent,
    base_url: Url,
    auth: AuthContext,
}

impl HttpkomClient {
    /// Create a client for the server in `config`
    pub fn new(config: &ServerConfig, auth: AuthContext) -> Result<Self> {
        let base_url = Self::parse_base_url(&config.base_url)?;

        let agent_config = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(config.timeout_secs)))
            .build();

        Ok(Self {
            agent: agent_config.into(),
            base_url,
            auth,
        })
    }

    /// Replace the credentials, e.g. after logging in
    pub fn set_auth(&mut self, auth: AuthContext) {
        self.auth = auth;
    }

    pub fn auth(&self) -> &AuthContext {
        &self.auth
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Parse a base URL, making sure relative paths join below it
    fn parse_base_url(base_url: &str) -> Result<Url> {
        let mut normalized = base_url.trim().to_string();
        if !normalized.ends_with('/') {
            normalized.push('/');
        }
        Url::parse(&normalized)
            .map_err(|e| KomError::validation(format!("invalid server URL {}: {}", base_url, e)))
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| KomError::validation(format!("invalid resource path {}: {}", path, e)))
    }

    fn cookie(&self) -> Option<String> {
        self.auth
            .session_id()
            .map(|id| format!("session_id={}", id))
    }

    fn get(&self, path: &str) -> Result<Response<Body>> {
        let url = self.url(path)?;
        debug!("GET {}", url);
        let mut request = self.agent.get(url.as_str());
        if let Some(cookie) = self.cookie() {
            request = request.header("Cookie", &cookie);
        }
        request.call().map_err(|e| request_error(url.as_str(), e))
    }

    fn delete(&self, path: &str) -> Result<()> {
        let url = self.url(path)?;
        debug!("DELETE {}", url);
        let mut request = self.agent.delete(url.as_str());
        if let Some(cookie) = self.cookie() {
            request = request.header("Cookie", &cookie);
        }
        request.call().map_err(|e| request_error(url.as_str(), e))?;
        Ok(())
    }

    fn put_json<T: Serialize>(&self, path: &str, body: &T) -> Result<Response<Body>> {
        let url = self.url(path)?;
        debug!("PUT {}", url);
        let mut request = self.agent.put(url.as_str());
        if let Some(cookie) = self.cookie() {
            request = request.header("Cookie", &cookie);
        }
        request
            .send_json(body)
            .map_err(|e| request_error(url.as_str(), e))
    }

    fn post_json<T: Serialize>(&self, path: &str, body: &T) -> Result<Response<Body>> {
        let url = self.url(path)?;
        debug!("POST {}", url);
        let mut request = self.agent.post(url.as_str());
        if let Some(cookie) = self.cookie() {
            request = request.header("Cookie", &cookie);
        }
        request
            .send_json(body)
            .map_err(|e| request_error(url.as_str(), e))
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let mut response = self.get(path)?;
        read_json(&mut response)
    }
}

/// Map a failed request to the error callers match on
fn request_error(url: &str, e: ureq::Error) -> KomError {
    match e {
        ureq::Error::StatusCode(404) => KomError::not_found(url),
        ureq::Error::StatusCode(401 | 403) => KomError::AuthRequired,
        ureq::Error::StatusCode(status) => KomError::Http {
            status,
            url: url.to_string(),
        },
        e => KomError::Network {
            message: e.to_string(),
        },
    }
}

fn read_json<T: DeserializeOwned>(response: &mut Response<Body>) -> Result<T> {
    response
        .body_mut()
        .read_json()
        .map_err(|e| KomError::Parse {
            message: e.to_string(),
        })
}

impl TextService for HttpkomClient {
    fn fetch_text(&self, text_no: TextNo) -> Result<Text> {
        let value: serde_json::Value = self.get_json(&paths::text(text_no))?;
        Text::from_json(value)
    }

    fn create_text(&self, text: &Text) -> Result<TextNo> {
        let mut response = self.post_json(&paths::texts(), &text.to_json())?;
        let created: CreatedText = read_json(&mut response)?;
        Ok(created.text_no)
    }
}

impl ReadMarkingStore for HttpkomClient {
    fn save_global_read_marking(&self, marking: &GlobalReadMarking) -> Result<()> {
        self.put_json(&paths::global_read_marking(marking.text_no), marking)?;
        Ok(())
    }

    fn delete_global_read_marking(&self, text_no: TextNo) -> Result<()> {
        self.delete(&paths::global_read_marking(text_no))
    }

    fn get_global_read_marking(&self, text_no: TextNo) -> Result<Option<GlobalReadMarking>> {
        match self.get_json(&paths::global_read_marking(text_no)) {
            Ok(marking) => Ok(Some(marking)),
            Err(KomError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn save_local_read_marking(&self, marking: &LocalReadMarking) -> Result<()> {
        let path = paths::local_read_marking(marking.conf_no, marking.local_text_no);
        self.put_json(&path, marking)?;
        Ok(())
    }

    fn delete_local_read_marking(
        &self,
        conf_no: ConfNo,
        local_text_no: LocalTextNo,
    ) -> Result<()> {
        self.delete(&paths::local_read_marking(conf_no, local_text_no))
    }

    fn list_local_read_markings(&self, conf_no: ConfNo) -> Result<Vec<LocalReadMarking>> {
        let response: ReadMarkingsResponse = self.get_json(&paths::read_markings(conf_no))?;
        let mut markings = response.rms;
        markings.sort_by_key(|rm| rm.local_text_no);
        Ok(markings)
    }
}

impl SessionService for HttpkomClient {
    fn create_session(&self, session: &Session) -> Result<Session> {
        let mut response = self.post_json(&paths::sessions(), session)?;
        read_json(&mut response)
    }

    fn get_session(&self, session_id: &str) -> Result<Session> {
        self.get_json(&paths::session(session_id))
    }

    fn delete_session(&self, session_id: &str) -> Result<()> {
        self.delete(&paths::session(session_id))
    }
}

impl ConferenceService for HttpkomClient {
    fn list_unread_conferences(&self) -> Result<UnreadConferences> {
        self.get_json(&paths::unread_conferences())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> HttpkomClient {
        let config = ServerConfig {
            base_url: base_url.to_string(),
            timeout_secs: 1,
        };
        HttpkomClient::new(&config, AuthContext::Anonymous).unwrap()
    }

    #[test]
    fn test_paths_join_below_base_url() {
        let client = client("http://kom.example/httpkom");
        assert_eq!(
            client.url(&paths::text(TextNo(17))).unwrap().as_str(),
            "http://kom.example/httpkom/texts/17"
        );
    }

    #[test]
    fn test_encoded_session_id_survives_join() {
        let client = client("http://kom.example/");
        assert_eq!(
            client.url(&paths::session("a b/c")).unwrap().as_str(),
            "http://kom.example/sessions/a%20b%2Fc"
        );
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let config = ServerConfig {
            base_url: "not a url".to_string(),
            timeout_secs: 1,
        };
        assert!(matches!(
            HttpkomClient::new(&config, AuthContext::Anonymous),
            Err(KomError::Validation { .. })
        ));
    }

    #[test]
    fn test_status_codes_map_to_errors() {
        let url = "http://kom.example/texts/1";
        assert!(matches!(
            request_error(url, ureq::Error::StatusCode(404)),
            KomError::NotFound { .. }
        ));
        assert!(matches!(
            request_error(url, ureq::Error::StatusCode(403)),
            KomError::AuthRequired
        ));
        assert!(matches!(
            request_error(url, ureq::Error::StatusCode(500)),
            KomError::Http { status: 500, .. }
        ));
    }

    #[test]
    fn test_cookie_follows_auth_context() {
        let mut client = client("http://kom.example/");
        assert!(client.cookie().is_none());

        client.set_auth(AuthContext::Authenticated {
            session_id: "abc123".to_string(),
            pers_no: None,
        });
        assert_eq!(client.cookie().as_deref(), Some("session_id=abc123"));
    }
}
