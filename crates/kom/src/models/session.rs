//! Session model and the authentication context derived from it

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::PersNo;
use crate::error::{KomError, Result};
use crate::service::SessionService;

/// Client identification sent when logging in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    pub version: String,
}

impl Default for ClientInfo {
    fn default() -> Self {
        Self {
            name: "kom".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// A login session with the server
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub pers_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default)]
    pub pers_no: Option<PersNo>,
    #[serde(default)]
    pub client: ClientInfo,
}

/// Credentials handed to the backend services
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthContext {
    #[default]
    Anonymous,
    Authenticated {
        session_id: String,
        pers_no: Option<PersNo>,
    },
}

impl AuthContext {
    pub fn session_id(&self) -> Option<&str> {
        match self {
            AuthContext::Anonymous => None,
            AuthContext::Authenticated { session_id, .. } => Some(session_id),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthContext::Authenticated { .. })
    }
}

impl Session {
    /// Create an unsaved session for logging in
    pub fn new(pers_name: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            id: None,
            pers_name: pers_name.into(),
            password: Some(password.into()),
            pers_no: None,
            client: ClientInfo::default(),
        }
    }

    /// A session that has not logged in
    pub fn anonymous() -> Self {
        Self {
            id: None,
            pers_name: String::new(),
            password: None,
            pers_no: None,
            client: ClientInfo::default(),
        }
    }

    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }

    pub fn validate(&self) -> Result<()> {
        if self.pers_name.trim().is_empty() {
            return Err(KomError::validation("can't have an empty person name"));
        }
        Ok(())
    }

    /// Log in, returning the session created by the server
    pub fn login(&self, service: &dyn SessionService) -> Result<Session> {
        self.validate()?;
        let session = service.create_session(self)?;
        info!(
            "Logged in as {} (session {})",
            session.pers_name,
            session.id.as_deref().unwrap_or("?")
        );
        Ok(session)
    }

    /// Log out and end the session on the server
    pub fn logout(&self, service: &dyn SessionService) -> Result<()> {
        let id = self
            .id
            .as_deref()
            .ok_or(KomError::AuthRequired)?;
        service.delete_session(id)?;
        info!("Logged out session {}", id);
        Ok(())
    }

    /// Restore the session stored from an earlier run
    ///
    /// Falls back to an anonymous session when nothing was stored or the
    /// server no longer knows the id.
    pub fn resume(service: &dyn SessionService, stored_id: Option<&str>) -> Session {
        let Some(id) = stored_id.filter(|id| !id.is_empty()) else {
            info!("No stored session");
            return Session::anonymous();
        };

        match service.get_session(id) {
            Ok(session) => {
                info!("Resumed session {}", id);
                session
            }
            Err(e) => {
                warn!("Failed to resume session {}: {}", id, e);
                Session::anonymous()
            }
        }
    }

    pub fn auth_context(&self) -> AuthContext {
        match &self.id {
            Some(id) => AuthContext::Authenticated {
                session_id: id.clone(),
                pers_no: self.pers_no,
            },
            None => AuthContext::Anonymous,
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("pers_name", &self.pers_name)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("pers_no", &self.pers_no)
            .field("client", &self.client)
            .finish()
    }
}
