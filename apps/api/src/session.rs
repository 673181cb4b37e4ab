//! Session context — created once per visitor and passed explicitly to the handlers
//! that touch per-visitor state, instead of being looked up ambiently.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;

/// Header carrying the session id on every stateful request.
pub const SESSION_HEADER: &str = "x-session-id";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionContext {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// In-memory registry of issued sessions.
#[derive(Clone, Default)]
pub struct Sessions {
    inner: Arc<RwLock<HashMap<Uuid, SessionContext>>>,
}

impl Sessions {
    pub fn create(&self) -> SessionContext {
        let session = SessionContext {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
        };
        self.inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(session.id, session.clone());
        session
    }

    pub fn get(&self, id: Uuid) -> Option<SessionContext> {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&id)
            .cloned()
    }
}

#[async_trait]
impl FromRequestParts<AppState> for SessionContext {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get(SESSION_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| Uuid::parse_str(v.trim()).ok())
            .ok_or(AppError::Unauthorized)?;

        state.sessions.get(id).ok_or(AppError::Unauthorized)
    }
}
