use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};
use tracing::info;
use uuid::Uuid;

use crate::agent::EditSession;
use crate::errors::AppError;
use crate::models::ResumeRecord;
use crate::scoring::ScoreResult;

/// Everything one user works on. Only touched while holding its lock.
#[derive(Debug)]
pub struct Session {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub editor: EditSession,
    pub job_description: String,
    pub last_score: Option<ScoreResult>,
}

/// In-memory sessions keyed by id. Nothing is persisted.
// TODO: evict sessions idle for longer than a configurable TTL.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Arc<Mutex<Session>>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self, record: ResumeRecord, job_description: String) -> Uuid {
        let id = Uuid::new_v4();
        let session = Session {
            id,
            created_at: Utc::now(),
            editor: EditSession::new(record),
            job_description,
            last_score: None,
        };
        let mut sessions = self.sessions.write().await;
        sessions.insert(id, Arc::new(Mutex::new(session)));
        info!("Created session {id} ({} active)", sessions.len());
        id
    }

    pub async fn get(&self, id: Uuid) -> Result<Arc<Mutex<Session>>, AppError> {
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))
    }

    pub async fn remove(&self, id: Uuid) -> Result<(), AppError> {
        match self.sessions.write().await.remove(&id) {
            Some(_) => {
                info!("Discarded session {id}");
                Ok(())
            }
            None => Err(AppError::NotFound(format!("Session {id} not found"))),
        }
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}
