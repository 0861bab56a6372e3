use std::{collections::HashMap, sync::Arc};

use tokio::sync::Mutex;

use crate::{types::Session, utils};

/// Server-side session store, addressed by the opaque id carried in the
/// session cookie. Each session is wrapped in its own mutex so token
/// refreshes and limit changes for one user never race each other while
/// other sessions stay untouched.
pub struct SessionManager {
    sessions: Mutex<HashMap<String, Arc<Mutex<Session>>>>,
}

impl SessionManager {
    pub fn new() -> Self {
        SessionManager {
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Stores a freshly authenticated session and returns its id.
    pub async fn create(&self, session: Session) -> String {
        let session_id = utils::generate_session_id();
        let mut sessions = self.sessions.lock().await;
        sessions.insert(session_id.clone(), Arc::new(Mutex::new(session)));
        session_id
    }

    pub async fn get(&self, session_id: &str) -> Option<Arc<Mutex<Session>>> {
        let sessions = self.sessions.lock().await;
        sessions.get(session_id).cloned()
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}
