use super::pool_resolver::PoolCandidate;
use crate::intent::Intent;
use crate::shared::{Network, RunId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// What a later phase of the same run needs to resume without restating the
/// intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSession {
    pub run_id: RunId,
    pub network: Network,
    pub intent: Intent,
    pub confirm_token: String,
    #[serde(default)]
    pub pool_candidates: Vec<PoolCandidate>,
    pub recorded_at: i64,
}

#[derive(Debug, Default)]
struct SessionIndex {
    sessions: HashMap<RunId, RunSession>,
    latest: Option<RunId>,
}

/// Process-wide run sessions. Writes replace the whole session and move the
/// latest pointer; concurrent writers to one run id are last-write-wins.
/// Entries are never evicted.
#[derive(Debug, Default)]
pub struct SessionStore {
    index: Mutex<SessionIndex>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SessionIndex> {
        self.index.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the session it replaced, if any.
    pub fn record(&self, session: RunSession) -> Option<RunSession> {
        let mut index = self.lock();
        let run_id = session.run_id.clone();
        let previous = index.sessions.insert(run_id.clone(), session);
        index.latest = Some(run_id);
        previous
    }

    pub fn get(&self, run_id: &RunId) -> Option<RunSession> {
        self.lock().sessions.get(run_id).cloned()
    }

    pub fn latest(&self) -> Option<RunSession> {
        let index = self.lock();
        index
            .latest
            .as_ref()
            .and_then(|run_id| index.sessions.get(run_id))
            .cloned()
    }

    pub fn contains(&self, run_id: &RunId) -> bool {
        self.lock().sessions.contains_key(run_id)
    }

    pub fn len(&self) -> usize {
        self.lock().sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
