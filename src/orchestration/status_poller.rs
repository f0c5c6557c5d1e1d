use super::collaborators::{CrossChainApi, SettlementStatus};
use super::error::WorkflowError;
use crate::config::StatusPollSettings;
use crate::shared::{EventLog, ExternalError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::LazyLock;
use std::time::{Duration, Instant};

static TRANSIENT_STATUS_ERROR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bnot\s+(?:yet\s+)?(?:found|indexed)\b|\bunknown\s+deposit\b|\b404\b")
        .expect("transient status error regex")
});

/// Time source for polling. Tests inject a fake that advances on sleep.
pub trait PollClock: Send + Sync {
    fn now_ms(&self) -> u64;
    fn sleep_ms(&self, duration_ms: u64);
}

#[derive(Debug)]
pub struct SystemPollClock {
    started: Instant,
}

impl SystemPollClock {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }
}

impl Default for SystemPollClock {
    fn default() -> Self {
        Self::new()
    }
}

impl PollClock for SystemPollClock {
    fn now_ms(&self) -> u64 {
        u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    fn sleep_ms(&self, duration_ms: u64) {
        std::thread::sleep(Duration::from_millis(duration_ms));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOptions {
    pub interval_ms: u64,
    pub timeout_ms: u64,
}

impl From<StatusPollSettings> for PollOptions {
    fn from(settings: StatusPollSettings) -> Self {
        Self {
            interval_ms: settings.interval_ms,
            timeout_ms: settings.timeout_ms,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollAttempt {
    pub attempt: u32,
    pub elapsed_ms: u64,
    #[serde(default)]
    pub status: Option<SettlementStatus>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollOutcome {
    pub timed_out: bool,
    pub attempts: u32,
    pub latest_status: Option<SettlementStatus>,
    pub last_error: Option<String>,
    pub history: Vec<PollAttempt>,
}

impl PollOutcome {
    pub fn settled(&self) -> bool {
        self.latest_status.is_some_and(SettlementStatus::is_terminal)
    }
}

/// Errors meaning "the service has not seen this deposit yet".
pub fn is_transient_status_error(err: &ExternalError) -> bool {
    match err {
        ExternalError::Status { status: 404, .. } => true,
        other => TRANSIENT_STATUS_ERROR_RE.is_match(&other.to_string()),
    }
}

/// Polls until a terminal status or the deadline. Sleeps never pass the
/// deadline. Transient errors are recorded and retried; any other error ends
/// polling with `Err`.
pub fn poll_settlement(
    api: &dyn CrossChainApi,
    deposit_address: &str,
    options: PollOptions,
    clock: &dyn PollClock,
    log: &EventLog,
) -> Result<PollOutcome, WorkflowError> {
    let started = clock.now_ms();
    let deadline = started.saturating_add(options.timeout_ms);
    let mut outcome = PollOutcome {
        timed_out: false,
        attempts: 0,
        latest_status: None,
        last_error: None,
        history: Vec::new(),
    };

    loop {
        outcome.attempts += 1;
        let elapsed_ms = clock.now_ms().saturating_sub(started);
        match api.status(deposit_address) {
            Ok(response) => {
                log.record(
                    "status_poll_attempt",
                    &[
                        ("depositAddress", Value::from(deposit_address)),
                        ("attempt", Value::from(outcome.attempts)),
                        ("status", Value::from(response.status.as_str())),
                    ],
                );
                outcome.latest_status = Some(response.status);
                outcome.history.push(PollAttempt {
                    attempt: outcome.attempts,
                    elapsed_ms,
                    status: Some(response.status),
                    error: None,
                });
                if response.status.is_terminal() {
                    return Ok(outcome);
                }
            }
            Err(err) if is_transient_status_error(&err) => {
                let message = err.to_string();
                log.record(
                    "status_poll_attempt",
                    &[
                        ("depositAddress", Value::from(deposit_address)),
                        ("attempt", Value::from(outcome.attempts)),
                        ("error", Value::from(message.as_str())),
                    ],
                );
                outcome.history.push(PollAttempt {
                    attempt: outcome.attempts,
                    elapsed_ms,
                    status: None,
                    error: Some(message.clone()),
                });
                outcome.last_error = Some(message);
            }
            Err(source) => {
                return Err(WorkflowError::External {
                    operation: format!("settlement status for `{deposit_address}`"),
                    source,
                });
            }
        }

        let now = clock.now_ms();
        if now >= deadline {
            outcome.timed_out = true;
            return Ok(outcome);
        }
        clock.sleep_ms(options.interval_ms.min(deadline - now));
    }
}
