use crate::intent::{IntentError, IntentType};
use crate::shared::{ExternalError, Network};

#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Intent(#[from] IntentError),
    #[error("`{field}` {reason}")]
    InvalidRequest { field: String, reason: String },
    #[error("workflow run `{run_id}` not found")]
    UnknownRunId { run_id: String },
    #[error("no previous run to resume; provide intent fields or a known `runId`")]
    NoSessionToResume,
    #[error("pool {pool_id} not found on {network}")]
    PoolNotFound { pool_id: u64, network: Network },
    #[error("no pool on {network} contains both `{token_a_id}` and `{token_b_id}`")]
    NoPoolForPair {
        token_a_id: String,
        token_b_id: String,
        network: Network,
    },
    #[error("pool {pool_id} does not contain `{token_id}`")]
    TokenNotInPool { pool_id: u64, token_id: String },
    #[error("pool candidate selection applies only to add_liquidity and remove_liquidity, not {intent_type}")]
    CandidateSelectionNotAllowed { intent_type: IntentType },
    #[error("workflow run `{run_id}` has no pool candidates to select from")]
    NoPoolCandidates { run_id: String },
    #[error("`poolCandidateIndex` {index} is out of range 1-{count}")]
    CandidateIndexOutOfRange { index: usize, count: usize },
    #[error("`poolCandidateIndex` {index} selects pool {candidate_pool_id} but `poolId` is {pool_id}")]
    CandidateConflict {
        index: usize,
        candidate_pool_id: u64,
        pool_id: u64,
    },
    #[error("`minAmountOutRaw` {requested} is below the quoted safe floor {floor}")]
    BelowQuotedFloor { requested: String, floor: String },
    #[error("`slippageBps` {requested} exceeds the maximum of {limit}")]
    SlippageAboveLimit { requested: u32, limit: u32 },
    #[error("upstream quote is malformed: {reason}")]
    MalformedQuote { reason: String },
    #[error("execution on {network} requires `confirmMainnet=true`")]
    ConfirmationRequired { network: Network },
    #[error("execution on {network} requires `confirmToken` {expected}")]
    ConfirmTokenMissing { network: Network, expected: String },
    #[error("confirm token mismatch: expected {expected}, provided {provided}")]
    ConfirmTokenMismatch { expected: String, provided: String },
    #[error("cross-chain execution has no deposit address to track")]
    MissingDepositAddress,
    #[error("{operation} failed: {source}")]
    External {
        operation: String,
        #[source]
        source: ExternalError,
    },
    #[error("failed to allocate run id: {0}")]
    RunIdAllocation(String),
    #[error("failed to encode intent: {0}")]
    IntentEncoding(String),
}

impl WorkflowError {
    pub fn external(operation: impl Into<String>) -> impl FnOnce(ExternalError) -> Self {
        let operation = operation.into();
        move |source| Self::External { operation, source }
    }
}
