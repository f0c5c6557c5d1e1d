pub mod collaborators;
pub mod confirm_token;
pub mod envelope;
pub mod error;
pub mod fan_out;
pub mod pool_resolver;
pub mod quote_api;
pub mod safety_guard;
pub mod session_store;
pub mod status_poller;
pub mod workflow_runner;

pub use collaborators::{
    ChainReader, Collaborators, CrossChainApi, CrossChainQuote, CrossChainQuoteRequest, Holding,
    PoolInfo, SettlementStatus, StatusResponse, Submission, Submitter, SwapQuote,
    SwapQuoteRequest, SwapQuoter, TransactionComposer,
};
pub use envelope::{PhaseArtifact, RunMode, WorkflowRequest, WorkflowResponse};
pub use error::WorkflowError;
pub use quote_api::HttpCrossChainApi;
pub use session_store::{RunSession, SessionStore};
pub use status_poller::{PollClock, PollOptions, PollOutcome, SystemPollClock};
pub use workflow_runner::WorkflowRunner;
