use crate::intent::{Intent, TokenDirectory};
use crate::shared::{ExternalError, Network};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolInfo {
    pub pool_id: u64,
    #[serde(default)]
    pub pool_kind: Option<String>,
    pub token_ids: Vec<String>,
}

impl PoolInfo {
    pub fn contains_pair(&self, token_a_id: &str, token_b_id: &str) -> bool {
        self.token_ids.iter().any(|id| id == token_a_id)
            && self.token_ids.iter().any(|id| id == token_b_id)
    }
}

/// What a balance query is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum Holding {
    Native,
    Token { token_id: String },
    PoolShares { pool_id: u64 },
    ExchangeDeposit { token_id: String },
}

/// Read-only chain views.
pub trait ChainReader: Send + Sync {
    fn pool(&self, network: Network, pool_id: u64) -> Result<Option<PoolInfo>, ExternalError>;

    fn list_pools(&self, network: Network) -> Result<Vec<PoolInfo>, ExternalError>;

    /// Monotonic: a higher score means deeper liquidity.
    fn pool_liquidity_score(&self, network: Network, pool: &PoolInfo)
        -> Result<u128, ExternalError>;

    /// Smallest-unit balance as an integer string.
    fn balance(
        &self,
        network: Network,
        account_id: &str,
        holding: &Holding,
    ) -> Result<String, ExternalError>;

    fn is_registered(
        &self,
        network: Network,
        token_id: &str,
        account_id: &str,
    ) -> Result<bool, ExternalError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapQuoteRequest {
    pub token_in_id: String,
    pub token_out_id: String,
    pub amount_raw: String,
    pub slippage_bps: u32,
    pub pool_id: Option<u64>,
}

/// `min_amount_out_raw` is the protocol floor for the requested slippage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapQuote {
    pub pool_id: u64,
    pub amount_out_raw: String,
    pub min_amount_out_raw: String,
}

pub trait SwapQuoter: Send + Sync {
    fn quote_swap(
        &self,
        network: Network,
        request: &SwapQuoteRequest,
    ) -> Result<SwapQuote, ExternalError>;
}

/// Builds an unsigned transaction for any intent type.
pub trait TransactionComposer: Send + Sync {
    fn compose(&self, network: Network, intent: &Intent) -> Result<Value, ExternalError>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    #[serde(default)]
    pub tx_hash: Option<String>,
    #[serde(default)]
    pub correlation_id: Option<String>,
    #[serde(default)]
    pub deposit_address: Option<String>,
}

/// Signs and broadcasts. Key handling lives entirely behind this seam.
pub trait Submitter: Send + Sync {
    fn submit(&self, network: Network, intent: &Intent) -> Result<Submission, ExternalError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossChainQuoteRequest {
    /// `true` prices only; `false` also allocates a deposit address.
    pub dry: bool,
    pub origin_asset: String,
    pub destination_asset: String,
    pub amount_raw: String,
    pub slippage_bps: u32,
    pub recipient: String,
    pub refund_to: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossChainQuote {
    #[serde(default)]
    pub deposit_address: Option<String>,
    #[serde(default)]
    pub correlation_id: Option<String>,
    pub amount_out_raw: String,
    pub min_amount_out_raw: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SettlementStatus {
    KnownDepositTx,
    PendingDeposit,
    IncompleteDeposit,
    Processing,
    Success,
    Refunded,
    Failed,
}

impl SettlementStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::KnownDepositTx => "KNOWN_DEPOSIT_TX",
            Self::PendingDeposit => "PENDING_DEPOSIT",
            Self::IncompleteDeposit => "INCOMPLETE_DEPOSIT",
            Self::Processing => "PROCESSING",
            Self::Success => "SUCCESS",
            Self::Refunded => "REFUNDED",
            Self::Failed => "FAILED",
        }
    }

    /// No transition leaves a terminal state.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Success | Self::Failed | Self::Refunded | Self::IncompleteDeposit
        )
    }
}

impl std::fmt::Display for SettlementStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub status: SettlementStatus,
    #[serde(default)]
    pub correlation_id: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Cross-chain quote and settlement API.
pub trait CrossChainApi: Send + Sync {
    fn quote(&self, request: &CrossChainQuoteRequest) -> Result<CrossChainQuote, ExternalError>;

    fn status(&self, deposit_address: &str) -> Result<StatusResponse, ExternalError>;
}

#[derive(Clone)]
pub struct Collaborators {
    pub tokens: Arc<dyn TokenDirectory>,
    pub chain: Arc<dyn ChainReader>,
    pub quoter: Arc<dyn SwapQuoter>,
    pub composer: Arc<dyn TransactionComposer>,
    pub submitter: Arc<dyn Submitter>,
    pub cross_chain: Arc<dyn CrossChainApi>,
}
