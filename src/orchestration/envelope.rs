use super::collaborators::{CrossChainQuote, Holding, SwapQuote, Submission};
use super::error::WorkflowError;
use super::pool_resolver::PoolResolution;
use super::status_poller::PollOutcome;
use crate::intent::{Intent, IntentFields, IntentType};
use crate::shared::{Network, RunId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    Analysis,
    Compose,
    Simulate,
    Execute,
}

impl RunMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Analysis => "analysis",
            Self::Compose => "compose",
            Self::Simulate => "simulate",
            Self::Execute => "execute",
        }
    }
}

impl std::fmt::Display for RunMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One phase invocation. Intent fields sit at the top level next to the
/// control fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowRequest {
    #[serde(default)]
    pub run_id: Option<String>,
    pub run_mode: RunMode,
    #[serde(default)]
    pub network: Option<Network>,
    #[serde(default)]
    pub intent_type: Option<IntentType>,
    #[serde(default)]
    pub intent_text: Option<String>,
    #[serde(flatten)]
    pub fields: IntentFields,
    #[serde(default)]
    pub pool_candidate_index: Option<usize>,
    #[serde(default)]
    pub confirm_mainnet: bool,
    #[serde(default)]
    pub confirm_token: Option<String>,
    #[serde(default)]
    pub wait_for_settlement: bool,
    /// Keys no other field claimed; a non-empty map is rejected before any work.
    #[serde(flatten)]
    pub unknown: Map<String, Value>,
}

impl WorkflowRequest {
    pub fn new(run_mode: RunMode) -> Self {
        Self {
            run_id: None,
            run_mode,
            network: None,
            intent_type: None,
            intent_text: None,
            fields: IntentFields::default(),
            pool_candidate_index: None,
            confirm_mainnet: false,
            confirm_token: None,
            wait_for_settlement: false,
            unknown: Map::new(),
        }
    }

    pub fn reject_unknown_fields(&self) -> Result<(), WorkflowError> {
        match self.unknown.keys().next() {
            Some(key) => Err(WorkflowError::InvalidRequest {
                field: key.clone(),
                reason: "is not a recognized request field".to_string(),
            }),
            None => Ok(()),
        }
    }

    /// True when the request restates any part of the intent.
    pub fn carries_intent(&self) -> bool {
        self.intent_type.is_some()
            || self
                .intent_text
                .as_deref()
                .is_some_and(|text| !text.trim().is_empty())
            || !self.fields.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Approval {
    pub required: bool,
    #[serde(default)]
    pub confirm_token: Option<String>,
    pub instructions: String,
}

impl Approval {
    pub fn for_network(network: Network, confirm_token: &str) -> Self {
        if network.is_production() {
            Self {
                required: true,
                confirm_token: Some(confirm_token.to_string()),
                instructions: format!(
                    "execute on {network} with confirmMainnet=true and confirmToken={confirm_token}"
                ),
            }
        } else {
            Self {
                required: false,
                confirm_token: None,
                instructions: format!("no confirmation required on {network}"),
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum SimulationCheck {
    Balance {
        account_id: String,
        holding: Holding,
        required_raw: String,
        available_raw: String,
        sufficient: bool,
    },
    Registration {
        account_id: String,
        token_id: String,
        registered: bool,
    },
}

impl SimulationCheck {
    pub fn passed(&self) -> bool {
        match self {
            Self::Balance { sufficient, .. } => *sufficient,
            Self::Registration { registered, .. } => *registered,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisArtifact {
    pub approval: Approval,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposeArtifact {
    pub unsigned_transaction: Value,
    #[serde(default)]
    pub pool: Option<PoolResolution>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulateArtifact {
    pub checks: Vec<SimulationCheck>,
    #[serde(default)]
    pub pool: Option<PoolResolution>,
    #[serde(default)]
    pub swap_quote: Option<SwapQuote>,
    #[serde(default)]
    pub cross_chain_quote: Option<CrossChainQuote>,
    #[serde(default)]
    pub safe_min_amount_out_raw: Option<String>,
    pub approval: Approval,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteArtifact {
    pub submission: Submission,
    #[serde(default)]
    pub settlement: Option<PollOutcome>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum PhaseArtifact {
    Analysis(AnalysisArtifact),
    Compose(ComposeArtifact),
    Simulate(SimulateArtifact),
    Execute(ExecuteArtifact),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
}

impl ContentItem {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: "text".to_string(),
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowDetails {
    pub run_id: RunId,
    pub run_mode: RunMode,
    pub network: Network,
    pub intent_type: IntentType,
    pub intent: Intent,
    pub approval_required: bool,
    #[serde(default)]
    pub confirm_token: Option<String>,
    pub artifacts: PhaseArtifact,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowResponse {
    pub content: Vec<ContentItem>,
    pub details: WorkflowDetails,
}

impl WorkflowResponse {
    pub fn summary(&self) -> &str {
        self.content
            .first()
            .map(|item| item.text.as_str())
            .unwrap_or_default()
    }
}
