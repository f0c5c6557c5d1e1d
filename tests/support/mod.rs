#![allow(dead_code)]

use chainflow::config::WorkflowSettings;
use chainflow::intent::{Intent, TokenDirectory, TokenMetadata};
use chainflow::orchestration::{
    ChainReader, Collaborators, CrossChainApi, CrossChainQuote, CrossChainQuoteRequest, Holding,
    PollClock, PoolInfo, SessionStore, SettlementStatus, StatusResponse, Submission, Submitter,
    SwapQuote, SwapQuoteRequest, SwapQuoter, TransactionComposer, WorkflowRequest,
    WorkflowRunner,
};
use chainflow::shared::{ExternalError, Network};
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const NEAR_ID: &str = "wrap.near";
pub const USDC_ID: &str = "usdc.omft.near";
pub const SOL_ID: &str = "sol.omft.near";
pub const USDT_ID: &str = "usdt.tether-token.near";

pub struct FakeTokens {
    tokens: Vec<TokenMetadata>,
    lookups: AtomicUsize,
}

impl FakeTokens {
    pub fn standard() -> Self {
        let token = |token_id: &str, symbol: &str, decimals: u8| TokenMetadata {
            token_id: token_id.to_string(),
            symbol: symbol.to_string(),
            decimals,
        };
        Self {
            tokens: vec![
                token(NEAR_ID, "NEAR", 24),
                token(USDC_ID, "USDC", 6),
                token(SOL_ID, "SOL", 9),
                token(USDT_ID, "USDT", 6),
                token("eth.omft.near", "ETH", 18),
                token("eth.bridge.near", "ETH", 18),
            ],
            lookups: AtomicUsize::new(0),
        }
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl TokenDirectory for FakeTokens {
    fn lookup(&self, _network: Network, token_ref: &str) -> Result<Vec<TokenMetadata>, ExternalError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .tokens
            .iter()
            .filter(|token| {
                token.token_id == token_ref || token.symbol.eq_ignore_ascii_case(token_ref)
            })
            .cloned()
            .collect())
    }
}

pub struct FakeChain {
    pub pools: Vec<PoolInfo>,
    pub scores: HashMap<u64, u128>,
    pub balance: String,
    pub registered: bool,
    calls: AtomicUsize,
    score_calls: AtomicUsize,
}

impl FakeChain {
    /// NEAR/USDC pools 3, 7 and 9 rank as 7, 3, 9 by liquidity.
    pub fn standard() -> Self {
        let pool = |pool_id: u64, tokens: &[&str]| PoolInfo {
            pool_id,
            pool_kind: Some("SIMPLE_POOL".to_string()),
            token_ids: tokens.iter().map(|token| token.to_string()).collect(),
        };
        Self {
            pools: vec![
                pool(3, &[NEAR_ID, USDC_ID]),
                pool(7, &[NEAR_ID, USDC_ID]),
                pool(9, &[NEAR_ID, USDC_ID, USDT_ID]),
                pool(12, &[SOL_ID, USDC_ID]),
            ],
            scores: HashMap::from([(3, 500), (7, 900), (9, 100), (12, 50)]),
            balance: "1000000000000000000000000000".to_string(),
            registered: true,
            calls: AtomicUsize::new(0),
            score_calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn score_calls(&self) -> usize {
        self.score_calls.load(Ordering::SeqCst)
    }
}

impl ChainReader for FakeChain {
    fn pool(&self, _network: Network, pool_id: u64) -> Result<Option<PoolInfo>, ExternalError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.pools.iter().find(|pool| pool.pool_id == pool_id).cloned())
    }

    fn list_pools(&self, _network: Network) -> Result<Vec<PoolInfo>, ExternalError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.pools.clone())
    }

    fn pool_liquidity_score(
        &self,
        _network: Network,
        pool: &PoolInfo,
    ) -> Result<u128, ExternalError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.score_calls.fetch_add(1, Ordering::SeqCst);
        self.scores
            .get(&pool.pool_id)
            .copied()
            .ok_or_else(|| ExternalError::unavailable("pool scores", "no liquidity data"))
    }

    fn balance(
        &self,
        _network: Network,
        _account_id: &str,
        _holding: &Holding,
    ) -> Result<String, ExternalError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.balance.clone())
    }

    fn is_registered(
        &self,
        _network: Network,
        _token_id: &str,
        _account_id: &str,
    ) -> Result<bool, ExternalError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.registered)
    }
}

pub struct FakeQuoter {
    pub quote: SwapQuote,
    calls: AtomicUsize,
    last_request: Mutex<Option<SwapQuoteRequest>>,
}

impl FakeQuoter {
    pub fn new(pool_id: u64, amount_out_raw: &str, min_amount_out_raw: &str) -> Self {
        Self {
            quote: SwapQuote {
                pool_id,
                amount_out_raw: amount_out_raw.to_string(),
                min_amount_out_raw: min_amount_out_raw.to_string(),
            },
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<SwapQuoteRequest> {
        self.last_request.lock().expect("quoter lock").clone()
    }
}

impl SwapQuoter for FakeQuoter {
    fn quote_swap(
        &self,
        _network: Network,
        request: &SwapQuoteRequest,
    ) -> Result<SwapQuote, ExternalError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().expect("quoter lock") = Some(request.clone());
        let mut quote = self.quote.clone();
        if let Some(pool_id) = request.pool_id {
            quote.pool_id = pool_id;
        }
        Ok(quote)
    }
}

#[derive(Default)]
pub struct FakeComposer {
    calls: AtomicUsize,
}

impl FakeComposer {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TransactionComposer for FakeComposer {
    fn compose(&self, network: Network, intent: &Intent) -> Result<Value, ExternalError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let action = serde_json::to_value(intent)
            .map_err(|err| ExternalError::unavailable("composer", err.to_string()))?;
        Ok(json!({
            "network": network.as_str(),
            "actions": [action],
        }))
    }
}

#[derive(Default)]
pub struct FakeSubmitter {
    submitted: Mutex<Vec<Intent>>,
}

impl FakeSubmitter {
    pub fn calls(&self) -> usize {
        self.submitted.lock().expect("submitter lock").len()
    }

    pub fn last(&self) -> Option<Intent> {
        self.submitted.lock().expect("submitter lock").last().cloned()
    }
}

impl Submitter for FakeSubmitter {
    fn submit(&self, _network: Network, intent: &Intent) -> Result<Submission, ExternalError> {
        let mut submitted = self.submitted.lock().expect("submitter lock");
        submitted.push(intent.clone());
        Ok(Submission {
            tx_hash: Some(format!("tx-{}", submitted.len())),
            correlation_id: None,
            deposit_address: None,
        })
    }
}

pub struct FakeCrossChain {
    pub quote: CrossChainQuote,
    statuses: Mutex<VecDeque<Result<StatusResponse, ExternalError>>>,
    quote_requests: Mutex<Vec<CrossChainQuoteRequest>>,
    status_calls: AtomicUsize,
}

impl FakeCrossChain {
    pub fn new() -> Self {
        Self {
            quote: CrossChainQuote {
                deposit_address: Some("0xdeposit".to_string()),
                correlation_id: Some("corr-1".to_string()),
                amount_out_raw: "2000000".to_string(),
                min_amount_out_raw: "1990000".to_string(),
            },
            statuses: Mutex::new(VecDeque::new()),
            quote_requests: Mutex::new(Vec::new()),
            status_calls: AtomicUsize::new(0),
        }
    }

    /// Once the script runs out every query reports `PENDING_DEPOSIT`.
    pub fn script(&self, responses: Vec<Result<SettlementStatus, ExternalError>>) {
        let mut statuses = self.statuses.lock().expect("status lock");
        statuses.extend(responses.into_iter().map(|response| {
            response.map(|status| StatusResponse {
                status,
                correlation_id: None,
                updated_at: None,
            })
        }));
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub fn quote_requests(&self) -> Vec<CrossChainQuoteRequest> {
        self.quote_requests.lock().expect("quote lock").clone()
    }
}

impl CrossChainApi for FakeCrossChain {
    fn quote(&self, request: &CrossChainQuoteRequest) -> Result<CrossChainQuote, ExternalError> {
        self.quote_requests
            .lock()
            .expect("quote lock")
            .push(request.clone());
        Ok(self.quote.clone())
    }

    fn status(&self, _deposit_address: &str) -> Result<StatusResponse, ExternalError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        self.statuses
            .lock()
            .expect("status lock")
            .pop_front()
            .unwrap_or(Ok(StatusResponse {
                status: SettlementStatus::PendingDeposit,
                correlation_id: None,
                updated_at: None,
            }))
    }
}

/// Time only moves when the poller sleeps.
#[derive(Default)]
pub struct FakeClock {
    now: AtomicU64,
    sleeps: Mutex<Vec<u64>>,
}

impl FakeClock {
    pub fn sleeps(&self) -> Vec<u64> {
        self.sleeps.lock().expect("clock lock").clone()
    }
}

impl PollClock for FakeClock {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }

    fn sleep_ms(&self, duration_ms: u64) {
        self.sleeps.lock().expect("clock lock").push(duration_ms);
        self.now.fetch_add(duration_ms, Ordering::SeqCst);
    }
}

pub struct Harness {
    pub tokens: Arc<FakeTokens>,
    pub chain: Arc<FakeChain>,
    pub quoter: Arc<FakeQuoter>,
    pub composer: Arc<FakeComposer>,
    pub submitter: Arc<FakeSubmitter>,
    pub cross_chain: Arc<FakeCrossChain>,
    pub clock: Arc<FakeClock>,
    pub sessions: Arc<SessionStore>,
    pub runner: WorkflowRunner,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_settings(WorkflowSettings::default())
    }

    pub fn with_settings(settings: WorkflowSettings) -> Self {
        let tokens = Arc::new(FakeTokens::standard());
        let chain = Arc::new(FakeChain::standard());
        let quoter = Arc::new(FakeQuoter::new(12, "1000000", "995000"));
        let composer = Arc::new(FakeComposer::default());
        let submitter = Arc::new(FakeSubmitter::default());
        let cross_chain = Arc::new(FakeCrossChain::new());
        let clock = Arc::new(FakeClock::default());
        let sessions = Arc::new(SessionStore::new());
        let collaborators = Collaborators {
            tokens: tokens.clone(),
            chain: chain.clone(),
            quoter: quoter.clone(),
            composer: composer.clone(),
            submitter: submitter.clone(),
            cross_chain: cross_chain.clone(),
        };
        let runner = WorkflowRunner::new(settings, Arc::clone(&sessions), collaborators)
            .with_poll_clock(clock.clone());
        Self {
            tokens,
            chain,
            quoter,
            composer,
            submitter,
            cross_chain,
            clock,
            sessions,
            runner,
        }
    }

    pub fn external_calls(&self) -> usize {
        self.chain.calls()
            + self.quoter.calls()
            + self.composer.calls()
            + self.submitter.calls()
            + self.cross_chain.quote_requests().len()
            + self.cross_chain.status_calls()
    }
}

pub fn request(value: Value) -> WorkflowRequest {
    serde_json::from_value(value).expect("workflow request")
}
