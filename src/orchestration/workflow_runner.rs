use super::collaborators::{
    Collaborators, CrossChainQuote, CrossChainQuoteRequest, Holding, PoolInfo, SwapQuote,
    SwapQuoteRequest,
};
use super::confirm_token::{derive_confirm_token, verify_execution_gate};
use super::envelope::{
    AnalysisArtifact, Approval, ComposeArtifact, ContentItem, ExecuteArtifact, PhaseArtifact,
    RunMode, SimulateArtifact, SimulationCheck, WorkflowDetails, WorkflowRequest,
    WorkflowResponse,
};
use super::error::WorkflowError;
use super::pool_resolver::{
    select_candidate, PoolCandidate, PoolResolution, PoolResolver, PoolSource,
};
use super::safety_guard::{enforce_intent_slippage, safe_min_amount_out};
use super::session_store::{RunSession, SessionStore};
use super::status_poller::{poll_settlement, PollClock, PollOutcome, SystemPollClock};
use crate::config::WorkflowSettings;
use crate::intent::amount::compare_raw;
use crate::intent::{
    normalize_request, CachedTokenDirectory, CrossChainSwapIntent, Intent, NormalizeContext,
    ShareAmount, SwapIntent,
};
use crate::shared::{generate_run_id, EventLog, Network, RunId};
use serde_json::Value;
use std::cmp::Ordering;
use std::sync::Arc;

const RUN_ID_ATTEMPTS: usize = 8;

/// Everything a phase needs once the run id, network and intent are settled.
#[derive(Debug, Clone)]
struct RunContext {
    run_id: RunId,
    network: Network,
    intent: Intent,
    candidates: Vec<PoolCandidate>,
    /// False when the intent was taken from a stored session.
    fresh: bool,
}

/// Drives the four-phase workflow. One runner serves many concurrent callers;
/// all shared state lives in the session store and the token cache.
pub struct WorkflowRunner {
    settings: WorkflowSettings,
    sessions: Arc<SessionStore>,
    tokens: CachedTokenDirectory,
    collaborators: Collaborators,
    clock: Arc<dyn PollClock>,
    log: EventLog,
}

impl WorkflowRunner {
    pub fn new(
        settings: WorkflowSettings,
        sessions: Arc<SessionStore>,
        collaborators: Collaborators,
    ) -> Self {
        let tokens = CachedTokenDirectory::new(Arc::clone(&collaborators.tokens));
        let log = EventLog::new(settings.event_log_path.clone());
        Self {
            settings,
            sessions,
            tokens,
            collaborators,
            clock: Arc::new(SystemPollClock::new()),
            log,
        }
    }

    pub fn with_poll_clock(mut self, clock: Arc<dyn PollClock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn settings(&self) -> &WorkflowSettings {
        &self.settings
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn token_fetch_count(&self) -> usize {
        self.tokens.fetch_count()
    }

    pub fn run(&self, request: &WorkflowRequest) -> Result<WorkflowResponse, WorkflowError> {
        self.log.record(
            "phase_started",
            &[
                ("runMode", Value::from(request.run_mode.as_str())),
                ("runId", Value::from(request.run_id.clone())),
            ],
        );
        let result = self.dispatch(request);
        match &result {
            Ok(response) => self.log.record(
                "phase_completed",
                &[
                    ("runMode", Value::from(request.run_mode.as_str())),
                    ("runId", Value::from(response.details.run_id.as_str())),
                    ("network", Value::from(response.details.network.as_str())),
                    (
                        "intentType",
                        Value::from(response.details.intent_type.as_str()),
                    ),
                ],
            ),
            Err(err) => self.log.record(
                "phase_failed",
                &[
                    ("runMode", Value::from(request.run_mode.as_str())),
                    ("runId", Value::from(request.run_id.clone())),
                    ("error", Value::from(err.to_string())),
                ],
            ),
        }
        result
    }

    fn dispatch(&self, request: &WorkflowRequest) -> Result<WorkflowResponse, WorkflowError> {
        request.reject_unknown_fields()?;
        let context = self.resolve_context(request)?;
        enforce_intent_slippage(&context.intent, self.settings.max_slippage_bps)?;
        match request.run_mode {
            RunMode::Analysis => self.analyze(context),
            RunMode::Compose => self.compose(context),
            RunMode::Simulate => self.simulate(context),
            RunMode::Execute => self.execute(context, request),
        }
    }

    fn resolve_context(&self, request: &WorkflowRequest) -> Result<RunContext, WorkflowError> {
        let requested_run_id = request
            .run_id
            .as_deref()
            .map(|raw| {
                RunId::parse(raw).map_err(|reason| WorkflowError::InvalidRequest {
                    field: "runId".to_string(),
                    reason,
                })
            })
            .transpose()?;
        let prior = match &requested_run_id {
            Some(run_id) => self.sessions.get(run_id),
            None => self.sessions.latest(),
        };

        if !request.carries_intent() {
            let session = match (prior, &requested_run_id) {
                (Some(session), _) => session,
                (None, Some(run_id)) => {
                    return Err(WorkflowError::UnknownRunId {
                        run_id: run_id.to_string(),
                    })
                }
                (None, None) => return Err(WorkflowError::NoSessionToResume),
            };
            let mut intent = session.intent;
            if let Some(index) = request.pool_candidate_index {
                let pool_id = select_candidate(
                    intent.intent_type(),
                    session.run_id.as_str(),
                    &session.pool_candidates,
                    index,
                    None,
                )?;
                intent = intent.with_pool_id(pool_id);
            }
            return Ok(RunContext {
                run_id: session.run_id,
                network: request.network.unwrap_or(session.network),
                intent,
                candidates: session.pool_candidates,
                fresh: false,
            });
        }

        let network = request.network.unwrap_or(self.settings.default_network);
        let normalize_ctx = NormalizeContext {
            network,
            tokens: &self.tokens,
            native_asset: &self.settings.native_asset,
            default_slippage_bps: self.settings.default_slippage_bps,
        };
        let mut intent = normalize_request(
            request.intent_type,
            request.intent_text.as_deref(),
            &request.fields,
            &normalize_ctx,
        )?;

        let mut candidates = Vec::new();
        if let Some(index) = request.pool_candidate_index {
            let (run_label, prior_candidates) = match &prior {
                Some(session) => (session.run_id.to_string(), session.pool_candidates.clone()),
                None => (request.run_id.clone().unwrap_or_default(), Vec::new()),
            };
            let pool_id = select_candidate(
                intent.intent_type(),
                &run_label,
                &prior_candidates,
                index,
                intent.pool_id(),
            )?;
            intent = intent.with_pool_id(pool_id);
            candidates = prior_candidates;
        }

        let run_id = match requested_run_id {
            Some(run_id) => run_id,
            None => self.allocate_run_id()?,
        };
        Ok(RunContext {
            run_id,
            network,
            intent,
            candidates,
            fresh: true,
        })
    }

    fn allocate_run_id(&self) -> Result<RunId, WorkflowError> {
        for _ in 0..RUN_ID_ATTEMPTS {
            let run_id = generate_run_id(chrono::Utc::now().timestamp())
                .map_err(WorkflowError::RunIdAllocation)?;
            if !self.sessions.contains(&run_id) {
                return Ok(run_id);
            }
        }
        Err(WorkflowError::RunIdAllocation(format!(
            "no unused run id after {RUN_ID_ATTEMPTS} attempts"
        )))
    }

    fn analyze(&self, context: RunContext) -> Result<WorkflowResponse, WorkflowError> {
        let confirm_token = derive_confirm_token(&context.run_id, context.network, &context.intent)?;
        self.record_session(&context, &context.intent, &confirm_token, &context.candidates);
        let approval = Approval::for_network(context.network, &confirm_token);
        let summary = approval.instructions.clone();
        Ok(respond(
            RunMode::Analysis,
            &context,
            context.intent.clone(),
            &confirm_token,
            summary,
            PhaseArtifact::Analysis(AnalysisArtifact { approval }),
        ))
    }

    fn compose(&self, context: RunContext) -> Result<WorkflowResponse, WorkflowError> {
        let (intent, pool) = self.resolve_pool(context.network, &context.intent)?;
        let unsigned_transaction = self
            .collaborators
            .composer
            .compose(context.network, &intent)
            .map_err(WorkflowError::external("transaction composition"))?;
        let confirm_token = derive_confirm_token(&context.run_id, context.network, &intent)?;
        if context.fresh {
            let candidates = session_candidates(pool.as_ref(), &context.candidates);
            self.record_session(&context, &intent, &confirm_token, &candidates);
        }
        let summary = match intent.pool_id() {
            Some(pool_id) => format!("unsigned transaction ready for pool {pool_id}"),
            None => "unsigned transaction ready".to_string(),
        };
        Ok(respond(
            RunMode::Compose,
            &context,
            intent,
            &confirm_token,
            summary,
            PhaseArtifact::Compose(ComposeArtifact {
                unsigned_transaction,
                pool,
            }),
        ))
    }

    fn simulate(&self, context: RunContext) -> Result<WorkflowResponse, WorkflowError> {
        let network = context.network;
        let (intent, pool) = self.resolve_pool(network, &context.intent)?;
        let mut swap_quote = None;
        let mut cross_chain_quote = None;
        let mut safe_min_amount_out_raw = None;
        let refined = match intent {
            Intent::Swap(swap) => {
                let (refined, quote) = self.quote_swap(network, &swap)?;
                safe_min_amount_out_raw = refined.min_amount_out_raw.clone();
                swap_quote = Some(quote);
                Intent::Swap(refined)
            }
            Intent::CrossChainSwap(swap) => {
                let (refined, quote) = self.quote_cross_chain(&swap)?;
                safe_min_amount_out_raw = refined.min_amount_out_raw.clone();
                cross_chain_quote = Some(quote);
                Intent::CrossChainSwap(refined)
            }
            other => other,
        };
        let checks = self.run_checks(network, &refined, pool.as_ref())?;
        let confirm_token = derive_confirm_token(&context.run_id, network, &refined)?;
        let candidates = session_candidates(pool.as_ref(), &context.candidates);
        self.record_session(&context, &refined, &confirm_token, &candidates);

        let approval = Approval::for_network(network, &confirm_token);
        let passed = checks.iter().filter(|check| check.passed()).count();
        let mut summary = format!("{passed}/{} checks passed", checks.len());
        if let Some(pool_id) = refined.pool_id() {
            summary.push_str(&format!("; pool {pool_id}"));
        }
        if let Some(min) = &safe_min_amount_out_raw {
            summary.push_str(&format!("; minAmountOutRaw {min}"));
        }
        summary.push_str(&format!("; {}", approval.instructions));
        Ok(respond(
            RunMode::Simulate,
            &context,
            refined,
            &confirm_token,
            summary,
            PhaseArtifact::Simulate(SimulateArtifact {
                checks,
                pool,
                swap_quote,
                cross_chain_quote,
                safe_min_amount_out_raw,
                approval,
            }),
        ))
    }

    fn execute(
        &self,
        context: RunContext,
        request: &WorkflowRequest,
    ) -> Result<WorkflowResponse, WorkflowError> {
        let network = context.network;
        let confirm_token = derive_confirm_token(&context.run_id, network, &context.intent)?;
        if let Err(err) = verify_execution_gate(
            network,
            request.confirm_mainnet,
            request.confirm_token.as_deref(),
            &confirm_token,
        ) {
            self.log.record(
                "execute_gate_rejected",
                &[
                    ("runId", Value::from(context.run_id.as_str())),
                    ("network", Value::from(network.as_str())),
                    ("error", Value::from(err.to_string())),
                ],
            );
            return Err(err);
        }

        let (intent, _) = self.resolve_pool(network, &context.intent)?;
        let intent = match intent {
            Intent::Swap(swap) if swap.pool_id.is_none() || swap.min_amount_out_raw.is_none() => {
                Intent::Swap(self.quote_swap(network, &swap)?.0)
            }
            Intent::CrossChainSwap(swap) if swap.deposit_address.is_none() => {
                Intent::CrossChainSwap(self.quote_cross_chain(&swap)?.0)
            }
            other => other,
        };

        let submission = self
            .collaborators
            .submitter
            .submit(network, &intent)
            .map_err(WorkflowError::external("submission"))?;

        let settlement = match &intent {
            Intent::CrossChainSwap(swap) if request.wait_for_settlement => {
                let deposit_address = submission
                    .deposit_address
                    .clone()
                    .or_else(|| swap.deposit_address.clone())
                    .ok_or(WorkflowError::MissingDepositAddress)?;
                Some(self.await_settlement(&deposit_address)?)
            }
            _ => None,
        };

        let mut summary = match &submission.tx_hash {
            Some(tx_hash) => format!("submitted transaction {tx_hash}"),
            None => "submitted".to_string(),
        };
        if let Some(outcome) = &settlement {
            summary.push_str(&settlement_summary(outcome));
        }
        Ok(respond(
            RunMode::Execute,
            &context,
            intent,
            &confirm_token,
            summary,
            PhaseArtifact::Execute(ExecuteArtifact {
                submission,
                settlement,
            }),
        ))
    }

    fn await_settlement(&self, deposit_address: &str) -> Result<PollOutcome, WorkflowError> {
        poll_settlement(
            self.collaborators.cross_chain.as_ref(),
            deposit_address,
            self.settings.status_poll.into(),
            self.clock.as_ref(),
            &self.log,
        )
    }

    /// Pins liquidity intents to a concrete pool, discovering one when only
    /// the pair is known. Explicit swap pools are checked for existence.
    fn resolve_pool(
        &self,
        network: Network,
        intent: &Intent,
    ) -> Result<(Intent, Option<PoolResolution>), WorkflowError> {
        let resolver = PoolResolver::new(
            self.collaborators.chain.as_ref(),
            network,
            self.settings.fan_out_workers,
        );
        if let Some(pool_ref) = intent.pool_ref() {
            let resolution = resolver.resolve(pool_ref)?;
            let pinned =
                align_to_pool(intent.with_pool_id(resolution.pool.pool_id), &resolution.pool)?;
            return Ok((pinned, Some(resolution)));
        }
        match intent {
            Intent::Swap(SwapIntent {
                pool_id: Some(pool_id),
                ..
            }) => {
                let pool = resolver.lookup(*pool_id)?;
                Ok((
                    intent.clone(),
                    Some(PoolResolution {
                        pool,
                        source: PoolSource::Explicit,
                        candidates: Vec::new(),
                    }),
                ))
            }
            _ => Ok((intent.clone(), None)),
        }
    }

    fn quote_swap(
        &self,
        network: Network,
        swap: &SwapIntent,
    ) -> Result<(SwapIntent, SwapQuote), WorkflowError> {
        let quote = self
            .collaborators
            .quoter
            .quote_swap(
                network,
                &SwapQuoteRequest {
                    token_in_id: swap.token_in_id.clone(),
                    token_out_id: swap.token_out_id.clone(),
                    amount_raw: swap.amount_raw.clone(),
                    slippage_bps: swap.slippage_bps,
                    pool_id: swap.pool_id,
                },
            )
            .map_err(WorkflowError::external("swap quote"))?;
        let safe_min = safe_min_amount_out(
            &quote.amount_out_raw,
            &quote.min_amount_out_raw,
            swap.min_amount_out_raw.as_deref(),
        )?;
        let mut refined = swap.clone();
        refined.pool_id = swap.pool_id.or(Some(quote.pool_id));
        refined.min_amount_out_raw = Some(safe_min);
        Ok((refined, quote))
    }

    /// Live (non-dry) quote: allocates the deposit address the swap settles through.
    fn quote_cross_chain(
        &self,
        swap: &CrossChainSwapIntent,
    ) -> Result<(CrossChainSwapIntent, CrossChainQuote), WorkflowError> {
        let quote = self
            .collaborators
            .cross_chain
            .quote(&CrossChainQuoteRequest {
                dry: false,
                origin_asset: swap.origin_asset.clone(),
                destination_asset: swap.destination_asset.clone(),
                amount_raw: swap.amount_raw.clone(),
                slippage_bps: swap.slippage_bps,
                recipient: swap.recipient.clone(),
                refund_to: swap.refund_to.clone(),
            })
            .map_err(WorkflowError::external("cross-chain quote"))?;
        let safe_min = safe_min_amount_out(
            &quote.amount_out_raw,
            &quote.min_amount_out_raw,
            swap.min_amount_out_raw.as_deref(),
        )?;
        let mut refined = swap.clone();
        refined.min_amount_out_raw = Some(safe_min);
        refined.deposit_address = quote
            .deposit_address
            .clone()
            .or_else(|| swap.deposit_address.clone());
        Ok((refined, quote))
    }

    /// Read-only readiness checks. Intents without a signer account get none.
    fn run_checks(
        &self,
        network: Network,
        intent: &Intent,
        pool: Option<&PoolResolution>,
    ) -> Result<Vec<SimulationCheck>, WorkflowError> {
        let Some(account_id) = intent.account_id() else {
            return Ok(Vec::new());
        };
        let mut checks = Vec::new();
        match intent {
            Intent::NativeTransfer(transfer) => {
                checks.push(self.balance_check(
                    network,
                    account_id,
                    Holding::Native,
                    &transfer.amount_raw,
                )?);
            }
            Intent::FtTransfer(transfer) => {
                checks.push(self.balance_check(
                    network,
                    account_id,
                    Holding::Token {
                        token_id: transfer.token_id.clone(),
                    },
                    &transfer.amount_raw,
                )?);
                checks.push(self.registration_check(
                    network,
                    &transfer.token_id,
                    &transfer.receiver_id,
                )?);
            }
            Intent::Swap(swap) => {
                checks.push(self.balance_check(
                    network,
                    account_id,
                    Holding::Token {
                        token_id: swap.token_in_id.clone(),
                    },
                    &swap.amount_raw,
                )?);
                checks.push(self.registration_check(network, &swap.token_out_id, account_id)?);
            }
            Intent::CrossChainSwap(swap) => {
                checks.push(self.balance_check(
                    network,
                    account_id,
                    Holding::Token {
                        token_id: swap.origin_asset.clone(),
                    },
                    &swap.amount_raw,
                )?);
            }
            Intent::AddLiquidity(add) => {
                let token_ids = match (&add.token_a_id, &add.token_b_id, pool) {
                    (Some(a), Some(b), _) => vec![a.clone(), b.clone()],
                    (_, _, Some(resolution)) => resolution.pool.token_ids.clone(),
                    _ => Vec::new(),
                };
                let amounts = [&add.amount_a_raw, &add.amount_b_raw];
                for (token_id, amount) in token_ids.into_iter().zip(amounts) {
                    checks.push(self.balance_check(
                        network,
                        account_id,
                        Holding::Token { token_id },
                        amount,
                    )?);
                }
            }
            Intent::RemoveLiquidity(remove) => {
                if let Some(pool_id) = intent.pool_id() {
                    let required = match &remove.shares {
                        ShareAmount::SharesRaw(raw) => raw.as_str(),
                        ShareAmount::ShareBps(_) => "1",
                    };
                    checks.push(self.balance_check(
                        network,
                        account_id,
                        Holding::PoolShares { pool_id },
                        required,
                    )?);
                }
            }
            Intent::ExchangeWithdraw(withdraw) => {
                checks.push(self.balance_check(
                    network,
                    account_id,
                    Holding::ExchangeDeposit {
                        token_id: withdraw.token_id.clone(),
                    },
                    &withdraw.amount_raw,
                )?);
                checks.push(self.registration_check(network, &withdraw.token_id, account_id)?);
            }
            Intent::Lend(lend) => {
                checks.push(self.balance_check(
                    network,
                    account_id,
                    Holding::Token {
                        token_id: lend.token_id.clone(),
                    },
                    &lend.amount_raw,
                )?);
            }
            Intent::Stake(stake) => {
                checks.push(self.balance_check(
                    network,
                    account_id,
                    Holding::Native,
                    &stake.amount_raw,
                )?);
            }
        }
        Ok(checks)
    }

    fn balance_check(
        &self,
        network: Network,
        account_id: &str,
        holding: Holding,
        required_raw: &str,
    ) -> Result<SimulationCheck, WorkflowError> {
        let available_raw = self
            .collaborators
            .chain
            .balance(network, account_id, &holding)
            .map_err(WorkflowError::external("balance query"))?;
        let sufficient = compare_raw(&available_raw, required_raw) != Ordering::Less;
        Ok(SimulationCheck::Balance {
            account_id: account_id.to_string(),
            holding,
            required_raw: required_raw.to_string(),
            available_raw,
            sufficient,
        })
    }

    fn registration_check(
        &self,
        network: Network,
        token_id: &str,
        account_id: &str,
    ) -> Result<SimulationCheck, WorkflowError> {
        let registered = self
            .collaborators
            .chain
            .is_registered(network, token_id, account_id)
            .map_err(WorkflowError::external("storage registration query"))?;
        Ok(SimulationCheck::Registration {
            account_id: account_id.to_string(),
            token_id: token_id.to_string(),
            registered,
        })
    }

    fn record_session(
        &self,
        context: &RunContext,
        intent: &Intent,
        confirm_token: &str,
        candidates: &[PoolCandidate],
    ) {
        self.sessions.record(RunSession {
            run_id: context.run_id.clone(),
            network: context.network,
            intent: intent.clone(),
            confirm_token: confirm_token.to_string(),
            pool_candidates: candidates.to_vec(),
            recorded_at: chrono::Utc::now().timestamp(),
        });
        self.log.record(
            "session_recorded",
            &[
                ("runId", Value::from(context.run_id.as_str())),
                ("network", Value::from(context.network.as_str())),
                ("intentType", Value::from(intent.intent_type().as_str())),
                ("poolCandidates", Value::from(candidates.len())),
            ],
        );
    }
}

/// Rejects liquidity token ids the pool does not hold and puts add-liquidity
/// amounts into the pool's token order.
fn align_to_pool(intent: Intent, pool: &PoolInfo) -> Result<Intent, WorkflowError> {
    let (token_a_id, token_b_id) = match &intent {
        Intent::AddLiquidity(add) => (add.token_a_id.as_deref(), add.token_b_id.as_deref()),
        Intent::RemoveLiquidity(remove) => {
            (remove.token_a_id.as_deref(), remove.token_b_id.as_deref())
        }
        _ => (None, None),
    };
    let position = |token_id: &str| {
        pool.token_ids
            .iter()
            .position(|id| id == token_id)
            .ok_or_else(|| WorkflowError::TokenNotInPool {
                pool_id: pool.pool_id,
                token_id: token_id.to_string(),
            })
    };
    let position_a = token_a_id.map(&position).transpose()?;
    let position_b = token_b_id.map(&position).transpose()?;

    match intent {
        Intent::AddLiquidity(mut add) => {
            if let (Some(a), Some(b)) = (position_a, position_b) {
                if a > b {
                    std::mem::swap(&mut add.token_a_id, &mut add.token_b_id);
                    std::mem::swap(&mut add.amount_a_raw, &mut add.amount_b_raw);
                }
            }
            Ok(Intent::AddLiquidity(add))
        }
        other => Ok(other),
    }
}

/// Discovery results replace stored candidates; otherwise the run keeps the
/// ones it already had.
fn session_candidates(
    pool: Option<&PoolResolution>,
    existing: &[PoolCandidate],
) -> Vec<PoolCandidate> {
    match pool {
        Some(resolution) if resolution.source == PoolSource::Discovered => {
            resolution.candidates.clone()
        }
        _ => existing.to_vec(),
    }
}

fn settlement_summary(outcome: &PollOutcome) -> String {
    match (outcome.latest_status, outcome.timed_out) {
        (Some(status), false) => {
            format!("; settlement {status} after {} polls", outcome.attempts)
        }
        (Some(status), true) => format!(
            "; settlement still {status} after {} polls (timed out)",
            outcome.attempts
        ),
        (None, _) => format!(
            "; settlement status unavailable after {} polls (timed out)",
            outcome.attempts
        ),
    }
}

fn respond(
    run_mode: RunMode,
    context: &RunContext,
    intent: Intent,
    confirm_token: &str,
    summary: String,
    artifacts: PhaseArtifact,
) -> WorkflowResponse {
    let approval_required = context.network.is_production();
    let intent_type = intent.intent_type();
    let text = format!(
        "{run_mode} {intent_type} on {} (run {}): {summary}",
        context.network, context.run_id
    );
    WorkflowResponse {
        content: vec![ContentItem::text(text)],
        details: WorkflowDetails {
            run_id: context.run_id.clone(),
            run_mode,
            network: context.network,
            intent_type,
            intent,
            approval_required,
            confirm_token: approval_required.then(|| confirm_token.to_string()),
            artifacts,
        },
    }
}
