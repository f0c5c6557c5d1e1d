use super::collaborators::{ChainReader, PoolInfo};
use super::error::WorkflowError;
use super::fan_out::fan_out;
use crate::intent::{IntentType, PoolRef};
use crate::shared::{ExternalError, Network};
use serde::{Deserialize, Serialize};

/// A discovered pool, ranked by liquidity score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolCandidate {
    pub pool_id: u64,
    #[serde(default)]
    pub pool_kind: Option<String>,
    pub token_a_id: String,
    pub token_b_id: String,
    pub liquidity_score: u128,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolSource {
    Explicit,
    Discovered,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolResolution {
    pub pool: PoolInfo,
    pub source: PoolSource,
    /// Ranked candidates when the pool was discovered; empty otherwise.
    pub candidates: Vec<PoolCandidate>,
}

pub struct PoolResolver<'a> {
    chain: &'a dyn ChainReader,
    network: Network,
    workers: usize,
}

impl<'a> PoolResolver<'a> {
    pub fn new(chain: &'a dyn ChainReader, network: Network, workers: usize) -> Self {
        Self {
            chain,
            network,
            workers,
        }
    }

    pub fn resolve(&self, pool: &PoolRef) -> Result<PoolResolution, WorkflowError> {
        match pool {
            PoolRef::Id { pool_id } => Ok(PoolResolution {
                pool: self.lookup(*pool_id)?,
                source: PoolSource::Explicit,
                candidates: Vec::new(),
            }),
            PoolRef::Pair {
                token_a_id,
                token_b_id,
            } => {
                let candidates = self.discover(token_a_id, token_b_id)?;
                let Some(best) = candidates.first() else {
                    return Err(WorkflowError::NoPoolForPair {
                        token_a_id: token_a_id.clone(),
                        token_b_id: token_b_id.clone(),
                        network: self.network,
                    });
                };
                let pool = self.lookup(best.pool_id)?;
                Ok(PoolResolution {
                    pool,
                    source: PoolSource::Discovered,
                    candidates,
                })
            }
        }
    }

    pub fn lookup(&self, pool_id: u64) -> Result<PoolInfo, WorkflowError> {
        self.chain
            .pool(self.network, pool_id)
            .map_err(WorkflowError::external("pool lookup"))?
            .ok_or(WorkflowError::PoolNotFound {
                pool_id,
                network: self.network,
            })
    }

    /// Pools holding both tokens, deepest first; ties go to the lower pool id.
    /// Scores are fetched concurrently. Pools whose score cannot be read are
    /// dropped unless every score fails.
    pub fn discover(
        &self,
        token_a_id: &str,
        token_b_id: &str,
    ) -> Result<Vec<PoolCandidate>, WorkflowError> {
        let pools: Vec<PoolInfo> = self
            .chain
            .list_pools(self.network)
            .map_err(WorkflowError::external("pool listing"))?
            .into_iter()
            .filter(|pool| pool.contains_pair(token_a_id, token_b_id))
            .collect();
        if pools.is_empty() {
            return Ok(Vec::new());
        }

        let report = fan_out(&pools, self.workers, |_, pool| {
            self.chain.pool_liquidity_score(self.network, pool)
        });
        let mut candidates: Vec<PoolCandidate> = report
            .successes()
            .map(|(index, score)| {
                let pool = &pools[index];
                PoolCandidate {
                    pool_id: pool.pool_id,
                    pool_kind: pool.pool_kind.clone(),
                    token_a_id: token_a_id.to_string(),
                    token_b_id: token_b_id.to_string(),
                    liquidity_score: *score,
                }
            })
            .collect();
        if candidates.is_empty() {
            if let Some(failure) = report.failures.into_iter().next() {
                return Err(score_failure(failure.error));
            }
        }
        rank_candidates(&mut candidates);
        Ok(candidates)
    }
}

fn score_failure(source: ExternalError) -> WorkflowError {
    WorkflowError::External {
        operation: "pool liquidity scoring".to_string(),
        source,
    }
}

pub fn rank_candidates(candidates: &mut [PoolCandidate]) {
    candidates.sort_by(|left, right| {
        right
            .liquidity_score
            .cmp(&left.liquidity_score)
            .then_with(|| left.pool_id.cmp(&right.pool_id))
    });
}

/// Maps a one-based candidate index to a pool id.
pub fn select_candidate(
    intent_type: IntentType,
    run_id: &str,
    candidates: &[PoolCandidate],
    index: usize,
    explicit_pool_id: Option<u64>,
) -> Result<u64, WorkflowError> {
    if !intent_type.accepts_pool_candidates() {
        return Err(WorkflowError::CandidateSelectionNotAllowed { intent_type });
    }
    if candidates.is_empty() {
        return Err(WorkflowError::NoPoolCandidates {
            run_id: run_id.to_string(),
        });
    }
    if index == 0 || index > candidates.len() {
        return Err(WorkflowError::CandidateIndexOutOfRange {
            index,
            count: candidates.len(),
        });
    }
    let candidate_pool_id = candidates[index - 1].pool_id;
    if let Some(pool_id) = explicit_pool_id {
        if pool_id != candidate_pool_id {
            return Err(WorkflowError::CandidateConflict {
                index,
                candidate_pool_id,
                pool_id,
            });
        }
    }
    Ok(candidate_pool_id)
}
