use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentType {
    NativeTransfer,
    FtTransfer,
    Swap,
    CrossChainSwap,
    AddLiquidity,
    RemoveLiquidity,
    ExchangeWithdraw,
    Lend,
    Stake,
}

impl IntentType {
    pub const ALL: [IntentType; 9] = [
        IntentType::NativeTransfer,
        IntentType::FtTransfer,
        IntentType::Swap,
        IntentType::CrossChainSwap,
        IntentType::AddLiquidity,
        IntentType::RemoveLiquidity,
        IntentType::ExchangeWithdraw,
        IntentType::Lend,
        IntentType::Stake,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::NativeTransfer => "native_transfer",
            Self::FtTransfer => "ft_transfer",
            Self::Swap => "swap",
            Self::CrossChainSwap => "cross_chain_swap",
            Self::AddLiquidity => "add_liquidity",
            Self::RemoveLiquidity => "remove_liquidity",
            Self::ExchangeWithdraw => "exchange_withdraw",
            Self::Lend => "lend",
            Self::Stake => "stake",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, String> {
        let normalized = raw.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|candidate| candidate.as_str() == normalized)
            .ok_or_else(|| {
                format!(
                    "intent type must be one of: {}",
                    Self::ALL.map(|value| value.as_str()).join(", ")
                )
            })
    }

    /// Only liquidity intents accept a follow-up pool candidate index.
    pub fn accepts_pool_candidates(self) -> bool {
        matches!(self, Self::AddLiquidity | Self::RemoveLiquidity)
    }

    pub fn is_cross_chain(self) -> bool {
        matches!(self, Self::CrossChainSwap)
    }
}

impl std::fmt::Display for IntentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a liquidity intent names its pool. Discovery refines `Pair` into `Id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum PoolRef {
    Id { pool_id: u64 },
    Pair { token_a_id: String, token_b_id: String },
}

impl PoolRef {
    pub fn pool_id(&self) -> Option<u64> {
        match self {
            Self::Id { pool_id } => Some(*pool_id),
            Self::Pair { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ShareAmount {
    SharesRaw(String),
    ShareBps(u32),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeTransferIntent {
    pub account_id: Option<String>,
    pub receiver_id: String,
    pub amount_raw: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FtTransferIntent {
    pub account_id: Option<String>,
    pub token_id: String,
    pub receiver_id: String,
    pub amount_raw: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapIntent {
    pub account_id: Option<String>,
    pub token_in_id: String,
    pub token_out_id: String,
    pub amount_raw: String,
    pub slippage_bps: u32,
    pub min_amount_out_raw: Option<String>,
    pub pool_id: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossChainSwapIntent {
    pub account_id: Option<String>,
    pub origin_asset: String,
    pub destination_asset: String,
    pub amount_raw: String,
    pub slippage_bps: u32,
    pub recipient: String,
    pub refund_to: String,
    pub min_amount_out_raw: Option<String>,
    pub deposit_address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddLiquidityIntent {
    pub account_id: Option<String>,
    pub pool: PoolRef,
    /// Token `amount_a_raw` is denominated in, when the caller named it.
    #[serde(default)]
    pub token_a_id: Option<String>,
    #[serde(default)]
    pub token_b_id: Option<String>,
    pub amount_a_raw: String,
    pub amount_b_raw: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveLiquidityIntent {
    pub account_id: Option<String>,
    pub pool: PoolRef,
    #[serde(default)]
    pub token_a_id: Option<String>,
    #[serde(default)]
    pub token_b_id: Option<String>,
    pub shares: ShareAmount,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeWithdrawIntent {
    pub account_id: Option<String>,
    pub token_id: String,
    pub amount_raw: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LendIntent {
    pub account_id: Option<String>,
    pub token_id: String,
    pub amount_raw: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StakeIntent {
    pub account_id: Option<String>,
    pub validator_id: String,
    pub amount_raw: String,
}

/// A fully resolved operation. Produced only by the normalizer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Intent {
    NativeTransfer(NativeTransferIntent),
    FtTransfer(FtTransferIntent),
    Swap(SwapIntent),
    CrossChainSwap(CrossChainSwapIntent),
    AddLiquidity(AddLiquidityIntent),
    RemoveLiquidity(RemoveLiquidityIntent),
    ExchangeWithdraw(ExchangeWithdrawIntent),
    Lend(LendIntent),
    Stake(StakeIntent),
}

impl Intent {
    pub fn intent_type(&self) -> IntentType {
        match self {
            Self::NativeTransfer(_) => IntentType::NativeTransfer,
            Self::FtTransfer(_) => IntentType::FtTransfer,
            Self::Swap(_) => IntentType::Swap,
            Self::CrossChainSwap(_) => IntentType::CrossChainSwap,
            Self::AddLiquidity(_) => IntentType::AddLiquidity,
            Self::RemoveLiquidity(_) => IntentType::RemoveLiquidity,
            Self::ExchangeWithdraw(_) => IntentType::ExchangeWithdraw,
            Self::Lend(_) => IntentType::Lend,
            Self::Stake(_) => IntentType::Stake,
        }
    }

    pub fn account_id(&self) -> Option<&str> {
        match self {
            Self::NativeTransfer(v) => v.account_id.as_deref(),
            Self::FtTransfer(v) => v.account_id.as_deref(),
            Self::Swap(v) => v.account_id.as_deref(),
            Self::CrossChainSwap(v) => v.account_id.as_deref(),
            Self::AddLiquidity(v) => v.account_id.as_deref(),
            Self::RemoveLiquidity(v) => v.account_id.as_deref(),
            Self::ExchangeWithdraw(v) => v.account_id.as_deref(),
            Self::Lend(v) => v.account_id.as_deref(),
            Self::Stake(v) => v.account_id.as_deref(),
        }
    }

    pub fn pool_ref(&self) -> Option<&PoolRef> {
        match self {
            Self::AddLiquidity(v) => Some(&v.pool),
            Self::RemoveLiquidity(v) => Some(&v.pool),
            _ => None,
        }
    }

    /// Resolved pool id for swap and liquidity intents.
    pub fn pool_id(&self) -> Option<u64> {
        match self {
            Self::Swap(v) => v.pool_id,
            _ => self.pool_ref().and_then(PoolRef::pool_id),
        }
    }

    /// Returns a copy pinned to `pool_id`; other variants are returned unchanged.
    pub fn with_pool_id(&self, pool_id: u64) -> Intent {
        let mut next = self.clone();
        match &mut next {
            Self::Swap(v) => v.pool_id = Some(pool_id),
            Self::AddLiquidity(v) => v.pool = PoolRef::Id { pool_id },
            Self::RemoveLiquidity(v) => v.pool = PoolRef::Id { pool_id },
            _ => {}
        }
        next
    }
}
