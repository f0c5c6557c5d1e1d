pub mod amount;
pub mod error;
pub mod fields;
pub mod hints;
pub mod normalize;
pub mod tokens;
pub mod types;

pub use error::IntentError;
pub use fields::{IntentFields, IntentHints};
pub use hints::extract_intent_hints;
pub use normalize::{normalize_intent, normalize_request, resolve_intent_type, NormalizeContext};
pub use tokens::{CachedTokenDirectory, TokenDirectory, TokenMetadata};
pub use types::{
    AddLiquidityIntent, CrossChainSwapIntent, ExchangeWithdrawIntent, FtTransferIntent, Intent,
    IntentType, LendIntent, NativeTransferIntent, PoolRef, RemoveLiquidityIntent, ShareAmount,
    StakeIntent, SwapIntent,
};
