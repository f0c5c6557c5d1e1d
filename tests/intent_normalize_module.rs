mod support;

use chainflow::intent::{
    normalize_request, CachedTokenDirectory, Intent, IntentError, IntentFields, IntentType,
    NormalizeContext, PoolRef, ShareAmount, TokenDirectory, TokenMetadata,
};
use chainflow::shared::{ExternalError, Network};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use support::{FakeTokens, SOL_ID, USDC_ID};

fn fields(value: serde_json::Value) -> IntentFields {
    serde_json::from_value(value).expect("intent fields")
}

fn context(tokens: &FakeTokens) -> NormalizeContext<'_> {
    NormalizeContext {
        network: Network::Testnet,
        tokens,
        native_asset: "NEAR",
        default_slippage_bps: 50,
    }
}

#[test]
fn normalize_module_is_deterministic_for_structured_input() {
    let tokens = FakeTokens::standard();
    let input = fields(json!({
        "accountId": " @alice.near ",
        "tokenInId": "SOL",
        "tokenOutId": "USDC",
        "amount": "0.25",
        "slippageBps": 30
    }));
    let first = normalize_request(Some(IntentType::Swap), None, &input, &context(&tokens))
        .expect("first");
    let second = normalize_request(Some(IntentType::Swap), None, &input, &context(&tokens))
        .expect("second");
    assert_eq!(first, second);
    let Intent::Swap(swap) = first else {
        panic!("expected swap");
    };
    assert_eq!(swap.account_id.as_deref(), Some("alice.near"));
    assert_eq!(swap.token_in_id, SOL_ID);
    assert_eq!(swap.token_out_id, USDC_ID);
    assert_eq!(swap.amount_raw, "250000000");
    assert_eq!(swap.slippage_bps, 30);
}

#[test]
fn normalize_module_scales_text_amounts_with_token_decimals() {
    let tokens = FakeTokens::standard();
    let intent = normalize_request(
        None,
        Some("swap 0.1 SOL to USDC slippageBps=50"),
        &IntentFields::default(),
        &context(&tokens),
    )
    .expect("normalize");
    let Intent::Swap(swap) = intent else {
        panic!("expected swap");
    };
    assert_eq!(swap.amount_raw, "100000000");
    assert_eq!(swap.slippage_bps, 50);
    assert_eq!(swap.min_amount_out_raw, None);
}

#[test]
fn normalize_module_structured_fields_override_hints() {
    let tokens = FakeTokens::standard();
    let intent = normalize_request(
        None,
        Some("swap 0.1 SOL to USDC slippageBps=50"),
        &fields(json!({"slippageBps": 80, "amountRaw": "42"})),
        &context(&tokens),
    )
    .expect("normalize");
    let Intent::Swap(swap) = intent else {
        panic!("expected swap");
    };
    assert_eq!(swap.slippage_bps, 80);
    assert_eq!(swap.amount_raw, "42");
    assert_eq!(swap.token_in_id, SOL_ID);
}

#[test]
fn normalize_module_rejects_raw_and_ui_amounts_together() {
    let tokens = FakeTokens::standard();
    let err = normalize_request(
        Some(IntentType::NativeTransfer),
        None,
        &fields(json!({"receiverId": "bob.near", "amountRaw": "42", "amount": "1"})),
        &context(&tokens),
    )
    .expect_err("conflict");
    assert_eq!(
        err,
        IntentError::ConflictingFields {
            first: "amountRaw".to_string(),
            second: "amount".to_string()
        }
    );
}

#[test]
fn normalize_module_rejects_field_violations_by_name() {
    let tokens = FakeTokens::standard();
    let ctx = context(&tokens);

    let err = normalize_request(
        Some(IntentType::NativeTransfer),
        None,
        &fields(json!({"receiverId": "   ", "amountRaw": "1"})),
        &ctx,
    )
    .expect_err("blank receiver");
    assert!(err.to_string().contains("receiverId"));

    let err = normalize_request(
        Some(IntentType::NativeTransfer),
        None,
        &fields(json!({"receiverId": "bob.near", "amountRaw": "1.5"})),
        &ctx,
    )
    .expect_err("raw must be integer");
    assert!(err.to_string().contains("amountRaw"));

    let err = normalize_request(
        Some(IntentType::Swap),
        None,
        &fields(json!({"tokenInId": "SOL", "tokenOutId": "USDC", "amountRaw": "1", "slippageBps": 10001})),
        &ctx,
    )
    .expect_err("slippage range");
    assert!(err.to_string().contains("slippageBps"));

    let err = normalize_request(
        Some(IntentType::NativeTransfer),
        None,
        &fields(json!({"receiverId": "bob.near", "amountRaw": "1", "poolId": 3})),
        &ctx,
    )
    .expect_err("pool id does not apply");
    assert!(matches!(err, IntentError::FieldNotApplicable { .. }));
}

#[test]
fn normalize_module_enforces_exactly_one_share_field() {
    let tokens = FakeTokens::standard();
    let ctx = context(&tokens);
    let err = normalize_request(
        Some(IntentType::RemoveLiquidity),
        None,
        &fields(json!({"poolId": 3, "sharesRaw": "100", "sharePercent": 50})),
        &ctx,
    )
    .expect_err("two share fields");
    assert!(matches!(err, IntentError::ExclusiveFields { .. }));

    let intent = normalize_request(
        Some(IntentType::RemoveLiquidity),
        None,
        &fields(json!({"poolId": 3, "sharePercent": 12.345})),
        &ctx,
    )
    .expect("percent floors to bps");
    let Intent::RemoveLiquidity(remove) = intent else {
        panic!("expected remove liquidity");
    };
    assert_eq!(remove.pool, PoolRef::Id { pool_id: 3 });
    assert_eq!(remove.shares, ShareAmount::ShareBps(1234));
}

#[test]
fn normalize_module_reports_ambiguous_and_unknown_tokens() {
    let tokens = FakeTokens::standard();
    let ctx = context(&tokens);
    let err = normalize_request(
        Some(IntentType::FtTransfer),
        None,
        &fields(json!({"tokenId": "ETH", "receiverId": "bob.near", "amount": "1"})),
        &ctx,
    )
    .expect_err("ambiguous");
    let IntentError::AmbiguousToken { candidates, .. } = err else {
        panic!("expected ambiguous token error");
    };
    assert_eq!(candidates.len(), 2);

    let intent = normalize_request(
        Some(IntentType::FtTransfer),
        None,
        &fields(json!({"tokenId": "eth.bridge.near", "receiverId": "bob.near", "amount": "1"})),
        &ctx,
    )
    .expect("exact id resolves");
    let Intent::FtTransfer(transfer) = intent else {
        panic!("expected ft transfer");
    };
    assert_eq!(transfer.amount_raw, "1000000000000000000");

    let err = normalize_request(
        Some(IntentType::Lend),
        None,
        &fields(json!({"tokenId": "DOGE", "amountRaw": "1"})),
        &ctx,
    )
    .expect_err("unknown");
    assert!(matches!(err, IntentError::UnknownToken { .. }));
}

#[test]
fn normalize_module_fails_when_type_cannot_be_inferred() {
    let tokens = FakeTokens::standard();
    let err = normalize_request(
        None,
        Some("hello"),
        &fields(json!({"amountRaw": "1"})),
        &context(&tokens),
    )
    .expect_err("no type");
    assert_eq!(err, IntentError::UnresolvedIntentType);
}

#[test]
fn normalize_module_cached_directory_fetches_each_token_once() {
    let inner = Arc::new(FakeTokens::standard());
    let cached = CachedTokenDirectory::new(inner.clone());
    let input = fields(json!({
        "tokenInId": "SOL",
        "tokenOutId": "USDC",
        "amount": "1"
    }));
    thread::scope(|scope| {
        for _ in 0..6 {
            scope.spawn(|| {
                let ctx = NormalizeContext {
                    network: Network::Testnet,
                    tokens: &cached,
                    native_asset: "NEAR",
                    default_slippage_bps: 50,
                };
                normalize_request(Some(IntentType::Swap), None, &input, &ctx).expect("normalize");
            });
        }
    });
    assert_eq!(inner.lookups(), 2);
    assert_eq!(cached.fetch_count(), 2);
}

/// Fails its first lookup, then answers from the standard directory.
struct FlakyTokens {
    inner: FakeTokens,
    calls: AtomicUsize,
}

impl TokenDirectory for FlakyTokens {
    fn lookup(
        &self,
        network: Network,
        token_ref: &str,
    ) -> Result<Vec<TokenMetadata>, ExternalError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            return Err(ExternalError::unavailable("token directory", "timeout"));
        }
        self.inner.lookup(network, token_ref)
    }
}

#[test]
fn normalize_module_cached_directory_retries_failed_lookup() {
    let inner = Arc::new(FlakyTokens {
        inner: FakeTokens::standard(),
        calls: AtomicUsize::new(0),
    });
    let cached = CachedTokenDirectory::new(inner.clone());
    let ctx = NormalizeContext {
        network: Network::Testnet,
        tokens: &cached,
        native_asset: "NEAR",
        default_slippage_bps: 50,
    };
    let input = fields(json!({
        "tokenId": "USDC",
        "receiverId": "bob.near",
        "amount": "1.5"
    }));

    let err = normalize_request(Some(IntentType::FtTransfer), None, &input, &ctx)
        .expect_err("directory down");
    assert!(matches!(err, IntentError::TokenLookup { .. }));

    let intent = normalize_request(Some(IntentType::FtTransfer), None, &input, &ctx)
        .expect("directory recovered");
    let Intent::FtTransfer(transfer) = intent else {
        panic!("expected ft transfer");
    };
    assert_eq!(transfer.token_id, USDC_ID);
    assert_eq!(transfer.amount_raw, "1500000");
    assert_eq!(inner.calls.load(Ordering::SeqCst), 2);

    normalize_request(Some(IntentType::FtTransfer), None, &input, &ctx).expect("cached");
    assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
}
