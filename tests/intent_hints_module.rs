use chainflow::intent::{extract_intent_hints, IntentType};

#[test]
fn hints_module_reads_swap_amount_tokens_and_slippage_marker() {
    let hints = extract_intent_hints(Some("swap 0.1 SOL to USDC slippageBps=50"), "NEAR");
    assert_eq!(hints.intent_type, Some(IntentType::Swap));
    assert_eq!(hints.fields.amount.as_deref(), Some("0.1"));
    assert_eq!(hints.fields.token_in_id.as_deref(), Some("SOL"));
    assert_eq!(hints.fields.token_out_id.as_deref(), Some("USDC"));
    assert_eq!(hints.fields.slippage_bps, Some(50.0));
}

#[test]
fn hints_module_never_fails_on_empty_or_unrelated_text() {
    assert!(extract_intent_hints(None, "NEAR").is_empty());
    assert!(extract_intent_hints(Some("   "), "NEAR").is_empty());
    let hints = extract_intent_hints(Some("what a lovely afternoon"), "NEAR");
    assert_eq!(hints.intent_type, None);
}

#[test]
fn hints_module_ladder_prefers_liquidity_removal_over_withdrawal() {
    let hints = extract_intent_hints(Some("withdraw 40% of my liquidity from pool 9"), "NEAR");
    assert_eq!(hints.intent_type, Some(IntentType::RemoveLiquidity));
    assert_eq!(hints.fields.share_percent, Some(40.0));
    assert_eq!(hints.fields.pool_id, Some(9));

    let hints = extract_intent_hints(Some("withdraw 5 USDC from the exchange"), "NEAR");
    assert_eq!(hints.intent_type, Some(IntentType::ExchangeWithdraw));
    assert_eq!(hints.fields.token_id.as_deref(), Some("USDC"));
    assert_eq!(hints.fields.amount.as_deref(), Some("5"));
}

#[test]
fn hints_module_reads_both_legs_of_added_liquidity() {
    let hints = extract_intent_hints(Some("add liquidity 10 NEAR and 25 USDC"), "NEAR");
    assert_eq!(hints.intent_type, Some(IntentType::AddLiquidity));
    assert_eq!(hints.fields.amount_a.as_deref(), Some("10"));
    assert_eq!(hints.fields.token_a_id.as_deref(), Some("NEAR"));
    assert_eq!(hints.fields.amount_b.as_deref(), Some("25"));
    assert_eq!(hints.fields.token_b_id.as_deref(), Some("USDC"));
}

#[test]
fn hints_module_splits_transfers_by_native_asset() {
    let hints = extract_intent_hints(Some("send 5 NEAR to bob.near"), "NEAR");
    assert_eq!(hints.intent_type, Some(IntentType::NativeTransfer));
    assert_eq!(hints.fields.receiver_id.as_deref(), Some("bob.near"));

    let hints = extract_intent_hints(Some("send 5 USDC to bob.near"), "NEAR");
    assert_eq!(hints.intent_type, Some(IntentType::FtTransfer));
    assert_eq!(hints.fields.token_id.as_deref(), Some("USDC"));
    assert_eq!(hints.fields.receiver_id.as_deref(), Some("bob.near"));
}

#[test]
fn hints_module_detects_cross_chain_swaps_and_stakes() {
    let hints = extract_intent_hints(
        Some("swap 1 NEAR to USDC cross-chain recipient=0xabc"),
        "NEAR",
    );
    assert_eq!(hints.intent_type, Some(IntentType::CrossChainSwap));
    assert_eq!(hints.fields.recipient.as_deref(), Some("0xabc"));

    let hints = extract_intent_hints(Some("stake 10 NEAR with aurora.poolv1.near"), "NEAR");
    assert_eq!(hints.intent_type, Some(IntentType::Stake));
    assert_eq!(hints.fields.validator_id.as_deref(), Some("aurora.poolv1.near"));
    assert_eq!(hints.fields.amount.as_deref(), Some("10"));
}

#[test]
fn hints_module_reads_verb_like_account_ids_as_receivers() {
    let hints = extract_intent_hints(Some("send 5 NEAR to exchange.near"), "NEAR");
    assert_eq!(hints.intent_type, Some(IntentType::NativeTransfer));
    assert_eq!(hints.fields.amount.as_deref(), Some("5"));
    assert_eq!(hints.fields.receiver_id.as_deref(), Some("exchange.near"));

    let hints = extract_intent_hints(Some("transfer 3 USDC to withdraw.near"), "NEAR");
    assert_eq!(hints.intent_type, Some(IntentType::FtTransfer));
    assert_eq!(hints.fields.token_id.as_deref(), Some("USDC"));
    assert_eq!(hints.fields.receiver_id.as_deref(), Some("withdraw.near"));

    let hints = extract_intent_hints(Some("send 1 NEAR to pay-x.near"), "NEAR");
    assert_eq!(hints.intent_type, Some(IntentType::NativeTransfer));
    assert_eq!(hints.fields.receiver_id.as_deref(), Some("pay-x.near"));
}
