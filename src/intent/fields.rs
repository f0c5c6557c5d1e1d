use super::types::IntentType;
use crate::shared::serde_ext::opt_string_or_number;
use serde::{Deserialize, Serialize};

/// Loosely structured intent fields as supplied by a caller, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IntentFields {
    pub account_id: Option<String>,
    pub receiver_id: Option<String>,
    pub token_id: Option<String>,
    pub token_in_id: Option<String>,
    pub token_out_id: Option<String>,
    pub token_a_id: Option<String>,
    pub token_b_id: Option<String>,
    #[serde(deserialize_with = "opt_string_or_number")]
    pub amount_raw: Option<String>,
    #[serde(deserialize_with = "opt_string_or_number")]
    pub amount: Option<String>,
    #[serde(deserialize_with = "opt_string_or_number")]
    pub amount_a_raw: Option<String>,
    #[serde(deserialize_with = "opt_string_or_number")]
    pub amount_a: Option<String>,
    #[serde(deserialize_with = "opt_string_or_number")]
    pub amount_b_raw: Option<String>,
    #[serde(deserialize_with = "opt_string_or_number")]
    pub amount_b: Option<String>,
    #[serde(deserialize_with = "opt_string_or_number")]
    pub min_amount_out_raw: Option<String>,
    pub slippage_bps: Option<f64>,
    pub pool_id: Option<u64>,
    #[serde(deserialize_with = "opt_string_or_number")]
    pub shares_raw: Option<String>,
    pub share_bps: Option<f64>,
    pub share_percent: Option<f64>,
    pub validator_id: Option<String>,
    pub recipient: Option<String>,
    pub refund_to: Option<String>,
    pub deposit_address: Option<String>,
}

macro_rules! overlay_fields {
    ($target:ident, $other:ident, [$($field:ident),* $(,)?]) => {
        $(
            if $target.$field.is_none() {
                $target.$field = $other.$field.clone();
            }
        )*
    };
}

impl IntentFields {
    /// Fills every unset field from `hints`; fields already set always win. A
    /// set member of an alternative group (raw or UI amount, share forms) also
    /// suppresses the hinted alternatives.
    pub fn overlay(mut self, hints: &IntentFields) -> IntentFields {
        let mut hints = hints.clone();
        if self.amount_raw.is_some() || self.amount.is_some() {
            hints.amount_raw = None;
            hints.amount = None;
        }
        if self.amount_a_raw.is_some() || self.amount_a.is_some() {
            hints.amount_a_raw = None;
            hints.amount_a = None;
        }
        if self.amount_b_raw.is_some() || self.amount_b.is_some() {
            hints.amount_b_raw = None;
            hints.amount_b = None;
        }
        if self.shares_raw.is_some() || self.share_bps.is_some() || self.share_percent.is_some() {
            hints.shares_raw = None;
            hints.share_bps = None;
            hints.share_percent = None;
        }
        overlay_fields!(
            self,
            hints,
            [
                account_id,
                receiver_id,
                token_id,
                token_in_id,
                token_out_id,
                token_a_id,
                token_b_id,
                amount_raw,
                amount,
                amount_a_raw,
                amount_a,
                amount_b_raw,
                amount_b,
                min_amount_out_raw,
                slippage_bps,
                pool_id,
                shares_raw,
                share_bps,
                share_percent,
                validator_id,
                recipient,
                refund_to,
                deposit_address,
            ]
        );
        self
    }

    /// Wire names of every populated field, in declaration order.
    pub fn present_field_names(&self) -> Vec<&'static str> {
        let flags: [(&'static str, bool); 23] = [
            ("accountId", self.account_id.is_some()),
            ("receiverId", self.receiver_id.is_some()),
            ("tokenId", self.token_id.is_some()),
            ("tokenInId", self.token_in_id.is_some()),
            ("tokenOutId", self.token_out_id.is_some()),
            ("tokenAId", self.token_a_id.is_some()),
            ("tokenBId", self.token_b_id.is_some()),
            ("amountRaw", self.amount_raw.is_some()),
            ("amount", self.amount.is_some()),
            ("amountARaw", self.amount_a_raw.is_some()),
            ("amountA", self.amount_a.is_some()),
            ("amountBRaw", self.amount_b_raw.is_some()),
            ("amountB", self.amount_b.is_some()),
            ("minAmountOutRaw", self.min_amount_out_raw.is_some()),
            ("slippageBps", self.slippage_bps.is_some()),
            ("poolId", self.pool_id.is_some()),
            ("sharesRaw", self.shares_raw.is_some()),
            ("shareBps", self.share_bps.is_some()),
            ("sharePercent", self.share_percent.is_some()),
            ("validatorId", self.validator_id.is_some()),
            ("recipient", self.recipient.is_some()),
            ("refundTo", self.refund_to.is_some()),
            ("depositAddress", self.deposit_address.is_some()),
        ];
        flags
            .into_iter()
            .filter_map(|(name, present)| present.then_some(name))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.present_field_names().is_empty()
    }
}

/// Wire names of the fields an intent type reads.
pub fn applicable_fields(intent_type: IntentType) -> &'static [&'static str] {
    match intent_type {
        IntentType::NativeTransfer => &["accountId", "receiverId", "amountRaw", "amount"],
        IntentType::FtTransfer => &[
            "accountId",
            "receiverId",
            "tokenId",
            "amountRaw",
            "amount",
        ],
        IntentType::Swap => &[
            "accountId",
            "tokenInId",
            "tokenOutId",
            "amountRaw",
            "amount",
            "minAmountOutRaw",
            "slippageBps",
            "poolId",
        ],
        IntentType::CrossChainSwap => &[
            "accountId",
            "tokenInId",
            "tokenOutId",
            "amountRaw",
            "amount",
            "minAmountOutRaw",
            "slippageBps",
            "recipient",
            "refundTo",
            "depositAddress",
        ],
        IntentType::AddLiquidity => &[
            "accountId",
            "poolId",
            "tokenAId",
            "tokenBId",
            "amountARaw",
            "amountA",
            "amountBRaw",
            "amountB",
        ],
        IntentType::RemoveLiquidity => &[
            "accountId",
            "poolId",
            "tokenAId",
            "tokenBId",
            "sharesRaw",
            "shareBps",
            "sharePercent",
        ],
        IntentType::ExchangeWithdraw | IntentType::Lend => {
            &["accountId", "tokenId", "amountRaw", "amount"]
        }
        IntentType::Stake => &["accountId", "validatorId", "amountRaw", "amount"],
    }
}

/// Sparse projection of intent fields recovered from free text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentHints {
    pub intent_type: Option<IntentType>,
    pub fields: IntentFields,
}

impl IntentHints {
    pub fn is_empty(&self) -> bool {
        self.intent_type.is_none() && self.fields.is_empty()
    }
}
