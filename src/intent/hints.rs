use super::fields::{IntentFields, IntentHints};
use super::types::IntentType;
use regex::{Captures, Regex};
use std::sync::LazyLock;

static KEY_VALUE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b([a-z][a-z_]*)\s*[=:]\s*([^\s,;]+)").expect("key value regex")
});
static AMOUNT_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|\s)(\d+(?:\.\d+)?)\s+([a-z][a-z0-9._:-]*)").expect("amount regex")
});
static SWAP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:swap|trade|convert|exchange)\s+(?:(\d+(?:\.\d+)?)\s+)?([a-z][a-z0-9._:-]*)\s+(?:to|for|into)\s+([a-z][a-z0-9._:-]*)",
    )
    .expect("swap regex")
});
static PAIR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b([a-z][a-z0-9._:-]*)\s*/\s*([a-z][a-z0-9._:-]*)").expect("pair regex")
});
static DESTINATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bto\s+(@?[a-z0-9][a-z0-9._:-]*)").expect("to regex"));
static VALIDATOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:with|to|on|validator)\s+(@?[a-z0-9][a-z0-9._-]*)").expect("validator")
});
static RECIPIENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:recipient|destination)\s+(?:is\s+)?([^\s,;]+)").expect("recipient")
});
static REFUND_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\brefund(?:\s+to)?\s+([^\s,;]+)").expect("refund regex")
});
static DEPOSIT_ADDRESS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bdeposit\s+address\s+([^\s,;]+)").expect("deposit regex")
});
static POOL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bpool\s*#?\s*(\d+)\b").expect("pool regex"));
static SLIPPAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bslippage\s+(?:of\s+|at\s+)?(\d+(?:\.\d+)?)\s*(%|bps)").expect("slippage")
});
static PERCENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*%").expect("percent regex"));
static ALL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\ball\b").expect("all regex"));
static CROSS_CHAIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:cross[- ]?chain|bridge|on\s+(?:ethereum|eth|base|arbitrum|solana|bitcoin|btc|polygon|bsc))\b",
    )
    .expect("cross chain regex")
});

static REMOVE_LIQUIDITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:remove|withdraw|pull|exit)\b.*\b(?:liquidity|lp|shares?)\b")
        .expect("remove liquidity regex")
});
static ADD_LIQUIDITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:add|provide|supply|deposit)\b.*\b(?:liquidity|lp)\b")
        .expect("add liquidity regex")
});
static WITHDRAW_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bwithdraw\b").expect("withdraw regex"));
static SWAP_VERB_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:swap|trade|convert|exchange)\b").expect("swap verb regex")
});
static STAKE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:stake|delegate)\b").expect("stake regex"));
static LEND_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:lend|supply)\b").expect("lend regex"));
/// Dotted, dashed or `@`-prefixed words such as `exchange.near` or `pay-x.near`.
static ACCOUNT_LIKE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@?[A-Za-z0-9_]+(?:[.:-][A-Za-z0-9_]+)+|@[A-Za-z0-9_]+").expect("account regex")
});
static TRANSFER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:send|transfer|pay)\b").expect("transfer regex"));

const TOKEN_STOPWORDS: &[&str] = &[
    "to", "for", "into", "of", "from", "with", "and", "on", "in", "at", "bps", "percent", "pct",
    "shares", "share",
];

#[derive(Debug, Clone, PartialEq, Eq)]
struct AmountToken {
    amount: String,
    token: String,
}

#[derive(Debug, Clone, Copy, Default)]
struct VerbFlags {
    remove_liquidity: bool,
    add_liquidity: bool,
    withdraw: bool,
    swap: bool,
    stake: bool,
    lend: bool,
    transfer: bool,
}

/// Best-effort parse of free text into sparse hints. Never fails: text that
/// matches nothing yields empty hints.
pub fn extract_intent_hints(text: Option<&str>, native_asset: &str) -> IntentHints {
    let Some(text) = text.map(str::trim).filter(|value| !value.is_empty()) else {
        return IntentHints::default();
    };

    let mut fields = IntentFields::default();
    let mut working = apply_key_value_markers(text, &mut fields);
    working = apply_slippage_phrase(&working, &mut fields);

    let verbs = detect_verbs(&working);
    let pairs = amount_token_pairs(&working);
    let cross_chain = CROSS_CHAIN_RE.is_match(&working)
        || fields.recipient.is_some()
        || fields.refund_to.is_some()
        || RECIPIENT_RE.is_match(&working)
        || REFUND_RE.is_match(&working);

    apply_address_markers(&working, &mut fields);
    if fields.pool_id.is_none() {
        fields.pool_id = first_capture(&POOL_RE, &working).and_then(|raw| raw.parse().ok());
    }

    let intent_type = classify(verbs, cross_chain, &pairs, native_asset);
    if let Some(intent_type) = intent_type {
        apply_type_specific(intent_type, &working, &pairs, &mut fields);
    }

    IntentHints {
        intent_type,
        fields,
    }
}

/// Fixed priority ladder: remove-liquidity > add-liquidity > exchange-withdraw >
/// swap > stake > lend > fungible transfer > native transfer.
fn classify(
    verbs: VerbFlags,
    cross_chain: bool,
    pairs: &[AmountToken],
    native_asset: &str,
) -> Option<IntentType> {
    if verbs.remove_liquidity {
        return Some(IntentType::RemoveLiquidity);
    }
    if verbs.add_liquidity {
        return Some(IntentType::AddLiquidity);
    }
    if verbs.withdraw {
        return Some(IntentType::ExchangeWithdraw);
    }
    if verbs.swap {
        return Some(if cross_chain {
            IntentType::CrossChainSwap
        } else {
            IntentType::Swap
        });
    }
    if verbs.stake {
        return Some(IntentType::Stake);
    }
    if verbs.lend {
        return Some(IntentType::Lend);
    }
    if verbs.transfer {
        let non_native = pairs
            .first()
            .is_some_and(|pair| !pair.token.eq_ignore_ascii_case(native_asset));
        return Some(if non_native {
            IntentType::FtTransfer
        } else {
            IntentType::NativeTransfer
        });
    }
    None
}

/// Verbs are only read from plain words; account ids never count as verbs.
fn detect_verbs(text: &str) -> VerbFlags {
    let text = ACCOUNT_LIKE_RE.replace_all(text, " ");
    let text = text.as_ref();
    VerbFlags {
        remove_liquidity: REMOVE_LIQUIDITY_RE.is_match(text),
        add_liquidity: ADD_LIQUIDITY_RE.is_match(text),
        withdraw: WITHDRAW_RE.is_match(text),
        swap: SWAP_VERB_RE.is_match(text),
        stake: STAKE_RE.is_match(text),
        lend: LEND_RE.is_match(text),
        transfer: TRANSFER_RE.is_match(text),
    }
}

/// Consumes recognized `key=value` markers and returns the text without them.
fn apply_key_value_markers(text: &str, fields: &mut IntentFields) -> String {
    KEY_VALUE_RE
        .replace_all(text, |caps: &Captures<'_>| {
            let key = caps[1].to_ascii_lowercase().replace('_', "");
            let value = caps[2].trim_end_matches('.').to_string();
            if apply_marker(&key, &value, fields) {
                " ".to_string()
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

fn apply_marker(key: &str, value: &str, fields: &mut IntentFields) -> bool {
    match key {
        "slippage" | "slippagebps" => {
            if let Some(percent) = value.strip_suffix('%') {
                fields.slippage_bps = percent.parse::<f64>().ok().map(|v| v * 100.0);
            } else {
                fields.slippage_bps = value.trim_end_matches("bps").parse().ok();
            }
        }
        "pool" | "poolid" => fields.pool_id = value.trim_start_matches('#').parse().ok(),
        "shares" | "sharesraw" => fields.shares_raw = Some(value.to_string()),
        "sharebps" => fields.share_bps = value.parse().ok(),
        "share" | "sharepercent" => {
            fields.share_percent = value.trim_end_matches('%').parse().ok();
        }
        "recipient" | "destination" | "dest" => fields.recipient = Some(value.to_string()),
        "refund" | "refundto" | "refundaddress" => fields.refund_to = Some(value.to_string()),
        "deposit" | "depositaddress" => fields.deposit_address = Some(value.to_string()),
        "minout" | "minamountout" | "minamountoutraw" => {
            fields.min_amount_out_raw = Some(value.to_string());
        }
        "receiver" | "receiverid" => fields.receiver_id = Some(value.to_string()),
        "account" | "accountid" => fields.account_id = Some(value.to_string()),
        "validator" | "validatorid" => fields.validator_id = Some(value.to_string()),
        "amountraw" => fields.amount_raw = Some(value.to_string()),
        "amount" => fields.amount = Some(value.to_string()),
        "token" | "tokenid" => fields.token_id = Some(value.to_string()),
        "tokenin" | "tokeninid" => fields.token_in_id = Some(value.to_string()),
        "tokenout" | "tokenoutid" => fields.token_out_id = Some(value.to_string()),
        _ => return false,
    }
    true
}

fn apply_slippage_phrase(text: &str, fields: &mut IntentFields) -> String {
    let Some(caps) = SLIPPAGE_RE.captures(text) else {
        return text.to_string();
    };
    if fields.slippage_bps.is_none() {
        let value = caps[1].parse::<f64>().ok();
        fields.slippage_bps = match &caps[2] {
            "%" => value.map(|v| v * 100.0),
            _ => value,
        };
    }
    SLIPPAGE_RE.replace(text, " ").into_owned()
}

fn apply_address_markers(text: &str, fields: &mut IntentFields) {
    if fields.recipient.is_none() {
        fields.recipient = first_capture(&RECIPIENT_RE, text);
    }
    if fields.refund_to.is_none() {
        fields.refund_to = first_capture(&REFUND_RE, text);
    }
    if fields.deposit_address.is_none() {
        fields.deposit_address = first_capture(&DEPOSIT_ADDRESS_RE, text);
    }
}

fn apply_type_specific(
    intent_type: IntentType,
    text: &str,
    pairs: &[AmountToken],
    fields: &mut IntentFields,
) {
    let first = pairs.first();
    let second = pairs.get(1);
    match intent_type {
        IntentType::RemoveLiquidity => {
            if fields.share_percent.is_none() && fields.share_bps.is_none() {
                fields.share_percent = first_capture(&PERCENT_RE, text)
                    .and_then(|raw| raw.parse().ok())
                    .or_else(|| ALL_RE.is_match(text).then_some(100.0));
            }
            apply_token_pair(text, fields);
        }
        IntentType::AddLiquidity => {
            if let Some(pair) = first {
                fill(&mut fields.amount_a, &pair.amount);
                fill(&mut fields.token_a_id, &pair.token);
            }
            if let Some(pair) = second {
                fill(&mut fields.amount_b, &pair.amount);
                fill(&mut fields.token_b_id, &pair.token);
            }
            apply_token_pair(text, fields);
        }
        IntentType::ExchangeWithdraw | IntentType::Lend | IntentType::FtTransfer => {
            if let Some(pair) = first {
                fill(&mut fields.amount, &pair.amount);
                fill(&mut fields.token_id, &pair.token);
            }
            if intent_type == IntentType::FtTransfer && fields.receiver_id.is_none() {
                fields.receiver_id = last_capture(&DESTINATION_RE, text);
            }
        }
        IntentType::Swap | IntentType::CrossChainSwap => {
            if let Some(caps) = SWAP_RE.captures(text) {
                if let Some(amount) = caps.get(1) {
                    fill(&mut fields.amount, amount.as_str());
                }
                fill(&mut fields.token_in_id, &caps[2]);
                fill(&mut fields.token_out_id, &caps[3]);
            } else if let Some(pair) = first {
                fill(&mut fields.amount, &pair.amount);
                fill(&mut fields.token_in_id, &pair.token);
            }
        }
        IntentType::Stake => {
            if let Some(pair) = first {
                fill(&mut fields.amount, &pair.amount);
            }
            if fields.validator_id.is_none() {
                fields.validator_id = last_capture(&VALIDATOR_RE, text);
            }
        }
        IntentType::NativeTransfer => {
            if let Some(pair) = first {
                fill(&mut fields.amount, &pair.amount);
            }
            if fields.receiver_id.is_none() {
                fields.receiver_id = last_capture(&DESTINATION_RE, text);
            }
        }
    }
}

fn apply_token_pair(text: &str, fields: &mut IntentFields) {
    if fields.token_a_id.is_some() && fields.token_b_id.is_some() {
        return;
    }
    if let Some(caps) = PAIR_RE.captures(text) {
        fill(&mut fields.token_a_id, &caps[1]);
        fill(&mut fields.token_b_id, &caps[2]);
    }
}

fn amount_token_pairs(text: &str) -> Vec<AmountToken> {
    AMOUNT_TOKEN_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let token = caps[2].trim_end_matches('.').to_string();
            if TOKEN_STOPWORDS
                .iter()
                .any(|stop| token.eq_ignore_ascii_case(stop))
            {
                return None;
            }
            Some(AmountToken {
                amount: caps[1].to_string(),
                token,
            })
        })
        .collect()
}

fn fill(slot: &mut Option<String>, value: &str) {
    if slot.is_none() {
        *slot = Some(value.trim_end_matches('.').to_string());
    }
}

fn first_capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .map(|caps| caps[1].trim_end_matches('.').to_string())
}

fn last_capture(re: &Regex, text: &str) -> Option<String> {
    re.captures_iter(text)
        .last()
        .map(|caps| caps[1].trim_end_matches('.').to_string())
}
