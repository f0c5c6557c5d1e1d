use super::amount::{is_zero, parse_raw_amount, scale_ui_amount};
use super::error::IntentError;
use super::fields::{applicable_fields, IntentFields};
use super::hints::extract_intent_hints;
use super::tokens::{TokenDirectory, TokenMetadata};
use super::types::{
    AddLiquidityIntent, CrossChainSwapIntent, ExchangeWithdrawIntent, FtTransferIntent, Intent,
    IntentType, LendIntent, NativeTransferIntent, PoolRef, RemoveLiquidityIntent, ShareAmount,
    StakeIntent, SwapIntent,
};
use crate::shared::Network;

const MAX_BPS: f64 = 10_000.0;

pub struct NormalizeContext<'a> {
    pub network: Network,
    pub tokens: &'a dyn TokenDirectory,
    pub native_asset: &'a str,
    pub default_slippage_bps: u32,
}

/// Text hints, structured fields and type inference in one pass. Structured
/// fields always override hints.
pub fn normalize_request(
    explicit_type: Option<IntentType>,
    intent_text: Option<&str>,
    fields: &IntentFields,
    ctx: &NormalizeContext<'_>,
) -> Result<Intent, IntentError> {
    let hints = extract_intent_hints(intent_text, ctx.native_asset);
    let merged = fields.clone().overlay(&hints.fields);
    let intent_type = resolve_intent_type(explicit_type, hints.intent_type, &merged)?;
    ensure_fields_applicable(intent_type, fields)?;
    normalize_intent(intent_type, &merged, ctx)
}

pub fn resolve_intent_type(
    explicit: Option<IntentType>,
    hinted: Option<IntentType>,
    fields: &IntentFields,
) -> Result<IntentType, IntentError> {
    explicit
        .or(hinted)
        .or_else(|| infer_intent_type(fields))
        .ok_or(IntentError::UnresolvedIntentType)
}

fn infer_intent_type(fields: &IntentFields) -> Option<IntentType> {
    if fields.shares_raw.is_some() || fields.share_bps.is_some() || fields.share_percent.is_some()
    {
        return Some(IntentType::RemoveLiquidity);
    }
    if fields.amount_a.is_some() || fields.amount_a_raw.is_some() {
        return Some(IntentType::AddLiquidity);
    }
    if fields.token_in_id.is_some() && fields.token_out_id.is_some() {
        let cross_chain = fields.recipient.is_some()
            || fields.refund_to.is_some()
            || fields.deposit_address.is_some();
        return Some(if cross_chain {
            IntentType::CrossChainSwap
        } else {
            IntentType::Swap
        });
    }
    if fields.validator_id.is_some() {
        return Some(IntentType::Stake);
    }
    if fields.receiver_id.is_some() {
        return Some(if fields.token_id.is_some() {
            IntentType::FtTransfer
        } else {
            IntentType::NativeTransfer
        });
    }
    None
}

/// Rejects caller-supplied fields the chosen intent type never reads.
pub fn ensure_fields_applicable(
    intent_type: IntentType,
    fields: &IntentFields,
) -> Result<(), IntentError> {
    let allowed = applicable_fields(intent_type);
    match fields
        .present_field_names()
        .into_iter()
        .find(|name| !allowed.contains(name))
    {
        Some(field) => Err(IntentError::FieldNotApplicable {
            field: field.to_string(),
            intent_type,
        }),
        None => Ok(()),
    }
}

/// All-or-nothing: returns a complete intent or the first field violation.
pub fn normalize_intent(
    intent_type: IntentType,
    fields: &IntentFields,
    ctx: &NormalizeContext<'_>,
) -> Result<Intent, IntentError> {
    let account_id = optional_account("accountId", fields.account_id.as_deref())?;
    match intent_type {
        IntentType::NativeTransfer => {
            let receiver_id = required_account("receiverId", &fields.receiver_id, intent_type)?;
            let amount_raw = resolve_amount(
                intent_type,
                ("amountRaw", fields.amount_raw.as_deref()),
                ("amount", fields.amount.as_deref()),
                || Ok(resolve_token(ctx, "amount", ctx.native_asset)?.decimals),
            )?;
            Ok(Intent::NativeTransfer(NativeTransferIntent {
                account_id,
                receiver_id,
                amount_raw,
            }))
        }
        IntentType::FtTransfer => {
            let token = required_token(ctx, "tokenId", &fields.token_id, intent_type)?;
            let receiver_id = required_account("receiverId", &fields.receiver_id, intent_type)?;
            let amount_raw = resolve_amount(
                intent_type,
                ("amountRaw", fields.amount_raw.as_deref()),
                ("amount", fields.amount.as_deref()),
                || Ok(token.decimals),
            )?;
            Ok(Intent::FtTransfer(FtTransferIntent {
                account_id,
                token_id: token.token_id,
                receiver_id,
                amount_raw,
            }))
        }
        IntentType::Swap => {
            let (token_in, token_out) = swap_tokens(ctx, fields, intent_type)?;
            let amount_raw = resolve_amount(
                intent_type,
                ("amountRaw", fields.amount_raw.as_deref()),
                ("amount", fields.amount.as_deref()),
                || Ok(token_in.decimals),
            )?;
            Ok(Intent::Swap(SwapIntent {
                account_id,
                token_in_id: token_in.token_id,
                token_out_id: token_out.token_id,
                amount_raw,
                slippage_bps: slippage_bps(fields.slippage_bps, ctx.default_slippage_bps)?,
                min_amount_out_raw: optional_raw("minAmountOutRaw", &fields.min_amount_out_raw)?,
                pool_id: fields.pool_id,
            }))
        }
        IntentType::CrossChainSwap => {
            let (origin, destination) = swap_tokens(ctx, fields, intent_type)?;
            let amount_raw = resolve_amount(
                intent_type,
                ("amountRaw", fields.amount_raw.as_deref()),
                ("amount", fields.amount.as_deref()),
                || Ok(origin.decimals),
            )?;
            let recipient = required_account("recipient", &fields.recipient, intent_type)?;
            let refund_to = match optional_account("refundTo", fields.refund_to.as_deref())? {
                Some(refund_to) => refund_to,
                None => account_id
                    .clone()
                    .ok_or_else(|| IntentError::missing("refundTo", intent_type))?,
            };
            Ok(Intent::CrossChainSwap(CrossChainSwapIntent {
                account_id,
                origin_asset: origin.token_id,
                destination_asset: destination.token_id,
                amount_raw,
                slippage_bps: slippage_bps(fields.slippage_bps, ctx.default_slippage_bps)?,
                recipient,
                refund_to,
                min_amount_out_raw: optional_raw("minAmountOutRaw", &fields.min_amount_out_raw)?,
                deposit_address: optional_trimmed("depositAddress", &fields.deposit_address)?,
            }))
        }
        IntentType::AddLiquidity => {
            let token_a = optional_token(ctx, "tokenAId", &fields.token_a_id)?;
            let token_b = optional_token(ctx, "tokenBId", &fields.token_b_id)?;
            let pool = pool_ref(fields.pool_id, token_a.as_ref(), token_b.as_ref(), intent_type)?;
            let amount_a_raw = resolve_amount(
                intent_type,
                ("amountARaw", fields.amount_a_raw.as_deref()),
                ("amountA", fields.amount_a.as_deref()),
                || decimals_for("amountA", "tokenAId", token_a.as_ref()),
            )?;
            let amount_b_raw = resolve_amount(
                intent_type,
                ("amountBRaw", fields.amount_b_raw.as_deref()),
                ("amountB", fields.amount_b.as_deref()),
                || decimals_for("amountB", "tokenBId", token_b.as_ref()),
            )?;
            Ok(Intent::AddLiquidity(AddLiquidityIntent {
                account_id,
                pool,
                token_a_id: token_a.map(|token| token.token_id),
                token_b_id: token_b.map(|token| token.token_id),
                amount_a_raw,
                amount_b_raw,
            }))
        }
        IntentType::RemoveLiquidity => {
            let token_a = optional_token(ctx, "tokenAId", &fields.token_a_id)?;
            let token_b = optional_token(ctx, "tokenBId", &fields.token_b_id)?;
            let pool = pool_ref(fields.pool_id, token_a.as_ref(), token_b.as_ref(), intent_type)?;
            Ok(Intent::RemoveLiquidity(RemoveLiquidityIntent {
                account_id,
                pool,
                token_a_id: token_a.map(|token| token.token_id),
                token_b_id: token_b.map(|token| token.token_id),
                shares: share_amount(fields)?,
            }))
        }
        IntentType::ExchangeWithdraw | IntentType::Lend => {
            let token = required_token(ctx, "tokenId", &fields.token_id, intent_type)?;
            let amount_raw = resolve_amount(
                intent_type,
                ("amountRaw", fields.amount_raw.as_deref()),
                ("amount", fields.amount.as_deref()),
                || Ok(token.decimals),
            )?;
            Ok(if intent_type == IntentType::Lend {
                Intent::Lend(LendIntent {
                    account_id,
                    token_id: token.token_id,
                    amount_raw,
                })
            } else {
                Intent::ExchangeWithdraw(ExchangeWithdrawIntent {
                    account_id,
                    token_id: token.token_id,
                    amount_raw,
                })
            })
        }
        IntentType::Stake => {
            let validator_id = required_account("validatorId", &fields.validator_id, intent_type)?;
            let amount_raw = resolve_amount(
                intent_type,
                ("amountRaw", fields.amount_raw.as_deref()),
                ("amount", fields.amount.as_deref()),
                || Ok(resolve_token(ctx, "amount", ctx.native_asset)?.decimals),
            )?;
            Ok(Intent::Stake(StakeIntent {
                account_id,
                validator_id,
                amount_raw,
            }))
        }
    }
}

pub fn normalize_account(field: &str, raw: &str) -> Result<String, IntentError> {
    let trimmed = raw.trim();
    let stripped = trimmed.strip_prefix('@').unwrap_or(trimmed).trim();
    if stripped.is_empty() {
        return Err(IntentError::invalid(field, "must be non-empty"));
    }
    if stripped.chars().any(char::is_whitespace) {
        return Err(IntentError::invalid(field, "must not contain whitespace"));
    }
    Ok(stripped.to_string())
}

fn optional_account(field: &str, raw: Option<&str>) -> Result<Option<String>, IntentError> {
    raw.map(|value| normalize_account(field, value)).transpose()
}

fn required_account(
    field: &str,
    raw: &Option<String>,
    intent_type: IntentType,
) -> Result<String, IntentError> {
    let value = raw
        .as_deref()
        .ok_or_else(|| IntentError::missing(field, intent_type))?;
    normalize_account(field, value)
}

fn optional_trimmed(field: &str, raw: &Option<String>) -> Result<Option<String>, IntentError> {
    match raw.as_deref().map(str::trim) {
        None => Ok(None),
        Some("") => Err(IntentError::invalid(field, "must be non-empty")),
        Some(value) => Ok(Some(value.to_string())),
    }
}

fn optional_raw(field: &str, raw: &Option<String>) -> Result<Option<String>, IntentError> {
    raw.as_deref()
        .map(|value| parse_raw_amount(value).map_err(|reason| IntentError::invalid(field, reason)))
        .transpose()
}

fn resolve_amount<F>(
    intent_type: IntentType,
    raw: (&str, Option<&str>),
    ui: (&str, Option<&str>),
    decimals: F,
) -> Result<String, IntentError>
where
    F: FnOnce() -> Result<u8, IntentError>,
{
    let (raw_field, raw_value) = raw;
    let (ui_field, ui_value) = ui;
    let (field, amount) = match (raw_value, ui_value) {
        (Some(_), Some(_)) => {
            return Err(IntentError::ConflictingFields {
                first: raw_field.to_string(),
                second: ui_field.to_string(),
            })
        }
        (Some(value), None) => (
            raw_field,
            parse_raw_amount(value).map_err(|reason| IntentError::invalid(raw_field, reason))?,
        ),
        (None, Some(value)) => (
            ui_field,
            scale_ui_amount(value, decimals()?)
                .map_err(|reason| IntentError::invalid(ui_field, reason))?,
        ),
        (None, None) => return Err(IntentError::missing(raw_field, intent_type)),
    };
    if is_zero(&amount) {
        return Err(IntentError::invalid(field, "must be greater than zero"));
    }
    Ok(amount)
}

fn resolve_token(
    ctx: &NormalizeContext<'_>,
    field: &str,
    token_ref: &str,
) -> Result<TokenMetadata, IntentError> {
    let token_ref = token_ref.trim();
    if token_ref.is_empty() {
        return Err(IntentError::invalid(field, "must be non-empty"));
    }
    let mut matches = ctx
        .tokens
        .lookup(ctx.network, token_ref)
        .map_err(|err| IntentError::TokenLookup {
            field: field.to_string(),
            token: token_ref.to_string(),
            reason: err.to_string(),
        })?;
    match matches.len() {
        0 => Err(IntentError::UnknownToken {
            field: field.to_string(),
            token: token_ref.to_string(),
        }),
        1 => Ok(matches.remove(0)),
        _ => {
            // An exact id match is never ambiguous.
            if let Some(position) = matches.iter().position(|m| m.token_id == token_ref) {
                return Ok(matches.remove(position));
            }
            Err(IntentError::AmbiguousToken {
                field: field.to_string(),
                symbol: token_ref.to_string(),
                candidates: matches.into_iter().map(|m| m.token_id).collect(),
            })
        }
    }
}

fn required_token(
    ctx: &NormalizeContext<'_>,
    field: &str,
    raw: &Option<String>,
    intent_type: IntentType,
) -> Result<TokenMetadata, IntentError> {
    let token_ref = raw
        .as_deref()
        .ok_or_else(|| IntentError::missing(field, intent_type))?;
    resolve_token(ctx, field, token_ref)
}

fn optional_token(
    ctx: &NormalizeContext<'_>,
    field: &str,
    raw: &Option<String>,
) -> Result<Option<TokenMetadata>, IntentError> {
    raw.as_deref()
        .map(|token_ref| resolve_token(ctx, field, token_ref))
        .transpose()
}

fn swap_tokens(
    ctx: &NormalizeContext<'_>,
    fields: &IntentFields,
    intent_type: IntentType,
) -> Result<(TokenMetadata, TokenMetadata), IntentError> {
    let token_in = required_token(ctx, "tokenInId", &fields.token_in_id, intent_type)?;
    let token_out = required_token(ctx, "tokenOutId", &fields.token_out_id, intent_type)?;
    if token_in.token_id == token_out.token_id {
        return Err(IntentError::invalid("tokenOutId", "must differ from tokenInId"));
    }
    Ok((token_in, token_out))
}

fn decimals_for(
    amount_field: &str,
    token_field: &str,
    token: Option<&TokenMetadata>,
) -> Result<u8, IntentError> {
    token.map(|token| token.decimals).ok_or_else(|| {
        IntentError::invalid(
            amount_field,
            format!("requires `{token_field}` to resolve decimals; supply `{amount_field}Raw` instead"),
        )
    })
}

fn pool_ref(
    pool_id: Option<u64>,
    token_a: Option<&TokenMetadata>,
    token_b: Option<&TokenMetadata>,
    intent_type: IntentType,
) -> Result<PoolRef, IntentError> {
    if let (Some(a), Some(b)) = (token_a, token_b) {
        if a.token_id == b.token_id {
            return Err(IntentError::invalid("tokenBId", "must differ from tokenAId"));
        }
    }
    if let Some(pool_id) = pool_id {
        return Ok(PoolRef::Id { pool_id });
    }
    match (token_a, token_b) {
        (Some(a), Some(b)) => Ok(PoolRef::Pair {
            token_a_id: a.token_id.clone(),
            token_b_id: b.token_id.clone(),
        }),
        (None, _) => Err(IntentError::missing("poolId or tokenAId", intent_type)),
        (Some(_), None) => Err(IntentError::missing("tokenBId", intent_type)),
    }
}

fn slippage_bps(value: Option<f64>, default_bps: u32) -> Result<u32, IntentError> {
    match value {
        None => Ok(default_bps),
        Some(value) => bps_in_range("slippageBps", value, 0.0),
    }
}

fn bps_in_range(field: &str, value: f64, min: f64) -> Result<u32, IntentError> {
    if !value.is_finite() || value < min || value > MAX_BPS {
        return Err(IntentError::invalid(
            field,
            format!("must be between {min} and {MAX_BPS}, got {value}"),
        ));
    }
    Ok(floor_bps(value))
}

fn share_amount(fields: &IntentFields) -> Result<ShareAmount, IntentError> {
    let exclusive = || IntentError::ExclusiveFields {
        fields: vec![
            "sharesRaw".to_string(),
            "shareBps".to_string(),
            "sharePercent".to_string(),
        ],
    };
    match (
        fields.shares_raw.as_deref(),
        fields.share_bps,
        fields.share_percent,
    ) {
        (Some(raw), None, None) => {
            let shares = parse_raw_amount(raw)
                .map_err(|reason| IntentError::invalid("sharesRaw", reason))?;
            if is_zero(&shares) {
                return Err(IntentError::invalid("sharesRaw", "must be greater than zero"));
            }
            Ok(ShareAmount::SharesRaw(shares))
        }
        (None, Some(bps), None) => {
            let bps = bps_in_range("shareBps", bps, 1.0)?;
            Ok(ShareAmount::ShareBps(bps))
        }
        (None, None, Some(percent)) => {
            if !percent.is_finite() || percent <= 0.0 || percent > 100.0 {
                return Err(IntentError::invalid(
                    "sharePercent",
                    format!("must be greater than 0 and at most 100, got {percent}"),
                ));
            }
            let bps = floor_bps(percent * 100.0);
            if bps == 0 {
                return Err(IntentError::invalid(
                    "sharePercent",
                    "must be at least 0.01 percent",
                ));
            }
            Ok(ShareAmount::ShareBps(bps))
        }
        _ => Err(exclusive()),
    }
}

/// Floors to whole basis points, absorbing binary float noise such as
/// `0.29 * 100.0 == 28.999999999999996`.
fn floor_bps(value: f64) -> u32 {
    (value + 1e-9).floor() as u32
}
