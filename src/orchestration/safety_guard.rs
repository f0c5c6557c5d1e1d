use super::error::WorkflowError;
use crate::config::HARD_MAX_SLIPPAGE_BPS;
use crate::intent::amount::{compare_raw, parse_raw_amount};
use crate::intent::Intent;
use std::cmp::Ordering;

/// The slippage ceiling in force: never above the hard limit, even when
/// configuration asks for more.
pub fn slippage_limit(configured_max_bps: u32) -> u32 {
    configured_max_bps.min(HARD_MAX_SLIPPAGE_BPS)
}

pub fn enforce_slippage_limit(
    requested_bps: u32,
    configured_max_bps: u32,
) -> Result<(), WorkflowError> {
    let limit = slippage_limit(configured_max_bps);
    if requested_bps > limit {
        return Err(WorkflowError::SlippageAboveLimit {
            requested: requested_bps,
            limit,
        });
    }
    Ok(())
}

/// Applies the slippage ceiling to intents that carry slippage.
pub fn enforce_intent_slippage(intent: &Intent, configured_max_bps: u32) -> Result<(), WorkflowError> {
    match intent {
        Intent::Swap(swap) => enforce_slippage_limit(swap.slippage_bps, configured_max_bps),
        Intent::CrossChainSwap(swap) => {
            enforce_slippage_limit(swap.slippage_bps, configured_max_bps)
        }
        _ => Ok(()),
    }
}

/// Resolves the minimum output to submit. The quote must satisfy
/// `floor <= amount_out`. A caller value below the floor is rejected, never
/// clamped; a missing value defaults to the floor.
pub fn safe_min_amount_out(
    quoted_amount_out: &str,
    quoted_floor: &str,
    requested: Option<&str>,
) -> Result<String, WorkflowError> {
    let amount_out = parse_raw_amount(quoted_amount_out).map_err(|reason| {
        WorkflowError::MalformedQuote {
            reason: format!("amount out {reason}"),
        }
    })?;
    let floor = parse_raw_amount(quoted_floor).map_err(|reason| WorkflowError::MalformedQuote {
        reason: format!("minimum amount out {reason}"),
    })?;
    if compare_raw(&floor, &amount_out) == Ordering::Greater {
        return Err(WorkflowError::MalformedQuote {
            reason: format!("minimum amount out {floor} exceeds amount out {amount_out}"),
        });
    }

    match requested {
        None => Ok(floor),
        Some(requested) => {
            if compare_raw(requested, &floor) == Ordering::Less {
                return Err(WorkflowError::BelowQuotedFloor {
                    requested: requested.to_string(),
                    floor,
                });
            }
            Ok(requested.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn below_floor_is_rejected_naming_the_floor() {
        let err = safe_min_amount_out("1000", "990", Some("950")).expect_err("below floor");
        assert!(matches!(err, WorkflowError::BelowQuotedFloor { .. }));
        assert!(err.to_string().contains("990"));
    }

    #[test]
    fn missing_min_defaults_to_floor_and_higher_min_is_kept() {
        assert_eq!(
            safe_min_amount_out("1000", "990", None).expect("floor"),
            "990"
        );
        assert_eq!(
            safe_min_amount_out("1000", "990", Some("995")).expect("kept"),
            "995"
        );
    }

    #[test]
    fn inverted_quote_is_malformed() {
        let err = safe_min_amount_out("900", "990", None).expect_err("malformed");
        assert!(matches!(err, WorkflowError::MalformedQuote { .. }));
        let err = safe_min_amount_out("abc", "1", None).expect_err("malformed");
        assert!(matches!(err, WorkflowError::MalformedQuote { .. }));
    }

    #[test]
    fn slippage_limit_caps_configuration() {
        assert_eq!(slippage_limit(9_000), HARD_MAX_SLIPPAGE_BPS);
        assert_eq!(slippage_limit(1_000), 1_000);
        let err = enforce_slippage_limit(1_500, 1_000).expect_err("over limit");
        assert!(err.to_string().contains("1000"));
        enforce_slippage_limit(1_000, 1_000).expect("at limit");
    }
}
