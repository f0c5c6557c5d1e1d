use super::types::IntentType;

/// Validation failures raised before any phase touches a collaborator. Every
/// variant names the offending field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntentError {
    #[error("`{field}` {reason}")]
    InvalidField { field: String, reason: String },
    #[error("`{field}` is required for {intent_type}")]
    MissingField {
        field: String,
        intent_type: IntentType,
    },
    #[error("`{first}` and `{second}` cannot both be provided")]
    ConflictingFields { first: String, second: String },
    #[error("exactly one of {} must be provided", .fields.join(", "))]
    ExclusiveFields { fields: Vec<String> },
    #[error("`{field}` does not apply to {intent_type}")]
    FieldNotApplicable {
        field: String,
        intent_type: IntentType,
    },
    #[error("`{field}`: unknown token `{token}`")]
    UnknownToken { field: String, token: String },
    #[error("`{field}`: token symbol `{symbol}` is ambiguous; candidates: {}", .candidates.join(", "))]
    AmbiguousToken {
        field: String,
        symbol: String,
        candidates: Vec<String>,
    },
    #[error("`{field}`: token lookup for `{token}` failed: {reason}")]
    TokenLookup {
        field: String,
        token: String,
        reason: String,
    },
    #[error("intent type could not be determined; provide `intentType` or a clearer `intentText`")]
    UnresolvedIntentType,
}

impl IntentError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn missing(field: impl Into<String>, intent_type: IntentType) -> Self {
        Self::MissingField {
            field: field.into(),
            intent_type,
        }
    }
}
