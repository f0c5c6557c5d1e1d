use super::collaborators::{
    CrossChainApi, CrossChainQuote, CrossChainQuoteRequest, SettlementStatus, StatusResponse,
};
use crate::shared::ExternalError;
use serde::{Deserialize, Serialize};

const QUOTE_DEADLINE_MINUTES: i64 = 10;

/// HTTP client for the cross-chain quote/status service.
#[derive(Debug, Clone)]
pub struct HttpCrossChainApi {
    api_base: String,
    bearer_token: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QuoteBody<'a> {
    dry: bool,
    swap_type: &'static str,
    slippage_tolerance: u32,
    origin_asset: &'a str,
    deposit_type: &'static str,
    destination_asset: &'a str,
    amount: &'a str,
    refund_to: &'a str,
    refund_type: &'static str,
    recipient: &'a str,
    recipient_type: &'static str,
    deadline: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteEnvelope {
    #[serde(default)]
    correlation_id: Option<String>,
    quote: QuoteDetails,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteDetails {
    #[serde(default)]
    deposit_address: Option<String>,
    amount_out: String,
    min_amount_out: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusEnvelope {
    status: SettlementStatus,
    #[serde(default)]
    correlation_id: Option<String>,
    #[serde(default)]
    updated_at: Option<String>,
}

impl HttpCrossChainApi {
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
            bearer_token: None,
        }
    }

    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.bearer_token = (!token.trim().is_empty()).then_some(token);
        self
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base.trim_end_matches('/'), path)
    }

    fn authorize(&self, request: ureq::Request) -> ureq::Request {
        match &self.bearer_token {
            Some(token) => request.set("Authorization", &format!("Bearer {token}")),
            None => request,
        }
    }

    fn decode<T: for<'de> Deserialize<'de>>(
        endpoint: &str,
        response: ureq::Response,
    ) -> Result<T, ExternalError> {
        response
            .into_json::<T>()
            .map_err(|e| ExternalError::Decode {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            })
    }
}

fn request_error(endpoint: &str, err: ureq::Error) -> ExternalError {
    match err {
        ureq::Error::Status(status, response) => ExternalError::Status {
            endpoint: endpoint.to_string(),
            status,
            body: response.into_string().unwrap_or_default(),
        },
        ureq::Error::Transport(transport) => ExternalError::Request {
            endpoint: endpoint.to_string(),
            reason: transport.to_string(),
        },
    }
}

impl CrossChainApi for HttpCrossChainApi {
    fn quote(&self, request: &CrossChainQuoteRequest) -> Result<CrossChainQuote, ExternalError> {
        let url = self.endpoint("quote");
        let deadline = chrono::Utc::now() + chrono::Duration::minutes(QUOTE_DEADLINE_MINUTES);
        let body = QuoteBody {
            dry: request.dry,
            swap_type: "EXACT_INPUT",
            slippage_tolerance: request.slippage_bps,
            origin_asset: &request.origin_asset,
            deposit_type: "ORIGIN_CHAIN",
            destination_asset: &request.destination_asset,
            amount: &request.amount_raw,
            refund_to: &request.refund_to,
            refund_type: "ORIGIN_CHAIN",
            recipient: &request.recipient,
            recipient_type: "DESTINATION_CHAIN",
            deadline: deadline.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        };
        let payload = serde_json::to_value(&body).map_err(|e| ExternalError::Request {
            endpoint: url.clone(),
            reason: e.to_string(),
        })?;
        let response = self
            .authorize(ureq::post(&url))
            .send_json(payload)
            .map_err(|e| request_error(&url, e))?;
        let envelope: QuoteEnvelope = Self::decode(&url, response)?;
        Ok(CrossChainQuote {
            deposit_address: envelope.quote.deposit_address,
            correlation_id: envelope.correlation_id,
            amount_out_raw: envelope.quote.amount_out,
            min_amount_out_raw: envelope.quote.min_amount_out,
        })
    }

    fn status(&self, deposit_address: &str) -> Result<StatusResponse, ExternalError> {
        let endpoint = self.endpoint("status");
        let url = format!(
            "{endpoint}?depositAddress={}",
            urlencoding::encode(deposit_address)
        );
        let response = self
            .authorize(ureq::get(&url))
            .call()
            .map_err(|e| request_error(&endpoint, e))?;
        let envelope: StatusEnvelope = Self::decode(&endpoint, response)?;
        Ok(StatusResponse {
            status: envelope.status,
            correlation_id: envelope.correlation_id,
            updated_at: envelope.updated_at,
        })
    }
}
