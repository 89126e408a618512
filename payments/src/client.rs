//! HTTP client for the payments REST API.
//!
//! Two endpoints are used:
//! - `POST {api_base}/checkout/create/` starts a card or mobile-money payment
//! - `GET {api_base}/{reference}/status/` reports its current status
//!
//! Both are authenticated with a bearer token when one is configured.

use crate::config::PaymentsConfig;
use crate::error::{PaymentError, Result};
use crate::poller::StatusSource;
use crate::status::{PaymentStatus, StatusResponse};
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use trails_core::money::{Money, CURRENCY};

/// Mobile-money networks, by provider code
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MomoProvider {
    /// MTN Mobile Money
    #[serde(rename = "mtn")]
    Mtn,
    /// Telecel Cash (formerly Vodafone Cash)
    #[serde(rename = "vod")]
    Telecel,
    /// AirtelTigo Money
    #[serde(rename = "atl")]
    AirtelTigo,
}

impl MomoProvider {
    /// Provider code expected by the payment gateway
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Mtn => "mtn",
            Self::Telecel => "vod",
            Self::AirtelTigo => "atl",
        }
    }
}

/// How the traveller pays
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PaymentMethod {
    /// Card payment via hosted checkout
    Card,
    /// Mobile-money prompt sent to a phone
    MobileMoney {
        /// Network operator
        provider: MomoProvider,
        /// Normalized `233XXXXXXXXX` number
        phone_number: String,
    },
}

/// A validated checkout request
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckoutRequest {
    amount: Money,
    method: PaymentMethod,
    description: String,
}

impl CheckoutRequest {
    /// Card checkout for `amount`
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError::InvalidArgument`] if `amount` is zero.
    pub fn card(amount: Money, description: impl Into<String>) -> Result<Self> {
        Self::new(amount, PaymentMethod::Card, description.into())
    }

    /// Mobile-money checkout for `amount`
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError::InvalidArgument`] if `amount` is zero or
    /// `phone_number` is not a Ghanaian mobile number.
    pub fn mobile_money(
        amount: Money,
        provider: MomoProvider,
        phone_number: &str,
        description: impl Into<String>,
    ) -> Result<Self> {
        let phone_number = normalize_phone_number(phone_number)?;
        Self::new(
            amount,
            PaymentMethod::MobileMoney {
                provider,
                phone_number,
            },
            description.into(),
        )
    }

    fn new(amount: Money, method: PaymentMethod, description: String) -> Result<Self> {
        if amount.is_zero() {
            return Err(PaymentError::InvalidArgument(
                "checkout amount must be greater than zero".to_string(),
            ));
        }
        Ok(Self {
            amount,
            method,
            description,
        })
    }

    /// Amount to charge
    #[must_use]
    pub const fn amount(&self) -> Money {
        self.amount
    }

    /// Payment method
    #[must_use]
    pub const fn method(&self) -> &PaymentMethod {
        &self.method
    }

    fn body(&self) -> CheckoutBody<'_> {
        let (payment_method, provider_code, phone_number) = match &self.method {
            PaymentMethod::Card => ("card", None, None),
            PaymentMethod::MobileMoney {
                provider,
                phone_number,
            } => ("mobile_money", Some(provider.code()), Some(phone_number.as_str())),
        };
        CheckoutBody {
            amount: self.amount,
            currency: CURRENCY,
            payment_method,
            provider_code,
            phone_number,
            description: &self.description,
        }
    }
}

#[derive(Serialize)]
struct CheckoutBody<'a> {
    amount: Money,
    currency: &'static str,
    payment_method: &'static str,
    provider_code: Option<&'static str>,
    phone_number: Option<&'a str>,
    description: &'a str,
}

/// Payment created by the backend
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct PaymentSummary {
    /// Reference used for status polling
    pub reference: String,
    /// Status at creation time
    #[serde(default)]
    pub status: Option<PaymentStatus>,
    /// Charged amount as recorded by the backend
    #[serde(default)]
    pub amount: Option<Money>,
    /// Hosted checkout page for card payments
    #[serde(default)]
    pub authorization_url: Option<String>,
}

#[derive(Deserialize)]
struct CheckoutResponse {
    success: bool,
    #[serde(default)]
    payment: Option<PaymentSummary>,
    #[serde(default)]
    error: Option<String>,
}

/// Normalize a Ghanaian mobile number to `233XXXXXXXXX`.
///
/// Accepts local (`024 123 4567`), international (`+233 24 123 4567`) and
/// bare nine-digit forms; spaces and dashes are ignored.
///
/// # Errors
///
/// Returns [`PaymentError::InvalidArgument`] for anything else.
pub fn normalize_phone_number(raw: &str) -> Result<String> {
    let digits: String = raw
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
        .collect();
    let digits = digits.strip_prefix('+').unwrap_or(&digits);

    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid_phone(raw));
    }

    let subscriber = match digits.len() {
        12 if digits.starts_with("233") => &digits[3..],
        10 if digits.starts_with('0') => &digits[1..],
        9 => digits,
        _ => return Err(invalid_phone(raw)),
    };
    if subscriber.starts_with('0') {
        return Err(invalid_phone(raw));
    }
    Ok(format!("233{subscriber}"))
}

fn invalid_phone(raw: &str) -> PaymentError {
    PaymentError::InvalidArgument(format!("'{raw}' is not a valid Ghanaian mobile number"))
}

/// Client for the payments REST API
#[derive(Debug, Clone)]
pub struct CheckoutClient {
    http: reqwest::Client,
    api_base: String,
    api_token: Option<String>,
}

impl CheckoutClient {
    /// Build a client from configuration
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError::Network`] if the HTTP client cannot be built.
    pub fn new(config: &PaymentsConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout())
            .build()?;
        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
        })
    }

    /// Base URL requests are sent to
    #[must_use]
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Start a payment.
    ///
    /// # Errors
    ///
    /// - [`PaymentError::Rejected`] if the backend answers `success: false`
    /// - [`PaymentError::Network`] on transport failure or an error status without a body
    /// - [`PaymentError::Decode`] if a successful response has no payment
    pub async fn create_checkout(&self, request: &CheckoutRequest) -> Result<PaymentSummary> {
        let url = format!("{}/checkout/create/", self.api_base);
        let response = self
            .authorize(self.http.post(&url))
            .json(&request.body())
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;
        let Ok(body) = serde_json::from_slice::<CheckoutResponse>(&bytes) else {
            return Err(if status.is_success() {
                PaymentError::Decode(format!("unexpected checkout response from {url}"))
            } else {
                PaymentError::Network(format!("checkout failed with HTTP {status}"))
            });
        };

        if !body.success {
            let reason = body
                .error
                .unwrap_or_else(|| "payment could not be created".to_string());
            tracing::warn!(http_status = status.as_u16(), reason = %reason, "Checkout rejected");
            return Err(PaymentError::Rejected(reason));
        }

        let payment = body
            .payment
            .ok_or_else(|| PaymentError::Decode("checkout response has no payment".to_string()))?;
        tracing::info!(
            reference = %payment.reference,
            amount = %request.amount,
            "Checkout created"
        );
        Ok(payment)
    }

    /// Fetch the current status of a payment.
    ///
    /// # Errors
    ///
    /// - [`PaymentError::InvalidArgument`] if `reference` is not URL-safe
    /// - [`PaymentError::Network`] on transport failure or a non-2xx status
    /// - [`PaymentError::Decode`] if the body is not a status document
    pub async fn payment_status(&self, reference: &str) -> Result<PaymentStatus> {
        if reference.is_empty()
            || !reference
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        {
            return Err(PaymentError::InvalidArgument(format!(
                "'{reference}' is not a valid payment reference"
            )));
        }

        let url = format!("{}/{reference}/status/", self.api_base);
        let response = self.authorize(self.http.get(&url)).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(PaymentError::Network(format!(
                "status check for {reference} failed with HTTP {status}"
            )));
        }
        let body: StatusResponse = response.json().await?;
        Ok(body.status)
    }
}

impl StatusSource for CheckoutClient {
    fn fetch_status<'a>(&'a self, reference: &'a str) -> BoxFuture<'a, Result<PaymentStatus>> {
        Box::pin(self.payment_status(reference))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tokio_test::assert_err;

    #[test]
    fn test_phone_normalization() {
        assert_eq!(normalize_phone_number("024 123 4567").unwrap(), "233241234567");
        assert_eq!(normalize_phone_number("+233-24-123-4567").unwrap(), "233241234567");
        assert_eq!(normalize_phone_number("241234567").unwrap(), "233241234567");
        assert_eq!(normalize_phone_number("233201234567").unwrap(), "233201234567");
    }

    #[test]
    fn test_phone_normalization_rejects_bad_numbers() {
        assert_err!(normalize_phone_number("12345"));
        assert_err!(normalize_phone_number("0241234abc"));
        assert_err!(normalize_phone_number("0024123456"));
        assert_err!(normalize_phone_number("+44 7700 900123"));
    }

    #[test]
    fn test_zero_amount_is_rejected() {
        assert!(matches!(
            CheckoutRequest::card(Money::ZERO, "Kakum canopy walk"),
            Err(PaymentError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_mobile_money_body_shape() {
        let request = CheckoutRequest::mobile_money(
            Money::from_pesewas(40_000),
            MomoProvider::Mtn,
            "0241234567",
            "Mole safari for 4",
        )
        .unwrap();

        let body = serde_json::to_value(request.body()).unwrap();
        assert_eq!(body["amount"], "400.00");
        assert_eq!(body["currency"], "GHS");
        assert_eq!(body["payment_method"], "mobile_money");
        assert_eq!(body["provider_code"], "mtn");
        assert_eq!(body["phone_number"], "233241234567");
        assert_eq!(body["description"], "Mole safari for 4");
    }

    #[test]
    fn test_card_body_has_no_provider() {
        let request = CheckoutRequest::card(Money::from_pesewas(12_000), "Wli hike").unwrap();
        let body = serde_json::to_value(request.body()).unwrap();
        assert_eq!(body["payment_method"], "card");
        assert!(body["provider_code"].is_null());
        assert!(body["phone_number"].is_null());
    }
}
