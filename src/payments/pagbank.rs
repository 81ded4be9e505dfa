//! PagBank integration: hosted checkout for PIX and card.
//!
//! Checkout creation returns a set of `links`; the participant is
//! redirected to the one with `rel == "PAY"`. A missing PAY link means the
//! provider contract changed, so the full response is logged before
//! erroring. Webhooks normally arrive as JSON with the charge embedded;
//! the legacy channel sends a form-encoded `notificationCode` that needs a
//! secondary authenticated GET.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::{Inscricao, MetodoPagamento};

const PAGBANK_API_BASE: &str = "https://api.pagseguro.com";

const HTTP_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Serialize)]
struct CheckoutItem {
    name: String,
    quantity: i64,
    /// Centavos, as the API expects
    unit_amount: i64,
}

#[derive(Debug, Serialize)]
struct CheckoutCustomer {
    name: String,
    email: String,
    tax_id: String,
}

#[derive(Debug, Serialize)]
struct CheckoutPaymentMethod {
    #[serde(rename = "type")]
    method_type: &'static str,
}

#[derive(Debug, Serialize)]
struct CreateCheckoutRequest {
    /// Our registration id - echoed back on notifications
    reference_id: String,
    items: Vec<CheckoutItem>,
    customer: CheckoutCustomer,
    payment_methods: Vec<CheckoutPaymentMethod>,
    redirect_url: String,
    notification_urls: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct PagBankLink {
    pub rel: String,
    pub href: String,
}

#[derive(Debug, Deserialize)]
struct CreateCheckoutResponse {
    id: String,
    links: Vec<PagBankLink>,
}

/// Pick the participant-facing payment URL out of a checkout's links.
pub fn extrair_link_pay(links: &[PagBankLink]) -> Option<&str> {
    links
        .iter()
        .find(|l| l.rel == "PAY")
        .map(|l| l.href.as_str())
}

/// Charge embedded in a notification.
#[derive(Debug, Deserialize)]
pub struct PagBankCharge {
    pub id: String,
    pub status: String,
    pub payment_method: Option<PagBankPaymentMethod>,
}

#[derive(Debug, Deserialize)]
pub struct PagBankPaymentMethod {
    #[serde(rename = "type")]
    pub method_type: String,
}

/// JSON notification body. `reference_id` is the registration id we sent
/// at checkout creation.
#[derive(Debug, Deserialize)]
pub struct PagBankNotification {
    pub id: Option<String>,
    pub reference_id: Option<String>,
    #[serde(default)]
    pub charges: Vec<PagBankCharge>,
}

impl PagBankNotification {
    /// Map the charge's payment method onto ours, when present.
    pub fn metodo(&self) -> Option<MetodoPagamento> {
        match self
            .charges
            .first()?
            .payment_method
            .as_ref()?
            .method_type
            .as_str()
        {
            "PIX" => Some(MetodoPagamento::Pix),
            "CREDIT_CARD" | "DEBIT_CARD" => Some(MetodoPagamento::Cartao),
            _ => None,
        }
    }
}

/// Legacy form-encoded webhook: only carries a code to look the order up by.
#[derive(Debug, Deserialize)]
pub struct PagBankFormNotification {
    #[serde(rename = "notificationCode")]
    pub notification_code: String,
}

#[derive(Debug, Clone)]
pub struct PagBankClient {
    client: Client,
    token: String,
}

impl PagBankClient {
    pub fn new(token: &str) -> Self {
        Self {
            client: Client::builder()
                .timeout(HTTP_TIMEOUT)
                .build()
                .unwrap_or_else(|_| Client::new()),
            token: token.to_string(),
        }
    }

    /// Create a hosted checkout restricted to one payment method. Returns
    /// the checkout id and the PAY redirect URL.
    pub async fn create_checkout(
        &self,
        inscricao: &Inscricao,
        valor_centavos: i64,
        metodo: MetodoPagamento,
        base_url: &str,
    ) -> Result<(String, String)> {
        let method_type = match metodo {
            MetodoPagamento::Pix => "PIX",
            MetodoPagamento::Cartao => "CREDIT_CARD",
            MetodoPagamento::MercadoPago => {
                return Err(AppError::Internal(
                    "Mercado Pago method routed to PagBank client".into(),
                ))
            }
        };

        let request = CreateCheckoutRequest {
            reference_id: inscricao.id.clone(),
            items: vec![CheckoutItem {
                name: format!("Inscrição {}", inscricao.codigo),
                quantity: 1,
                unit_amount: valor_centavos,
            }],
            customer: CheckoutCustomer {
                name: inscricao.nome.clone(),
                email: inscricao.email.clone(),
                tax_id: inscricao.cpf.clone(),
            },
            payment_methods: vec![CheckoutPaymentMethod { method_type }],
            redirect_url: format!("{}/inscricao/confirmacao", base_url),
            notification_urls: vec![format!("{}/webhooks/pagbank", base_url)],
        };

        let response = self
            .client
            .post(format!("{}/checkouts", PAGBANK_API_BASE))
            .bearer_auth(&self.token)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("PagBank request failed: {}", e)))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::Provider(format!(
                "PagBank checkout rejected: {}",
                error_text
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to read PagBank response: {}", e)))?;

        let checkout: CreateCheckoutResponse = serde_json::from_str(&body)
            .map_err(|e| AppError::Internal(format!("Failed to parse PagBank response: {}", e)))?;

        let Some(url) = extrair_link_pay(&checkout.links) else {
            // A missing PAY link indicates a provider contract change; the
            // payload is what support will need to diagnose it.
            tracing::error!("PagBank checkout {} has no PAY link: {}", checkout.id, body);
            return Err(AppError::Internal(
                "PagBank checkout did not return a payment link".into(),
            ));
        };

        Ok((checkout.id, url.to_string()))
    }

    /// Secondary lookup for the legacy form-encoded webhook channel.
    pub async fn get_notification(&self, notification_code: &str) -> Result<PagBankNotification> {
        let response = self
            .client
            .get(format!(
                "{}/orders/{}",
                PAGBANK_API_BASE, notification_code
            ))
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("PagBank request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::Provider(format!(
                "PagBank notification lookup failed ({}): {}",
                status, error_text
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to parse PagBank notification: {}", e)))
    }
}
