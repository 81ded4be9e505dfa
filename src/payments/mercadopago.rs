//! Mercado Pago integration: checkout preferences and payment lookup.
//!
//! Checkout is preference-based: we POST a preference with the item, the
//! payer identity and our callback URLs, and redirect the participant to
//! the returned `init_point`. Webhooks only carry `{type, data: {id}}` -
//! the payment status requires a secondary authenticated GET against the
//! Payment API.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::Inscricao;

const MP_API_BASE: &str = "https://api.mercadopago.com";

/// Provider calls use a short fixed timeout; a slow provider surfaces as a
/// user-facing error instead of hanging the request.
const HTTP_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Serialize)]
struct PreferenceItem {
    title: String,
    quantity: i64,
    /// Mercado Pago takes decimal reais, not centavos
    unit_price: f64,
    currency_id: &'static str,
}

#[derive(Debug, Serialize)]
struct PreferencePayer {
    name: String,
    email: String,
    identification: PayerIdentification,
}

#[derive(Debug, Serialize)]
struct PayerIdentification {
    #[serde(rename = "type")]
    id_type: &'static str,
    number: String,
}

#[derive(Debug, Serialize)]
struct PreferenceBackUrls {
    success: String,
    pending: String,
    failure: String,
}

#[derive(Debug, Serialize)]
struct CreatePreferenceRequest {
    items: Vec<PreferenceItem>,
    payer: PreferencePayer,
    /// Our registration id - comes back on the payment object and is how
    /// the webhook reconciler finds the registration
    external_reference: String,
    back_urls: PreferenceBackUrls,
    auto_return: &'static str,
    notification_url: String,
}

#[derive(Debug, Deserialize)]
struct CreatePreferenceResponse {
    id: String,
    init_point: String,
}

/// Payment object from GET /v1/payments/{id}.
#[derive(Debug, Deserialize)]
pub struct MpPayment {
    pub id: i64,
    pub status: String,
    pub external_reference: Option<String>,
    pub payment_type_id: Option<String>,
}

/// Webhook body: `{type, data: {id}}`. The id arrives as a number or a
/// string depending on the notification channel.
#[derive(Debug, Deserialize)]
pub struct MpWebhook {
    #[serde(rename = "type")]
    pub event_type: Option<String>,
    pub data: Option<MpWebhookData>,
}

#[derive(Debug, Deserialize)]
pub struct MpWebhookData {
    pub id: Option<serde_json::Value>,
}

impl MpWebhook {
    /// The payment id as a string, whichever JSON type it arrived as.
    pub fn payment_id(&self) -> Option<String> {
        match self.data.as_ref()?.id.as_ref()? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MercadoPagoClient {
    client: Client,
    access_token: String,
}

impl MercadoPagoClient {
    pub fn new(access_token: &str) -> Self {
        Self {
            client: Client::builder()
                .timeout(HTTP_TIMEOUT)
                .build()
                .unwrap_or_else(|_| Client::new()),
            access_token: access_token.to_string(),
        }
    }

    /// Create a checkout preference for a registration. Returns the
    /// preference id and the redirect URL (`init_point`).
    pub async fn create_preference(
        &self,
        inscricao: &Inscricao,
        valor_centavos: i64,
        base_url: &str,
    ) -> Result<(String, String)> {
        let request = CreatePreferenceRequest {
            items: vec![PreferenceItem {
                title: format!("Inscrição {}", inscricao.codigo),
                quantity: 1,
                unit_price: valor_centavos as f64 / 100.0,
                currency_id: "BRL",
            }],
            payer: PreferencePayer {
                name: inscricao.nome.clone(),
                email: inscricao.email.clone(),
                identification: PayerIdentification {
                    id_type: "CPF",
                    number: inscricao.cpf.clone(),
                },
            },
            external_reference: inscricao.id.clone(),
            back_urls: PreferenceBackUrls {
                success: format!("{}/inscricao/confirmacao", base_url),
                pending: format!("{}/inscricao/pendente", base_url),
                failure: format!("{}/inscricao/erro", base_url),
            },
            auto_return: "approved",
            notification_url: format!("{}/webhooks/mercadopago", base_url),
        };

        let response = self
            .client
            .post(format!("{}/checkout/preferences", MP_API_BASE))
            .bearer_auth(&self.access_token)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("Mercado Pago request failed: {}", e)))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::Provider(format!(
                "Mercado Pago preference rejected: {}",
                error_text
            )));
        }

        let preference: CreatePreferenceResponse = response.json().await.map_err(|e| {
            AppError::Internal(format!("Failed to parse Mercado Pago response: {}", e))
        })?;

        Ok((preference.id, preference.init_point))
    }

    /// Secondary lookup required by the webhook flow: the notification body
    /// has no status, only the payment id.
    pub async fn get_payment(&self, payment_id: &str) -> Result<MpPayment> {
        let response = self
            .client
            .get(format!("{}/v1/payments/{}", MP_API_BASE, payment_id))
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("Mercado Pago request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::Provider(format!(
                "Mercado Pago payment lookup failed ({}): {}",
                status, error_text
            )));
        }

        response.json().await.map_err(|e| {
            AppError::Internal(format!("Failed to parse Mercado Pago payment: {}", e))
        })
    }
}
