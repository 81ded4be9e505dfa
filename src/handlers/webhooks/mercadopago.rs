//! Mercado Pago webhook endpoint.
//!
//! The notification body only says "payment X changed" - the status has to
//! be fetched with a secondary authenticated GET, and the registration is
//! resolved through the payment's `external_reference`.

use axum::{body::Bytes, extract::State, http::StatusCode, response::IntoResponse};

use crate::db::AppState;
use crate::payments::{MercadoPagoClient, MpWebhook, StatusNormalizado};

use super::common::{aplicar_evento, EventoPagamento};

pub async fn handle(State(state): State<AppState>, body: Bytes) -> impl IntoResponse {
    // Always 200: a failing webhook must not trigger provider retry storms
    (StatusCode::OK, process(&state, &body).await)
}

async fn process(state: &AppState, body: &Bytes) -> &'static str {
    let webhook: MpWebhook = match serde_json::from_slice(body) {
        Ok(w) => w,
        Err(e) => {
            tracing::warn!("Invalid Mercado Pago webhook body: {}", e);
            return "JSON inválido";
        }
    };

    if webhook.event_type.as_deref() != Some("payment") {
        return "Evento ignorado";
    }

    let Some(payment_id) = webhook.payment_id() else {
        tracing::warn!("Mercado Pago webhook without payment id");
        return "Sem id de pagamento";
    };

    let Some(token) = state.mercadopago_token.as_deref() else {
        tracing::error!("Mercado Pago webhook received but provider is not configured");
        return "Provedor não configurado";
    };

    let client = MercadoPagoClient::new(token);
    let payment = match client.get_payment(&payment_id).await {
        Ok(p) => p,
        Err(e) => {
            tracing::error!("Mercado Pago payment lookup failed for {}: {}", payment_id, e);
            return "Falha na consulta ao provedor";
        }
    };

    let Some(inscricao_id) = payment.external_reference else {
        tracing::warn!("Mercado Pago payment {} has no external_reference", payment.id);
        return "Sem referência externa";
    };

    aplicar_evento(
        state,
        EventoPagamento {
            inscricao_id,
            transacao_id: payment.id.to_string(),
            status: StatusNormalizado::from_provider(&payment.status),
            // Method was fixed at checkout time (MERCADO_PAGO)
            metodo: None,
        },
    )
}
