//! PagBank webhook endpoint.
//!
//! Notifications normally arrive as JSON with the charge embedded. The
//! legacy channel instead POSTs form-encoded data with a
//! `notificationCode`, which requires a secondary authenticated lookup.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};

use crate::db::AppState;
use crate::payments::{
    PagBankClient, PagBankFormNotification, PagBankNotification, StatusNormalizado,
};

use super::common::{aplicar_evento, EventoPagamento};

pub async fn handle(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    // Always 200: a failing webhook must not trigger provider retry storms
    (StatusCode::OK, process(&state, &headers, &body).await)
}

fn is_form_encoded(headers: &HeaderMap) -> bool {
    headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.starts_with("application/x-www-form-urlencoded"))
        .unwrap_or(false)
}

async fn process(state: &AppState, headers: &HeaderMap, body: &Bytes) -> &'static str {
    let notification = if is_form_encoded(headers) {
        let form: PagBankFormNotification = match serde_urlencoded::from_bytes(body) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!("Invalid PagBank form webhook: {}", e);
                return "Formulário inválido";
            }
        };

        let Some(token) = state.pagbank_token.as_deref() else {
            tracing::error!("PagBank webhook received but provider is not configured");
            return "Provedor não configurado";
        };

        match PagBankClient::new(token)
            .get_notification(&form.notification_code)
            .await
        {
            Ok(n) => n,
            Err(e) => {
                tracing::error!(
                    "PagBank notification lookup failed for {}: {}",
                    form.notification_code,
                    e
                );
                return "Falha na consulta ao provedor";
            }
        }
    } else {
        match serde_json::from_slice::<PagBankNotification>(body) {
            Ok(n) => n,
            Err(e) => {
                tracing::warn!("Invalid PagBank webhook body: {}", e);
                return "JSON inválido";
            }
        }
    };

    let Some(inscricao_id) = notification.reference_id.clone() else {
        tracing::warn!("PagBank notification without reference_id");
        return "Sem referência externa";
    };

    let Some(charge) = notification.charges.first() else {
        return "Sem cobranças";
    };

    let evento = EventoPagamento {
        inscricao_id,
        transacao_id: charge.id.clone(),
        status: StatusNormalizado::from_provider(&charge.status),
        metodo: notification.metodo(),
    };

    aplicar_evento(state, evento)
}
