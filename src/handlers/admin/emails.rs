use axum::extract::State;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::auth::AdminUser;
use crate::db::{queries, AppState};
use crate::error::{AppError, Result};
use crate::extractors::Json;
use crate::models::StatusInscricao;

#[derive(Debug, Deserialize)]
pub struct BulkEmailRequest {
    pub assunto: String,
    pub corpo: String,
    /// Restrict recipients to one status (e.g., only PAGO)
    #[serde(default)]
    pub status: Option<StatusInscricao>,
}

#[derive(Debug, Serialize)]
pub struct BulkEmailResponse {
    pub destinatarios: usize,
}

/// Bulk email to registrants. The batch runs on its own task; the handler
/// answers as soon as the recipient list is resolved.
pub async fn enviar_emails(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Json(request): Json<BulkEmailRequest>,
) -> Result<(StatusCode, Json<BulkEmailResponse>)> {
    if request.assunto.trim().is_empty() {
        return Err(AppError::BadRequest("Assunto não pode ser vazio".into()));
    }

    let conn = state.db.get()?;
    let destinatarios = queries::emails_inscritos(&conn, request.status)?;
    let total = destinatarios.len();

    let email = state.email.clone();
    let assunto = request.assunto.clone();
    let corpo = request.corpo.clone();
    tokio::spawn(async move {
        let enviados = email.send_em_massa(&destinatarios, &assunto, &corpo).await;
        tracing::info!("Bulk email finished: {}/{} sent", enviados, total);
    });

    Ok((
        StatusCode::ACCEPTED,
        Json(BulkEmailResponse {
            destinatarios: total,
        }),
    ))
}
