use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Canonical user-facing error messages, shared between handlers and tests.
pub mod msg {
    pub const INSCRICAO_NOT_FOUND: &str = "Inscrição não encontrada";
    pub const LOTE_NOT_FOUND: &str = "Lote não encontrado";
    pub const LOTE_INATIVO: &str = "Lote não está ativo";
    pub const LOTE_FORA_DO_PERIODO: &str = "Lote fora do período de vendas";
    pub const CUPOM_NOT_FOUND: &str = "Cupom não encontrado";
    pub const CUPOM_INATIVO: &str = "Cupom não está ativo";
    pub const CUPOM_AINDA_NAO_VALIDO: &str = "Cupom ainda não está válido";
    pub const CUPOM_EXPIRADO: &str = "Cupom expirado";
    pub const CUPOM_LIMITE_ATINGIDO: &str = "Cupom atingiu o limite de usos";
    pub const CUPOM_LIMITE_USUARIO: &str = "Você já utilizou este cupom o máximo de vezes";
    pub const CUPOM_VALOR_MINIMO: &str = "Valor mínimo do pedido não atingido para este cupom";
    pub const CPF_JA_INSCRITO: &str = "CPF já possui inscrição";
    pub const USUARIO_JA_INSCRITO: &str = "Usuário já possui inscrição";
    pub const INSCRICAO_JA_PAGA: &str = "Inscrição já está paga";
    pub const CREDENCIAIS_INVALIDAS: &str = "E-mail ou senha inválidos";
    pub const EMAIL_JA_CADASTRADO: &str = "E-mail já cadastrado";
    pub const PROVEDOR_NAO_CONFIGURADO: &str = "Provedor de pagamento não configurado";
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "Not found", Some(msg.clone())),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "Bad request", Some(msg.clone()))
            }
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized", None),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "Forbidden", Some(msg.clone())),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "Conflict", Some(msg.clone())),
            AppError::Provider(msg) => {
                // Provider error bodies are passed through so the client can
                // show something actionable, but logged in full here.
                tracing::error!("Payment provider error: {}", msg);
                (StatusCode::BAD_GATEWAY, "Payment provider error", Some(msg.clone()))
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error", None)
            }
            AppError::Pool(e) => {
                tracing::error!("Pool error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error", None)
            }
            AppError::Json(e) => {
                tracing::error!("JSON error: {}", e);
                (StatusCode::BAD_REQUEST, "Invalid JSON", Some(e.to_string()))
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Extension trait for turning `Option` lookups into `NotFound` errors.
pub trait OptionExt<T> {
    fn or_not_found(self, msg: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn or_not_found(self, msg: &str) -> Result<T> {
        self.ok_or_else(|| AppError::NotFound(msg.to_string()))
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
