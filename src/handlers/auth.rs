use axum::extract::State;
use axum::http::StatusCode;

use crate::auth::{self, AuthUser, SESSAO_TTL_SECS};
use crate::db::{queries, AppState};
use crate::error::{msg, AppError, Result};
use crate::extractors::Json;
use crate::models::{CreateUser, LoginRequest, LoginResponse, User};

pub async fn registrar(
    State(state): State<AppState>,
    Json(input): Json<CreateUser>,
) -> Result<(StatusCode, Json<LoginResponse>)> {
    if input.senha.len() < 8 {
        return Err(AppError::BadRequest(
            "Senha deve ter pelo menos 8 caracteres".into(),
        ));
    }
    if !input.email.contains('@') {
        return Err(AppError::BadRequest("E-mail inválido".into()));
    }

    let conn = state.db.get()?;

    if queries::get_user_by_email(&conn, &input.email)?.is_some() {
        return Err(AppError::Conflict(msg::EMAIL_JA_CADASTRADO.into()));
    }

    let senha_hash = auth::hash_senha(&input.senha)?;
    let user = queries::create_user(&conn, &input, &senha_hash)?;

    let token = auth::gerar_token();
    queries::create_sessao(&conn, &user.id, &auth::hash_token(&token), SESSAO_TTL_SECS)?;

    Ok((StatusCode::CREATED, Json(LoginResponse { token })))
}

pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let conn = state.db.get()?;

    // Same error for unknown email and wrong password - don't leak which
    let user = queries::get_user_by_email(&conn, &input.email)?
        .ok_or_else(|| AppError::BadRequest(msg::CREDENCIAIS_INVALIDAS.into()))?;

    if !auth::verificar_senha(&input.senha, &user.senha_hash) {
        return Err(AppError::BadRequest(msg::CREDENCIAIS_INVALIDAS.into()));
    }

    let token = auth::gerar_token();
    queries::create_sessao(&conn, &user.id, &auth::hash_token(&token), SESSAO_TTL_SECS)?;

    Ok(Json(LoginResponse { token }))
}

pub async fn eu(AuthUser(user): AuthUser) -> Json<User> {
    Json(user)
}
