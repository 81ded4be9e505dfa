use axum::extract::State;
use axum::http::StatusCode;

use crate::auth::AuthUser;
use crate::db::{queries, AppState};
use crate::email::spawn_email;
use crate::error::{msg, OptionExt, Result};
use crate::extractors::Json;
use crate::models::{InscricaoComPagamento, NovaInscricao};
use crate::registro::{self, OrigemInscricao};

/// Final step of the registration wizard.
pub async fn criar(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(dados): Json<NovaInscricao>,
) -> Result<(StatusCode, Json<InscricaoComPagamento>)> {
    let mut conn = state.db.get()?;

    let criada =
        registro::criar_inscricao(&mut conn, &user, &dados, OrigemInscricao::Autoatendimento)?;

    // The transaction is committed; the notification rides on its own task
    // and its failure can only ever cost us an email.
    let email = state.email.clone();
    let inscricao = criada.inscricao.clone();
    spawn_email(async move { email.send_inscricao_pendente(&inscricao).await });

    Ok((StatusCode::CREATED, Json(criada)))
}

/// The participant's own registration with its payment.
pub async fn minha(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<InscricaoComPagamento>> {
    let conn = state.db.get()?;

    let inscricao = queries::get_inscricao_by_user(&conn, &user.id)?
        .or_not_found(msg::INSCRICAO_NOT_FOUND)?;
    let pagamento = queries::get_pagamento_by_inscricao(&conn, &inscricao.id)?
        .or_not_found(msg::INSCRICAO_NOT_FOUND)?;

    Ok(Json(InscricaoComPagamento {
        inscricao,
        pagamento,
    }))
}
