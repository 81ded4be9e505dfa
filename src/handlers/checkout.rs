use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::auth::AuthUser;
use crate::db::{queries, AppState};
use crate::error::{msg, AppError, OptionExt, Result};
use crate::extractors::{Json, Path};
use crate::models::{MetodoPagamento, StatusInscricao};
use crate::payments::{valor_cobrado, MercadoPagoClient, PagBankClient};

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub metodo: MetodoPagamento,
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    /// Provider-hosted payment page; the client performs the redirect
    pub url: String,
    pub transacao_id: String,
}

/// Create a provider checkout for a registration and return the redirect
/// URL. CARTAO charges carry the fixed surcharge; the recalculated amount
/// is persisted on the payment row together with the provider transaction
/// id and method.
pub async fn criar_checkout(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>> {
    let conn = state.db.get()?;

    let inscricao =
        queries::get_inscricao_by_id(&conn, &id)?.or_not_found(msg::INSCRICAO_NOT_FOUND)?;

    if inscricao.user_id != user.id && !user.admin {
        return Err(AppError::Forbidden(
            "Inscrição pertence a outro usuário".into(),
        ));
    }

    if inscricao.status == StatusInscricao::Pago {
        return Err(AppError::Conflict(msg::INSCRICAO_JA_PAGA.into()));
    }

    let valor = valor_cobrado(inscricao.valor_centavos, request.metodo);

    let (transacao_id, url) = match request.metodo {
        MetodoPagamento::MercadoPago => {
            let token = state
                .mercadopago_token
                .as_deref()
                .ok_or_else(|| AppError::BadRequest(msg::PROVEDOR_NAO_CONFIGURADO.into()))?;
            MercadoPagoClient::new(token)
                .create_preference(&inscricao, valor, &state.base_url)
                .await?
        }
        MetodoPagamento::Pix | MetodoPagamento::Cartao => {
            let token = state
                .pagbank_token
                .as_deref()
                .ok_or_else(|| AppError::BadRequest(msg::PROVEDOR_NAO_CONFIGURADO.into()))?;
            PagBankClient::new(token)
                .create_checkout(&inscricao, valor, request.metodo, &state.base_url)
                .await?
        }
    };

    let provedor = match request.metodo {
        MetodoPagamento::MercadoPago => "mercadopago",
        MetodoPagamento::Pix | MetodoPagamento::Cartao => "pagbank",
    };

    queries::update_pagamento_checkout(
        &conn,
        &inscricao.id,
        &transacao_id,
        request.metodo,
        provedor,
        valor,
    )?;

    Ok(Json(CheckoutResponse { url, transacao_id }))
}
