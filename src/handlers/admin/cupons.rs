use axum::extract::State;
use axum::http::StatusCode;
use chrono::Utc;

use crate::auth::AdminUser;
use crate::db::{queries, AppState};
use crate::error::{msg, AppError, OptionExt, Result};
use crate::extractors::{Json, Path};
use crate::models::{CreateCupom, CupomDetalhe, UpdateCupom};

pub async fn listar_cupons(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<Json<Vec<CupomDetalhe>>> {
    let conn = state.db.get()?;
    let now = Utc::now().timestamp();

    let cupons = queries::list_cupons(&conn)?
        .into_iter()
        .map(|c| CupomDetalhe::new(c, now))
        .collect();

    Ok(Json(cupons))
}

pub async fn criar_cupom(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Json(input): Json<CreateCupom>,
) -> Result<(StatusCode, Json<CupomDetalhe>)> {
    if input.codigo.trim().is_empty() {
        return Err(AppError::BadRequest("Código não pode ser vazio".into()));
    }
    if input.desconto <= 0 {
        return Err(AppError::BadRequest("Desconto deve ser positivo".into()));
    }

    let conn = state.db.get()?;

    if queries::get_cupom_by_codigo(&conn, &input.codigo)?.is_some() {
        return Err(AppError::Conflict("Código de cupom já existe".into()));
    }

    let cupom = queries::create_cupom(&conn, &input)?;
    let now = Utc::now().timestamp();

    Ok((StatusCode::CREATED, Json(CupomDetalhe::new(cupom, now))))
}

pub async fn atualizar_cupom(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<String>,
    Json(input): Json<UpdateCupom>,
) -> Result<Json<CupomDetalhe>> {
    let conn = state.db.get()?;

    let cupom = queries::update_cupom(&conn, &id, &input)?.or_not_found(msg::CUPOM_NOT_FOUND)?;
    let now = Utc::now().timestamp();

    Ok(Json(CupomDetalhe::new(cupom, now)))
}
