use axum::extract::State;
use axum::http::StatusCode;

use crate::auth::AdminUser;
use crate::db::{queries, AppState};
use crate::error::{msg, AppError, OptionExt, Result};
use crate::extractors::{Json, Path};
use crate::models::{CreateLote, Lote, UpdateLote};

pub async fn listar_lotes(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<Json<Vec<Lote>>> {
    let conn = state.db.get()?;
    Ok(Json(queries::list_lotes(&conn, false)?))
}

pub async fn criar_lote(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Json(input): Json<CreateLote>,
) -> Result<(StatusCode, Json<Lote>)> {
    if input.valor_centavos <= 0 {
        return Err(AppError::BadRequest("Valor deve ser positivo".into()));
    }
    if input.data_fim <= input.data_inicio {
        return Err(AppError::BadRequest(
            "Fim do período deve ser depois do início".into(),
        ));
    }

    let conn = state.db.get()?;
    let lote = queries::create_lote(&conn, &input)?;

    Ok((StatusCode::CREATED, Json(lote)))
}

pub async fn atualizar_lote(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<String>,
    Json(input): Json<UpdateLote>,
) -> Result<Json<Lote>> {
    let conn = state.db.get()?;
    let lote = queries::update_lote(&conn, &id, &input)?.or_not_found(msg::LOTE_NOT_FOUND)?;
    Ok(Json(lote))
}
