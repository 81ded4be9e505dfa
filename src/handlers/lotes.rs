use axum::extract::State;
use chrono::Utc;

use crate::db::{queries, AppState};
use crate::error::{msg, OptionExt, Result};
use crate::extractors::Json;
use crate::models::Lote;

/// Public listing of active lotes, in sales order.
pub async fn listar(State(state): State<AppState>) -> Result<Json<Vec<Lote>>> {
    let conn = state.db.get()?;
    Ok(Json(queries::list_lotes(&conn, true)?))
}

/// The lote currently open for sales - what the wizard offers by default.
pub async fn atual(State(state): State<AppState>) -> Result<Json<Lote>> {
    let conn = state.db.get()?;
    let lote = queries::lote_atual(&conn, Utc::now().timestamp())?
        .or_not_found(msg::LOTE_NOT_FOUND)?;
    Ok(Json(lote))
}
