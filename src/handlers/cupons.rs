use axum::extract::State;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::auth::AuthUser;
use crate::cupons;
use crate::db::{queries, AppState};
use crate::error::{msg, OptionExt, Result};
use crate::extractors::Json;

#[derive(Debug, Deserialize)]
pub struct ValidarCupomRequest {
    pub codigo: String,
    /// Lote to price against; defaults to the current lote
    #[serde(default)]
    pub lote_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ValidarCupomResponse {
    pub valido: bool,
    pub desconto_centavos: i64,
    pub valor_final_centavos: i64,
}

/// Preview validation for the wizard. Pure read - the coupon is only
/// consumed when the registration is created.
pub async fn validar(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(request): Json<ValidarCupomRequest>,
) -> Result<Json<ValidarCupomResponse>> {
    let conn = state.db.get()?;
    let now = Utc::now().timestamp();

    let lote = match &request.lote_id {
        Some(id) => queries::get_lote_by_id(&conn, id)?.or_not_found(msg::LOTE_NOT_FOUND)?,
        None => queries::lote_atual(&conn, now)?.or_not_found(msg::LOTE_NOT_FOUND)?,
    };

    let validado =
        cupons::validar_cupom(&conn, &request.codigo, lote.valor_centavos, &user.id, now)?;

    Ok(Json(ValidarCupomResponse {
        valido: true,
        desconto_centavos: validado.desconto_centavos,
        valor_final_centavos: validado.valor_final_centavos,
    }))
}
