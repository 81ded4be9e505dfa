mod cupons;
mod emails;
mod inscricoes;
mod lotes;

use axum::routing::{get, patch, post};
use axum::Router;

use crate::db::AppState;

pub use cupons::*;
pub use emails::*;
pub use inscricoes::*;
pub use lotes::*;

/// Admin back-office routes. Every handler takes [`crate::auth::AdminUser`],
/// so role enforcement lives in the extractor, not here.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/inscricoes",
            get(listar_inscricoes).post(criar_inscricao_manual),
        )
        .route("/inscricoes/{id}", patch(atualizar_inscricao))
        .route("/cupons", get(listar_cupons).post(criar_cupom))
        .route("/cupons/{id}", patch(atualizar_cupom))
        .route("/lotes", get(listar_lotes).post(criar_lote))
        .route("/lotes/{id}", patch(atualizar_lote))
        .route("/emails", post(enviar_emails))
}
