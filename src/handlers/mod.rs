pub mod admin;
pub mod auth;
pub mod checkout;
pub mod cupons;
pub mod inscricoes;
pub mod lotes;
pub mod webhooks;

use axum::routing::{get, post};
use axum::Router;

use crate::db::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/auth/registrar", post(auth::registrar))
        .route("/auth/login", post(auth::login))
        .route("/auth/eu", get(auth::eu))
        .route("/lotes", get(lotes::listar))
        .route("/lotes/atual", get(lotes::atual))
        .route("/cupons/validar", post(cupons::validar))
        .route("/inscricoes", post(inscricoes::criar))
        .route("/inscricoes/minha", get(inscricoes::minha))
        .route("/inscricoes/{id}/checkout", post(checkout::criar_checkout))
        .route("/webhooks/mercadopago", post(webhooks::mercadopago::handle))
        .route("/webhooks/pagbank", post(webhooks::pagbank::handle))
        .nest("/admin", admin::router())
        .with_state(state)
}
