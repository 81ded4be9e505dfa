use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;

use crate::auth::AdminUser;
use crate::db::{queries, AppState};
use crate::email::spawn_email;
use crate::error::{msg, OptionExt, Result};
use crate::extractors::{Json, Path, Query};
use crate::models::{
    Inscricao, InscricaoComPagamento, NovaInscricao, StatusInscricao, UpdateInscricao,
};
use crate::pagination::{Paginated, PaginationQuery};
use crate::registro::{self, OrigemInscricao};

#[derive(Debug, Default, Deserialize)]
pub struct InscricaoFilter {
    pub status: Option<StatusInscricao>,
    /// Max results to return (default 50, max 100)
    pub limit: Option<i64>,
    /// Offset for pagination (default 0)
    pub offset: Option<i64>,
}

pub async fn listar_inscricoes(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Query(filter): Query<InscricaoFilter>,
) -> Result<Json<Paginated<Inscricao>>> {
    let conn = state.db.get()?;

    let page = PaginationQuery {
        limit: filter.limit,
        offset: filter.offset,
    };
    let limit = page.limit();
    let offset = page.offset();
    let items = queries::list_inscricoes(&conn, filter.status, limit, offset)?;
    let total = queries::count_inscricoes(&conn, filter.status)?;

    Ok(Json(Paginated {
        items,
        total,
        limit,
        offset,
    }))
}

#[derive(Debug, Deserialize)]
pub struct AdminNovaInscricao {
    /// Participant account the registration belongs to
    pub user_id: String,
    #[serde(flatten)]
    pub dados: NovaInscricao,
}

/// Manual registration by the back-office: sequential numeric code, lote
/// sales window not enforced (a closed lote can still be sold by hand).
pub async fn criar_inscricao_manual(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Json(input): Json<AdminNovaInscricao>,
) -> Result<(StatusCode, Json<InscricaoComPagamento>)> {
    let mut conn = state.db.get()?;

    let user = queries::get_user_by_id(&conn, &input.user_id)?
        .or_not_found("Usuário não encontrado")?;

    let criada =
        registro::criar_inscricao(&mut conn, &user, &input.dados, OrigemInscricao::Admin)?;

    let email = state.email.clone();
    let inscricao = criada.inscricao.clone();
    spawn_email(async move { email.send_inscricao_pendente(&inscricao).await });

    Ok((StatusCode::CREATED, Json(criada)))
}

pub async fn atualizar_inscricao(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<String>,
    Json(input): Json<UpdateInscricao>,
) -> Result<Json<Inscricao>> {
    let conn = state.db.get()?;

    let inscricao = queries::update_inscricao(&conn, &id, &input)?
        .or_not_found(msg::INSCRICAO_NOT_FOUND)?;

    Ok(Json(inscricao))
}
