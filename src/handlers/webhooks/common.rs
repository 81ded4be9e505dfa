//! Provider-agnostic webhook reconciliation.
//!
//! Provider handlers parse their payload into an [`EventoPagamento`] and
//! hand it here; this module owns the status state machine and the
//! transactional update of the inscricao/pagamento pair. Webhook endpoints
//! always answer 200 - anything that goes wrong is logged, never surfaced
//! to the provider, so redeliveries don't turn into retry storms.

use rusqlite::Connection;

use crate::db::{queries, AppState};
use crate::email::spawn_email;
use crate::error::Result;
use crate::models::{Inscricao, MetodoPagamento, StatusPagamento};
use crate::payments::StatusNormalizado;

/// Normalized payment event, whatever provider it came from.
#[derive(Debug)]
pub struct EventoPagamento {
    /// Registration id carried in the provider's external reference
    pub inscricao_id: String,
    /// Provider's transaction/charge id
    pub transacao_id: String,
    pub status: StatusNormalizado,
    /// Method as reported by the provider, when it reports one
    pub metodo: Option<MetodoPagamento>,
}

/// What the reconciler did with an event.
#[derive(Debug)]
pub enum Reconciliacao {
    Aplicada {
        inscricao: Inscricao,
        /// True only on the first transition into PAGO - gates the
        /// confirmation email so redeliveries can't duplicate it
        primeira_confirmacao: bool,
    },
    Ignorada(&'static str),
}

/// Apply an event to the inscricao/pagamento pair in one transaction.
///
/// Rules, in order:
/// - unknown registration: ignored (the provider still gets its 200)
/// - stale event: a PENDENTE notification never overwrites a terminal
///   status (rank guard against out-of-order delivery)
/// - PENDENTE onto PENDENTE: no-op by definition
/// - anything else: both statuses, the transaction id and the method are
///   written together; re-applying a terminal event sets the same values
///   again, which keeps redelivery idempotent
pub fn reconciliar(conn: &mut Connection, evento: &EventoPagamento) -> Result<Reconciliacao> {
    let tx = conn.transaction()?;

    let Some(inscricao) = queries::get_inscricao_by_id(&tx, &evento.inscricao_id)? else {
        tracing::warn!(
            "Webhook for unknown registration {} (transacao {})",
            evento.inscricao_id,
            evento.transacao_id
        );
        return Ok(Reconciliacao::Ignorada("Inscrição não encontrada"));
    };

    let Some(pagamento) = queries::get_pagamento_by_inscricao(&tx, &inscricao.id)? else {
        // The creation transaction makes this unreachable; if it ever
        // happens the database is corrupt and worth a loud log.
        tracing::error!("Registration {} has no payment row", inscricao.id);
        return Ok(Reconciliacao::Ignorada("Pagamento não encontrado"));
    };

    let (status_inscricao, status_pagamento) = evento.status.transicao();

    if status_pagamento.rank() < pagamento.status.rank() {
        tracing::info!(
            "Stale webhook for {}: {} would downgrade {}, ignoring",
            inscricao.id,
            status_pagamento,
            pagamento.status
        );
        return Ok(Reconciliacao::Ignorada("Notificação obsoleta"));
    }

    if status_pagamento == StatusPagamento::Pendente {
        return Ok(Reconciliacao::Ignorada("Sem transição"));
    }

    let primeira_confirmacao = status_pagamento == StatusPagamento::Aprovado
        && pagamento.status != StatusPagamento::Aprovado;

    queries::aplicar_transicao(
        &tx,
        &inscricao.id,
        status_inscricao,
        status_pagamento,
        &evento.transacao_id,
        evento.metodo,
    )?;

    tx.commit()?;

    tracing::info!(
        "Reconciled {}: {} -> {} / {} (transacao {})",
        inscricao.id,
        pagamento.status,
        status_inscricao,
        status_pagamento,
        evento.transacao_id
    );

    Ok(Reconciliacao::Aplicada {
        inscricao: Inscricao {
            status: status_inscricao,
            ..inscricao
        },
        primeira_confirmacao,
    })
}

/// Reconcile an event and, on the first confirmation, spawn the
/// post-commit confirmation email. Returns the message the webhook
/// endpoint answers with (always under a 200).
pub fn aplicar_evento(state: &AppState, evento: EventoPagamento) -> &'static str {
    let mut conn = match state.db.get() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Failed to get DB connection for webhook: {}", e);
            return "Erro interno";
        }
    };

    match reconciliar(&mut conn, &evento) {
        Ok(Reconciliacao::Aplicada {
            inscricao,
            primeira_confirmacao,
        }) => {
            if primeira_confirmacao {
                let email = state.email.clone();
                spawn_email(async move { email.send_inscricao_confirmada(&inscricao).await });
            }
            "OK"
        }
        Ok(Reconciliacao::Ignorada(motivo)) => motivo,
        Err(e) => {
            tracing::error!("Webhook reconciliation failed: {}", e);
            "Erro interno"
        }
    }
}
