//! Registration creation: the one place an inscricao/pagamento pair is born.
//!
//! The pair is written in a single transaction together with the coupon
//! consumption, so a registration never exists without its payment row and
//! a capped coupon can never be oversold. Notification email is dispatched
//! by the caller only after the transaction commits.

use chrono::Utc;
use rand::Rng;
use rusqlite::Connection;
use uuid::Uuid;

use crate::cupons;
use crate::db::queries;
use crate::error::{msg, AppError, Result};
use crate::models::{
    Inscricao, InscricaoComPagamento, NovaInscricao, Pagamento, StatusInscricao, StatusPagamento,
    User,
};

/// Attempts at generating a unique public code before giving up.
const TENTATIVAS_CODIGO: usize = 5;

/// Alphabet for public codes. No 0/O/1/I to keep codes phone-friendly.
const ALFABETO_CODIGO: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

fn gerar_codigo_aleatorio() -> String {
    let mut rng = rand::thread_rng();
    let sufixo: String = (0..6)
        .map(|_| ALFABETO_CODIGO[rng.gen_range(0..ALFABETO_CODIGO.len())] as char)
        .collect();
    format!("LRG-{}", sufixo)
}

/// Random alphanumeric code for the self-service flow, retried against the
/// uniqueness constraint.
fn gerar_codigo_publico(conn: &Connection) -> Result<String> {
    for _ in 0..TENTATIVAS_CODIGO {
        let codigo = gerar_codigo_aleatorio();
        if !queries::codigo_em_uso(conn, &codigo)? {
            return Ok(codigo);
        }
    }
    Err(AppError::Internal(
        "Não foi possível gerar um código de inscrição único".into(),
    ))
}

/// CPF as stored: digits only, exactly 11 of them.
fn normalizar_cpf(cpf: &str) -> Result<String> {
    let digits: String = cpf.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() != 11 {
        return Err(AppError::BadRequest("CPF inválido".into()));
    }
    Ok(digits)
}

/// Which entry path is creating the registration. The admin path relaxes
/// the lote sales-window check and issues sequential numeric codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrigemInscricao {
    Autoatendimento,
    Admin,
}

/// Create a registration plus its payment placeholder atomically.
///
/// Preconditions checked here: user has no registration, CPF unused, lote
/// exists and is active (and inside its window for self-service). Coupon
/// validation and consumption happen inside the same transaction as the
/// two inserts.
pub fn criar_inscricao(
    conn: &mut Connection,
    user: &User,
    dados: &NovaInscricao,
    origem: OrigemInscricao,
) -> Result<InscricaoComPagamento> {
    let now = Utc::now().timestamp();

    if queries::get_inscricao_by_user(conn, &user.id)?.is_some() {
        return Err(AppError::Conflict(msg::USUARIO_JA_INSCRITO.into()));
    }

    let cpf = normalizar_cpf(&dados.cpf)?;
    if queries::cpf_em_uso(conn, &cpf)? {
        return Err(AppError::Conflict(msg::CPF_JA_INSCRITO.into()));
    }

    let lote = queries::get_lote_by_id(conn, &dados.lote_id)?
        .ok_or_else(|| AppError::NotFound(msg::LOTE_NOT_FOUND.into()))?;
    if !lote.ativo {
        return Err(AppError::BadRequest(msg::LOTE_INATIVO.into()));
    }
    if origem == OrigemInscricao::Autoatendimento && !lote.em_vigencia(now) {
        return Err(AppError::BadRequest(msg::LOTE_FORA_DO_PERIODO.into()));
    }

    // Validate the coupon before opening the transaction; the conditional
    // increment inside the transaction re-checks the global cap.
    let validado = dados
        .cupom_codigo
        .as_deref()
        .filter(|c| !c.trim().is_empty())
        .map(|codigo| cupons::validar_cupom(conn, codigo, lote.valor_centavos, &user.id, now))
        .transpose()?;

    let codigo = match origem {
        OrigemInscricao::Autoatendimento => gerar_codigo_publico(conn)?,
        OrigemInscricao::Admin => queries::proximo_codigo_numerico(conn)?.to_string(),
    };

    let valor_centavos = validado
        .as_ref()
        .map(|v| v.valor_final_centavos)
        .unwrap_or(lote.valor_centavos);

    let inscricao = Inscricao {
        id: Uuid::new_v4().to_string(),
        codigo,
        user_id: user.id.clone(),
        lote_id: lote.id.clone(),
        cupom_id: validado.as_ref().map(|v| v.cupom.id.clone()),
        nome: dados.nome.trim().to_string(),
        cpf,
        email: dados.email.trim().to_lowercase(),
        telefone: dados.telefone.trim().to_string(),
        data_nascimento: dados.data_nascimento.clone(),
        tamanho_camiseta: dados.tamanho_camiseta.clone(),
        equipe: dados.equipe.clone(),
        valor_centavos,
        status: StatusInscricao::Pendente,
        created_at: now,
        updated_at: now,
    };

    // Placeholder until checkout fills in the provider transaction id
    let pagamento = Pagamento {
        id: Uuid::new_v4().to_string(),
        inscricao_id: inscricao.id.clone(),
        transacao_id: format!("aguardando-{}", Uuid::new_v4()),
        valor_centavos,
        status: StatusPagamento::Pendente,
        metodo: None,
        provedor: None,
        created_at: now,
        updated_at: now,
    };

    let tx = conn.transaction()?;

    if let Some(v) = &validado {
        // The cap was checked during validation, but only this conditional
        // increment is race-free: a concurrent registration that got here
        // first makes this UPDATE match zero rows.
        if !queries::try_consumir_cupom(&tx, &v.cupom.id)? {
            return Err(AppError::Conflict(msg::CUPOM_LIMITE_ATINGIDO.into()));
        }
    }

    queries::insert_inscricao(&tx, &inscricao)?;
    queries::insert_pagamento(&tx, &pagamento)?;

    tx.commit()?;

    Ok(InscricaoComPagamento {
        inscricao,
        pagamento,
    })
}
