use chrono::Utc;
use rusqlite::{params, types::Value, Connection, OptionalExtension};
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;

use super::from_row::{
    query_all, query_one, FromRow, CUPOM_COLS, INSCRICAO_COLS, LOTE_COLS, PAGAMENTO_COLS,
    USER_COLS,
};

fn now() -> i64 {
    Utc::now().timestamp()
}

fn gen_id() -> String {
    Uuid::new_v4().to_string()
}

/// Builder for dynamic UPDATE statements with optional fields.
struct UpdateBuilder {
    table: &'static str,
    id: String,
    fields: Vec<(&'static str, Value)>,
}

impl UpdateBuilder {
    fn new(table: &'static str, id: &str) -> Self {
        Self {
            table,
            id: id.to_string(),
            fields: Vec::new(),
        }
    }

    fn set(mut self, column: &'static str, value: impl Into<Value>) -> Self {
        self.fields.push((column, value.into()));
        self
    }

    fn set_opt<V: Into<Value>>(self, column: &'static str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.set(column, v),
            None => self,
        }
    }

    /// Execute the update and return the updated entity using RETURNING.
    /// Returns None if no rows matched or there was nothing to update.
    fn execute_returning<T: FromRow>(
        mut self,
        conn: &Connection,
        returning_cols: &str,
    ) -> Result<Option<T>> {
        if self.fields.is_empty() {
            return Ok(None);
        }
        self.fields.push(("updated_at", now().into()));
        let sets: Vec<String> = self
            .fields
            .iter()
            .map(|(col, _)| format!("{} = ?", col))
            .collect();
        let mut values: Vec<Value> = self.fields.into_iter().map(|(_, v)| v).collect();
        values.push(self.id.into());
        let sql = format!(
            "UPDATE {} SET {} WHERE id = ? RETURNING {}",
            self.table,
            sets.join(", "),
            returning_cols
        );
        conn.query_row(&sql, rusqlite::params_from_iter(values), T::from_row)
            .optional()
            .map_err(Into::into)
    }
}

// ============ Users ============

pub fn create_user(conn: &Connection, input: &CreateUser, senha_hash: &str) -> Result<User> {
    let id = gen_id();
    let now = now();
    let email = input.email.trim().to_lowercase();

    conn.execute(
        "INSERT INTO users (id, email, nome, senha_hash, admin, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, 0, ?5, ?6)",
        params![&id, &email, &input.nome, senha_hash, now, now],
    )?;

    Ok(User {
        id,
        email,
        nome: input.nome.clone(),
        senha_hash: senha_hash.to_string(),
        admin: false,
        created_at: now,
        updated_at: now,
    })
}

pub fn get_user_by_id(conn: &Connection, id: &str) -> Result<Option<User>> {
    query_one(
        conn,
        &format!("SELECT {} FROM users WHERE id = ?1", USER_COLS),
        &[&id],
    )
}

pub fn get_user_by_email(conn: &Connection, email: &str) -> Result<Option<User>> {
    let email = email.trim().to_lowercase();
    query_one(
        conn,
        &format!("SELECT {} FROM users WHERE email = ?1", USER_COLS),
        &[&email],
    )
}

pub fn set_user_admin(conn: &Connection, id: &str, admin: bool) -> Result<bool> {
    let affected = conn.execute(
        "UPDATE users SET admin = ?1, updated_at = ?2 WHERE id = ?3",
        params![admin, now(), id],
    )?;
    Ok(affected > 0)
}

pub fn count_users(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
        .map_err(Into::into)
}

// ============ Sessions ============

pub fn create_sessao(
    conn: &Connection,
    user_id: &str,
    token_hash: &str,
    ttl_secs: i64,
) -> Result<()> {
    let now = now();
    conn.execute(
        "INSERT INTO sessoes (id, user_id, token_hash, created_at, expires_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![gen_id(), user_id, token_hash, now, now + ttl_secs],
    )?;
    Ok(())
}

/// Resolve a hashed bearer token into the owning user, ignoring expired
/// sessions.
pub fn get_user_by_sessao(conn: &Connection, token_hash: &str) -> Result<Option<User>> {
    query_one(
        conn,
        "SELECT u.id, u.email, u.nome, u.senha_hash, u.admin, u.created_at, u.updated_at
         FROM users u
         JOIN sessoes s ON s.user_id = u.id
         WHERE s.token_hash = ?1 AND s.expires_at > ?2",
        &[&token_hash, &now()],
    )
}

// ============ Lotes ============

pub fn create_lote(conn: &Connection, input: &CreateLote) -> Result<Lote> {
    let id = gen_id();
    let now = now();

    conn.execute(
        "INSERT INTO lotes (id, nome, valor_centavos, data_inicio, data_fim, ativo, ordem,
                            created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            &id,
            &input.nome,
            input.valor_centavos,
            input.data_inicio,
            input.data_fim,
            input.ativo,
            input.ordem,
            now,
            now
        ],
    )?;

    Ok(Lote {
        id,
        nome: input.nome.clone(),
        valor_centavos: input.valor_centavos,
        data_inicio: input.data_inicio,
        data_fim: input.data_fim,
        ativo: input.ativo,
        ordem: input.ordem,
        created_at: now,
        updated_at: now,
    })
}

pub fn get_lote_by_id(conn: &Connection, id: &str) -> Result<Option<Lote>> {
    query_one(
        conn,
        &format!("SELECT {} FROM lotes WHERE id = ?1", LOTE_COLS),
        &[&id],
    )
}

pub fn list_lotes(conn: &Connection, somente_ativos: bool) -> Result<Vec<Lote>> {
    let where_clause = if somente_ativos { "WHERE ativo = 1" } else { "" };
    query_all(
        conn,
        &format!(
            "SELECT {} FROM lotes {} ORDER BY ordem ASC",
            LOTE_COLS, where_clause
        ),
        &[],
    )
}

/// The lote currently open for self-service sales (active, inside its
/// window, lowest ordem wins when windows overlap).
pub fn lote_atual(conn: &Connection, now: i64) -> Result<Option<Lote>> {
    query_one(
        conn,
        &format!(
            "SELECT {} FROM lotes
             WHERE ativo = 1 AND data_inicio <= ?1 AND data_fim >= ?1
             ORDER BY ordem ASC LIMIT 1",
            LOTE_COLS
        ),
        &[&now],
    )
}

pub fn update_lote(conn: &Connection, id: &str, input: &UpdateLote) -> Result<Option<Lote>> {
    UpdateBuilder::new("lotes", id)
        .set_opt("nome", input.nome.clone())
        .set_opt("valor_centavos", input.valor_centavos)
        .set_opt("data_inicio", input.data_inicio)
        .set_opt("data_fim", input.data_fim)
        .set_opt("ativo", input.ativo)
        .set_opt("ordem", input.ordem)
        .execute_returning(conn, LOTE_COLS)
}

// ============ Cupons ============

pub fn create_cupom(conn: &Connection, input: &CreateCupom) -> Result<Cupom> {
    let id = gen_id();
    let now = now();
    let codigo = input.codigo.trim().to_uppercase();

    conn.execute(
        "INSERT INTO cupons (id, codigo, tipo, desconto, ativo, data_inicio, data_validade,
                             uso_maximo, uso_por_usuario, valor_minimo_centavos, usos,
                             created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, 0, ?11, ?12)",
        params![
            &id,
            &codigo,
            input.tipo.as_str(),
            input.desconto,
            input.ativo,
            input.data_inicio,
            input.data_validade,
            input.uso_maximo,
            input.uso_por_usuario,
            input.valor_minimo_centavos,
            now,
            now
        ],
    )?;

    Ok(Cupom {
        id,
        codigo,
        tipo: input.tipo,
        desconto: input.desconto,
        ativo: input.ativo,
        data_inicio: input.data_inicio,
        data_validade: input.data_validade,
        uso_maximo: input.uso_maximo,
        uso_por_usuario: input.uso_por_usuario,
        valor_minimo_centavos: input.valor_minimo_centavos,
        usos: 0,
        created_at: now,
        updated_at: now,
    })
}

/// Lookup by code, case-insensitive (codes are stored uppercase).
pub fn get_cupom_by_codigo(conn: &Connection, codigo: &str) -> Result<Option<Cupom>> {
    let codigo = codigo.trim().to_uppercase();
    query_one(
        conn,
        &format!("SELECT {} FROM cupons WHERE codigo = ?1", CUPOM_COLS),
        &[&codigo],
    )
}

pub fn get_cupom_by_id(conn: &Connection, id: &str) -> Result<Option<Cupom>> {
    query_one(
        conn,
        &format!("SELECT {} FROM cupons WHERE id = ?1", CUPOM_COLS),
        &[&id],
    )
}

pub fn list_cupons(conn: &Connection) -> Result<Vec<Cupom>> {
    query_all(
        conn,
        &format!("SELECT {} FROM cupons ORDER BY created_at DESC", CUPOM_COLS),
        &[],
    )
}

pub fn update_cupom(conn: &Connection, id: &str, input: &UpdateCupom) -> Result<Option<Cupom>> {
    UpdateBuilder::new("cupons", id)
        .set_opt("tipo", input.tipo.map(|t| t.as_str().to_string()))
        .set_opt("desconto", input.desconto)
        .set_opt("ativo", input.ativo)
        .set_opt("data_inicio", input.data_inicio)
        .set_opt("data_validade", input.data_validade)
        .set_opt("uso_maximo", input.uso_maximo)
        .set_opt("uso_por_usuario", input.uso_por_usuario)
        .set_opt("valor_minimo_centavos", input.valor_minimo_centavos)
        .execute_returning(conn, CUPOM_COLS)
}

/// How many registrations this user already made with this coupon.
pub fn usos_do_usuario(conn: &Connection, cupom_id: &str, user_id: &str) -> Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM inscricoes WHERE cupom_id = ?1 AND user_id = ?2",
        params![cupom_id, user_id],
        |row| row.get(0),
    )
    .map_err(Into::into)
}

/// Atomically consume one use of a capped coupon.
///
/// The conditional increment is what closes the oversell race: two
/// concurrent registrations against a coupon with one use left cannot both
/// succeed, because only one UPDATE will match `usos < uso_maximo`.
/// Must run inside the registration transaction so a failed registration
/// releases the use on rollback.
pub fn try_consumir_cupom(conn: &Connection, cupom_id: &str) -> Result<bool> {
    let affected = conn.execute(
        "UPDATE cupons SET usos = usos + 1, updated_at = ?1
         WHERE id = ?2 AND (uso_maximo IS NULL OR usos < uso_maximo)",
        params![now(), cupom_id],
    )?;
    Ok(affected > 0)
}

// ============ Inscrições ============

pub fn codigo_em_uso(conn: &Connection, codigo: &str) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM inscricoes WHERE codigo = ?1",
        params![codigo],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

pub fn cpf_em_uso(conn: &Connection, cpf: &str) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM inscricoes WHERE cpf = ?1",
        params![cpf],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Next code for the admin-manual flow: one past the highest numeric code
/// already issued.
pub fn proximo_codigo_numerico(conn: &Connection) -> Result<i64> {
    let max: Option<i64> = conn.query_row(
        "SELECT MAX(CAST(codigo AS INTEGER)) FROM inscricoes
         WHERE codigo GLOB '[0-9]*' AND codigo NOT GLOB '*[^0-9]*'",
        [],
        |row| row.get(0),
    )?;
    Ok(max.unwrap_or(0) + 1)
}

/// Insert a pre-built registration row. Part of the registration
/// transaction - see [`crate::registro`].
pub fn insert_inscricao(conn: &Connection, ins: &Inscricao) -> Result<()> {
    conn.execute(
        "INSERT INTO inscricoes (id, codigo, user_id, lote_id, cupom_id, nome, cpf, email,
                                 telefone, data_nascimento, tamanho_camiseta, equipe,
                                 valor_centavos, status, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
        params![
            &ins.id,
            &ins.codigo,
            &ins.user_id,
            &ins.lote_id,
            &ins.cupom_id,
            &ins.nome,
            &ins.cpf,
            &ins.email,
            &ins.telefone,
            &ins.data_nascimento,
            &ins.tamanho_camiseta,
            &ins.equipe,
            ins.valor_centavos,
            ins.status.as_str(),
            ins.created_at,
            ins.updated_at
        ],
    )?;
    Ok(())
}

pub fn insert_pagamento(conn: &Connection, pag: &Pagamento) -> Result<()> {
    conn.execute(
        "INSERT INTO pagamentos (id, inscricao_id, transacao_id, valor_centavos, status,
                                 metodo, provedor, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            &pag.id,
            &pag.inscricao_id,
            &pag.transacao_id,
            pag.valor_centavos,
            pag.status.as_str(),
            pag.metodo.map(|m| m.as_str()),
            &pag.provedor,
            pag.created_at,
            pag.updated_at
        ],
    )?;
    Ok(())
}

pub fn get_inscricao_by_id(conn: &Connection, id: &str) -> Result<Option<Inscricao>> {
    query_one(
        conn,
        &format!("SELECT {} FROM inscricoes WHERE id = ?1", INSCRICAO_COLS),
        &[&id],
    )
}

pub fn get_inscricao_by_user(conn: &Connection, user_id: &str) -> Result<Option<Inscricao>> {
    query_one(
        conn,
        &format!(
            "SELECT {} FROM inscricoes WHERE user_id = ?1",
            INSCRICAO_COLS
        ),
        &[&user_id],
    )
}

pub fn get_pagamento_by_inscricao(
    conn: &Connection,
    inscricao_id: &str,
) -> Result<Option<Pagamento>> {
    query_one(
        conn,
        &format!(
            "SELECT {} FROM pagamentos WHERE inscricao_id = ?1",
            PAGAMENTO_COLS
        ),
        &[&inscricao_id],
    )
}

pub fn list_inscricoes(
    conn: &Connection,
    status: Option<StatusInscricao>,
    limit: i64,
    offset: i64,
) -> Result<Vec<Inscricao>> {
    match status {
        Some(s) => query_all(
            conn,
            &format!(
                "SELECT {} FROM inscricoes WHERE status = ?1
                 ORDER BY created_at DESC LIMIT ?2 OFFSET ?3",
                INSCRICAO_COLS
            ),
            &[&s.as_str(), &limit, &offset],
        ),
        None => query_all(
            conn,
            &format!(
                "SELECT {} FROM inscricoes ORDER BY created_at DESC LIMIT ?1 OFFSET ?2",
                INSCRICAO_COLS
            ),
            &[&limit, &offset],
        ),
    }
}

pub fn count_inscricoes(conn: &Connection, status: Option<StatusInscricao>) -> Result<i64> {
    match status {
        Some(s) => conn
            .query_row(
                "SELECT COUNT(*) FROM inscricoes WHERE status = ?1",
                params![s.as_str()],
                |row| row.get(0),
            )
            .map_err(Into::into),
        None => conn
            .query_row("SELECT COUNT(*) FROM inscricoes", [], |row| row.get(0))
            .map_err(Into::into),
    }
}

pub fn update_inscricao(
    conn: &Connection,
    id: &str,
    input: &UpdateInscricao,
) -> Result<Option<Inscricao>> {
    UpdateBuilder::new("inscricoes", id)
        .set_opt("nome", input.nome.clone())
        .set_opt("telefone", input.telefone.clone())
        .set_opt("tamanho_camiseta", input.tamanho_camiseta.clone())
        .set_opt("equipe", input.equipe.clone())
        .set_opt("valor_centavos", input.valor_centavos)
        .set_opt("status", input.status.map(|s| s.as_str().to_string()))
        .execute_returning(conn, INSCRICAO_COLS)
}

/// Recipients for bulk email, optionally filtered by status.
pub fn emails_inscritos(
    conn: &Connection,
    status: Option<StatusInscricao>,
) -> Result<Vec<(String, String)>> {
    let map = |row: &rusqlite::Row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?));
    let rows = match status {
        Some(s) => {
            let mut stmt =
                conn.prepare("SELECT nome, email FROM inscricoes WHERE status = ?1")?;
            let rows = stmt
                .query_map(params![s.as_str()], map)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            rows
        }
        None => {
            let mut stmt = conn.prepare("SELECT nome, email FROM inscricoes")?;
            let rows = stmt
                .query_map([], map)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            rows
        }
    };
    Ok(rows)
}

// ============ Pagamentos ============

/// Persist checkout results on the payment row: provider transaction id,
/// method, provider name and (for surcharged card payments) the
/// recalculated amount.
pub fn update_pagamento_checkout(
    conn: &Connection,
    inscricao_id: &str,
    transacao_id: &str,
    metodo: MetodoPagamento,
    provedor: &str,
    valor_centavos: i64,
) -> Result<bool> {
    let affected = conn.execute(
        "UPDATE pagamentos
         SET transacao_id = ?1, metodo = ?2, provedor = ?3, valor_centavos = ?4, updated_at = ?5
         WHERE inscricao_id = ?6",
        params![
            transacao_id,
            metodo.as_str(),
            provedor,
            valor_centavos,
            now(),
            inscricao_id
        ],
    )?;
    Ok(affected > 0)
}

/// Apply a reconciled status pair to both rows. Caller is responsible for
/// wrapping this in a transaction - the two updates must commit together.
pub fn aplicar_transicao(
    conn: &Connection,
    inscricao_id: &str,
    status_inscricao: StatusInscricao,
    status_pagamento: StatusPagamento,
    transacao_id: &str,
    metodo: Option<MetodoPagamento>,
) -> Result<()> {
    let ts = now();
    conn.execute(
        "UPDATE inscricoes SET status = ?1, updated_at = ?2 WHERE id = ?3",
        params![status_inscricao.as_str(), ts, inscricao_id],
    )?;
    match metodo {
        Some(m) => {
            conn.execute(
                "UPDATE pagamentos
                 SET status = ?1, transacao_id = ?2, metodo = ?3, updated_at = ?4
                 WHERE inscricao_id = ?5",
                params![status_pagamento.as_str(), transacao_id, m.as_str(), ts, inscricao_id],
            )?;
        }
        None => {
            conn.execute(
                "UPDATE pagamentos
                 SET status = ?1, transacao_id = ?2, updated_at = ?3
                 WHERE inscricao_id = ?4",
                params![status_pagamento.as_str(), transacao_id, ts, inscricao_id],
            )?;
        }
    }
    Ok(())
}
