//! Row mapping trait and helpers for reducing boilerplate in queries.

use rusqlite::{Connection, OptionalExtension, Row, ToSql};

use crate::models::*;

/// Parse a string column into an enum type, converting parse errors to
/// rusqlite errors instead of panicking on corrupted data.
fn parse_enum<T: std::str::FromStr>(row: &Row, col: usize, col_name: &str) -> rusqlite::Result<T> {
    row.get::<_, String>(col)?.parse::<T>().map_err(|_| {
        rusqlite::Error::InvalidColumnType(col, col_name.to_string(), rusqlite::types::Type::Text)
    })
}

/// Trait for constructing a type from a database row.
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> rusqlite::Result<Self>;
}

/// Query for a single optional result.
pub fn query_one<T: FromRow>(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> crate::error::Result<Option<T>> {
    conn.query_row(sql, params, T::from_row)
        .optional()
        .map_err(Into::into)
}

/// Query for multiple results.
pub fn query_all<T: FromRow>(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> crate::error::Result<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, T::from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ============ SQL SELECT constants ============

pub const USER_COLS: &str = "id, email, nome, senha_hash, admin, created_at, updated_at";

pub const LOTE_COLS: &str =
    "id, nome, valor_centavos, data_inicio, data_fim, ativo, ordem, created_at, updated_at";

pub const CUPOM_COLS: &str = "id, codigo, tipo, desconto, ativo, data_inicio, data_validade, \
     uso_maximo, uso_por_usuario, valor_minimo_centavos, usos, created_at, updated_at";

pub const INSCRICAO_COLS: &str = "id, codigo, user_id, lote_id, cupom_id, nome, cpf, email, \
     telefone, data_nascimento, tamanho_camiseta, equipe, valor_centavos, status, \
     created_at, updated_at";

pub const PAGAMENTO_COLS: &str = "id, inscricao_id, transacao_id, valor_centavos, status, \
     metodo, provedor, created_at, updated_at";

// ============ FromRow implementations ============

impl FromRow for User {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(User {
            id: row.get(0)?,
            email: row.get(1)?,
            nome: row.get(2)?,
            senha_hash: row.get(3)?,
            admin: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }
}

impl FromRow for Lote {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Lote {
            id: row.get(0)?,
            nome: row.get(1)?,
            valor_centavos: row.get(2)?,
            data_inicio: row.get(3)?,
            data_fim: row.get(4)?,
            ativo: row.get(5)?,
            ordem: row.get(6)?,
            created_at: row.get(7)?,
            updated_at: row.get(8)?,
        })
    }
}

impl FromRow for Cupom {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Cupom {
            id: row.get(0)?,
            codigo: row.get(1)?,
            tipo: parse_enum(row, 2, "tipo")?,
            desconto: row.get(3)?,
            ativo: row.get(4)?,
            data_inicio: row.get(5)?,
            data_validade: row.get(6)?,
            uso_maximo: row.get(7)?,
            uso_por_usuario: row.get(8)?,
            valor_minimo_centavos: row.get(9)?,
            usos: row.get(10)?,
            created_at: row.get(11)?,
            updated_at: row.get(12)?,
        })
    }
}

impl FromRow for Inscricao {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Inscricao {
            id: row.get(0)?,
            codigo: row.get(1)?,
            user_id: row.get(2)?,
            lote_id: row.get(3)?,
            cupom_id: row.get(4)?,
            nome: row.get(5)?,
            cpf: row.get(6)?,
            email: row.get(7)?,
            telefone: row.get(8)?,
            data_nascimento: row.get(9)?,
            tamanho_camiseta: row.get(10)?,
            equipe: row.get(11)?,
            valor_centavos: row.get(12)?,
            status: parse_enum(row, 13, "status")?,
            created_at: row.get(14)?,
            updated_at: row.get(15)?,
        })
    }
}

impl FromRow for Pagamento {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let metodo: Option<String> = row.get(5)?;
        Ok(Pagamento {
            id: row.get(0)?,
            inscricao_id: row.get(1)?,
            transacao_id: row.get(2)?,
            valor_centavos: row.get(3)?,
            status: parse_enum(row, 4, "status")?,
            metodo: metodo
                .map(|m| {
                    m.parse().map_err(|_| {
                        rusqlite::Error::InvalidColumnType(
                            5,
                            "metodo".to_string(),
                            rusqlite::types::Type::Text,
                        )
                    })
                })
                .transpose()?,
            provedor: row.get(6)?,
            created_at: row.get(7)?,
            updated_at: row.get(8)?,
        })
    }
}
