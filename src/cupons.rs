//! Coupon validation and discount computation.
//!
//! Validation is a pure read: it never consumes a use. Consumption happens
//! inside the registration transaction ([`crate::registro`]) with an atomic
//! conditional counter increment, so the check here is advisory for the
//! per-request error message while the transaction enforces the cap.

use rusqlite::Connection;

use crate::db::queries;
use crate::error::{msg, AppError, Result};
use crate::models::{Cupom, TipoDesconto};

/// Outcome of a successful validation.
#[derive(Debug, Clone)]
pub struct CupomValidado {
    pub cupom: Cupom,
    /// Discount in centavos, already clamped to [0, valor_base]
    pub desconto_centavos: i64,
    /// Net amount after discount
    pub valor_final_centavos: i64,
}

/// Compute the discount a coupon grants over a base amount, in centavos.
///
/// PERCENTUAL: valor * desconto / 100. FIXO: desconto flat. Either way the
/// result is clamped so the net price never goes below zero.
pub fn calcular_desconto(cupom: &Cupom, valor_base_centavos: i64) -> i64 {
    let bruto = match cupom.tipo {
        TipoDesconto::Percentual => valor_base_centavos * cupom.desconto / 100,
        TipoDesconto::Fixo => cupom.desconto,
    };
    bruto.clamp(0, valor_base_centavos)
}

/// Validate a coupon for a user against a base amount.
///
/// Checks run in order and short-circuit on the first failure: existence,
/// active flag, validity window (not-yet-valid and expired are distinct
/// errors), global cap, per-user cap, minimum order value.
pub fn validar_cupom(
    conn: &Connection,
    codigo: &str,
    valor_base_centavos: i64,
    user_id: &str,
    now: i64,
) -> Result<CupomValidado> {
    let cupom = queries::get_cupom_by_codigo(conn, codigo)?
        .ok_or_else(|| AppError::NotFound(msg::CUPOM_NOT_FOUND.into()))?;

    if !cupom.ativo {
        return Err(AppError::BadRequest(msg::CUPOM_INATIVO.into()));
    }

    if now < cupom.data_inicio {
        return Err(AppError::BadRequest(msg::CUPOM_AINDA_NAO_VALIDO.into()));
    }
    if cupom.expirado(now) {
        return Err(AppError::BadRequest(msg::CUPOM_EXPIRADO.into()));
    }

    if let Some(maximo) = cupom.uso_maximo {
        if cupom.usos >= maximo {
            return Err(AppError::Conflict(msg::CUPOM_LIMITE_ATINGIDO.into()));
        }
    }

    if let Some(por_usuario) = cupom.uso_por_usuario {
        let usados = queries::usos_do_usuario(conn, &cupom.id, user_id)?;
        if usados >= por_usuario {
            return Err(AppError::Conflict(msg::CUPOM_LIMITE_USUARIO.into()));
        }
    }

    if let Some(minimo) = cupom.valor_minimo_centavos {
        if valor_base_centavos < minimo {
            return Err(AppError::BadRequest(msg::CUPOM_VALOR_MINIMO.into()));
        }
    }

    let desconto_centavos = calcular_desconto(&cupom, valor_base_centavos);
    let valor_final_centavos = valor_base_centavos - desconto_centavos;

    Ok(CupomValidado {
        cupom,
        desconto_centavos,
        valor_final_centavos,
    })
}
