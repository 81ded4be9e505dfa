mod mercadopago;
mod pagbank;

pub use mercadopago::*;
pub use pagbank::*;

use crate::models::{MetodoPagamento, StatusInscricao, StatusPagamento};

/// Fixed surcharge applied to card checkouts: 4.16% (valor × 1.0416).
/// Expressed as a rational so amounts stay in integer centavos.
const ACRESCIMO_CARTAO_NUM: i64 = 10416;
const ACRESCIMO_CARTAO_DEN: i64 = 10000;

/// Amount actually charged for a method. PIX and Mercado Pago charge the
/// stored amount; CARTAO carries the fixed surcharge, rounded to the
/// nearest centavo.
pub fn valor_cobrado(valor_centavos: i64, metodo: MetodoPagamento) -> i64 {
    match metodo {
        MetodoPagamento::Cartao => {
            (valor_centavos * ACRESCIMO_CARTAO_NUM + ACRESCIMO_CARTAO_DEN / 2)
                / ACRESCIMO_CARTAO_DEN
        }
        MetodoPagamento::MercadoPago | MetodoPagamento::Pix => valor_centavos,
    }
}

/// Provider-agnostic payment status, normalized from raw provider strings.
///
/// Unrecognized statuses normalize to `Pendente`, which the reconciler
/// treats as a no-op, so an unknown provider state can never corrupt a
/// registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusNormalizado {
    Aprovado,
    Pendente,
    Recusado,
    Reembolsado,
}

impl StatusNormalizado {
    pub fn from_provider(raw: &str) -> Self {
        match raw {
            // Mercado Pago
            "approved" => Self::Aprovado,
            "pending" | "in_process" | "in_mediation" => Self::Pendente,
            "rejected" | "cancelled" => Self::Recusado,
            "refunded" | "charged_back" => Self::Reembolsado,
            // PagBank charges
            "PAID" | "AUTHORIZED" => Self::Aprovado,
            "WAITING" | "IN_ANALYSIS" => Self::Pendente,
            "DECLINED" | "CANCELED" => Self::Recusado,
            "REFUNDED" => Self::Reembolsado,
            other => {
                tracing::warn!("Unrecognized provider status '{}', treating as pending", other);
                Self::Pendente
            }
        }
    }

    /// The (inscricao, pagamento) status pair this event transitions to.
    pub fn transicao(&self) -> (StatusInscricao, StatusPagamento) {
        match self {
            Self::Aprovado => (StatusInscricao::Pago, StatusPagamento::Aprovado),
            Self::Pendente => (StatusInscricao::Pendente, StatusPagamento::Pendente),
            Self::Recusado => (StatusInscricao::Cancelado, StatusPagamento::Recusado),
            Self::Reembolsado => (StatusInscricao::Cancelado, StatusPagamento::Reembolsado),
        }
    }
}
