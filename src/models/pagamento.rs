use serde::{Deserialize, Serialize};

/// Payment status. Ranked so the reconciler can reject stale notifications:
/// a terminal status is never overwritten by a late PENDENTE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusPagamento {
    #[serde(rename = "PENDENTE")]
    Pendente,
    #[serde(rename = "APROVADO")]
    Aprovado,
    #[serde(rename = "RECUSADO")]
    Recusado,
    #[serde(rename = "REEMBOLSADO")]
    Reembolsado,
}

impl StatusPagamento {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pendente => "PENDENTE",
            Self::Aprovado => "APROVADO",
            Self::Recusado => "RECUSADO",
            Self::Reembolsado => "REEMBOLSADO",
        }
    }

    /// Ordering rank for the reorder guard: terminal states outrank PENDENTE.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Pendente => 0,
            Self::Aprovado | Self::Recusado | Self::Reembolsado => 1,
        }
    }
}

impl std::str::FromStr for StatusPagamento {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDENTE" => Ok(Self::Pendente),
            "APROVADO" => Ok(Self::Aprovado),
            "RECUSADO" => Ok(Self::Recusado),
            "REEMBOLSADO" => Ok(Self::Reembolsado),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for StatusPagamento {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Payment method chosen at checkout time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetodoPagamento {
    /// Mercado Pago hosted checkout (method picked on their page)
    #[serde(rename = "MERCADO_PAGO")]
    MercadoPago,
    /// PagBank PIX - no surcharge
    #[serde(rename = "PIX")]
    Pix,
    /// PagBank credit card - carries the fixed 4.16% surcharge
    #[serde(rename = "CARTAO")]
    Cartao,
}

impl MetodoPagamento {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MercadoPago => "MERCADO_PAGO",
            Self::Pix => "PIX",
            Self::Cartao => "CARTAO",
        }
    }
}

impl std::str::FromStr for MetodoPagamento {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MERCADO_PAGO" => Ok(Self::MercadoPago),
            "PIX" => Ok(Self::Pix),
            "CARTAO" => Ok(Self::Cartao),
            _ => Err(()),
        }
    }
}

/// 1:1 with an [`super::Inscricao`]. Created with a synthetic placeholder
/// `transacao_id` in the same transaction as the registration; the real
/// provider transaction id is filled in by checkout and by the webhook
/// reconciler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pagamento {
    pub id: String,
    pub inscricao_id: String,
    pub transacao_id: String,
    pub valor_centavos: i64,
    pub status: StatusPagamento,
    pub metodo: Option<MetodoPagamento>,
    /// "mercadopago" or "pagbank"
    pub provedor: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}
