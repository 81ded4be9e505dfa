use serde::{Deserialize, Serialize};

use super::Pagamento;

/// Registration lifecycle status.
///
/// PAGO and CANCELADO are terminal for the webhook reconciler; PENDENTE is
/// the only state checkout can still be initiated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusInscricao {
    #[serde(rename = "PENDENTE")]
    Pendente,
    #[serde(rename = "PAGO")]
    Pago,
    #[serde(rename = "CANCELADO")]
    Cancelado,
}

impl StatusInscricao {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pendente => "PENDENTE",
            Self::Pago => "PAGO",
            Self::Cancelado => "CANCELADO",
        }
    }
}

impl std::str::FromStr for StatusInscricao {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDENTE" => Ok(Self::Pendente),
            "PAGO" => Ok(Self::Pago),
            "CANCELADO" => Ok(Self::Cancelado),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for StatusInscricao {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One participant's entry in the event. 1:1 with a [`Pagamento`] row,
/// created together in a single transaction. Never deleted - cancellation
/// is a status change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Inscricao {
    pub id: String,
    /// Human-facing unique code (alphanumeric for self-service,
    /// numeric sequence for admin-created entries)
    pub codigo: String,
    pub user_id: String,
    pub lote_id: String,
    pub cupom_id: Option<String>,
    pub nome: String,
    /// CPF digits only, unique system-wide
    pub cpf: String,
    pub email: String,
    pub telefone: String,
    /// Birth date as YYYY-MM-DD
    pub data_nascimento: String,
    pub tamanho_camiseta: String,
    pub equipe: Option<String>,
    /// Amount due in centavos (lote price minus coupon discount, locked in
    /// at creation time)
    pub valor_centavos: i64,
    pub status: StatusInscricao,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Wizard form data for a new registration.
#[derive(Debug, Clone, Deserialize)]
pub struct NovaInscricao {
    pub lote_id: String,
    #[serde(default)]
    pub cupom_codigo: Option<String>,
    pub nome: String,
    pub cpf: String,
    pub email: String,
    pub telefone: String,
    pub data_nascimento: String,
    pub tamanho_camiseta: String,
    #[serde(default)]
    pub equipe: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateInscricao {
    pub nome: Option<String>,
    pub telefone: Option<String>,
    pub tamanho_camiseta: Option<String>,
    pub equipe: Option<String>,
    pub valor_centavos: Option<i64>,
    pub status: Option<StatusInscricao>,
}

/// Registration plus its payment, as returned to the participant.
#[derive(Debug, Serialize)]
pub struct InscricaoComPagamento {
    #[serde(flatten)]
    pub inscricao: Inscricao,
    pub pagamento: Pagamento,
}
