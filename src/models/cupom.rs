use serde::{Deserialize, Serialize};

/// Discount kind for a coupon.
///
/// `desconto` is interpreted according to the kind: percent points for
/// `Percentual` (10 = 10%), centavos for `Fixo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TipoDesconto {
    #[serde(rename = "PERCENTUAL")]
    Percentual,
    #[serde(rename = "FIXO")]
    Fixo,
}

impl TipoDesconto {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Percentual => "PERCENTUAL",
            Self::Fixo => "FIXO",
        }
    }
}

impl std::str::FromStr for TipoDesconto {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PERCENTUAL" => Ok(Self::Percentual),
            "FIXO" => Ok(Self::Fixo),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cupom {
    pub id: String,
    /// Normalized uppercase, unique
    pub codigo: String,
    pub tipo: TipoDesconto,
    pub desconto: i64,
    pub ativo: bool,
    /// Validity window start (Unix timestamp)
    pub data_inicio: i64,
    /// Validity window end (Unix timestamp)
    pub data_validade: i64,
    /// Global use cap (None = unlimited)
    pub uso_maximo: Option<i64>,
    /// Per-user use cap (None = unlimited)
    pub uso_por_usuario: Option<i64>,
    /// Minimum order value in centavos (None = no minimum)
    pub valor_minimo_centavos: Option<i64>,
    /// Consumed uses. Incremented atomically inside the registration
    /// transaction so a capped coupon can never be oversold.
    pub usos: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Cupom {
    pub fn expirado(&self, now: i64) -> bool {
        now > self.data_validade
    }
}

/// Admin-facing view of a coupon with derived fields.
#[derive(Debug, Serialize)]
pub struct CupomDetalhe {
    #[serde(flatten)]
    pub cupom: Cupom,
    pub expirado: bool,
    /// Registrations referencing this coupon (same as the `usos` counter,
    /// kept in the payload under the name the dashboard expects)
    pub total_usos: i64,
}

impl CupomDetalhe {
    pub fn new(cupom: Cupom, now: i64) -> Self {
        let expirado = cupom.expirado(now);
        let total_usos = cupom.usos;
        Self {
            cupom,
            expirado,
            total_usos,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateCupom {
    pub codigo: String,
    pub tipo: TipoDesconto,
    pub desconto: i64,
    #[serde(default = "default_true")]
    pub ativo: bool,
    pub data_inicio: i64,
    pub data_validade: i64,
    #[serde(default)]
    pub uso_maximo: Option<i64>,
    #[serde(default)]
    pub uso_por_usuario: Option<i64>,
    #[serde(default)]
    pub valor_minimo_centavos: Option<i64>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateCupom {
    pub tipo: Option<TipoDesconto>,
    pub desconto: Option<i64>,
    pub ativo: Option<bool>,
    pub data_inicio: Option<i64>,
    pub data_validade: Option<i64>,
    pub uso_maximo: Option<i64>,
    pub uso_por_usuario: Option<i64>,
    pub valor_minimo_centavos: Option<i64>,
}
