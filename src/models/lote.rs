use serde::{Deserialize, Serialize};

/// Price tier ("lote") with its own sales window.
///
/// A registration locks in the lote price at creation time - the price is
/// never recomputed afterwards except by explicit admin edit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lote {
    pub id: String,
    pub nome: String,
    /// Price in centavos
    pub valor_centavos: i64,
    /// Sales window start (Unix timestamp)
    pub data_inicio: i64,
    /// Sales window end (Unix timestamp)
    pub data_fim: i64,
    pub ativo: bool,
    /// Display/sales order (1º lote, 2º lote, ...)
    pub ordem: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Lote {
    /// Whether the lote is currently open for self-service sales.
    pub fn em_vigencia(&self, now: i64) -> bool {
        now >= self.data_inicio && now <= self.data_fim
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateLote {
    pub nome: String,
    pub valor_centavos: i64,
    pub data_inicio: i64,
    pub data_fim: i64,
    #[serde(default = "default_true")]
    pub ativo: bool,
    pub ordem: i64,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateLote {
    pub nome: Option<String>,
    pub valor_centavos: Option<i64>,
    pub data_inicio: Option<i64>,
    pub data_fim: Option<i64>,
    pub ativo: Option<bool>,
    pub ordem: Option<i64>,
}
