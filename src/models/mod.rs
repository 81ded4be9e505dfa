mod cupom;
mod inscricao;
mod lote;
mod pagamento;
mod user;

pub use cupom::*;
pub use inscricao::*;
pub use lote::*;
pub use pagamento::*;
pub use user::*;
