pub mod common;
pub mod mercadopago;
pub mod pagbank;
