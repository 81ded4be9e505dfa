mod from_row;
mod schema;
pub mod queries;

pub use from_row::FromRow;
pub use schema::init_db;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::email::EmailService;

pub type DbPool = Pool<SqliteConnectionManager>;

/// Application state shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    /// Base URL for provider callbacks (e.g., https://api.example.com)
    pub base_url: String,
    pub email: EmailService,
    /// Mercado Pago access token (None = provider disabled)
    pub mercadopago_token: Option<String>,
    /// PagBank API token (None = provider disabled)
    pub pagbank_token: Option<String>,
}

pub fn create_pool(database_path: &str) -> Result<DbPool, r2d2::Error> {
    let manager = SqliteConnectionManager::file(database_path);
    Pool::builder().max_size(10).build(manager)
}
