use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use largada::auth;
use largada::config::Config;
use largada::db::{create_pool, init_db, queries, AppState};
use largada::email::EmailService;
use largada::handlers;
use largada::models::{CreateLote, CreateUser};

#[derive(Parser, Debug)]
#[command(name = "largada")]
#[command(about = "Race-event registration backend")]
struct Cli {
    /// Seed the database with dev data (admin user and a first lote)
    #[arg(long)]
    seed: bool,
}

fn seed_dev_data(state: &AppState) {
    let conn = state.db.get().expect("Failed to get db connection for seed");

    let count = queries::count_users(&conn).expect("Failed to count users");
    if count > 0 {
        tracing::info!("Users already exist, skipping seed");
        return;
    }

    let senha_hash = auth::hash_senha("admin-dev-senha").expect("Failed to hash seed password");
    let admin = queries::create_user(
        &conn,
        &CreateUser {
            email: "admin@largada.run".to_string(),
            nome: "Admin Dev".to_string(),
            senha: String::new(),
        },
        &senha_hash,
    )
    .expect("Failed to create seed admin");
    queries::set_user_admin(&conn, &admin.id, true).expect("Failed to promote seed admin");

    let now = chrono::Utc::now().timestamp();
    queries::create_lote(
        &conn,
        &CreateLote {
            nome: "1º Lote".to_string(),
            valor_centavos: 10000,
            data_inicio: now,
            data_fim: now + 30 * 86400,
            ativo: true,
            ordem: 1,
        },
    )
    .expect("Failed to create seed lote");

    tracing::info!("Seeded dev data: admin@largada.run / 1º Lote");
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = Config::from_env();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "largada=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let pool = create_pool(&config.database_path).expect("Failed to create database pool");
    {
        let conn = pool.get().expect("Failed to get database connection");
        init_db(&conn).expect("Failed to initialize database schema");
    }

    let state = AppState {
        db: pool,
        base_url: config.base_url.clone(),
        email: EmailService::new(config.resend_api_key.clone(), config.email_from.clone()),
        mercadopago_token: config.mercadopago_access_token.clone(),
        pagbank_token: config.pagbank_token.clone(),
    };

    if cli.seed {
        if !config.dev_mode {
            tracing::warn!("--seed requested outside dev mode, refusing");
        } else {
            seed_dev_data(&state);
        }
    }

    let app = handlers::router(state).layer(TraceLayer::new_for_http());

    let addr = config.addr();
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind listener");
    axum::serve(listener, app).await.expect("Server error");
}
