//! Test utilities and fixtures for largada integration tests

#![allow(dead_code)]

use rusqlite::Connection;

pub use largada::cupons;
pub use largada::db::{init_db, queries};
pub use largada::models::*;
pub use largada::registro::{self, OrigemInscricao};

pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Create an in-memory test database with schema initialized
pub fn setup_test_db() -> Connection {
    let conn = Connection::open_in_memory().expect("Failed to create in-memory database");
    init_db(&conn).expect("Failed to initialize schema");
    conn
}

/// Create a test user. The password hash is a fixture value - tests that
/// exercise real hashing build their own.
pub fn create_test_user(conn: &Connection, email: &str) -> User {
    let input = CreateUser {
        email: email.to_string(),
        nome: format!("Participante {}", email),
        senha: String::new(),
    };
    queries::create_user(conn, &input, "hash-de-teste").expect("Failed to create test user")
}

/// Create a lote open for sales right now, priced in centavos.
pub fn create_test_lote(conn: &Connection, valor_centavos: i64) -> Lote {
    let now = now();
    queries::create_lote(
        conn,
        &CreateLote {
            nome: "Lote Teste".to_string(),
            valor_centavos,
            data_inicio: now - 3600,
            data_fim: now + 30 * 86400,
            ativo: true,
            ordem: 1,
        },
    )
    .expect("Failed to create test lote")
}

/// Default coupon input: active, valid from an hour ago until next month,
/// no caps. Tests tweak fields before inserting.
pub fn cupom_input(codigo: &str, tipo: TipoDesconto, desconto: i64) -> CreateCupom {
    let now = now();
    CreateCupom {
        codigo: codigo.to_string(),
        tipo,
        desconto,
        ativo: true,
        data_inicio: now - 3600,
        data_validade: now + 30 * 86400,
        uso_maximo: None,
        uso_por_usuario: None,
        valor_minimo_centavos: None,
    }
}

/// Wizard form data with a given CPF (11 digits).
pub fn nova_inscricao(lote_id: &str, cpf: &str) -> NovaInscricao {
    NovaInscricao {
        lote_id: lote_id.to_string(),
        cupom_codigo: None,
        nome: "Maria Corredora".to_string(),
        cpf: cpf.to_string(),
        email: "maria@example.com".to_string(),
        telefone: "11999990000".to_string(),
        data_nascimento: "1990-05-20".to_string(),
        tamanho_camiseta: "M".to_string(),
        equipe: None,
    }
}

/// Create a registration through the real writer (self-service path).
pub fn criar_inscricao_teste(
    conn: &mut Connection,
    user: &User,
    lote: &Lote,
    cpf: &str,
) -> InscricaoComPagamento {
    let dados = nova_inscricao(&lote.id, cpf);
    registro::criar_inscricao(conn, user, &dados, OrigemInscricao::Autoatendimento)
        .expect("Failed to create test registration")
}
