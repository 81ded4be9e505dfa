//! Back-office query tests: listing with filters and pagination, partial
//! updates and the lote selection rules.

mod common;

use common::*;
use largada::pagination::PaginationQuery;

fn inscrever_varios(conn: &mut rusqlite::Connection, lote: &Lote, quantos: usize) {
    for i in 0..quantos {
        let user = create_test_user(conn, &format!("p{}@example.com", i));
        let cpf = format!("{:011}", 10000000000u64 + i as u64);
        criar_inscricao_teste(conn, &user, lote, &cpf);
    }
}

#[test]
fn test_listagem_paginada() {
    let mut conn = setup_test_db();
    let lote = create_test_lote(&conn, 10000);
    inscrever_varios(&mut conn, &lote, 5);

    let pagina = queries::list_inscricoes(&conn, None, 2, 0).unwrap();
    assert_eq!(pagina.len(), 2);
    let resto = queries::list_inscricoes(&conn, None, 10, 4).unwrap();
    assert_eq!(resto.len(), 1);
    assert_eq!(queries::count_inscricoes(&conn, None).unwrap(), 5);
}

#[test]
fn test_filtro_por_status() {
    let mut conn = setup_test_db();
    let lote = create_test_lote(&conn, 10000);
    inscrever_varios(&mut conn, &lote, 3);

    // Confirm one of them by hand
    let todas = queries::list_inscricoes(&conn, None, 10, 0).unwrap();
    queries::update_inscricao(
        &conn,
        &todas[0].id,
        &UpdateInscricao {
            status: Some(StatusInscricao::Pago),
            ..Default::default()
        },
    )
    .unwrap();

    let pagas = queries::list_inscricoes(&conn, Some(StatusInscricao::Pago), 10, 0).unwrap();
    assert_eq!(pagas.len(), 1);
    assert_eq!(
        queries::count_inscricoes(&conn, Some(StatusInscricao::Pendente)).unwrap(),
        2
    );
}

#[test]
fn test_pagination_query_limites() {
    let q = PaginationQuery::default();
    assert_eq!(q.limit(), 50);
    assert_eq!(q.offset(), 0);

    let q = PaginationQuery {
        limit: Some(1000),
        offset: Some(-5),
    };
    assert_eq!(q.limit(), 100);
    assert_eq!(q.offset(), 0);

    let q = PaginationQuery {
        limit: Some(0),
        offset: Some(3),
    };
    assert_eq!(q.limit(), 1);
    assert_eq!(q.offset(), 3);
}

#[test]
fn test_update_parcial_de_inscricao() {
    let mut conn = setup_test_db();
    let user = create_test_user(&conn, "a@example.com");
    let lote = create_test_lote(&conn, 10000);
    let criada = criar_inscricao_teste(&mut conn, &user, &lote, "52998224725");

    let atualizada = queries::update_inscricao(
        &conn,
        &criada.inscricao.id,
        &UpdateInscricao {
            tamanho_camiseta: Some("G".to_string()),
            ..Default::default()
        },
    )
    .unwrap()
    .unwrap();

    // Only the named field changed
    assert_eq!(atualizada.tamanho_camiseta, "G");
    assert_eq!(atualizada.nome, criada.inscricao.nome);
    assert_eq!(atualizada.valor_centavos, criada.inscricao.valor_centavos);
    assert!(atualizada.updated_at >= criada.inscricao.updated_at);
}

#[test]
fn test_update_de_id_inexistente() {
    let conn = setup_test_db();
    let resultado = queries::update_inscricao(
        &conn,
        "nao-existe",
        &UpdateInscricao {
            nome: Some("X".to_string()),
            ..Default::default()
        },
    )
    .unwrap();
    assert!(resultado.is_none());
}

#[test]
fn test_update_de_cupom_desativa() {
    let conn = setup_test_db();
    let cupom = queries::create_cupom(&conn, &cupom_input("DEZ", TipoDesconto::Percentual, 10))
        .unwrap();

    let atualizado = queries::update_cupom(
        &conn,
        &cupom.id,
        &UpdateCupom {
            ativo: Some(false),
            desconto: Some(15),
            ..Default::default()
        },
    )
    .unwrap()
    .unwrap();
    assert!(!atualizado.ativo);
    assert_eq!(atualizado.desconto, 15);
    assert_eq!(atualizado.codigo, "DEZ");
}

#[test]
fn test_cupom_detalhe_campos_derivados() {
    let conn = setup_test_db();
    let agora = now();
    let mut input = cupom_input("VELHO", TipoDesconto::Fixo, 500);
    input.data_inicio = agora - 2 * 86400;
    input.data_validade = agora - 86400;
    let cupom = queries::create_cupom(&conn, &input).unwrap();

    let detalhe = CupomDetalhe::new(cupom, agora);
    assert!(detalhe.expirado);
    assert_eq!(detalhe.total_usos, 0);
}

#[test]
fn test_lote_atual_respeita_ordem_e_vigencia() {
    let conn = setup_test_db();
    let agora = now();

    // Second tier is open too, but the first tier wins by ordem
    for (nome, ordem, inicio, fim) in [
        ("2º Lote", 2, agora - 3600, agora + 86400),
        ("1º Lote", 1, agora - 3600, agora + 86400),
        ("Lote Futuro", 0, agora + 86400, agora + 2 * 86400),
    ] {
        queries::create_lote(
            &conn,
            &CreateLote {
                nome: nome.to_string(),
                valor_centavos: 10000,
                data_inicio: inicio,
                data_fim: fim,
                ativo: true,
                ordem,
            },
        )
        .unwrap();
    }

    let atual = queries::lote_atual(&conn, agora).unwrap().unwrap();
    assert_eq!(atual.nome, "1º Lote");
}

#[test]
fn test_lote_atual_ignora_inativos() {
    let conn = setup_test_db();
    let agora = now();
    queries::create_lote(
        &conn,
        &CreateLote {
            nome: "Desligado".to_string(),
            valor_centavos: 10000,
            data_inicio: agora - 3600,
            data_fim: agora + 86400,
            ativo: false,
            ordem: 1,
        },
    )
    .unwrap();

    assert!(queries::lote_atual(&conn, agora).unwrap().is_none());
}

#[test]
fn test_list_lotes_somente_ativos() {
    let conn = setup_test_db();
    create_test_lote(&conn, 10000);
    let agora = now();
    queries::create_lote(
        &conn,
        &CreateLote {
            nome: "Oculto".to_string(),
            valor_centavos: 20000,
            data_inicio: agora,
            data_fim: agora + 86400,
            ativo: false,
            ordem: 2,
        },
    )
    .unwrap();

    assert_eq!(queries::list_lotes(&conn, true).unwrap().len(), 1);
    assert_eq!(queries::list_lotes(&conn, false).unwrap().len(), 2);
}

#[test]
fn test_emails_inscritos_por_status() {
    let mut conn = setup_test_db();
    let lote = create_test_lote(&conn, 10000);
    inscrever_varios(&mut conn, &lote, 2);

    let todas = queries::list_inscricoes(&conn, None, 10, 0).unwrap();
    queries::update_inscricao(
        &conn,
        &todas[0].id,
        &UpdateInscricao {
            status: Some(StatusInscricao::Pago),
            ..Default::default()
        },
    )
    .unwrap();

    assert_eq!(queries::emails_inscritos(&conn, None).unwrap().len(), 2);
    let pagos = queries::emails_inscritos(&conn, Some(StatusInscricao::Pago)).unwrap();
    assert_eq!(pagos.len(), 1);
}
