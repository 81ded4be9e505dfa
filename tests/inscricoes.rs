//! Registration creation tests: the inscricao/pagamento pair, uniqueness
//! rules, lote window enforcement and coupon consumption.

mod common;

use common::*;
use largada::error::AppError;

#[test]
fn test_cria_par_inscricao_pagamento() {
    let mut conn = setup_test_db();
    let user = create_test_user(&conn, "a@example.com");
    let lote = create_test_lote(&conn, 10000);

    let criada = criar_inscricao_teste(&mut conn, &user, &lote, "52998224725");

    assert_eq!(criada.inscricao.valor_centavos, 10000);
    assert_eq!(criada.inscricao.status, StatusInscricao::Pendente);
    assert_eq!(criada.pagamento.inscricao_id, criada.inscricao.id);
    assert_eq!(criada.pagamento.valor_centavos, 10000);
    assert_eq!(criada.pagamento.status, StatusPagamento::Pendente);
    assert!(criada.pagamento.metodo.is_none());

    // Both rows actually landed
    let ins = queries::get_inscricao_by_user(&conn, &user.id).unwrap().unwrap();
    assert_eq!(ins.id, criada.inscricao.id);
    let pag = queries::get_pagamento_by_inscricao(&conn, &ins.id).unwrap().unwrap();
    assert_eq!(pag.id, criada.pagamento.id);
}

#[test]
fn test_codigo_publico_tem_formato_lrg() {
    let mut conn = setup_test_db();
    let user = create_test_user(&conn, "a@example.com");
    let lote = create_test_lote(&conn, 10000);

    let criada = criar_inscricao_teste(&mut conn, &user, &lote, "52998224725");

    let codigo = &criada.inscricao.codigo;
    assert!(codigo.starts_with("LRG-"), "got {}", codigo);
    assert_eq!(codigo.len(), 10);
    // No ambiguous characters in the suffix
    for c in codigo[4..].chars() {
        assert!(!"0O1I".contains(c), "ambiguous char {} in {}", c, codigo);
    }
}

#[test]
fn test_usuario_nao_pode_se_inscrever_duas_vezes() {
    let mut conn = setup_test_db();
    let user = create_test_user(&conn, "a@example.com");
    let lote = create_test_lote(&conn, 10000);

    criar_inscricao_teste(&mut conn, &user, &lote, "52998224725");

    let dados = nova_inscricao(&lote.id, "11144477735");
    let err = registro::criar_inscricao(&mut conn, &user, &dados, OrigemInscricao::Autoatendimento)
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[test]
fn test_cpf_nao_pode_repetir() {
    let mut conn = setup_test_db();
    let lote = create_test_lote(&conn, 10000);
    let user1 = create_test_user(&conn, "um@example.com");
    let user2 = create_test_user(&conn, "dois@example.com");

    criar_inscricao_teste(&mut conn, &user1, &lote, "52998224725");

    let dados = nova_inscricao(&lote.id, "529.982.247-25");
    let err = registro::criar_inscricao(&mut conn, &user2, &dados, OrigemInscricao::Autoatendimento)
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[test]
fn test_cpf_normalizado_para_digitos() {
    let mut conn = setup_test_db();
    let user = create_test_user(&conn, "a@example.com");
    let lote = create_test_lote(&conn, 10000);

    let dados = nova_inscricao(&lote.id, "529.982.247-25");
    let criada =
        registro::criar_inscricao(&mut conn, &user, &dados, OrigemInscricao::Autoatendimento)
            .unwrap();
    assert_eq!(criada.inscricao.cpf, "52998224725");
}

#[test]
fn test_cpf_com_tamanho_errado() {
    let mut conn = setup_test_db();
    let user = create_test_user(&conn, "a@example.com");
    let lote = create_test_lote(&conn, 10000);

    let dados = nova_inscricao(&lote.id, "12345");
    let err = registro::criar_inscricao(&mut conn, &user, &dados, OrigemInscricao::Autoatendimento)
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
}

#[test]
fn test_lote_fora_do_periodo_bloqueia_autoatendimento() {
    let mut conn = setup_test_db();
    let user = create_test_user(&conn, "a@example.com");
    let agora = now();
    let lote = queries::create_lote(
        &conn,
        &CreateLote {
            nome: "Lote Encerrado".to_string(),
            valor_centavos: 10000,
            data_inicio: agora - 10 * 86400,
            data_fim: agora - 86400,
            ativo: true,
            ordem: 1,
        },
    )
    .unwrap();

    let dados = nova_inscricao(&lote.id, "52998224725");
    let err = registro::criar_inscricao(&mut conn, &user, &dados, OrigemInscricao::Autoatendimento)
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    // The admin path ignores the sales window
    registro::criar_inscricao(&mut conn, &user, &dados, OrigemInscricao::Admin)
        .expect("admin path should bypass the window");
}

#[test]
fn test_lote_inativo_bloqueia_todas_as_origens() {
    let mut conn = setup_test_db();
    let user = create_test_user(&conn, "a@example.com");
    let agora = now();
    let lote = queries::create_lote(
        &conn,
        &CreateLote {
            nome: "Lote Desligado".to_string(),
            valor_centavos: 10000,
            data_inicio: agora - 3600,
            data_fim: agora + 86400,
            ativo: false,
            ordem: 1,
        },
    )
    .unwrap();

    let dados = nova_inscricao(&lote.id, "52998224725");
    for origem in [OrigemInscricao::Autoatendimento, OrigemInscricao::Admin] {
        let err = registro::criar_inscricao(&mut conn, &user, &dados, origem).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}

#[test]
fn test_lote_inexistente() {
    let mut conn = setup_test_db();
    let user = create_test_user(&conn, "a@example.com");

    let dados = nova_inscricao("nao-existe", "52998224725");
    let err = registro::criar_inscricao(&mut conn, &user, &dados, OrigemInscricao::Autoatendimento)
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[test]
fn test_cupom_aplica_desconto_no_par() {
    let mut conn = setup_test_db();
    let user = create_test_user(&conn, "a@example.com");
    let lote = create_test_lote(&conn, 10000);
    let cupom = queries::create_cupom(&conn, &cupom_input("DEZ", TipoDesconto::Percentual, 10))
        .unwrap();

    let mut dados = nova_inscricao(&lote.id, "52998224725");
    dados.cupom_codigo = Some("dez".to_string());
    let criada =
        registro::criar_inscricao(&mut conn, &user, &dados, OrigemInscricao::Autoatendimento)
            .unwrap();

    assert_eq!(criada.inscricao.valor_centavos, 9000);
    assert_eq!(criada.pagamento.valor_centavos, 9000);
    assert_eq!(criada.inscricao.cupom_id.as_deref(), Some(cupom.id.as_str()));

    let atualizado = queries::get_cupom_by_id(&conn, &cupom.id).unwrap().unwrap();
    assert_eq!(atualizado.usos, 1);
}

#[test]
fn test_cupom_fixo_pode_zerar_o_valor() {
    let mut conn = setup_test_db();
    let user = create_test_user(&conn, "a@example.com");
    let lote = create_test_lote(&conn, 5000);
    queries::create_cupom(&conn, &cupom_input("CORTESIA", TipoDesconto::Fixo, 8000)).unwrap();

    let mut dados = nova_inscricao(&lote.id, "52998224725");
    dados.cupom_codigo = Some("CORTESIA".to_string());
    let criada =
        registro::criar_inscricao(&mut conn, &user, &dados, OrigemInscricao::Autoatendimento)
            .unwrap();

    assert_eq!(criada.inscricao.valor_centavos, 0);
}

#[test]
fn test_cupom_codigo_vazio_e_ignorado() {
    let mut conn = setup_test_db();
    let user = create_test_user(&conn, "a@example.com");
    let lote = create_test_lote(&conn, 10000);

    let mut dados = nova_inscricao(&lote.id, "52998224725");
    dados.cupom_codigo = Some("   ".to_string());
    let criada =
        registro::criar_inscricao(&mut conn, &user, &dados, OrigemInscricao::Autoatendimento)
            .unwrap();
    assert!(criada.inscricao.cupom_id.is_none());
    assert_eq!(criada.inscricao.valor_centavos, 10000);
}

#[test]
fn test_cupom_esgotado_nao_deixa_inscricao_parcial() {
    let mut conn = setup_test_db();
    let lote = create_test_lote(&conn, 10000);
    let mut input = cupom_input("UNICO", TipoDesconto::Percentual, 10);
    input.uso_maximo = Some(1);
    let cupom = queries::create_cupom(&conn, &input).unwrap();

    let user1 = create_test_user(&conn, "um@example.com");
    let mut dados1 = nova_inscricao(&lote.id, "52998224725");
    dados1.cupom_codigo = Some("UNICO".to_string());
    registro::criar_inscricao(&mut conn, &user1, &dados1, OrigemInscricao::Autoatendimento)
        .unwrap();

    let user2 = create_test_user(&conn, "dois@example.com");
    let mut dados2 = nova_inscricao(&lote.id, "11144477735");
    dados2.cupom_codigo = Some("UNICO".to_string());
    let err =
        registro::criar_inscricao(&mut conn, &user2, &dados2, OrigemInscricao::Autoatendimento)
            .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    // The failed attempt rolled everything back
    assert!(queries::get_inscricao_by_user(&conn, &user2.id).unwrap().is_none());
    let atualizado = queries::get_cupom_by_id(&conn, &cupom.id).unwrap().unwrap();
    assert_eq!(atualizado.usos, 1);
}

#[test]
fn test_codigo_numerico_incrementa_no_fluxo_admin() {
    let mut conn = setup_test_db();
    let lote = create_test_lote(&conn, 10000);

    let user1 = create_test_user(&conn, "um@example.com");
    let dados1 = nova_inscricao(&lote.id, "52998224725");
    let c1 = registro::criar_inscricao(&mut conn, &user1, &dados1, OrigemInscricao::Admin).unwrap();
    assert_eq!(c1.inscricao.codigo, "1");

    let user2 = create_test_user(&conn, "dois@example.com");
    let dados2 = nova_inscricao(&lote.id, "11144477735");
    let c2 = registro::criar_inscricao(&mut conn, &user2, &dados2, OrigemInscricao::Admin).unwrap();
    assert_eq!(c2.inscricao.codigo, "2");

    // Random self-service codes don't feed the numeric sequence
    let user3 = create_test_user(&conn, "tres@example.com");
    criar_inscricao_teste(&mut conn, &user3, &lote, "39053344705");
    assert_eq!(queries::proximo_codigo_numerico(&conn).unwrap(), 3);
}

#[test]
fn test_email_normalizado_minusculo() {
    let mut conn = setup_test_db();
    let user = create_test_user(&conn, "a@example.com");
    let lote = create_test_lote(&conn, 10000);

    let mut dados = nova_inscricao(&lote.id, "52998224725");
    dados.email = "  Maria@Example.COM ".to_string();
    let criada =
        registro::criar_inscricao(&mut conn, &user, &dados, OrigemInscricao::Autoatendimento)
            .unwrap();
    assert_eq!(criada.inscricao.email, "maria@example.com");
}
