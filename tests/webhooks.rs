//! Webhook reconciliation tests: the status state machine, idempotent
//! redelivery, stale-notification handling and provider payload parsing.

mod common;

use common::*;
use largada::handlers::webhooks::common::{reconciliar, EventoPagamento, Reconciliacao};
use largada::payments::{
    extrair_link_pay, MpWebhook, PagBankLink, PagBankNotification, StatusNormalizado,
};

fn evento(inscricao_id: &str, status: StatusNormalizado) -> EventoPagamento {
    EventoPagamento {
        inscricao_id: inscricao_id.to_string(),
        transacao_id: "mp-123".to_string(),
        status,
        metodo: None,
    }
}

#[test]
fn test_aprovacao_confirma_inscricao() {
    let mut conn = setup_test_db();
    let user = create_test_user(&conn, "a@example.com");
    let lote = create_test_lote(&conn, 10000);
    let criada = criar_inscricao_teste(&mut conn, &user, &lote, "52998224725");

    let resultado = reconciliar(
        &mut conn,
        &evento(&criada.inscricao.id, StatusNormalizado::Aprovado),
    )
    .unwrap();

    match resultado {
        Reconciliacao::Aplicada {
            inscricao,
            primeira_confirmacao,
        } => {
            assert_eq!(inscricao.status, StatusInscricao::Pago);
            assert!(primeira_confirmacao);
        }
        other => panic!("expected Aplicada, got {:?}", other),
    }

    let ins = queries::get_inscricao_by_id(&conn, &criada.inscricao.id).unwrap().unwrap();
    assert_eq!(ins.status, StatusInscricao::Pago);
    let pag = queries::get_pagamento_by_inscricao(&conn, &ins.id).unwrap().unwrap();
    assert_eq!(pag.status, StatusPagamento::Aprovado);
    assert_eq!(pag.transacao_id, "mp-123");
}

#[test]
fn test_redelivery_e_idempotente() {
    let mut conn = setup_test_db();
    let user = create_test_user(&conn, "a@example.com");
    let lote = create_test_lote(&conn, 10000);
    let criada = criar_inscricao_teste(&mut conn, &user, &lote, "52998224725");
    let ev = evento(&criada.inscricao.id, StatusNormalizado::Aprovado);

    let primeiro = reconciliar(&mut conn, &ev).unwrap();
    let segundo = reconciliar(&mut conn, &ev).unwrap();

    // Both apply, but only the first flags the confirmation email
    assert!(matches!(
        primeiro,
        Reconciliacao::Aplicada {
            primeira_confirmacao: true,
            ..
        }
    ));
    assert!(matches!(
        segundo,
        Reconciliacao::Aplicada {
            primeira_confirmacao: false,
            ..
        }
    ));

    let ins = queries::get_inscricao_by_id(&conn, &criada.inscricao.id).unwrap().unwrap();
    assert_eq!(ins.status, StatusInscricao::Pago);
}

#[test]
fn test_pendente_depois_de_pago_e_obsoleto() {
    let mut conn = setup_test_db();
    let user = create_test_user(&conn, "a@example.com");
    let lote = create_test_lote(&conn, 10000);
    let criada = criar_inscricao_teste(&mut conn, &user, &lote, "52998224725");

    reconciliar(
        &mut conn,
        &evento(&criada.inscricao.id, StatusNormalizado::Aprovado),
    )
    .unwrap();

    // An out-of-order pending notification must not undo the payment
    let resultado = reconciliar(
        &mut conn,
        &evento(&criada.inscricao.id, StatusNormalizado::Pendente),
    )
    .unwrap();
    assert!(matches!(resultado, Reconciliacao::Ignorada(_)));

    let ins = queries::get_inscricao_by_id(&conn, &criada.inscricao.id).unwrap().unwrap();
    assert_eq!(ins.status, StatusInscricao::Pago);
    let pag = queries::get_pagamento_by_inscricao(&conn, &ins.id).unwrap().unwrap();
    assert_eq!(pag.status, StatusPagamento::Aprovado);
}

#[test]
fn test_pendente_sobre_pendente_e_noop() {
    let mut conn = setup_test_db();
    let user = create_test_user(&conn, "a@example.com");
    let lote = create_test_lote(&conn, 10000);
    let criada = criar_inscricao_teste(&mut conn, &user, &lote, "52998224725");

    let resultado = reconciliar(
        &mut conn,
        &evento(&criada.inscricao.id, StatusNormalizado::Pendente),
    )
    .unwrap();
    assert!(matches!(resultado, Reconciliacao::Ignorada(_)));

    let ins = queries::get_inscricao_by_id(&conn, &criada.inscricao.id).unwrap().unwrap();
    assert_eq!(ins.status, StatusInscricao::Pendente);
}

#[test]
fn test_recusa_cancela_inscricao() {
    let mut conn = setup_test_db();
    let user = create_test_user(&conn, "a@example.com");
    let lote = create_test_lote(&conn, 10000);
    let criada = criar_inscricao_teste(&mut conn, &user, &lote, "52998224725");

    let resultado = reconciliar(
        &mut conn,
        &evento(&criada.inscricao.id, StatusNormalizado::Recusado),
    )
    .unwrap();
    assert!(matches!(
        resultado,
        Reconciliacao::Aplicada {
            primeira_confirmacao: false,
            ..
        }
    ));

    let ins = queries::get_inscricao_by_id(&conn, &criada.inscricao.id).unwrap().unwrap();
    assert_eq!(ins.status, StatusInscricao::Cancelado);
    let pag = queries::get_pagamento_by_inscricao(&conn, &ins.id).unwrap().unwrap();
    assert_eq!(pag.status, StatusPagamento::Recusado);
}

#[test]
fn test_reembolso_depois_de_pago() {
    let mut conn = setup_test_db();
    let user = create_test_user(&conn, "a@example.com");
    let lote = create_test_lote(&conn, 10000);
    let criada = criar_inscricao_teste(&mut conn, &user, &lote, "52998224725");

    reconciliar(
        &mut conn,
        &evento(&criada.inscricao.id, StatusNormalizado::Aprovado),
    )
    .unwrap();
    let resultado = reconciliar(
        &mut conn,
        &evento(&criada.inscricao.id, StatusNormalizado::Reembolsado),
    )
    .unwrap();
    assert!(matches!(resultado, Reconciliacao::Aplicada { .. }));

    let ins = queries::get_inscricao_by_id(&conn, &criada.inscricao.id).unwrap().unwrap();
    assert_eq!(ins.status, StatusInscricao::Cancelado);
    let pag = queries::get_pagamento_by_inscricao(&conn, &ins.id).unwrap().unwrap();
    assert_eq!(pag.status, StatusPagamento::Reembolsado);
}

#[test]
fn test_inscricao_desconhecida_e_ignorada() {
    let mut conn = setup_test_db();

    let resultado =
        reconciliar(&mut conn, &evento("nao-existe", StatusNormalizado::Aprovado)).unwrap();
    assert!(matches!(resultado, Reconciliacao::Ignorada(_)));
}

#[test]
fn test_metodo_do_evento_e_persistido() {
    let mut conn = setup_test_db();
    let user = create_test_user(&conn, "a@example.com");
    let lote = create_test_lote(&conn, 10000);
    let criada = criar_inscricao_teste(&mut conn, &user, &lote, "52998224725");

    let ev = EventoPagamento {
        inscricao_id: criada.inscricao.id.clone(),
        transacao_id: "pb-42".to_string(),
        status: StatusNormalizado::Aprovado,
        metodo: Some(MetodoPagamento::Pix),
    };
    reconciliar(&mut conn, &ev).unwrap();

    let pag = queries::get_pagamento_by_inscricao(&conn, &criada.inscricao.id)
        .unwrap()
        .unwrap();
    assert_eq!(pag.metodo, Some(MetodoPagamento::Pix));
    assert_eq!(pag.transacao_id, "pb-42");
}

#[test]
fn test_normalizacao_de_status_dos_provedores() {
    // Mercado Pago
    assert_eq!(
        StatusNormalizado::from_provider("approved"),
        StatusNormalizado::Aprovado
    );
    assert_eq!(
        StatusNormalizado::from_provider("in_process"),
        StatusNormalizado::Pendente
    );
    assert_eq!(
        StatusNormalizado::from_provider("rejected"),
        StatusNormalizado::Recusado
    );
    assert_eq!(
        StatusNormalizado::from_provider("charged_back"),
        StatusNormalizado::Reembolsado
    );
    // PagBank
    assert_eq!(
        StatusNormalizado::from_provider("PAID"),
        StatusNormalizado::Aprovado
    );
    assert_eq!(
        StatusNormalizado::from_provider("IN_ANALYSIS"),
        StatusNormalizado::Pendente
    );
    assert_eq!(
        StatusNormalizado::from_provider("DECLINED"),
        StatusNormalizado::Recusado
    );
    assert_eq!(
        StatusNormalizado::from_provider("REFUNDED"),
        StatusNormalizado::Reembolsado
    );
    // Unknown strings never produce a transition
    assert_eq!(
        StatusNormalizado::from_provider("alguma_coisa_nova"),
        StatusNormalizado::Pendente
    );
}

#[test]
fn test_mp_webhook_id_numero_ou_string() {
    let numero: MpWebhook =
        serde_json::from_str(r#"{"type": "payment", "data": {"id": 12345}}"#).unwrap();
    assert_eq!(numero.payment_id().as_deref(), Some("12345"));

    let string: MpWebhook =
        serde_json::from_str(r#"{"type": "payment", "data": {"id": "12345"}}"#).unwrap();
    assert_eq!(string.payment_id().as_deref(), Some("12345"));

    let vazio: MpWebhook = serde_json::from_str(r#"{"type": "test"}"#).unwrap();
    assert!(vazio.payment_id().is_none());
}

#[test]
fn test_pagbank_notification_parse() {
    let body = r#"{
        "id": "ORDE_123",
        "reference_id": "inscricao-uuid",
        "charges": [
            {
                "id": "CHAR_456",
                "status": "PAID",
                "payment_method": {"type": "PIX"}
            }
        ]
    }"#;
    let n: PagBankNotification = serde_json::from_str(body).unwrap();
    assert_eq!(n.reference_id.as_deref(), Some("inscricao-uuid"));
    assert_eq!(n.charges[0].status, "PAID");
    assert_eq!(n.metodo(), Some(MetodoPagamento::Pix));
}

#[test]
fn test_pagbank_notification_sem_charges() {
    let n: PagBankNotification =
        serde_json::from_str(r#"{"id": "ORDE_123", "reference_id": "x"}"#).unwrap();
    assert!(n.charges.is_empty());
    assert!(n.metodo().is_none());
}

#[test]
fn test_extrair_link_pay() {
    let links = vec![
        PagBankLink {
            rel: "SELF".to_string(),
            href: "https://example.com/self".to_string(),
        },
        PagBankLink {
            rel: "PAY".to_string(),
            href: "https://example.com/pagar".to_string(),
        },
    ];
    assert_eq!(extrair_link_pay(&links), Some("https://example.com/pagar"));
    assert_eq!(extrair_link_pay(&links[..1]), None);
}
