//! Transactional email via the Resend API.
//!
//! Every send here is best-effort: callers spawn it after their database
//! transaction has committed, and a failure is logged, never propagated.
//! With no API key configured the service degrades to log-only, which is
//! also what the test fixtures use.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::Inscricao;

const RESEND_API_URL: &str = "https://api.resend.com/emails";

/// Format centavos as "R$ 90,00".
fn format_valor(centavos: i64) -> String {
    format!("R$ {},{:02}", centavos / 100, centavos % 100)
}

/// Result of attempting to send an email.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailSendResult {
    Sent,
    /// No API key configured - logged and skipped
    Disabled,
}

#[derive(Debug, Serialize)]
struct ResendEmailRequest<'a> {
    from: &'a str,
    to: Vec<&'a str>,
    subject: String,
    text: String,
}

#[derive(Debug, Deserialize)]
struct ResendEmailResponse {
    #[allow(dead_code)]
    id: String,
}

#[derive(Clone)]
pub struct EmailService {
    api_key: Option<String>,
    from_email: String,
    http_client: Client,
}

impl EmailService {
    pub fn new(api_key: Option<String>, from_email: String) -> Self {
        Self {
            api_key,
            from_email,
            http_client: Client::new(),
        }
    }

    /// Disabled service for tests and for deployments without email.
    pub fn disabled() -> Self {
        Self::new(None, "inscricoes@largada.run".to_string())
    }

    async fn send(&self, to: &str, subject: String, text: String) -> Result<EmailSendResult> {
        let Some(api_key) = self.api_key.as_deref() else {
            tracing::debug!(to = %to, subject = %subject, "Email disabled, skipping send");
            return Ok(EmailSendResult::Disabled);
        };

        let request = ResendEmailRequest {
            from: &self.from_email,
            to: vec![to],
            subject,
            text,
        };

        let response = self
            .http_client
            .post(RESEND_API_URL)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("Resend request failed: {}", e)))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::Internal(format!(
                "Resend rejected email: {}",
                error_text
            )));
        }

        let _: ResendEmailResponse = response
            .json()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to parse Resend response: {}", e)))?;

        Ok(EmailSendResult::Sent)
    }

    /// Pending-payment notification, sent right after registration commits.
    pub async fn send_inscricao_pendente(&self, inscricao: &Inscricao) -> Result<EmailSendResult> {
        let subject = format!("Inscrição {} recebida - pagamento pendente", inscricao.codigo);
        let text = format!(
            "Olá {},\n\n\
             Recebemos sua inscrição (código {}).\n\
             Valor: {}\n\n\
             Ela será confirmada assim que o pagamento for aprovado.\n",
            inscricao.nome,
            inscricao.codigo,
            format_valor(inscricao.valor_centavos),
        );
        self.send(&inscricao.email, subject, text).await
    }

    /// Confirmation, sent on the first transition to PAGO.
    pub async fn send_inscricao_confirmada(&self, inscricao: &Inscricao) -> Result<EmailSendResult> {
        let subject = format!("Inscrição {} confirmada!", inscricao.codigo);
        let text = format!(
            "Olá {},\n\n\
             Pagamento aprovado - sua inscrição {} está confirmada.\n\
             Nos vemos na largada!\n",
            inscricao.nome, inscricao.codigo,
        );
        self.send(&inscricao.email, subject, text).await
    }

    /// Admin bulk email. Sends sequentially; per-recipient failures are
    /// logged and do not stop the batch. Returns how many were sent.
    pub async fn send_em_massa(
        &self,
        destinatarios: &[(String, String)],
        assunto: &str,
        corpo: &str,
    ) -> usize {
        let mut enviados = 0;
        for (nome, email) in destinatarios {
            let text = format!("Olá {},\n\n{}\n", nome, corpo);
            match self.send(email, assunto.to_string(), text).await {
                Ok(EmailSendResult::Sent) => enviados += 1,
                Ok(EmailSendResult::Disabled) => {}
                Err(e) => {
                    tracing::warn!("Bulk email to {} failed: {}", email, e);
                }
            }
        }
        enviados
    }
}

/// Spawn a best-effort email send. Used after transaction commit so a
/// failed send can never affect the committed write.
pub fn spawn_email<F>(future: F)
where
    F: std::future::Future<Output = Result<EmailSendResult>> + Send + 'static,
{
    tokio::spawn(async move {
        if let Err(e) = future.await {
            tracing::warn!("Notification email failed: {}", e);
        }
    });
}
