// src/services/mail.rs
//
// Envio de e-mail. O `HttpMailer` posta JSON numa API de e-mail configurada;
// sem configuração, o `LogMailer` apenas registra a mensagem.

use async_trait::async_trait;
use serde::Serialize;

use crate::models::delivery::DeliveryDetail;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub text: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: EmailMessage) -> anyhow::Result<()>;
}

#[derive(Clone)]
pub struct HttpMailer {
    client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
    from: String,
}

impl HttpMailer {
    pub fn new(api_url: String, api_key: Option<String>, from: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
            api_key,
            from,
        }
    }
}

#[derive(Serialize)]
struct OutgoingEmail<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, message: EmailMessage) -> anyhow::Result<()> {
        let mut request = self.client.post(&self.api_url).json(&OutgoingEmail {
            from: &self.from,
            to: &message.to,
            subject: &message.subject,
            text: &message.text,
        });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        request.send().await?.error_for_status()?;
        tracing::info!("📧 E-mail enviado para {}", message.to);
        Ok(())
    }
}

pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: EmailMessage) -> anyhow::Result<()> {
        tracing::info!("📧 (sem API de e-mail) para={} assunto={}", message.to, message.subject);
        Ok(())
    }
}

/// Comprovante enviado ao funcionário quando a entrega é assinada.
/// `None` quando o funcionário não tem e-mail.
pub fn delivery_confirmed_email(detail: &DeliveryDetail) -> Option<EmailMessage> {
    let to = detail.staff_email.as_deref()?.trim();
    if to.is_empty() {
        return None;
    }

    let d = &detail.delivery;
    let confirmed = d
        .confirmed_at
        .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_default();

    let mut text = format!(
        "Hello {},\n\nYou signed for the following parts delivery:\n\n\
         Part: {} ({})\nQuantity: {}\nDelivered: {}\nConfirmed: {}\n",
        detail.staff_name,
        detail.part_name,
        detail.part_code,
        d.quantity,
        d.delivered_at.format("%Y-%m-%d %H:%M UTC"),
        confirmed,
    );
    if let Some(building) = &detail.building_name {
        text.push_str(&format!("Building: {}\n", building));
    }
    if let Some(code) = &detail.cost_center_code {
        text.push_str(&format!("Cost center: {}\n", code));
    }
    if let Some(total) = detail.total_cost() {
        text.push_str(&format!("Total cost: ${:.2}\n", total));
    }
    text.push_str(&format!("\nReference: {}\n\nONU Parts Tracker", d.id));

    Some(EmailMessage {
        to: to.to_string(),
        subject: format!("Parts delivery confirmed: {}", detail.part_name),
        text,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::delivery::tests::detail;
    use std::sync::Mutex;

    /// Guarda as mensagens em memória.
    #[derive(Default)]
    pub(crate) struct RecordingMailer {
        pub sent: Mutex<Vec<EmailMessage>>,
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, message: EmailMessage) -> anyhow::Result<()> {
            self.sent.lock().unwrap().push(message);
            Ok(())
        }
    }

    #[test]
    fn no_email_without_address() {
        let d = detail("bolt", 1, None, 1);
        assert!(delivery_confirmed_email(&d).is_none());

        let mut blank = detail("bolt", 1, None, 1);
        blank.staff_email = Some("  ".into());
        assert!(delivery_confirmed_email(&blank).is_none());
    }

    #[test]
    fn email_mentions_part_and_quantity() {
        let mut d = detail("bolt", 3, Some("FAC-1"), 1);
        d.staff_email = Some("jane@onu.edu".into());
        let msg = delivery_confirmed_email(&d).unwrap();
        assert_eq!(msg.to, "jane@onu.edu");
        assert!(msg.subject.contains("bolt"));
        assert!(msg.text.contains("Quantity: 3"));
        assert!(msg.text.contains("Cost center: FAC-1"));
        assert!(msg.text.contains("Total cost: $7.50"));
    }

    #[tokio::test]
    async fn recording_mailer_keeps_messages() {
        let mailer = RecordingMailer::default();
        mailer
            .send(EmailMessage { to: "a@b.c".into(), subject: "s".into(), text: "t".into() })
            .await
            .unwrap();
        assert_eq!(mailer.sent.lock().unwrap().len(), 1);
    }
}
