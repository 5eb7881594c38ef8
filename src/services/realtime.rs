// src/services/realtime.rs

use tokio::sync::broadcast;

use crate::models::realtime::WsMessage;

const CHANNEL_CAPACITY: usize = 256;

/// Fan-out de "algo mudou" para todos os sockets abertos. Melhor esforço:
/// sem ninguém ouvindo, a mensagem é descartada.
#[derive(Clone)]
pub struct Notifier {
    tx: broadcast::Sender<WsMessage>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier {
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<WsMessage> {
        self.tx.subscribe()
    }

    pub fn data_changed(&self, resource: &str) {
        let receivers = self.tx.send(WsMessage::data_changed(resource)).unwrap_or(0);
        tracing::debug!("📣 data-changed '{}' -> {} socket(s)", resource, receivers);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_receive_changes() {
        let notifier = Notifier::new();
        let mut rx = notifier.subscribe();
        notifier.data_changed("parts");
        assert_eq!(rx.recv().await.unwrap(), WsMessage::data_changed("parts"));
    }

    #[test]
    fn publishing_without_listeners_is_fine() {
        Notifier::new().data_changed("staff");
    }
}
