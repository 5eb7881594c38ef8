// src/handlers/ws.rs
//
// `/ws`: avisa os clientes que algum recurso mudou. O cliente responde
// invalidando as consultas daquele recurso. Sem autenticação: nada de dado
// trafega por aqui, só o nome do recurso.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use tokio::sync::broadcast::error::RecvError;

use crate::{config::AppState, models::realtime::WsMessage};

pub async fn ws_handler(State(app_state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, app_state))
}

/// Resposta a uma mensagem de texto do cliente. Só `ping` tem resposta.
pub fn respond(text: &str) -> Option<WsMessage> {
    match serde_json::from_str::<WsMessage>(text) {
        Ok(WsMessage::Ping { timestamp }) => Some(WsMessage::Pong { timestamp }),
        Ok(_) => None,
        Err(e) => {
            tracing::debug!("Mensagem WS ignorada: {}", e);
            None
        }
    }
}

async fn send(socket: &mut WebSocket, message: &WsMessage) -> bool {
    let Ok(text) = serde_json::to_string(message) else {
        return false;
    };
    socket.send(Message::Text(text.into())).await.is_ok()
}

async fn handle_socket(mut socket: WebSocket, app_state: AppState) {
    let mut changes = app_state.notifier.subscribe();

    if !send(&mut socket, &WsMessage::Connected).await {
        return;
    }
    tracing::debug!("🔌 WebSocket conectado");

    loop {
        tokio::select! {
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    if let Some(reply) = respond(text.as_str()) {
                        if !send(&mut socket, &reply).await {
                            break;
                        }
                    }
                }
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                Some(Ok(_)) => {}
            },
            change = changes.recv() => match change {
                Ok(message) => {
                    if !send(&mut socket, &message).await {
                        break;
                    }
                }
                // Perdeu avisos: o próximo que chegar já dispara nova busca
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("WebSocket atrasado, {} aviso(s) descartado(s)", skipped);
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    tracing::debug!("🔌 WebSocket desconectado");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ping_gets_pong_with_same_timestamp() {
        assert_eq!(
            respond(r#"{"type":"ping","timestamp":1700000000000}"#),
            Some(WsMessage::Pong { timestamp: 1_700_000_000_000 })
        );
    }

    #[test]
    fn other_messages_are_ignored() {
        assert_eq!(respond(r#"{"type":"connected"}"#), None);
        assert_eq!(respond("not json"), None);
    }
}
