use crate::relay::Connection;
use crate::socket::RelayService;
use axum::extract::ws::{CloseFrame, Message, WebSocket, close_code};
use axum::extract::{ConnectInfo, State, WebSocketUpgrade};
use axum::http::{HeaderMap, header};
use axum::response::IntoResponse;
use futures::stream::SplitStream;
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use std::net::SocketAddr;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    headers: HeaderMap,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(service): State<RelayService>,
) -> impl IntoResponse {
    let origin = declared_origin(&headers);
    let remote_addr = forwarded_for(&headers).unwrap_or_else(|| addr.to_string());

    ws.on_upgrade(move |socket| handle_socket(socket, service, origin, remote_addr))
}

async fn handle_socket(
    socket: WebSocket,
    service: RelayService,
    origin: Option<String>,
    remote_addr: String,
) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();

    let mut connection = Connection::open(service.index(), tx, Some(remote_addr.clone()));
    let id = connection.id();

    if let Err(e) = connection.validate(service.gate(), origin.as_deref()).await {
        error!("Rejected connection {} (IP: {}): {}", id, remote_addr, e);
        connection.dispose();

        let frame = CloseFrame {
            code: close_code::POLICY,
            reason: e.to_string().into(),
        };
        let _ = sender.send(Message::Close(Some(frame))).await;
        return;
    }

    if let Err(e) = connection.start(origin.as_deref()) {
        error!("Failed to set up connection {} (IP: {}): {}", id, remote_addr, e);
        connection.dispose();
        return;
    }

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(msg).await.is_err() {
                break;
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => {},
        _ = read_frames(&mut receiver, &mut connection) => {},
    };

    send_task.abort();
    connection.dispose();
    info!("disconnect: {}", id);
}

async fn read_frames(receiver: &mut SplitStream<WebSocket>, connection: &mut Connection) {
    while let Some(Ok(msg)) = receiver.next().await {
        match msg {
            Message::Text(text) => match serde_json::from_str::<Value>(text.as_str()) {
                Ok(frame) => connection.process_message(frame),
                Err(e) => warn!(
                    "Invalid relay frame from {} (IP: {}): {}",
                    connection.id(),
                    connection.remote_addr().unwrap_or("unknown"),
                    e
                ),
            },
            Message::Close(_) => break,
            _ => {}
        }
    }
}

/// Page the client was loaded from: `Referer`, else `Origin`.
fn declared_origin(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::REFERER)
        .or_else(|| headers.get(header::ORIGIN))
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}

fn forwarded_for(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}
