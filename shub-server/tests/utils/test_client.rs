use anyhow::{Context, Result, bail};
use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use shub_core::model::{CONNECTED_KEY, JOIN_KEY, LEAVE_KEY, RelayBucket, RelayMessage};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Timeout for a frame the test expects to arrive (ms).
pub const FRAME_TIMEOUT_MS: u64 = 5000;

/// How long a client must stay silent to count as "received nothing" (ms).
pub const SILENCE_MS: u64 = 300;

/// What the server sent next.
#[derive(Debug)]
pub enum Incoming {
    Frame(RelayBucket),
    Closed(Option<CloseFrame>),
}

/// Browser stand-in speaking the relay wire format over a real WebSocket.
pub struct TestClient {
    ws: WsStream,
}

impl TestClient {
    /// Open a socket presenting `referer`, without waiting for the handshake ack.
    pub async fn connect(addr: SocketAddr, referer: &str) -> Result<Self> {
        let mut request = format!("ws://{}/socket", addr).into_client_request()?;
        request
            .headers_mut()
            .insert("referer", HeaderValue::from_str(referer)?);

        let (ws, _response) = connect_async(request)
            .await
            .context("WebSocket handshake failed")?;
        Ok(Self { ws })
    }

    /// Connect and wait for the `connected` acknowledgement.
    pub async fn connect_ready(addr: SocketAddr, referer: &str) -> Result<Self> {
        let mut client = Self::connect(addr, referer).await?;
        let status = client.expect_key(CONNECTED_KEY).await?;
        if status != json!({"status": "OK"}) {
            bail!("unexpected connected payload: {}", status);
        }
        Ok(client)
    }

    pub async fn send(&mut self, message: &RelayMessage) -> Result<()> {
        self.send_raw(&serde_json::to_string(message)?).await
    }

    pub async fn send_raw(&mut self, text: &str) -> Result<()> {
        self.ws.send(Message::text(text.to_owned())).await?;
        Ok(())
    }

    pub async fn join(&mut self, room: &str) -> Result<()> {
        self.send(&RelayMessage::new(JOIN_KEY, Some(json!({ "room": room }))))
            .await
    }

    pub async fn leave(&mut self, room: &str) -> Result<()> {
        self.send(&RelayMessage::new(LEAVE_KEY, Some(json!({ "room": room }))))
            .await
    }

    /// Next frame or close, `None` on timeout.
    pub async fn next(&mut self, timeout_ms: u64) -> Result<Option<Incoming>> {
        let deadline = tokio::time::Instant::now() + Duration::from_millis(timeout_ms);

        loop {
            let msg = match tokio::time::timeout_at(deadline, self.ws.next()).await {
                Err(_) => return Ok(None),
                Ok(None) => return Ok(Some(Incoming::Closed(None))),
                Ok(Some(msg)) => msg?,
            };

            match msg {
                Message::Text(text) => {
                    let bucket: RelayBucket = serde_json::from_str(text.as_str())?;
                    return Ok(Some(Incoming::Frame(bucket)));
                }
                Message::Close(frame) => return Ok(Some(Incoming::Closed(frame))),
                _ => continue,
            }
        }
    }

    /// Wait for the next frame and require it to carry `key`.
    pub async fn expect_key(&mut self, key: &str) -> Result<Value> {
        match self.next(FRAME_TIMEOUT_MS).await? {
            Some(Incoming::Frame(bucket)) if bucket.key == key => Ok(bucket.value),
            Some(other) => bail!("expected '{}', got {:?}", key, other),
            None => bail!("timed out waiting for '{}'", key),
        }
    }

    /// Require that nothing arrives for a while.
    pub async fn expect_silence(&mut self) -> Result<()> {
        match self.next(SILENCE_MS).await? {
            None => Ok(()),
            Some(other) => bail!("expected silence, got {:?}", other),
        }
    }

    pub async fn close(mut self) -> Result<()> {
        self.ws.close(None).await?;
        Ok(())
    }
}
