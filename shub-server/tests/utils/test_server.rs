use anyhow::{Result, bail};
use shub_core::ConnectionId;
use shub_server::{RefererValidator, RelayService, RoomIndex};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Prefix admitted by every test server.
pub const ALLOWED_ORIGIN: &str = "http://localhost";

/// Timeout for waiting on server-side state (ms).
pub const STATE_TIMEOUT_MS: u64 = 5000;

/// Relay bound to an ephemeral local port, with its own room index.
pub struct TestServer {
    pub addr: SocketAddr,
    pub index: Arc<RoomIndex>,
}

impl TestServer {
    pub async fn start() -> Result<Self> {
        let index = Arc::new(RoomIndex::new());
        let service = RelayService::new(
            index.clone(),
            Arc::new(RefererValidator::new([ALLOWED_ORIGIN])),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        tokio::spawn(async move {
            let app = service
                .router()
                .into_make_service_with_connect_info::<SocketAddr>();
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("[TestServer] serve failed: {}", e);
            }
        });

        Ok(Self { addr, index })
    }

    /// Wait until `room` has at least `count` members.
    pub async fn wait_for_members(&self, room: &str, count: usize) -> Result<Vec<ConnectionId>> {
        let start = Instant::now();
        let timeout = Duration::from_millis(STATE_TIMEOUT_MS);

        loop {
            let members = self.index.members(room);
            if members.len() >= count {
                return Ok(members);
            }
            if start.elapsed() > timeout {
                bail!("room '{}' has {} members, expected {}", room, members.len(), count);
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    /// Wait until the index holds exactly `count` connections.
    pub async fn wait_for_connections(&self, count: usize) -> Result<()> {
        let start = Instant::now();
        let timeout = Duration::from_millis(STATE_TIMEOUT_MS);

        while self.index.connection_count() != count {
            if start.elapsed() > timeout {
                bail!(
                    "index holds {} connections, expected {}",
                    self.index.connection_count(),
                    count
                );
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        Ok(())
    }

    /// Id of the single connection whose home room is `referer`.
    pub async fn connection_from(&self, referer: &str) -> Result<ConnectionId> {
        let members = self.wait_for_members(referer, 1).await?;
        Ok(members[0])
    }
}
