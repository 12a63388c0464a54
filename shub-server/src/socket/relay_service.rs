use crate::access::AccessGate;
use crate::socket::ws_handler;
use crate::transport::RoomIndex;
use axum::Router;
use axum::routing::get;
use std::sync::Arc;

struct RelayInner {
    index: Arc<RoomIndex>,
    gate: Arc<dyn AccessGate>,
}

#[derive(Clone)]
pub struct RelayService {
    inner: Arc<RelayInner>,
}

impl RelayService {
    pub fn new(index: Arc<RoomIndex>, gate: Arc<dyn AccessGate>) -> Self {
        Self {
            inner: Arc::new(RelayInner { index, gate }),
        }
    }

    pub fn index(&self) -> Arc<RoomIndex> {
        self.inner.index.clone()
    }

    pub fn gate(&self) -> &dyn AccessGate {
        self.inner.gate.as_ref()
    }

    /// Serve with `into_make_service_with_connect_info::<SocketAddr>()`.
    pub fn router(self) -> Router {
        Router::new()
            .route("/socket", get(ws_handler))
            .with_state(self)
    }
}
