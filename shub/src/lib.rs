pub use shub_core::model::{ConnectionId, PeerId};

pub mod model {
    pub use shub_core::model::*;
}

#[cfg(feature = "server")]
pub mod server {
    pub use shub_server::*;
}

#[cfg(feature = "peer")]
pub mod peer {
    pub use shub_peer::*;
}
