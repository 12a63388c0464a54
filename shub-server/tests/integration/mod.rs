pub mod connection_tests;
pub mod messaging_tests;
pub mod multi_peer_tests;

use tracing::Level;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Referer whose path is unique to one client, so each client gets its own
/// home room.
pub fn referer(name: &str) -> String {
    format!("{}/{}", crate::utils::ALLOWED_ORIGIN, name)
}
