use serde_json::json;
use shub_core::model::{DISCONNECT_KEY, JOIN_KEY};

use crate::integration::{init_tracing, referer};
use crate::utils::{TestClient, TestServer};

#[tokio::test]
async fn test_disconnect_notifies_rooms() {
    init_tracing();

    let server = TestServer::start().await.expect("Failed to start server");

    let mut stayer = TestClient::connect_ready(server.addr, &referer("stayer"))
        .await
        .expect("Stayer failed to connect");
    let mut leaver = TestClient::connect_ready(server.addr, &referer("leaver"))
        .await
        .expect("Leaver failed to connect");
    let leaver_id = server
        .connection_from(&referer("leaver"))
        .await
        .expect("Leaver has no home room");

    stayer.join("lobby").await.expect("Stayer join failed");
    server.wait_for_members("lobby", 1).await.expect("Stayer not joined");
    leaver.join("lobby").await.expect("Leaver join failed");
    stayer.expect_key(JOIN_KEY).await.expect("Stayer should see leaver");

    leaver.close().await.expect("Failed to close leaver");

    assert_eq!(
        stayer.expect_key(DISCONNECT_KEY).await.expect("No disconnect notice"),
        json!({ "id": leaver_id })
    );
    stayer
        .expect_silence()
        .await
        .expect("Disconnect must be announced once");

    server
        .wait_for_connections(1)
        .await
        .expect("Leaver still registered");
    assert_eq!(server.index.members("lobby").len(), 1);

    stayer.close().await.expect("Failed to close stayer");
}
