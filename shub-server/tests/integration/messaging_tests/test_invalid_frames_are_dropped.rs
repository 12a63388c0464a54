use serde_json::json;
use shub_core::model::{RESPONSE_MESSAGE_KEY, RelayMessage};

use crate::integration::{init_tracing, referer};
use crate::utils::{TestClient, TestServer};

#[tokio::test]
async fn test_invalid_frames_are_dropped() {
    init_tracing();

    let server = TestServer::start().await.expect("Failed to start server");

    let mut noisy = TestClient::connect_ready(server.addr, &referer("noisy"))
        .await
        .expect("Noisy client failed to connect");
    let mut listener = TestClient::connect_ready(server.addr, &referer("listener"))
        .await
        .expect("Listener failed to connect");

    listener.join("lobby").await.expect("Listener join failed");
    server.wait_for_members("lobby", 1).await.expect("Listener not joined");

    noisy.send_raw("not json at all").await.expect("Send failed");
    noisy
        .send_raw(r#"{"key": "shub.join", "value": {"room": 7}}"#)
        .await
        .expect("Send failed");
    noisy
        .send_raw(r#"{"key": "shub.leave"}"#)
        .await
        .expect("Send failed");

    noisy.join("lobby").await.expect("Join failed");
    server
        .wait_for_members("lobby", 2)
        .await
        .expect("Connection should survive bad frames");
    listener
        .expect_key("shub.join")
        .await
        .expect("Listener should see the valid join only");

    let hello = RelayMessage::new("hello", Some(json!("world")));
    noisy.send(&hello).await.expect("Send failed");
    assert_eq!(
        listener
            .expect_key(RESPONSE_MESSAGE_KEY)
            .await
            .expect("Listener missed message"),
        json!({"key": "hello", "value": "world"})
    );

    noisy.close().await.expect("Failed to close noisy");
    listener.close().await.expect("Failed to close listener");
}
