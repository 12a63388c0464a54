use serde_json::json;
use shub_core::model::{RESPONSE_MESSAGE_KEY, RelayMessage, RoomTarget};

use crate::integration::{init_tracing, referer};
use crate::utils::{TestClient, TestServer};

#[tokio::test]
async fn test_broadcast_policy() {
    init_tracing();

    let server = TestServer::start().await.expect("Failed to start server");

    let mut sender = TestClient::connect_ready(server.addr, &referer("sender"))
        .await
        .expect("Sender failed to connect");
    let mut red = TestClient::connect_ready(server.addr, &referer("red"))
        .await
        .expect("Red failed to connect");
    let mut blue = TestClient::connect_ready(server.addr, &referer("blue"))
        .await
        .expect("Blue failed to connect");

    red.join("red").await.expect("Red join failed");
    blue.join("blue").await.expect("Blue join failed");
    server.wait_for_members("red", 1).await.expect("Red not joined");
    server.wait_for_members("blue", 1).await.expect("Blue not joined");

    sender.join("red").await.expect("Sender join red failed");
    sender.join("blue").await.expect("Sender join blue failed");
    server.wait_for_members("red", 2).await.expect("Sender not in red");
    server.wait_for_members("blue", 2).await.expect("Sender not in blue");
    red.expect_key("shub.join").await.expect("Red should see sender");
    blue.expect_key("shub.join").await.expect("Blue should see sender");

    // Suppressed delivery.
    let suppressed =
        RelayMessage::new("chat", Some(json!({"n": 1}))).with_room(RoomTarget::Flag(false));
    sender.send(&suppressed).await.expect("Send failed");
    red.expect_silence().await.expect("room=false must not reach red");
    blue.expect_silence().await.expect("room=false must not reach blue");

    // Single named room.
    let to_blue = RelayMessage::new("chat", Some(json!({"n": 2})))
        .with_room(RoomTarget::Name("blue".into()));
    sender.send(&to_blue).await.expect("Send failed");
    let delivered = blue
        .expect_key(RESPONSE_MESSAGE_KEY)
        .await
        .expect("Blue should receive the named-room message");
    assert_eq!(delivered, serde_json::to_value(&to_blue).unwrap());
    red.expect_silence().await.expect("Red is not the target");

    // No options: every joined room.
    let everywhere = RelayMessage::new("chat", Some(json!({"n": 3})));
    sender.send(&everywhere).await.expect("Send failed");
    let expected = json!({"key": "chat", "value": {"n": 3}});
    assert_eq!(
        red.expect_key(RESPONSE_MESSAGE_KEY).await.expect("Red missed it"),
        expected
    );
    assert_eq!(
        blue.expect_key(RESPONSE_MESSAGE_KEY).await.expect("Blue missed it"),
        expected
    );

    sender
        .expect_silence()
        .await
        .expect("Sender must not receive its own messages");

    sender.close().await.expect("Failed to close sender");
    red.close().await.expect("Failed to close red");
    blue.close().await.expect("Failed to close blue");
}
