use serde_json::json;
use shub_core::model::{JOIN_KEY, LEAVE_KEY, MOVE_KEY, RelayMessage};

use crate::integration::{init_tracing, referer};
use crate::utils::{TestClient, TestServer};

#[tokio::test]
async fn test_move_between_rooms() {
    init_tracing();

    let server = TestServer::start().await.expect("Failed to start server");
    let home = referer("mover");

    let mut mover = TestClient::connect_ready(server.addr, &home)
        .await
        .expect("Mover failed to connect");
    let mut old_room = TestClient::connect_ready(server.addr, &referer("old"))
        .await
        .expect("Old-room client failed to connect");
    let mut new_room = TestClient::connect_ready(server.addr, &referer("new"))
        .await
        .expect("New-room client failed to connect");
    let mover_id = server.connection_from(&home).await.expect("No mover id");

    old_room.join("old").await.expect("Join failed");
    new_room.join("new").await.expect("Join failed");
    server.wait_for_members("old", 1).await.expect("old not ready");
    server.wait_for_members("new", 1).await.expect("new not ready");

    mover.join("old").await.expect("Join failed");
    server.wait_for_members("old", 2).await.expect("Mover not in old");
    old_room.expect_key(JOIN_KEY).await.expect("Old room missed join");

    mover
        .send(&RelayMessage::new(MOVE_KEY, Some(json!({"room": "new"}))))
        .await
        .expect("Move failed");

    assert_eq!(
        old_room.expect_key(LEAVE_KEY).await.expect("Old room missed leave"),
        json!({"id": mover_id, "room": "old"})
    );
    assert_eq!(
        new_room.expect_key(JOIN_KEY).await.expect("New room missed join"),
        json!({"id": mover_id, "room": "new"})
    );

    // The home room was left as part of the move; the self-room never is.
    assert!(!server.index.is_member(&mover_id, &home));
    assert!(server.index.is_member(&mover_id, &mover_id.self_room()));
    mover.expect_silence().await.expect("Mover must not see its own notices");

    mover.leave("new").await.expect("Leave failed");
    assert_eq!(
        new_room.expect_key(LEAVE_KEY).await.expect("New room missed leave"),
        json!({"id": mover_id, "room": "new"})
    );

    mover.close().await.expect("Failed to close mover");
    old_room.close().await.expect("Failed to close old room");
    new_room.close().await.expect("Failed to close new room");
}
