use serde_json::json;
use shub_core::model::JOIN_KEY;

use crate::integration::init_tracing;
use crate::utils::{TestClient, TestServer};

#[tokio::test]
async fn test_connect_joins_home_room() {
    init_tracing();

    let server = TestServer::start().await.expect("Failed to start server");
    let page = "http://localhost/board/42";

    let mut first = TestClient::connect_ready(server.addr, page)
        .await
        .expect("First client failed to connect");
    let first_id = server
        .connection_from(page)
        .await
        .expect("First client not in home room");

    let mut second = TestClient::connect_ready(server.addr, page)
        .await
        .expect("Second client failed to connect");
    let members = server
        .wait_for_members(page, 2)
        .await
        .expect("Second client not in home room");
    let second_id = members
        .into_iter()
        .find(|id| *id != first_id)
        .expect("Second id missing");

    let notice = first
        .expect_key(JOIN_KEY)
        .await
        .expect("First client should see the second join");
    assert_eq!(notice, json!({"id": second_id, "room": page}));

    second
        .expect_silence()
        .await
        .expect("Joiner must not see its own notice");

    first.close().await.expect("Failed to close first client");
    second.close().await.expect("Failed to close second client");
}
