use axum::extract::ws::close_code;

use crate::integration::{init_tracing, referer};
use crate::utils::{FRAME_TIMEOUT_MS, Incoming, TestClient, TestServer};

#[tokio::test]
async fn test_rejected_origin_is_closed() {
    init_tracing();

    let server = TestServer::start().await.expect("Failed to start server");

    let mut member = TestClient::connect_ready(server.addr, &referer("member"))
        .await
        .expect("Member failed to connect");
    server
        .wait_for_connections(1)
        .await
        .expect("Member not registered");

    let mut intruder = TestClient::connect(server.addr, "http://localhost.evil.example/")
        .await
        .expect("Handshake itself should succeed");

    match intruder.next(FRAME_TIMEOUT_MS).await.expect("Read failed") {
        Some(Incoming::Closed(Some(frame))) => {
            assert_eq!(u16::from(frame.code), close_code::POLICY);
        }
        other => panic!("Expected a policy close, got {:?}", other),
    }

    server
        .wait_for_connections(1)
        .await
        .expect("Rejected connection must be removed from the index");

    member
        .expect_silence()
        .await
        .expect("Rejection must not be broadcast");

    member.close().await.expect("Failed to close member");
}
