//! Integration tests for the listen-password gate and MOTD coordination.

mod common;

use std::time::Duration;

use common::{FakeUpstream, TestClient, TestServer};

#[tokio::test]
async fn command_before_pass_is_rejected_and_disconnected() {
    let upstream = FakeUpstream::bind().await.expect("bind fake upstream");
    let server = TestServer::spawn(17675, upstream.port(), Some("s3cret"))
        .await
        .expect("spawn muxbncd");
    let mut conn = upstream.accept().await.expect("accept upstream connection");
    conn.complete_registration("muxbncabc")
        .await
        .expect("welcome burst");
    server.wait_until_ready().await.expect("server ready");

    let mut bob = TestClient::connect(server.port()).await.expect("connect");
    bob.send_line("NICK bob").await.expect("send NICK");

    let reply = bob.recv_line().await.expect("rejection");
    assert!(
        reply.contains("464 * :Incorrect password"),
        "expected ERR_PASSWDMISMATCH, got {reply:?}"
    );
    bob.expect_disconnect().await.expect("disconnect");
}

#[tokio::test]
async fn correct_pass_admits_the_client() {
    let upstream = FakeUpstream::bind().await.expect("bind fake upstream");
    let server = TestServer::spawn(17676, upstream.port(), Some("s3cret"))
        .await
        .expect("spawn muxbncd");
    let mut conn = upstream.accept().await.expect("accept upstream connection");
    conn.complete_registration("muxbncabc")
        .await
        .expect("welcome burst");
    server.wait_until_ready().await.expect("server ready");
    tokio::time::sleep(Duration::from_millis(300)).await;

    let mut bob = TestClient::connect(server.port()).await.expect("connect");
    bob.send_line("PASS s3cret").await.expect("send PASS");
    bob.send_line("NICK bob").await.expect("send NICK");

    let rewrite = bob.recv_line().await.expect("NICK rewrite");
    assert_eq!(rewrite, ":bob NICK muxbncabc");

    bob.send_line("USER bob 0 * :Bob").await.expect("send USER");
    bob.recv_containing(" 001 ").await.expect("welcome replay");
}

#[tokio::test]
async fn motd_requests_coalesce_and_reach_only_requesters() {
    let upstream = FakeUpstream::bind().await.expect("bind fake upstream");
    let server = TestServer::spawn(17677, upstream.port(), None)
        .await
        .expect("spawn muxbncd");
    let mut conn = upstream.accept().await.expect("accept upstream connection");
    conn.complete_registration("muxbncabc")
        .await
        .expect("welcome burst");
    server.wait_until_ready().await.expect("server ready");
    tokio::time::sleep(Duration::from_millis(300)).await;

    // First client registers; its registration demands one MOTD.
    let mut alice = TestClient::connect(server.port()).await.expect("connect alice");
    alice.register("alice").await.expect("register alice");
    alice.recv_containing(" 005 ").await.expect("alice replay");

    let request = conn.recv_containing("MOTD").await.expect("motd request");
    assert_eq!(request, "MOTD");

    conn.send_line(":irc.test 375 muxbncabc :- irc.test Message of the day -")
        .await
        .expect("375");
    conn.send_line(":irc.test 372 muxbncabc :- hello there")
        .await
        .expect("372");
    conn.send_line(":irc.test 376 muxbncabc :End of /MOTD command.")
        .await
        .expect("376");

    alice.recv_containing(" 375 ").await.expect("alice 375");
    alice.recv_containing(" 372 ").await.expect("alice 372");
    alice.recv_containing(" 376 ").await.expect("alice 376");

    // Second client's registration triggers a second, separate exchange
    // that the first client does not see.
    let mut bob = TestClient::connect(server.port()).await.expect("connect bob");
    bob.register("bob").await.expect("register bob");
    bob.recv_containing(" 005 ").await.expect("bob replay");

    let request = conn.recv_containing("MOTD").await.expect("second request");
    assert_eq!(request, "MOTD");

    conn.send_line(":irc.test 375 muxbncabc :- irc.test Message of the day -")
        .await
        .expect("375");
    conn.send_line(":irc.test 372 muxbncabc :- hello there")
        .await
        .expect("372");
    conn.send_line(":irc.test 376 muxbncabc :End of /MOTD command.")
        .await
        .expect("376");

    bob.recv_containing(" 376 ").await.expect("bob motd");
    alice
        .expect_silence(Duration::from_millis(300))
        .await
        .expect("alice saw a second MOTD");
}
