//! Integration tests for operator commands: OPER, KILL, DLINE/UNDLINE and
//! REHASH.

mod common;

use anonirc_proto::Response;
use common::client::is_numeric;
use common::server::{OPER_NAME, OPER_PASS, eventually};
use common::{TestClient, TestServer};
use std::time::Duration;

async fn oper_up(client: &mut TestClient) {
    client
        .send_raw(&format!("OPER {OPER_NAME} {OPER_PASS}"))
        .await
        .unwrap();
    assert_eq!(
        client.recv_line().await.unwrap().unwrap(),
        format!(":test.server 381 {} :You are now an IRC operator", client.nick())
    );
}

#[tokio::test]
async fn oper_rejects_bad_credentials() {
    let server = TestServer::spawn().await.unwrap();
    let mut alice = server.connect_registered("alice").await.unwrap();

    alice.send_raw("OPER nobody secret").await.unwrap();
    assert!(is_numeric(&alice.recv().await.unwrap(), Response::ERR_NOOPERHOST));

    alice.send_raw(&format!("OPER {OPER_NAME} wrong")).await.unwrap();
    assert!(is_numeric(&alice.recv().await.unwrap(), Response::ERR_PASSWDMISMATCH));

    oper_up(&mut alice).await;
}

#[tokio::test]
async fn operator_commands_need_privileges() {
    let server = TestServer::spawn().await.unwrap();
    let mut alice = server.connect_registered("alice").await.unwrap();

    for line in ["KILL bob", "DLINE 10.0.0.1", "UNDLINE 10.0.0.1", "REHASH"] {
        alice.send_raw(line).await.unwrap();
        assert_eq!(
            alice.recv_line().await.unwrap().unwrap(),
            ":test.server 481 alice :Permission Denied- You're not an IRC operator",
            "{line}"
        );
    }
}

#[tokio::test]
async fn kill_disconnects_the_target() {
    let server = TestServer::spawn().await.unwrap();
    let mut alice = server.connect_registered("alice").await.unwrap();
    let mut bob = server.connect_registered("bob").await.unwrap();
    alice.recv().await.unwrap(); // bob's JOIN
    oper_up(&mut alice).await;

    alice.send_raw("KILL bob :spamming").await.unwrap();

    let lines = bob.recv_until_closed().await.unwrap();
    assert_eq!(
        lines,
        vec!["ERROR :Closing Link: 127.0.0.1 (Killed (spamming))".to_string()]
    );

    // the oper's confirmation and bob's departure race each other
    let seen = [
        alice.recv().await.unwrap().to_string(),
        alice.recv().await.unwrap().to_string(),
    ];
    assert!(seen.contains(&":test.server NOTICE alice :Killed bob".to_string()));
    assert!(seen.iter().any(|l| l.ends_with("!Anon@IRC PART # :Killed (spamming)")));
    assert!(eventually(|| server.matrix.sessions.find_by_nick("bob").is_none()).await);

    alice.send_raw("KILL bob").await.unwrap();
    let reply = alice
        .recv_until(|m| is_numeric(m, Response::ERR_NOSUCHNICK))
        .await
        .unwrap();
    assert!(reply.last().unwrap().to_string().contains(" 401 alice bob "));
}

#[tokio::test]
async fn dline_stores_and_undline_removes() {
    let server = TestServer::spawn().await.unwrap();
    let mut alice = server.connect_registered("alice").await.unwrap();
    oper_up(&mut alice).await;

    alice
        .send_raw("DLINE 30 203.0.113.0/24 :abuse")
        .await
        .unwrap();
    assert_eq!(
        alice.recv_line().await.unwrap().unwrap(),
        ":test.server NOTICE alice :D-line added for 203.0.113.0/24"
    );

    let active = server.matrix.bans.list_active().await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].reason(), "abuse");
    assert_eq!(active[0].set_by, OPER_NAME);
    assert!(active[0].matches("203.0.113.77".parse().unwrap()));

    alice.send_raw("UNDLINE 203.0.113.0/24").await.unwrap();
    assert_eq!(
        alice.recv_line().await.unwrap().unwrap(),
        ":test.server NOTICE alice :D-line removed for 203.0.113.0/24"
    );
    assert!(server.matrix.bans.list_active().await.unwrap().is_empty());

    alice.send_raw("UNDLINE 203.0.113.0/24").await.unwrap();
    assert_eq!(
        alice.recv_line().await.unwrap().unwrap(),
        ":test.server NOTICE alice :No D-line for 203.0.113.0/24"
    );

    alice.send_raw("DLINE not/a/mask").await.unwrap();
    assert_eq!(
        alice.recv_line().await.unwrap().unwrap(),
        ":test.server NOTICE alice :Invalid D-line mask: not/a/mask"
    );
}

#[tokio::test]
async fn dline_with_oversized_duration_is_refused() {
    let server = TestServer::spawn().await.unwrap();
    let mut alice = server.connect_registered("alice").await.unwrap();
    let mut bob = server.connect_registered("bob").await.unwrap();
    alice.recv().await.unwrap(); // bob's JOIN
    oper_up(&mut alice).await;

    alice
        .send_raw("DLINE 999999999999999999 203.0.113.9 :x")
        .await
        .unwrap();
    assert_eq!(
        alice.recv_line().await.unwrap().unwrap(),
        ":test.server NOTICE alice :D-line duration out of range: 999999999999999999"
    );
    assert!(server.matrix.bans.list_active().await.unwrap().is_empty());

    // the session is intact and still answers
    alice.send_raw("PING check").await.unwrap();
    assert_eq!(
        alice.recv_line().await.unwrap().unwrap(),
        ":test.server PONG test.server check"
    );
    assert_eq!(server.matrix.channels.member_count("#"), 2);
    assert!(server.matrix.sessions.find_by_nick("alice").is_some());
    assert!(bob.is_quiet(Duration::from_millis(100)).await);
}

#[tokio::test]
async fn dline_drops_matching_sessions_and_refuses_new_ones() {
    let server = TestServer::spawn().await.unwrap();
    let mut alice = server.connect_registered("alice").await.unwrap();
    let mut bob = server.connect_registered("bob").await.unwrap();
    alice.recv().await.unwrap(); // bob's JOIN
    oper_up(&mut alice).await;

    alice.send_raw("DLINE 127.0.0.1 :go away").await.unwrap();

    let closing = "ERROR :Closing Link: 127.0.0.1 (Banned: go away)".to_string();
    assert_eq!(bob.recv_until_closed().await.unwrap(), vec![closing.clone()]);
    // the oper is on the same address
    assert!(alice.recv_until_closed().await.unwrap().contains(&closing));

    let mut late = server.connect("late").await.unwrap();
    assert_eq!(late.recv_until_closed().await.unwrap(), vec![closing]);
}

#[tokio::test]
async fn rehash_reloads_the_motd_for_live_sessions() {
    let file = tempfile::NamedTempFile::new().unwrap();
    let write_config = |motd: &str| {
        let content = format!(
            r#"
[server]
name = "test.server"
network = "TestNet"

[motd]
lines = ["{motd}"]

[[oper]]
name = "{OPER_NAME}"
password = "{OPER_PASS}"
"#
        );
        std::fs::write(file.path(), content).unwrap();
    };
    write_config("first edition");

    let server = TestServer::spawn_from_file(file.path()).await.unwrap();
    let mut alice = server.connect_registered("alice").await.unwrap();
    let mut bob = server.connect_registered("bob").await.unwrap();
    alice.recv().await.unwrap(); // bob's JOIN
    oper_up(&mut alice).await;
    alice.join("&").await.unwrap();

    write_config("second edition");
    alice.send_raw("REHASH").await.unwrap();
    assert_eq!(
        alice.recv_line().await.unwrap().unwrap(),
        format!(
            ":test.server 382 alice {} :Rehashing",
            file.path().display()
        )
    );
    assert_eq!(
        alice.recv_line().await.unwrap().unwrap(),
        ":test.server NOTICE & :Server configuration reloaded"
    );

    // bob stays connected and sees the new MOTD
    bob.send_raw("MOTD").await.unwrap();
    let motd = bob.recv_until_numeric(Response::RPL_ENDOFMOTD).await.unwrap();
    assert!(motd.iter().any(|m| m.to_string() == ":test.server 372 bob :- second edition"));

    // a broken file leaves the running config alone
    std::fs::write(file.path(), "[server\n").unwrap();
    alice.send_raw("REHASH").await.unwrap();
    alice.recv_line().await.unwrap(); // 382
    let failure = alice.recv_line().await.unwrap().unwrap();
    assert!(failure.starts_with(":test.server NOTICE alice :Rehash failed:"));
    assert!(bob.is_quiet(Duration::from_millis(100)).await);
    assert_eq!(server.matrix.config.current().motd.lines(), vec!["second edition"]);

    // live sessions kept their nick and memberships through both rehashes
    let bob_session = server.matrix.sessions.find_by_nick("bob").unwrap();
    assert_eq!(bob_session.nick().as_deref(), Some("bob"));
    assert_eq!(bob_session.channels(), vec!["#".to_string()]);
    let mut alice_channels = server.matrix.sessions.find_by_nick("alice").unwrap().channels();
    alice_channels.sort();
    assert_eq!(alice_channels, vec!["#".to_string(), "&".to_string()]);
    assert_eq!(server.matrix.channels.member_count("#"), 2);

    // a newcomer gets the reloaded MOTD in its welcome burst
    let mut carol = server.connect("carol").await.unwrap();
    let burst = carol.register().await.unwrap();
    let motd: Vec<String> = burst
        .iter()
        .filter(|m| is_numeric(m, Response::RPL_MOTD))
        .map(ToString::to_string)
        .collect();
    assert_eq!(motd, vec![":test.server 372 carol :- second edition".to_string()]);
}
