//! Integration tests for channel membership, topics, LIST and KICK.

mod common;

use anonirc_proto::{Command, Message, Response};
use common::client::{is_numeric, source_name};
use common::{TestClient, TestServer};
use std::time::Duration;

async fn pair(server: &TestServer) -> (TestClient, TestClient) {
    let alice = server.connect_registered("alice").await.unwrap();
    let bob = server.connect_registered("bob").await.unwrap();
    let mut alice = alice;
    alice
        .recv_until(|m| matches!(m.command, Command::JOIN(..)))
        .await
        .unwrap();
    (alice, bob)
}

fn label_of(msg: &Message) -> String {
    source_name(msg).unwrap().to_string()
}

#[tokio::test]
async fn user_channel_is_created_and_destroyed() {
    let server = TestServer::spawn().await.unwrap();
    let mut alice = server.connect_registered("alice").await.unwrap();

    let burst = alice.join("#Rust").await.unwrap();
    let lines: Vec<String> = burst.iter().map(|m| m.to_string()).collect();
    assert_eq!(
        lines,
        vec![
            ":alice!Anon@IRC JOIN #Rust".to_string(),
            ":test.server 353 alice = #Rust @alice".to_string(),
            ":test.server 366 alice #Rust :End of /NAMES list.".to_string(),
        ]
    );
    assert!(server.matrix.channels.exists("#rust"));

    alice.send_raw("PART #rust").await.unwrap();
    assert_eq!(
        alice.recv_line().await.unwrap().unwrap(),
        ":alice!Anon@IRC PART #Rust"
    );
    assert!(!server.matrix.channels.exists("#rust"));
}

#[tokio::test]
async fn joining_twice_is_a_noop() {
    let server = TestServer::spawn().await.unwrap();
    let mut alice = server.connect_registered("alice").await.unwrap();

    alice.send_raw("JOIN #").await.unwrap();
    assert!(alice.is_quiet(Duration::from_millis(200)).await);
    assert_eq!(server.matrix.channels.member_count("#"), 1);
}

#[tokio::test]
async fn bad_channel_names_are_refused() {
    let server = TestServer::spawn().await.unwrap();
    let mut alice = server.connect_registered("alice").await.unwrap();

    let long = format!("#{}", "a".repeat(60));
    alice.send_raw(&format!("JOIN {long}")).await.unwrap();
    let reply = alice.recv().await.unwrap();
    assert!(is_numeric(&reply, Response::ERR_BADCHANMASK));
}

#[tokio::test]
async fn part_errors() {
    let server = TestServer::spawn().await.unwrap();
    let (mut alice, mut bob) = pair(&server).await;

    alice.send_raw("PART #nowhere").await.unwrap();
    assert_eq!(
        alice.recv_line().await.unwrap().unwrap(),
        ":test.server 403 alice #nowhere :No such channel"
    );

    alice.join("#mine").await.unwrap();
    bob.send_raw("PART #mine").await.unwrap();
    assert!(is_numeric(&bob.recv().await.unwrap(), Response::ERR_NOTONCHANNEL));
}

#[tokio::test]
async fn join_zero_leaves_every_channel() {
    let server = TestServer::spawn().await.unwrap();
    let mut alice = server.connect_registered("alice").await.unwrap();
    alice.join("#a").await.unwrap();

    alice.send_raw("JOIN 0").await.unwrap();
    let mut parted = vec![
        alice.recv_line().await.unwrap().unwrap(),
        alice.recv_line().await.unwrap().unwrap(),
    ];
    parted.sort();
    assert_eq!(
        parted,
        vec![":alice!Anon@IRC PART #".to_string(), ":alice!Anon@IRC PART #a".to_string()]
    );
    assert!(server.matrix.channels.exists("#"));
    assert!(!server.matrix.channels.exists("#a"));
}

#[tokio::test]
async fn messages_need_membership() {
    let server = TestServer::spawn().await.unwrap();
    let (mut alice, mut bob) = pair(&server).await;
    alice.join("#private").await.unwrap();

    bob.privmsg("#private", "let me in").await.unwrap();
    assert_eq!(
        bob.recv_line().await.unwrap().unwrap(),
        ":test.server 404 bob #private :Cannot send to channel"
    );
    bob.privmsg("#ghost", "anyone?").await.unwrap();
    assert!(is_numeric(&bob.recv().await.unwrap(), Response::ERR_NOSUCHCHANNEL));
    assert!(alice.is_quiet(Duration::from_millis(200)).await);
}

#[tokio::test]
async fn system_channel_is_broadcast_only() {
    let server = TestServer::spawn().await.unwrap();
    let mut alice = server.connect_registered("alice").await.unwrap();

    alice.join("&").await.unwrap();
    alice.privmsg("&", "can I talk?").await.unwrap();
    assert!(is_numeric(&alice.recv().await.unwrap(), Response::ERR_CANNOTSENDTOCHAN));

    // it outlives its last member
    alice.send_raw("PART &").await.unwrap();
    alice.recv().await.unwrap();
    assert!(server.matrix.channels.exists("&"));
}

#[tokio::test]
async fn topics_on_user_channels() {
    let server = TestServer::spawn().await.unwrap();
    let (mut alice, mut bob) = pair(&server).await;
    alice.join("#t").await.unwrap();
    bob.join("#t").await.unwrap();
    alice.recv().await.unwrap(); // bob's JOIN

    bob.send_raw("TOPIC #t").await.unwrap();
    assert_eq!(
        bob.recv_line().await.unwrap().unwrap(),
        ":test.server 331 bob #t :No topic is set"
    );

    bob.send_raw("TOPIC #t :fresh topic").await.unwrap();
    assert_eq!(
        bob.recv_line().await.unwrap().unwrap(),
        ":bob!Anon@IRC TOPIC #t :fresh topic"
    );
    let seen = alice.recv().await.unwrap();
    assert_eq!(
        seen.to_string(),
        format!(":{}!Anon@IRC TOPIC #t :fresh topic", label_of(&seen))
    );

    alice.send_raw("TOPIC #t").await.unwrap();
    assert_eq!(
        alice.recv_line().await.unwrap().unwrap(),
        ":test.server 332 alice #t :fresh topic"
    );
}

#[tokio::test]
async fn lobby_topic_needs_an_operator() {
    let server = TestServer::spawn().await.unwrap();
    let mut alice = server.connect_registered("alice").await.unwrap();

    alice.send_raw("TOPIC # :mine now").await.unwrap();
    assert!(is_numeric(&alice.recv().await.unwrap(), Response::ERR_CHANOPRIVSNEEDED));
}

#[tokio::test]
async fn list_shows_channels_with_counts() {
    let server = TestServer::spawn().await.unwrap();
    let (mut alice, mut bob) = pair(&server).await;
    alice.join("#busy").await.unwrap();
    bob.join("#busy").await.unwrap();

    bob.send_raw("LIST").await.unwrap();
    let reply = bob.recv_until_numeric(Response::RPL_LISTEND).await.unwrap();
    assert!(is_numeric(&reply[0], Response::RPL_LISTSTART));

    let rows: Vec<(String, String)> = reply
        .iter()
        .filter_map(|m| match &m.command {
            Command::Response(Response::RPL_LIST, args) => Some((args[1].clone(), args[2].clone())),
            _ => None,
        })
        .collect();
    assert!(rows.contains(&("#".to_string(), "2".to_string())));
    assert!(rows.contains(&("#busy".to_string(), "2".to_string())));
    assert!(rows.contains(&("&".to_string(), "0".to_string())));

    bob.send_raw("LIST #busy").await.unwrap();
    let reply = bob.recv_until_numeric(Response::RPL_LISTEND).await.unwrap();
    assert_eq!(reply.len(), 3);
}

#[tokio::test]
async fn creator_can_kick_by_label() {
    let server = TestServer::spawn().await.unwrap();
    let (mut alice, mut bob) = pair(&server).await;
    let mut carol = server.connect_registered("carol").await.unwrap();
    alice.recv().await.unwrap();
    bob.recv().await.unwrap();

    alice.join("#k").await.unwrap();
    bob.join("#k").await.unwrap();
    let bob_join = alice.recv().await.unwrap();
    let bob_label = label_of(&bob_join);
    carol.join("#k").await.unwrap();
    alice.recv().await.unwrap();
    bob.recv().await.unwrap();

    alice
        .send_raw(&format!("KICK #k {bob_label} :behave"))
        .await
        .unwrap();

    assert_eq!(
        alice.recv_line().await.unwrap().unwrap(),
        format!(":alice!Anon@IRC KICK #k {bob_label} behave")
    );
    let to_bob = bob.recv().await.unwrap();
    assert_eq!(
        to_bob.to_string(),
        format!(":{}!Anon@IRC KICK #k bob behave", label_of(&to_bob))
    );
    let to_carol = carol.recv().await.unwrap();
    assert_eq!(
        to_carol.to_string(),
        format!(":{}!Anon@IRC KICK #k {bob_label} behave", label_of(&to_carol))
    );
    assert_eq!(server.matrix.channels.member_count("#k"), 2);
}

#[tokio::test]
async fn kick_needs_channel_operator() {
    let server = TestServer::spawn().await.unwrap();
    let (mut alice, mut bob) = pair(&server).await;
    let burst = alice.join("#k").await.unwrap();
    let alice_view = burst[0].to_string();
    assert!(alice_view.ends_with("JOIN #k"));
    bob.join("#k").await.unwrap();
    alice.recv().await.unwrap();

    bob.send_raw("KICK #k AnonXYZ").await.unwrap();
    assert_eq!(
        bob.recv_line().await.unwrap().unwrap(),
        ":test.server 482 bob #k :You're not channel operator"
    );

    alice.send_raw("KICK #k NoSuchLabel").await.unwrap();
    assert!(is_numeric(&alice.recv().await.unwrap(), Response::ERR_USERNOTINCHANNEL));
}
