//! Integration tests for address bans at the gateway and at registration.

mod common;

use anonirc_proto::Response;
use anonircd::security::{BanEntry, BanStore, StoreError};
use async_trait::async_trait;
use common::TestServer;
use common::client::is_numeric;
use std::net::IpAddr;
use std::sync::Arc;

/// A ban store whose backend is always down.
struct BrokenStore;

#[async_trait]
impl BanStore for BrokenStore {
    async fn is_banned(&self, _ip: IpAddr) -> Result<Option<BanEntry>, StoreError> {
        Err(StoreError::Unavailable("disk on fire".into()))
    }

    async fn add_ban(&self, _ban: BanEntry) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("disk on fire".into()))
    }

    async fn remove_ban(&self, _mask: &str) -> Result<bool, StoreError> {
        Err(StoreError::Unavailable("disk on fire".into()))
    }

    async fn list_active(&self) -> Result<Vec<BanEntry>, StoreError> {
        Err(StoreError::Unavailable("disk on fire".into()))
    }
}

fn local_ban(reason: &str) -> BanEntry {
    BanEntry::new("127.0.0.0/8", Some(reason.to_string()), "test", None)
}

#[tokio::test]
async fn banned_address_gets_only_an_error_line() {
    let server = TestServer::spawn_with(TestServer::config(), vec![local_ban("go away")])
        .await
        .unwrap();
    let mut client = server.connect("banned").await.unwrap();

    let lines = client.recv_until_closed().await.unwrap();
    assert_eq!(
        lines,
        vec!["ERROR :Closing Link: 127.0.0.1 (Banned: go away)".to_string()]
    );
    assert!(server.matrix.sessions.is_empty());
}

#[tokio::test]
async fn expired_ban_is_ignored() {
    let mut ban = local_ban("old news");
    ban.expires_at = Some(ban.set_at - 1);
    let server = TestServer::spawn_with(TestServer::config(), vec![ban])
        .await
        .unwrap();

    server.connect_registered("welcome").await.unwrap();
}

#[tokio::test]
async fn ban_added_after_accept_is_enforced_at_registration() {
    let server = TestServer::spawn().await.unwrap();
    let mut client = server.connect("sneaky").await.unwrap();
    client.send_raw("NICK sneaky").await.unwrap();

    server.matrix.bans.add_ban(local_ban("caught")).await.unwrap();
    client.send_raw("USER sneaky 0 * :Sneaky").await.unwrap();

    let lines = client.recv_until_closed().await.unwrap();
    assert_eq!(lines.len(), 2, "{lines:?}");
    let banned: anonirc_proto::Message = lines[0].parse().unwrap();
    assert!(is_numeric(&banned, Response::ERR_YOUREBANNEDCREEP));
    assert_eq!(lines[1], "ERROR :Closing Link: 127.0.0.1 (Banned: caught)");
}

#[tokio::test]
async fn unavailable_store_fails_closed_by_default() {
    let server = TestServer::spawn_with_store(TestServer::config(), Arc::new(BrokenStore))
        .await
        .unwrap();
    let mut client = server.connect("unlucky").await.unwrap();

    assert_eq!(
        client.recv_until_closed().await.unwrap(),
        vec!["ERROR :Closing Link: 127.0.0.1 (Ban check unavailable)".to_string()]
    );
}

#[tokio::test]
async fn unavailable_store_can_fail_open() {
    let mut config = TestServer::config();
    config.bans.fail_open = true;
    let server = TestServer::spawn_with_store(config, Arc::new(BrokenStore))
        .await
        .unwrap();

    server.connect_registered("lucky").await.unwrap();
}
