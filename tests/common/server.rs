//! Test server management.
//!
//! Runs an anonircd gateway inside the test's runtime on an ephemeral port.

use anonircd::config::{Config, ConfigHandle, OperBlock};
use anonircd::network::Gateway;
use anonircd::security::{BanEntry, BanStore, MemoryBanStore};
use anonircd::state::{Anonymizer, Matrix};
use std::path::Path;
use std::sync::Arc;

/// Operator credentials present in every [`TestServer::config`].
pub const OPER_NAME: &str = "testop";
pub const OPER_PASS: &str = "testpass";

/// A test server instance.
pub struct TestServer {
    pub matrix: Arc<Matrix>,
    address: String,
}

impl TestServer {
    /// Baseline configuration: fixed name, a one-line MOTD, one operator.
    pub fn config() -> Config {
        let mut config = Config::default();
        config.server.name = "test.server".to_string();
        config.server.network = "TestNet".to_string();
        config.motd.lines = Some(vec!["Test Server".to_string()]);
        config.oper.push(OperBlock {
            name: OPER_NAME.to_string(),
            password: OPER_PASS.to_string(),
        });
        config
    }

    /// Spawn a server with [`TestServer::config`].
    pub async fn spawn() -> anyhow::Result<Self> {
        Self::spawn_with(Self::config(), Vec::new()).await
    }

    /// Spawn a server with the given configuration and pre-loaded bans.
    pub async fn spawn_with(config: Config, bans: Vec<BanEntry>) -> anyhow::Result<Self> {
        let anonymizer = Anonymizer::new(42, &config.anonymity);
        Self::start(ConfigHandle::new(config), Arc::new(MemoryBanStore::load(bans)), anonymizer).await
    }

    /// Spawn a server reading `path`, so REHASH picks up edits to the file.
    pub async fn spawn_from_file(path: &Path) -> anyhow::Result<Self> {
        let handle = ConfigHandle::load(path)?;
        let anonymizer = Anonymizer::new(42, &handle.current().anonymity);
        Self::start(handle, Arc::new(MemoryBanStore::new()), anonymizer).await
    }

    /// Spawn a server backed by an arbitrary ban store.
    pub async fn spawn_with_store(config: Config, bans: Arc<dyn BanStore>) -> anyhow::Result<Self> {
        let anonymizer = Anonymizer::new(42, &config.anonymity);
        Self::start(ConfigHandle::new(config), bans, anonymizer).await
    }

    async fn start(
        handle: ConfigHandle,
        bans: Arc<dyn BanStore>,
        anonymizer: Anonymizer,
    ) -> anyhow::Result<Self> {
        let matrix = Arc::new(Matrix::new(handle, bans, anonymizer));
        let gateway = Gateway::bind("127.0.0.1:0".parse()?, Arc::clone(&matrix)).await?;
        let address = gateway.local_addr()?.to_string();
        tokio::spawn(gateway.run());
        Ok(Self { matrix, address })
    }

    /// Get the server address.
    pub fn address(&self) -> String {
        self.address.clone()
    }

    /// Create a new test client connected to this server.
    pub async fn connect(&self, nick: &str) -> anyhow::Result<super::client::TestClient> {
        super::client::TestClient::connect(&self.address(), nick).await
    }

    /// Connect and complete registration, including the lobby join burst.
    pub async fn connect_registered(&self, nick: &str) -> anyhow::Result<super::client::TestClient> {
        let mut client = self.connect(nick).await?;
        client.register().await?;
        Ok(client)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        // stops the accept loop and cancels every session
        self.matrix.lifecycle.begin_shutdown();
    }
}

/// Poll `condition` for up to two seconds.
#[allow(dead_code)]
pub async fn eventually<F: Fn() -> bool>(condition: F) -> bool {
    for _ in 0..100 {
        if condition() {
            return true;
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }
    condition()
}
