//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Core config struct definitions (Config, ServerConfig, MotdConfig, BansConfig)
//! - [`limits`]: Queue, line and timeout limits (LimitsConfig, IdleTimeoutsConfig)
//! - [`oper`]: Operator blocks (OperBlock)
//! - [`anonymity`]: Label generation settings (AnonymityConfig, RejoinPolicy)
//! - [`validation`]: Startup and reload validation
//!
//! The running configuration is an immutable `Arc<Config>` snapshot held by
//! [`ConfigHandle`]. A reload swaps the `Arc`; readers that already cloned the
//! old one keep using it until they are done.

mod anonymity;
mod limits;
mod oper;
mod types;
pub mod validation;

pub use anonymity::{AnonymityConfig, RejoinPolicy};
pub use limits::{IdleTimeoutsConfig, LimitsConfig};
pub use oper::OperBlock;
pub use types::{
    BansConfig, Config, ConfigError, DatabaseConfig, ListenConfig, MotdConfig, ServerConfig,
};

use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Hot-swappable configuration snapshot.
pub struct ConfigHandle {
    /// File to re-read on reload. `None` for configs built in code.
    path: Option<PathBuf>,
    current: RwLock<Arc<Config>>,
}

impl ConfigHandle {
    /// Wrap an already-built configuration. Reloads keep it as is.
    pub fn new(config: Config) -> Self {
        Self {
            path: None,
            current: RwLock::new(Arc::new(config)),
        }
    }

    /// Load and validate `path`; later reloads re-read the same file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref().to_path_buf();
        let config = Config::load_validated(&path)?;
        Ok(Self {
            path: Some(path),
            current: RwLock::new(Arc::new(config)),
        })
    }

    /// The config file path, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// The current snapshot.
    pub fn current(&self) -> Arc<Config> {
        Arc::clone(&self.current.read())
    }

    /// Re-read and validate the config file, then swap it in.
    ///
    /// On error the running snapshot stays in place.
    pub fn reload(&self) -> Result<Arc<Config>, ConfigError> {
        let Some(path) = self.path.as_deref() else {
            return Ok(self.current());
        };

        let fresh = Arc::new(Config::load_validated(path)?);
        let old = std::mem::replace(&mut *self.current.write(), Arc::clone(&fresh));

        for setting in restart_required(&old, &fresh) {
            warn!(setting, "Change needs a restart to take effect");
        }
        info!(path = %path.display(), "Configuration reloaded");
        Ok(fresh)
    }
}

/// Settings that differ between `old` and `fresh` but are only read at
/// startup.
fn restart_required(old: &Config, fresh: &Config) -> Vec<&'static str> {
    let mut changed = Vec::new();
    if old.listen.address != fresh.listen.address {
        changed.push("listen.address");
    }
    if old.anonymity != fresh.anonymity {
        changed.push("anonymity");
    }
    changed
}
