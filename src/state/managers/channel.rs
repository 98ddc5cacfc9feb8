//! Channel registry.
//!
//! All channels live in one map behind a single lock. Membership changes
//! touch the channel and the joining session's record together, so they are
//! done under the write lock; fan-out happens after it is released.
//!
//! Lock order: this registry first, then any [`crate::state::Session`] data.

use crate::state::channel::Channel;
use anonirc_proto::chan::{LOBBY, SYSTEM};
use anonirc_proto::irc_to_lower;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::collections::HashMap;

pub struct ChannelManager {
    channels: RwLock<HashMap<String, Channel>>,
}

impl ChannelManager {
    /// Registry holding the two permanent channels.
    pub fn new() -> Self {
        let mut channels = HashMap::new();
        for name in [LOBBY, SYSTEM] {
            channels.insert(key(name), Channel::new(name));
        }
        Self {
            channels: RwLock::new(channels),
        }
    }

    pub fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Channel>> {
        self.channels.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Channel>> {
        self.channels.write()
    }

    pub fn exists(&self, name: &str) -> bool {
        self.channels.read().contains_key(&key(name))
    }

    pub fn count(&self) -> usize {
        self.channels.read().len()
    }

    pub fn member_count(&self, name: &str) -> usize {
        self.channels
            .read()
            .get(&key(name))
            .map_or(0, |c| c.members.len())
    }
}

impl Default for ChannelManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Registry key for a channel name.
pub fn key(name: &str) -> String {
    irc_to_lower(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_permanent_channels() {
        let channels = ChannelManager::new();
        assert_eq!(channels.count(), 2);
        assert!(channels.exists("#"));
        assert!(channels.exists("&"));
        assert!(!channels.exists("#rust"));
    }

    #[test]
    fn lookups_are_casefolded() {
        let channels = ChannelManager::new();
        channels.write().insert(key("#Rust"), Channel::new("#Rust"));
        assert!(channels.exists("#rust"));
        assert_eq!(channels.read()[&key("#RUST")].name, "#Rust");
    }
}
