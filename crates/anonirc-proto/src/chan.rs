//! Channel name helpers.

/// The lobby every registered client is placed in.
pub const LOBBY: &str = "#";

/// The server channel: operator notices only, members cannot speak.
pub const SYSTEM: &str = "&";

/// Longest channel name accepted, sigil included.
pub const MAX_CHANNEL_LEN: usize = 50;

/// Extension trait for channel-name checks on string types.
pub trait ChannelExt {
    /// Starts with a channel sigil (`#` or `&`).
    fn is_channel_name(&self) -> bool;

    /// A channel name clients may join or create.
    fn is_valid_channel_name(&self) -> bool;
}

impl ChannelExt for str {
    fn is_channel_name(&self) -> bool {
        self.starts_with('#') || self.starts_with('&')
    }

    fn is_valid_channel_name(&self) -> bool {
        self.is_channel_name()
            && self.len() <= MAX_CHANNEL_LEN
            && !self
                .chars()
                .any(|c| matches!(c, ' ' | ',' | '\x07' | '\0' | '\r' | '\n' | ':'))
    }
}

impl ChannelExt for String {
    fn is_channel_name(&self) -> bool {
        self.as_str().is_channel_name()
    }

    fn is_valid_channel_name(&self) -> bool {
        self.as_str().is_valid_channel_name()
    }
}
