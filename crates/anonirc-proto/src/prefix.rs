//! Message source prefix.

use std::fmt;

/// The source of a message: either a server or a `nick!user@host` mask.
///
/// A prefix without `!` or `@` parses as [`Prefix::ServerName`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Prefix {
    /// Server name, e.g. `AnonIRC`.
    ServerName(String),
    /// `(nick, user, host)`; empty user or host parts are omitted on output.
    Nickname(String, String, String),
}

impl Prefix {
    /// Build a full `nick!user@host` prefix.
    pub fn new_user(nick: impl Into<String>, user: impl Into<String>, host: impl Into<String>) -> Self {
        Prefix::Nickname(nick.into(), user.into(), host.into())
    }

    /// The nickname or server name part.
    pub fn name(&self) -> &str {
        match self {
            Prefix::ServerName(name) => name,
            Prefix::Nickname(nick, _, _) => nick,
        }
    }
}

impl From<&str> for Prefix {
    fn from(s: &str) -> Self {
        if !s.contains(['!', '@']) {
            return Prefix::ServerName(s.to_owned());
        }

        let (nick_user, host) = match s.split_once('@') {
            Some((left, host)) => (left, host),
            None => (s, ""),
        };
        let (nick, user) = match nick_user.split_once('!') {
            Some((nick, user)) => (nick, user),
            None => (nick_user, ""),
        };

        Prefix::Nickname(nick.to_owned(), user.to_owned(), host.to_owned())
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prefix::ServerName(name) => f.write_str(name),
            Prefix::Nickname(nick, user, host) => {
                f.write_str(nick)?;
                if !user.is_empty() {
                    write!(f, "!{user}")?;
                }
                if !host.is_empty() {
                    write!(f, "@{host}")?;
                }
                Ok(())
            }
        }
    }
}
