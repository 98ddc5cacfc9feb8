//! Owned IRC message type.

mod parser;

use std::fmt;
use std::str::FromStr;

use crate::command::Command;
use crate::error::{MessageParseError, ProtocolError};
use crate::prefix::Prefix;

/// One IRC line: optional source prefix plus a command.
///
/// Incoming IRCv3 tags are accepted and dropped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    /// Message source.
    pub prefix: Option<Prefix>,
    /// The command and its parameters.
    pub command: Command,
}

impl Message {
    /// Create a message.
    pub fn new(prefix: Option<Prefix>, command: Command) -> Self {
        Message { prefix, command }
    }

    /// Replace the prefix.
    pub fn with_prefix(mut self, prefix: Prefix) -> Self {
        self.prefix = Some(prefix);
        self
    }
}

impl From<Command> for Message {
    fn from(command: Command) -> Self {
        Message {
            prefix: None,
            command,
        }
    }
}

/// The last parameter needs a `:` when it would otherwise be misread.
fn needs_colon(param: &str) -> bool {
    param.is_empty() || param.contains(' ') || param.starts_with(':')
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(prefix) = &self.prefix {
            write!(f, ":{prefix} ")?;
        }
        f.write_str(&self.command.name())?;

        let params = self.command.params();
        let last = params.len().saturating_sub(1);
        for (idx, param) in params.iter().enumerate() {
            if idx == last && needs_colon(param) {
                write!(f, " :{param}")?;
            } else {
                write!(f, " {param}")?;
            }
        }
        Ok(())
    }
}

impl FromStr for Message {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let line = s.trim_start().trim_end_matches(['\r', '\n']);
        let invalid = |cause| ProtocolError::InvalidMessage {
            string: line.to_owned(),
            cause,
        };

        if line.trim().is_empty() {
            return Err(invalid(MessageParseError::EmptyMessage));
        }

        let (rest, parsed) = parser::parse_message(line)
            .map_err(|_| invalid(MessageParseError::InvalidCommand))?;

        if !rest.trim().is_empty() && parsed.params.len() < parser::MAX_PARAMS {
            return Err(invalid(MessageParseError::TrailingData));
        }

        let command = Command::new(parsed.command, &parsed.params).map_err(invalid)?;

        Ok(Message {
            prefix: parsed.prefix.map(Prefix::from),
            command,
        })
    }
}
