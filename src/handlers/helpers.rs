//! Helper functions for IRC command handlers.
//!
//! Reply builders shared by several handler families.

use anonirc_proto::{Command, Message, Prefix, Response};

/// Longest `353` payload before the names list is split.
const NAMES_CHUNK: usize = 400;

/// Helper to create a server reply message (numeric response).
pub fn server_reply(server_name: &str, response: Response, params: Vec<String>) -> Message {
    Message::new(
        Some(Prefix::ServerName(server_name.to_string())),
        Command::Response(response, params),
    )
}

/// Helper to create a server NOTICE message.
pub fn server_notice<T: Into<String>>(server_name: &str, target: &str, text: T) -> Message {
    Message::new(
        Some(Prefix::ServerName(server_name.to_string())),
        Command::NOTICE(target.to_string(), text.into()),
    )
}

/// Split a names list into space-joined chunks that fit one `353` line.
pub fn chunk_names(names: &[String]) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    for name in names {
        if !current.is_empty() && current.len() + 1 + name.len() > NAMES_CHUNK {
            chunks.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(name);
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Comma-separated targets, empty entries dropped.
pub fn split_targets(list: &str) -> impl Iterator<Item = &str> {
    list.split(',').filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunks_stay_under_limit() {
        let names: Vec<String> = (0..200).map(|i| format!("Anon{i:04}")).collect();
        let chunks = chunk_names(&names);
        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.len() <= NAMES_CHUNK));
        assert_eq!(
            chunks.iter().map(|c| c.split(' ').count()).sum::<usize>(),
            200
        );
    }

    #[test]
    fn empty_targets_are_skipped() {
        assert_eq!(split_targets("#a,,bob,").collect::<Vec<_>>(), vec!["#a", "bob"]);
    }
}
