//! Matching and validation helpers shared by the daemon.

use crate::casemap::irc_lower_char;

/// Longest nickname accepted.
pub const MAX_NICK_LEN: usize = 30;

/// Match `text` against an IRC glob pattern (`*` and `?`), case-insensitively.
///
/// ```
/// use anonirc_proto::wildcard_match;
///
/// assert!(wildcard_match("192.168.*", "192.168.1.20"));
/// assert!(!wildcard_match("10.?.0.1", "10.20.0.1"));
/// ```
pub fn wildcard_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().map(irc_lower_char).collect();
    let text: Vec<char> = text.chars().map(irc_lower_char).collect();

    let mut p = 0;
    let mut t = 0;
    let mut star_p = None;
    let mut star_t = 0;

    while t < text.len() {
        if p < pattern.len() && (pattern[p] == '?' || pattern[p] == text[t]) {
            p += 1;
            t += 1;
        } else if p < pattern.len() && pattern[p] == '*' {
            star_p = Some(p);
            star_t = t;
            p += 1;
        } else if let Some(sp) = star_p {
            // backtrack: let the last '*' swallow one more char
            p = sp + 1;
            star_t += 1;
            t = star_t;
        } else {
            return false;
        }
    }

    while p < pattern.len() && pattern[p] == '*' {
        p += 1;
    }

    p == pattern.len()
}

fn is_special(c: char) -> bool {
    matches!(c, '[' | ']' | '\\' | '`' | '_' | '^' | '{' | '|' | '}')
}

/// RFC 2812 nickname grammar: a letter or special first, then letters,
/// digits, specials or `-`.
pub fn is_valid_nick(nick: &str) -> bool {
    let mut chars = nick.chars();
    let Some(first) = chars.next() else {
        return false;
    };

    nick.len() <= MAX_NICK_LEN
        && (first.is_ascii_alphabetic() || is_special(first))
        && chars.all(|c| c.is_ascii_alphanumeric() || is_special(c) || c == '-')
}
