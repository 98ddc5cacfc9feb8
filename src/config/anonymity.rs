//! Display identity settings.

use serde::Deserialize;

/// What a session gets when it rejoins a channel it left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RejoinPolicy {
    /// A newly drawn label every time.
    #[default]
    Fresh,
    /// The previous label, if nobody else holds it now.
    Reuse,
}

/// Settings for generated labels. Read once at startup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AnonymityConfig {
    /// Fixed head of every label (default: "Anon").
    #[serde(default = "default_label_prefix")]
    pub label_prefix: String,
    /// Initial number of A-Z letters after the prefix (default: 3).
    #[serde(default = "default_suffix_len")]
    pub suffix_len: usize,
    #[serde(default)]
    pub rejoin: RejoinPolicy,
}

impl Default for AnonymityConfig {
    fn default() -> Self {
        Self {
            label_prefix: default_label_prefix(),
            suffix_len: default_suffix_len(),
            rejoin: RejoinPolicy::default(),
        }
    }
}

fn default_label_prefix() -> String {
    "Anon".to_string()
}

fn default_suffix_len() -> usize {
    3
}
