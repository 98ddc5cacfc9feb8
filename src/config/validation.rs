//! Configuration validation.
//!
//! Runs at startup and on every reload; a reload that fails validation
//! leaves the running configuration untouched.

use super::Config;
use crate::state::anonymizer::MAX_SUFFIX_LEN;
use std::path::Path;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("server.name is required")]
    MissingServerName,
    #[error("server.name must not contain spaces, got '{0}'")]
    InvalidServerName(String),
    #[error("server.network is required")]
    MissingNetworkName,
    #[error("limits.send_queue must be at least 1")]
    ZeroSendQueue,
    #[error("limits.max_line_len must be between 64 and 8192, got {0}")]
    InvalidLineLength(usize),
    #[error("anonymity.label_prefix must be a valid nickname, got '{0}'")]
    InvalidLabelPrefix(String),
    #[error("anonymity.suffix_len must be between 1 and {max}, got {0}", max = MAX_SUFFIX_LEN)]
    InvalidSuffixLength(usize),
    #[error("oper block has an empty name")]
    EmptyOperName,
    #[error("duplicate oper block '{0}'")]
    DuplicateOper(String),
    #[error("database.path parent directory does not exist: {0}")]
    DatabasePathInvalid(String),
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.name.is_empty() {
        errors.push(ValidationError::MissingServerName);
    } else if config.server.name.contains(' ') {
        errors.push(ValidationError::InvalidServerName(config.server.name.clone()));
    }
    if config.server.network.is_empty() {
        errors.push(ValidationError::MissingNetworkName);
    }

    let limits = &config.limits;
    if limits.send_queue == 0 {
        errors.push(ValidationError::ZeroSendQueue);
    }
    if !(64..=8192).contains(&limits.max_line_len) {
        errors.push(ValidationError::InvalidLineLength(limits.max_line_len));
    }

    let anon = &config.anonymity;
    if !anonirc_proto::is_valid_nick(&anon.label_prefix) {
        errors.push(ValidationError::InvalidLabelPrefix(anon.label_prefix.clone()));
    }
    if !(1..=MAX_SUFFIX_LEN).contains(&anon.suffix_len) {
        errors.push(ValidationError::InvalidSuffixLength(anon.suffix_len));
    }

    let mut seen = std::collections::HashSet::new();
    for oper in &config.oper {
        if oper.name.is_empty() {
            errors.push(ValidationError::EmptyOperName);
        } else if !seen.insert(oper.name.as_str()) {
            errors.push(ValidationError::DuplicateOper(oper.name.clone()));
        }
    }

    if let Some(ref db) = config.database {
        let db_path = Path::new(&db.path);
        if let Some(parent) = db_path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            errors.push(ValidationError::DatabasePathInvalid(db.path.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
