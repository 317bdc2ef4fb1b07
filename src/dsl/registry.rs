//! Registering the DSL with an editor host
//!
//!     The editor keeps a process-wide language registry. We never reach for it directly: the
//!     host is passed in as an [EditorHost], so the same registration code drives the real
//!     widget bridge, the CLI and the tests.
//!
//!     Registration runs three steps against the host, in order: declare the language id,
//!     install the tokenizer, install the language configuration. Each step overwrites whatever
//!     the host held under the same id, so registering on every editor mount is safe and
//!     leaves the host exactly as a single registration would.

use crate::dsl::grammar::{LexicalGrammar, FILE_EXTENSIONS};
use crate::dsl::language::LanguageConfiguration;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Error reported by a host that refuses a registration step.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct HostError {
    pub message: String,
}

impl HostError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("invalid language id '{0}'")]
    InvalidLanguageId(String),

    #[error("editor host rejected language '{id}': {source}")]
    Language { id: String, source: HostError },

    #[error("editor host rejected tokenizer for '{id}': {source}")]
    Tokenizer { id: String, source: HostError },

    #[error("editor host rejected configuration for '{id}': {source}")]
    Configuration { id: String, source: HostError },
}

/// Metadata declared for a language.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct LanguageInfo {
    pub id: String,
    pub extensions: Vec<String>,
}

/// The registration surface of an editing widget.
pub trait EditorHost {
    fn register_language(&mut self, info: LanguageInfo) -> Result<(), HostError>;

    fn set_tokens_provider(
        &mut self,
        id: &str,
        grammar: Arc<LexicalGrammar>,
    ) -> Result<(), HostError>;

    fn set_language_configuration(
        &mut self,
        id: &str,
        configuration: LanguageConfiguration,
    ) -> Result<(), HostError>;
}

fn validate_language_id(id: &str) -> Result<(), RegistrationError> {
    let valid = id
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic())
        && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(RegistrationError::InvalidLanguageId(id.to_string()))
    }
}

/// Registers the grammar's language, tokenizer and configuration with `host`.
pub fn register<H: EditorHost + ?Sized>(
    host: &mut H,
    grammar: &Arc<LexicalGrammar>,
) -> Result<(), RegistrationError> {
    let id = grammar.language_id();
    validate_language_id(id)?;

    debug!(language = id, "registering language");
    host.register_language(LanguageInfo {
        id: id.to_string(),
        extensions: FILE_EXTENSIONS.iter().map(|ext| format!(".{}", ext)).collect(),
    })
    .map_err(|source| RegistrationError::Language {
        id: id.to_string(),
        source,
    })?;

    host.set_tokens_provider(id, Arc::clone(grammar))
        .map_err(|source| RegistrationError::Tokenizer {
            id: id.to_string(),
            source,
        })?;

    host.set_language_configuration(id, LanguageConfiguration::imagedsl())
        .map_err(|source| RegistrationError::Configuration {
            id: id.to_string(),
            source,
        })?;

    debug!(language = id, "language registered");
    Ok(())
}

/// Everything a host holds for one language.
#[derive(Debug, Clone, Default)]
pub struct LanguageEntry {
    pub info: Option<LanguageInfo>,
    pub tokens_provider: Option<Arc<LexicalGrammar>>,
    pub configuration: Option<LanguageConfiguration>,
}

/// In-memory editor host keyed by language id.
#[derive(Debug, Clone, Default)]
pub struct LanguageRegistry {
    entries: BTreeMap<String, LanguageEntry>,
}

impl LanguageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|id| id.as_str())
    }

    pub fn language(&self, id: &str) -> Option<&LanguageInfo> {
        self.entries.get(id).and_then(|entry| entry.info.as_ref())
    }

    pub fn tokens_provider(&self, id: &str) -> Option<&Arc<LexicalGrammar>> {
        self.entries
            .get(id)
            .and_then(|entry| entry.tokens_provider.as_ref())
    }

    pub fn configuration(&self, id: &str) -> Option<&LanguageConfiguration> {
        self.entries
            .get(id)
            .and_then(|entry| entry.configuration.as_ref())
    }

    /// Finds the language registered for a file extension (with or without the dot).
    pub fn language_for_extension(&self, extension: &str) -> Option<&LanguageInfo> {
        let wanted = format!(".{}", extension.trim_start_matches('.'));
        self.entries
            .values()
            .filter_map(|entry| entry.info.as_ref())
            .find(|info| info.extensions.iter().any(|ext| *ext == wanted))
    }

    fn entry(&mut self, id: &str) -> &mut LanguageEntry {
        self.entries.entry(id.to_string()).or_default()
    }
}

impl EditorHost for LanguageRegistry {
    fn register_language(&mut self, info: LanguageInfo) -> Result<(), HostError> {
        let id = info.id.clone();
        self.entry(&id).info = Some(info);
        Ok(())
    }

    fn set_tokens_provider(
        &mut self,
        id: &str,
        grammar: Arc<LexicalGrammar>,
    ) -> Result<(), HostError> {
        if !self.entries.contains_key(id) {
            return Err(HostError::new(format!("unknown language '{}'", id)));
        }
        self.entry(id).tokens_provider = Some(grammar);
        Ok(())
    }

    fn set_language_configuration(
        &mut self,
        id: &str,
        configuration: LanguageConfiguration,
    ) -> Result<(), HostError> {
        if !self.entries.contains_key(id) {
            return Err(HostError::new(format!("unknown language '{}'", id)));
        }
        self.entry(id).configuration = Some(configuration);
        Ok(())
    }
}
