//! Configuration loader for the pipe tool.
//!
//! `defaults/pipe.default.toml` is embedded into the binary so that docs and
//! runtime behavior stay in sync. User files and CLI settings are layered on
//! top of those defaults via [`Loader`] before deserializing into [`PipeConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

const DEFAULT_TOML: &str = include_str!("../defaults/pipe.default.toml");

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PipeConfig {
    pub tokenizer: TokenizerConfig,
    pub output: OutputConfig,
    pub highlight: HighlightConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenizerConfig {
    pub max_stack_depth: usize,
}

/// Controls `pipe tokenize` listings.
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub show_whitespace: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HighlightConfig {
    pub color: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    Text,
    Json,
    Yaml,
}

impl OutputFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Text => "text",
            OutputFormat::Json => "json",
            OutputFormat::Yaml => "yaml",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "yaml" => Ok(OutputFormat::Yaml),
            other => Err(format!(
                "unknown output format '{}' (expected text, json or yaml)",
                other
            )),
        }
    }
}

/// Layers a user file and command-line flags over the built-in defaults.
///
/// Later layers win: defaults, then [Loader::with_file], then [Loader::set_override].
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Starts from `defaults/pipe.default.toml`.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Adds a TOML file; a missing file fails at [Loader::build].
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Sets one dotted key, e.g. `output.format`, above every file layer.
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    pub fn build(self) -> Result<PipeConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// The embedded defaults alone.
pub fn load_defaults() -> Result<PipeConfig, ConfigError> {
    Loader::new().build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_default_config() {
        let config = load_defaults().expect("defaults to deserialize");
        assert_eq!(config.tokenizer.max_stack_depth, 100);
        assert_eq!(config.output.format, OutputFormat::Text);
        assert!(!config.output.show_whitespace);
        assert!(config.highlight.color);
    }

    #[test]
    fn supports_overrides() {
        let config = Loader::new()
            .set_override("output.format", "json")
            .expect("override to apply")
            .build()
            .expect("config to build");
        assert_eq!(config.output.format, OutputFormat::Json);
    }

    #[test]
    fn layers_user_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[tokenizer]\nmax_stack_depth = 8\n\n[highlight]\ncolor = false").unwrap();

        let config = Loader::new().with_file(file.path()).build().unwrap();
        assert_eq!(config.tokenizer.max_stack_depth, 8);
        assert!(!config.highlight.color);
        // untouched keys keep their defaults
        assert_eq!(config.output.format, OutputFormat::Text);
    }

    #[test]
    fn missing_required_file_fails() {
        assert!(Loader::new().with_file("/nonexistent/pipe.toml").build().is_err());
    }

    #[test]
    fn overrides_win_over_user_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[output]\nformat = \"yaml\"\nshow_whitespace = false").unwrap();

        let config = Loader::new()
            .with_file(file.path())
            .set_override("output.format", "json")
            .unwrap()
            .set_override("output.show_whitespace", true)
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(config.output.format, OutputFormat::Json);
        assert!(config.output.show_whitespace);
    }

    #[test]
    fn unknown_override_format_is_rejected() {
        let result = Loader::new()
            .set_override("output.format", "xml")
            .unwrap()
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn parses_output_format() {
        assert_eq!("yaml".parse::<OutputFormat>(), Ok(OutputFormat::Yaml));
        assert!("xml".parse::<OutputFormat>().is_err());
    }
}
