//! Parsing policy: the delimiters and switches a config grammar is built from.
//!
//! A policy is plain data and may be stored as TOML:
//!
//! ```toml
//! line_comment = "#"
//! section_start = "<"
//! section_end = ">"
//! trim = true
//! ```
//!
//! Missing fields take the defaults of [`Policy::default`]. Every policy is
//! validated before a grammar is built from it.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("The {field} delimiter is empty")]
    EmptyDelimiter { field: &'static str },

    #[error("The {first} and {second} delimiters are both {delimiter:?}")]
    DelimiterCollision {
        first: &'static str,
        second: &'static str,
        delimiter: String,
    },

    #[error("Failed to read policy file at {policy_path}: {source}")]
    PolicyReadError {
        policy_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse policy file at {policy_path}: {source}")]
    PolicyParseError {
        policy_path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Policy {
    pub line_comment: String,
    pub block_comment_start: String,
    pub block_comment_end: String,
    pub section_start: String,
    pub section_end: String,
    pub assign: String,
    /// Strip blanks around names, keys and unquoted values.
    pub trim: bool,
    /// Restrict names and keys to `[A-Za-z_][A-Za-z0-9_]*`.
    pub alnum_names: bool,
    /// Allow double-quoted values, which may contain comment delimiters.
    pub quoted_values: bool,
    /// Error budget. Values below the engine's floor of 4 are raised to it.
    pub max_errors: usize,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            line_comment: ";".to_string(),
            block_comment_start: "/*".to_string(),
            block_comment_end: "*/".to_string(),
            section_start: "[".to_string(),
            section_end: "]".to_string(),
            assign: "=".to_string(),
            trim: false,
            alnum_names: false,
            quoted_values: false,
            max_errors: sprig_syntax::DEFAULT_MAX_ERRORS,
        }
    }
}

impl Policy {
    /// Each delimiter with the name it is reported under.
    pub fn delimiters(&self) -> [(&'static str, &str); 6] {
        [
            ("line comment", &self.line_comment),
            ("block comment start", &self.block_comment_start),
            ("block comment end", &self.block_comment_end),
            ("section start", &self.section_start),
            ("section end", &self.section_end),
            ("assignment", &self.assign),
        ]
    }

    /// Check that no delimiter is empty and no two delimiters are equal.
    pub fn validate(&self) -> Result<(), PolicyError> {
        let delimiters = self.delimiters();
        for (field, delimiter) in delimiters {
            if delimiter.is_empty() {
                return Err(PolicyError::EmptyDelimiter { field });
            }
        }
        for (i, &(first, delimiter)) in delimiters.iter().enumerate() {
            let clash = delimiters[i + 1..]
                .iter()
                .find(|&&(_, other)| other == delimiter);
            if let Some(&(second, _)) = clash {
                return Err(PolicyError::DelimiterCollision {
                    first,
                    second,
                    delimiter: delimiter.to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn load_from_path<P: AsRef<Path>>(policy_path: P) -> Result<Option<Self>, PolicyError> {
        let policy_path = policy_path.as_ref();
        if !policy_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(policy_path).map_err(|source| {
            PolicyError::PolicyReadError {
                policy_path: policy_path.to_path_buf(),
                source,
            }
        })?;

        let policy: Policy =
            toml::from_str(&content).map_err(|source| PolicyError::PolicyParseError {
                policy_path: policy_path.to_path_buf(),
                source,
            })?;
        policy.validate()?;

        log::debug!("loaded policy from {}", policy_path.display());
        Ok(Some(policy))
    }

    pub fn load() -> Result<Option<Self>, PolicyError> {
        Self::load_from_path(Self::policy_path())
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, policy_path: P) -> anyhow::Result<()> {
        let policy_path = policy_path.as_ref();
        if let Some(parent) = policy_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(policy_path, content)?;
        Ok(())
    }

    pub fn policy_path() -> PathBuf {
        let policy_dir = shellexpand::tilde("~/.config/sprig");
        PathBuf::from(policy_dir.as_ref()).join("policy.toml")
    }
}
