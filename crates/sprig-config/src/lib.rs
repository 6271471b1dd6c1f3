//! # sprig-config
//!
//! A grammar for INI-style config files whose delimiters are chosen by a
//! [`Policy`]: comment markers, section brackets and the assignment operator
//! are all configurable, as are trimming, name restrictions and quoted
//! values.
//!
//! ## Architecture Overview
//!
//! ```text
//! Policy ──validate──▶ ConfigGrammar::new ──▶ rule
//!
//! ConfigParser::parse_file(path)
//!   │  read_config_file: NUL → ' ', append '\n'
//!   ▼
//! ConfigParser::parse(bytes)
//!   │
//!   ├─▶ Driver::parse(rule)          sprig-syntax, error budget from the policy
//!   │       diagnostics ──▶ MessageSink
//!   │
//!   └─▶ ConfigGrammar::replay(journal)
//!           SectionName ──▶ add_section
//!           KeyValue    ──▶ add_global_key / add_section_key
//!           end         ──▶ parsed_config_file(valid)
//! ```
//!
//! A malformed line is reported and skipped; parsing resumes on the next
//! line until the error budget runs out.
//!
//! ## Example
//!
//! ```
//! use sprig_config::{ConfigParser, ConfigReceiver, Policy};
//! use sprig_syntax::{Level, MessageSink, ParseResult, Span};
//!
//! struct Quiet;
//! impl MessageSink for Quiet {
//!     fn give_message(&mut self, _: Level, _: &str) -> bool {
//!         true
//!     }
//! }
//!
//! #[derive(Default)]
//! struct Keys(Vec<String>);
//! impl ConfigReceiver for Keys {
//!     fn add_global_key(&mut self, key: Span<'_>, _: Option<Span<'_>>) -> bool {
//!         self.0.push(key.to_string());
//!         true
//!     }
//!     fn add_section(&mut self, _: Span<'_>) -> bool {
//!         true
//!     }
//!     fn add_section_key(&mut self, key: Span<'_>, _: Option<Span<'_>>) -> bool {
//!         self.0.push(key.to_string());
//!         true
//!     }
//!     fn parsed_config_file(&mut self, _: bool) {}
//! }
//!
//! let parser = ConfigParser::new(Policy { trim: true, ..Policy::default() }).unwrap();
//! let mut keys = Keys::default();
//! let result = parser.parse(b"name = demo\n[server]\nport = 80\n", &mut keys, &mut Quiet);
//!
//! assert_eq!(result, ParseResult::AllValid);
//! assert_eq!(keys.0, ["name", "port"]);
//! ```

pub mod file;
pub mod grammar;
pub mod policy;
pub mod receiver;

pub use file::{FileError, expand_file_patterns, read_config_file};
pub use grammar::{ConfigAction, ConfigGrammar};
pub use policy::{Policy, PolicyError};
pub use receiver::ConfigReceiver;

use std::path::Path;

use sprig_syntax::{Delivery, Driver, MessageSink, ParseResult};


/// Restated as the last message when the error budget runs out.
pub const ABORT_RESTATEMENT: &str = "Unable to continue parsing config contents.";

/// Parses config files under one policy.
///
/// Not reentrant: a receiver or sink that starts another parse on the same
/// parser gets [`ParseResult::ParsingNow`].
pub struct ConfigParser {
    policy: Policy,
    grammar: ConfigGrammar,
    driver: Driver,
}

impl ConfigParser {
    pub fn new(policy: Policy) -> Result<Self, PolicyError> {
        policy.validate()?;
        Ok(Self::build(policy))
    }

    fn build(policy: Policy) -> Self {
        let grammar = ConfigGrammar::new(&policy);
        let driver = Driver::new()
            .with_max_errors(policy.max_errors)
            .with_abort_restatement(ABORT_RESTATEMENT);
        Self {
            policy,
            grammar,
            driver,
        }
    }

    /// Rebuild the grammar for `policy`. The current policy is kept if the
    /// new one is rejected.
    pub fn set_policy(&mut self, policy: Policy) -> Result<(), PolicyError> {
        policy.validate()?;
        *self = Self::build(policy);
        Ok(())
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    pub fn grammar(&self) -> &ConfigGrammar {
        &self.grammar
    }

    pub fn driver(&self) -> &Driver {
        &self.driver
    }

    /// Validity of the last parse that reached replay.
    pub fn is_valid(&self) -> bool {
        self.grammar.is_valid()
    }

    /// Parse `source[start..end]`.
    pub fn parse_range(
        &self,
        source: &[u8],
        start: usize,
        end: usize,
        receiver: &mut dyn ConfigReceiver,
        sink: &mut dyn MessageSink,
    ) -> ParseResult {
        let mut out = Delivery::default();
        self.driver
            .parse(source, start, end, self.grammar.rule(), sink, |journal| {
                self.grammar.replay(journal, receiver, &mut out)
            })
    }

    pub fn parse(
        &self,
        input: &[u8],
        receiver: &mut dyn ConfigReceiver,
        sink: &mut dyn MessageSink,
    ) -> ParseResult {
        self.parse_range(input, 0, input.len(), receiver, sink)
    }

    /// Read and parse one file. File errors are reported as their
    /// [`FileError::result`] code.
    pub fn parse_file<P: AsRef<Path>>(
        &self,
        path: P,
        receiver: &mut dyn ConfigReceiver,
        sink: &mut dyn MessageSink,
    ) -> ParseResult {
        match read_config_file(path.as_ref()) {
            Ok(contents) => self.parse(&contents, receiver, sink),
            Err(err) => {
                log::warn!("{err}");
                err.result()
            }
        }
    }
}

impl Default for ConfigParser {
    fn default() -> Self {
        Self::build(Policy::default())
    }
}
