//! # sprig-syntax
//!
//! A backtracking rule engine for small hand-written grammars, with
//! diagnostics that survive backtracking.
//!
//! Grammars are built from combinators ([`Rule`]) and annotated two ways:
//! with **actions**, values of a grammar-specific type that are delivered to
//! a receiver once the whole parse has committed, and with **effects**, which
//! maintain a stack of tentative error messages and a stack of breadcrumbs
//! ("inside section X") while matching runs.
//!
//! ## Architecture Overview
//!
//! ```text
//! Driver::parse
//!   │  range checks, reentrancy guard
//!   ▼
//! Matcher ──run(rule)──▶ journal of Events ──▶ Journal ──▶ grammar replay ──▶ receiver
//!   │                     (truncated on failure)          (only after commit)
//!   ▼
//! Diagnostics ──▶ MessageSink
//!   diagnostic stack  (Push / Prepare / Cancel / Pop / PopAbandoned / SendNow)
//!   breadcrumb stack  (EnterScope / LeaveScope / ReplaceScope)
//!   error budget      (abort after max_errors)
//! ```
//!
//! ### Actions are journaled
//!
//! A rule inside a failed alternative may already have matched part of the
//! input. Calling a receiver from there would report content that is later
//! thrown away, so the [`Matcher`](parser::Matcher) records
//! [`Event`](parser::event::Event)s instead and truncates them on failure.
//! The driver hands the committed journal to the grammar's replay function.
//!
//! ### Diagnostics are transactional
//!
//! Effects run immediately. Entries pushed by a failed attempt move to an
//! abandoned list; a successful enclosing rule forgets them, a failed root
//! rule reports them. See [`diagnostics`].
//!
//! ## Module Structure
//!
//! ```text
//! sprig-syntax/
//! ├── lib.rs           # This file - public API
//! ├── input.rs         # Span, Position, LineIndex
//! ├── charset.rs       # 256-bit byte sets
//! ├── rule.rs          # Rule combinators
//! ├── diagnostics.rs   # Levels, messages, effects, sinks, the error budget
//! ├── breadcrumbs.rs   # Scope stack for message context
//! ├── delivery.rs      # Receiver calls that stop on refusal
//! ├── driver.rs        # Driver and ParseResult
//! └── parser/
//!     ├── mod.rs       # Matcher: backtracking evaluation
//!     ├── event.rs     # Journal events
//!     └── replay.rs    # Walking a committed journal
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use sprig_syntax::{CharSet, Driver, Level, MessageSink, ParseResult, Rule};
//!
//! struct Print;
//! impl MessageSink for Print {
//!     fn give_message(&mut self, level: Level, text: &str) -> bool {
//!         println!("{level}: {text}");
//!         true
//!     }
//! }
//!
//! let number = Rule::set(CharSet::digit()).repeat1().action("number");
//! let list = number.clone().then(Rule::byte(b',').then(number).repeat());
//!
//! let driver = Driver::new();
//! let mut numbers = Vec::new();
//! let result = driver.parse(b"1,22,333", 0, 8, &list, &mut Print, |journal| {
//!     numbers.extend(journal.nodes().map(|n| n.span().to_string()));
//!     true
//! });
//!
//! assert_eq!(result, ParseResult::AllValid);
//! assert_eq!(numbers, ["1", "22", "333"]);
//! ```

pub mod breadcrumbs;
pub mod charset;
pub mod delivery;
pub mod diagnostics;
pub mod driver;
pub mod input;
pub mod parser;
pub mod rule;

pub use breadcrumbs::{Breadcrumb, BreadcrumbStack};
pub use charset::CharSet;
pub use delivery::Delivery;
pub use diagnostics::{Aborted, DiagnosticStack, Effect, Level, Message, MessageSink, Report};
pub use driver::{DEFAULT_MAX_ERRORS, Driver, MIN_MAX_ERRORS, ParseResult};
pub use input::{LineIndex, Position, Span};
pub use parser::replay::{EventNode, Journal, Nodes};
pub use rule::Rule;
