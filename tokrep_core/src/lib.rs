//! `tokrep_core` replaces delimited tokens such as `${name}` in a string with
//! values from a key/value source, falling back to a default value when a key
//! is missing.
//!
//! ## Processing Pipeline
//!
//! ```text
//! input, delimiters, default
//!   → Stringable normalization (reject values without a string form)
//!   → Pattern (quoted start + non-greedy capture + quoted end)
//!   → Token scan (left to right, non-overlapping)
//!   → Key normalization → Source lookup (default on not-found)
//!   → Literal replacement on the working string
//! ```
//!
//! ## Modules
//!
//! - [`config`] — Loading `tokrep.toml`, including token settings and data
//!   source mappings.
//! - [`source`] — The [`Source`] lookup trait and adapters for maps, JSON
//!   values, sequences and closures.
//! - [`stringable`] — Coercion of scalar values into strings.
//!
//! ## Quick Start
//!
//! ```rust
//! use serde_json::json;
//! use tokrep_core::TokenReplacer;
//!
//! let source = json!({ "name": "world" });
//! let replacer = TokenReplacer::new();
//! let output = replacer
//! 	.replace(
//! 		&json!("Hello ${name}${punctuation}"),
//! 		&source,
//! 		&json!("${"),
//! 		&json!("}"),
//! 		Some(&json!("!")),
//! 	)
//! 	.unwrap();
//!
//! assert_eq!(output, "Hello world!");
//! ```

pub use config::*;
pub use engine::*;
pub use error::*;
pub use key::*;
pub use placeholder::*;
pub use source::*;
pub use stringable::*;

pub mod config;
mod engine;
#[allow(unused_assignments)]
mod error;
mod key;
mod placeholder;
pub mod source;
pub mod stringable;
