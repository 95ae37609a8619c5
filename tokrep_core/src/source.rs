//! Key/value sources that back token substitution.
//!
//! A [`Source`] answers a single question: what is the value for this key?
//! The answer distinguishes three outcomes:
//!
//! - `Ok(Some(value))`: the key exists.
//! - `Ok(None)`: the key does not exist. The replacer substitutes the default
//!   value.
//! - `Err(error)`: the lookup itself failed. The replacer aborts.
//!
//! Adapters are provided for maps, JSON values, sequences (indexed by the
//! canonical decimal key) and closures.

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::hash::BuildHasher;

use serde::Serialize;
use serde_json::Value;

use crate::SourceError;

pub trait Source {
	fn lookup(&self, key: &str) -> Result<Option<Value>, SourceError>;
}

impl<T: Source + ?Sized> Source for &T {
	fn lookup(&self, key: &str) -> Result<Option<Value>, SourceError> {
		(**self).lookup(key)
	}
}

impl<T: Source + ?Sized> Source for Box<T> {
	fn lookup(&self, key: &str) -> Result<Option<Value>, SourceError> {
		(**self).lookup(key)
	}
}

fn serialize_found<V: Serialize + ?Sized>(
	value: &V,
	key: &str,
) -> Result<Option<Value>, SourceError> {
	serde_json::to_value(value).map(Some).map_err(|e| {
		SourceError::with_cause(format!("value for `{key}` could not be serialized"), e)
	})
}

/// Only canonical decimal indices resolve: `"01"` and `"+1"` are distinct,
/// absent keys.
fn parse_index(key: &str) -> Option<usize> {
	if key.is_empty() || !key.bytes().all(|b| b.is_ascii_digit()) {
		return None;
	}
	if key.len() > 1 && key.starts_with('0') {
		return None;
	}
	key.parse().ok()
}

impl<V: Serialize, S: BuildHasher> Source for HashMap<String, V, S> {
	fn lookup(&self, key: &str) -> Result<Option<Value>, SourceError> {
		match self.get(key) {
			Some(value) => serialize_found(value, key),
			None => Ok(None),
		}
	}
}

impl<V: Serialize> Source for BTreeMap<String, V> {
	fn lookup(&self, key: &str) -> Result<Option<Value>, SourceError> {
		match self.get(key) {
			Some(value) => serialize_found(value, key),
			None => Ok(None),
		}
	}
}

impl<V: Serialize> Source for [V] {
	fn lookup(&self, key: &str) -> Result<Option<Value>, SourceError> {
		match parse_index(key).and_then(|index| self.get(index)) {
			Some(value) => serialize_found(value, key),
			None => Ok(None),
		}
	}
}

impl<V: Serialize> Source for Vec<V> {
	fn lookup(&self, key: &str) -> Result<Option<Value>, SourceError> {
		self.as_slice().lookup(key)
	}
}

impl Source for serde_json::Map<String, Value> {
	fn lookup(&self, key: &str) -> Result<Option<Value>, SourceError> {
		Ok(self.get(key).cloned())
	}
}

/// Objects are looked up by key and arrays by decimal index. Any other value
/// has no keys.
impl Source for Value {
	fn lookup(&self, key: &str) -> Result<Option<Value>, SourceError> {
		Ok(match self {
			Value::Object(map) => map.get(key).cloned(),
			Value::Array(items) => parse_index(key).and_then(|i| items.get(i)).cloned(),
			_ => None,
		})
	}
}

/// Adapter turning a closure into a [`Source`].
///
/// ```rust
/// use serde_json::Value;
/// use tokrep_core::FnSource;
/// use tokrep_core::replace_tokens;
///
/// let env = FnSource::new(|key: &str| Ok(std::env::var(key).ok().map(Value::String)));
/// let output = replace_tokens("${__TOKREP_UNSET__}", &env, "${", "}", Some("none")).unwrap();
/// assert_eq!(output, "none");
/// ```
pub struct FnSource<F>(F);

impl<F> FnSource<F>
where
	F: Fn(&str) -> Result<Option<Value>, SourceError>,
{
	pub fn new(lookup: F) -> Self {
		Self(lookup)
	}
}

impl<F> Source for FnSource<F>
where
	F: Fn(&str) -> Result<Option<Value>, SourceError>,
{
	fn lookup(&self, key: &str) -> Result<Option<Value>, SourceError> {
		(self.0)(key)
	}
}

/// Resolves dotted paths such as `pkg.version` or `authors.0` against a
/// nested JSON value.
///
/// A key that exists verbatim at the top level wins over path traversal, so
/// data containing literal dots in its keys stays reachable.
#[derive(Debug, Clone, Copy)]
pub struct DottedSource<'a> {
	root: &'a Value,
}

impl<'a> DottedSource<'a> {
	pub fn new(root: &'a Value) -> Self {
		Self { root }
	}
}

impl Source for DottedSource<'_> {
	fn lookup(&self, key: &str) -> Result<Option<Value>, SourceError> {
		if let Some(value) = self.root.lookup(key)? {
			return Ok(Some(value));
		}

		let mut current = self.root;
		for segment in key.split('.') {
			let next = match current {
				Value::Object(map) => map.get(segment),
				Value::Array(items) => parse_index(segment).and_then(|i| items.get(i)),
				_ => None,
			};
			let Some(next) = next else {
				return Ok(None);
			};
			current = next;
		}

		Ok(Some(current.clone()))
	}
}
