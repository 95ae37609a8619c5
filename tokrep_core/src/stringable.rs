//! Coercion of loosely typed values into plain strings.
//!
//! Templates, delimiters, default values and looked up values all arrive as
//! [`serde_json::Value`]s. Only scalars are considered stringable: strings
//! pass through, numbers use their JSON representation and booleans become
//! `true` / `false`. Everything else is rejected.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::TokrepError;
use crate::TokrepResult;

/// Convert a value into a plain string.
///
/// Numbers keep their JSON form, so the float `1.0` becomes `"1.0"` rather
/// than `"1"`. Pass integers when the fractional part should be dropped.
///
/// `name` identifies the argument in the [`TokrepError::InvalidArgument`]
/// returned for `null`, arrays and objects.
pub fn normalize_stringable(value: &Value, name: &'static str) -> TokrepResult<String> {
	match value {
		Value::String(s) => Ok(s.clone()),
		Value::Number(n) => Ok(n.to_string()),
		Value::Bool(b) => Ok(b.to_string()),
		Value::Null | Value::Array(_) | Value::Object(_) => {
			Err(TokrepError::InvalidArgument {
				name,
				value: value.to_string(),
			})
		}
	}
}

/// Normalize a token delimiter. Delimiters follow the same coercion rules
/// as any other stringable and must not be empty.
pub fn normalize_token_delimiter(
	normalizer: &StringNormalizer,
	delimiter: &Value,
	name: &'static str,
) -> TokrepResult<String> {
	let delimiter = normalizer.normalize(delimiter, name)?;
	if delimiter.is_empty() {
		return Err(TokrepError::EmptyDelimiter { name });
	}

	Ok(delimiter)
}

/// Replace every literal occurrence of `search` in `subject` with the
/// stringified `replace` value. No pattern syntax is interpreted.
pub fn stringable_replace(
	normalizer: &StringNormalizer,
	search: &str,
	replace: &Value,
	subject: &str,
) -> TokrepResult<String> {
	let replacement = normalizer.normalize(replace, "replacement")?;
	Ok(subject.replace(search, &replacement))
}

type NormalizeFn = dyn Fn(&Value, &'static str) -> TokrepResult<String> + Send + Sync;

/// Strategy used to coerce values into strings.
///
/// The default is [`normalize_stringable`]. A custom strategy can, for
/// example, render arrays as comma separated lists.
#[derive(Clone)]
pub struct StringNormalizer(Arc<NormalizeFn>);

impl StringNormalizer {
	pub fn new<F>(normalize: F) -> Self
	where
		F: Fn(&Value, &'static str) -> TokrepResult<String> + Send + Sync + 'static,
	{
		Self(Arc::new(normalize))
	}

	pub fn normalize(&self, value: &Value, name: &'static str) -> TokrepResult<String> {
		(self.0)(value, name)
	}
}

impl Default for StringNormalizer {
	fn default() -> Self {
		Self::new(normalize_stringable)
	}
}

impl fmt::Debug for StringNormalizer {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("StringNormalizer(..)")
	}
}
