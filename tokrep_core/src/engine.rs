use std::ops::Range;

use regex::Regex;
use serde_json::Value;

use crate::KeyNormalizer;
use crate::Source;
use crate::StringNormalizer;
use crate::TokrepError;
use crate::TokrepResult;
use crate::stringable::normalize_token_delimiter;
use crate::stringable::stringable_replace;

/// A token found in a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenMatch {
	/// The full token text including both delimiters, e.g. `${name}`.
	pub token: String,
	/// The text captured between the delimiters.
	pub raw_key: String,
	/// The captured text after key normalization. This is the key looked up
	/// in the source.
	pub key: String,
	/// Byte range of the token in the template.
	pub span: Range<usize>,
}

/// How a key that is absent from the source is handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissingKeyPolicy {
	/// Substitute the default value, or an empty string without one.
	#[default]
	UseDefault,
	/// Fail with [`TokrepError::MissingKey`].
	Error,
}

/// Replaces delimited tokens in a template with values from a [`Source`].
///
/// Tokens are matched non-greedily: the first end delimiter after a start
/// delimiter closes the token, and tokens never nest. Matches are processed
/// left to right and each one replaces every literal occurrence of its token
/// text in the working string. Identical tokens therefore always resolve to
/// the same value.
///
/// ```rust
/// use std::collections::HashMap;
///
/// use tokrep_core::TokenReplacer;
///
/// let source = HashMap::from([("x".to_string(), "1"), ("y".to_string(), "2")]);
/// let replacer = TokenReplacer::new();
/// let output = replacer.replace_str("A${x}B${y}C", &source, "${", "}", None).unwrap();
/// assert_eq!(output, "A1B2C");
/// ```
#[derive(Debug, Clone, Default)]
pub struct TokenReplacer {
	key_normalizer: KeyNormalizer,
	string_normalizer: StringNormalizer,
	missing_key_policy: MissingKeyPolicy,
}

impl TokenReplacer {
	pub fn new() -> Self {
		Self::default()
	}

	#[must_use]
	pub fn with_key_normalizer(mut self, normalizer: KeyNormalizer) -> Self {
		self.key_normalizer = normalizer;
		self
	}

	#[must_use]
	pub fn with_string_normalizer(mut self, normalizer: StringNormalizer) -> Self {
		self.string_normalizer = normalizer;
		self
	}

	#[must_use]
	pub fn with_missing_key_policy(mut self, policy: MissingKeyPolicy) -> Self {
		self.missing_key_policy = policy;
		self
	}

	/// Replace every token in `input`.
	///
	/// `input`, both delimiters and `default` are validated before any
	/// matching happens. A lookup failure other than a missing key, or a
	/// value that cannot be converted to a string, aborts the whole call.
	pub fn replace<S: Source + ?Sized>(
		&self,
		input: &Value,
		source: &S,
		token_start: &Value,
		token_end: &Value,
		default: Option<&Value>,
	) -> TokrepResult<String> {
		let input = self.string_normalizer.normalize(input, "input")?;
		let default = match default {
			Some(value) => self.string_normalizer.normalize(value, "default value")?,
			None => String::new(),
		};
		let pattern = self.token_pattern(token_start, token_end)?;

		self.replace_with_pattern(input, source, &pattern, &default)
	}

	/// Typed variant of [`TokenReplacer::replace`] for callers that already
	/// hold plain strings.
	pub fn replace_str<S: Source + ?Sized>(
		&self,
		input: &str,
		source: &S,
		token_start: &str,
		token_end: &str,
		default: Option<&str>,
	) -> TokrepResult<String> {
		let pattern = self.token_pattern(&Value::from(token_start), &Value::from(token_end))?;

		self.replace_with_pattern(
			input.to_string(),
			source,
			&pattern,
			default.unwrap_or_default(),
		)
	}

	/// List the tokens in `input` in the order they would be processed.
	pub fn tokens(
		&self,
		input: &str,
		token_start: &str,
		token_end: &str,
	) -> TokrepResult<Vec<TokenMatch>> {
		let pattern = self.token_pattern(&Value::from(token_start), &Value::from(token_end))?;

		Ok(self.collect_matches(&pattern, input))
	}

	/// Build the token pattern: the quoted start delimiter, a non-greedy
	/// capture, then the quoted end delimiter.
	fn token_pattern(&self, token_start: &Value, token_end: &Value) -> TokrepResult<Regex> {
		let start = normalize_token_delimiter(&self.string_normalizer, token_start, "token start")?;
		let end = normalize_token_delimiter(&self.string_normalizer, token_end, "token end")?;
		let pattern = format!("{}(.*?){}", regex::escape(&start), regex::escape(&end));

		Ok(Regex::new(&pattern)?)
	}

	fn collect_matches(&self, pattern: &Regex, input: &str) -> Vec<TokenMatch> {
		pattern
			.captures_iter(input)
			.filter_map(|captures| {
				let full = captures.get(0)?;
				let raw_key = captures.get(1).map_or("", |m| m.as_str());
				Some(TokenMatch {
					token: full.as_str().to_string(),
					raw_key: raw_key.to_string(),
					key: self.key_normalizer.normalize(raw_key),
					span: full.range(),
				})
			})
			.collect()
	}

	fn replace_with_pattern<S: Source + ?Sized>(
		&self,
		input: String,
		source: &S,
		pattern: &Regex,
		default: &str,
	) -> TokrepResult<String> {
		let matches = self.collect_matches(pattern, &input);
		tracing::debug!(tokens = matches.len(), pattern = %pattern, "replacing tokens");

		let mut output = input;
		for TokenMatch { token, key, .. } in matches {
			let value = match source.lookup(&key) {
				Ok(Some(value)) => value,
				Ok(None) => {
					if self.missing_key_policy == MissingKeyPolicy::Error {
						return Err(TokrepError::MissingKey(key));
					}
					tracing::debug!(%key, "key not found, using default value");
					Value::String(default.to_string())
				}
				Err(source) => return Err(TokrepError::Lookup { key, source }),
			};

			tracing::trace!(%token, %key, "substituting token");
			output = stringable_replace(&self.string_normalizer, &token, &value, &output)
				.map_err(|e| {
					TokrepError::Replace {
						key,
						source: Box::new(e),
					}
				})?;
		}

		Ok(output)
	}
}

/// Replace tokens using a default [`TokenReplacer`].
pub fn replace_tokens<S: Source + ?Sized>(
	input: &str,
	source: &S,
	token_start: &str,
	token_end: &str,
	default: Option<&str>,
) -> TokrepResult<String> {
	TokenReplacer::new().replace_str(input, source, token_start, token_end, default)
}

/// Distinct keys referenced by `input`, in order of first appearance.
pub fn token_keys(
	replacer: &TokenReplacer,
	input: &str,
	token_start: &str,
	token_end: &str,
) -> TokrepResult<Vec<String>> {
	let mut keys: Vec<String> = Vec::new();
	for token in replacer.tokens(input, token_start, token_end)? {
		if !keys.contains(&token.key) {
			keys.push(token.key);
		}
	}

	Ok(keys)
}
