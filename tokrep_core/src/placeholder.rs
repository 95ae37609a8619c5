use serde_json::Value;

use crate::Source;
use crate::StringNormalizer;
use crate::TokenReplacer;
use crate::TokrepError;
use crate::TokrepResult;
use crate::stringable::normalize_token_delimiter;

/// A template together with the delimiters and default value needed to
/// render it.
///
/// Every setter accepts `None` to clear the field. A value that cannot be
/// converted to a string is rejected and the previous value is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaceholderTemplate {
	template: Option<String>,
	token_start: Option<String>,
	token_end: Option<String>,
	default_placeholder_value: Option<String>,
}

impl PlaceholderTemplate {
	pub fn new() -> Self {
		Self::default()
	}

	/// Create a fully configured template from plain strings.
	pub fn with_delimiters(
		template: impl Into<String>,
		token_start: &str,
		token_end: &str,
	) -> TokrepResult<Self> {
		let mut placeholder = Self {
			template: Some(template.into()),
			..Self::default()
		};
		placeholder.set_token_start(Some(&Value::from(token_start)))?;
		placeholder.set_token_end(Some(&Value::from(token_end)))?;

		Ok(placeholder)
	}

	pub fn template(&self) -> Option<&str> {
		self.template.as_deref()
	}

	pub fn set_template(&mut self, template: Option<&Value>) -> TokrepResult<()> {
		self.template = normalize_optional(template, "template")?;
		Ok(())
	}

	pub fn token_start(&self) -> Option<&str> {
		self.token_start.as_deref()
	}

	pub fn set_token_start(&mut self, delimiter: Option<&Value>) -> TokrepResult<()> {
		self.token_start = normalize_optional_delimiter(delimiter, "token start")?;
		Ok(())
	}

	pub fn token_end(&self) -> Option<&str> {
		self.token_end.as_deref()
	}

	pub fn set_token_end(&mut self, delimiter: Option<&Value>) -> TokrepResult<()> {
		self.token_end = normalize_optional_delimiter(delimiter, "token end")?;
		Ok(())
	}

	pub fn default_placeholder_value(&self) -> Option<&str> {
		self.default_placeholder_value.as_deref()
	}

	pub fn set_default_placeholder_value(&mut self, value: Option<&Value>) -> TokrepResult<()> {
		self.default_placeholder_value = normalize_optional(value, "default value")?;
		Ok(())
	}

	/// Render the stored template against `source`.
	pub fn render<S: Source + ?Sized>(
		&self,
		replacer: &TokenReplacer,
		source: &S,
	) -> TokrepResult<String> {
		let template = self
			.template
			.as_deref()
			.ok_or(TokrepError::MissingField("template"))?;
		let token_start = self
			.token_start
			.as_deref()
			.ok_or(TokrepError::MissingField("token start"))?;
		let token_end = self
			.token_end
			.as_deref()
			.ok_or(TokrepError::MissingField("token end"))?;

		replacer.replace_str(
			template,
			source,
			token_start,
			token_end,
			self.default_placeholder_value.as_deref(),
		)
	}
}

fn normalize_optional(value: Option<&Value>, name: &'static str) -> TokrepResult<Option<String>> {
	value
		.map(|value| StringNormalizer::default().normalize(value, name))
		.transpose()
}

fn normalize_optional_delimiter(
	value: Option<&Value>,
	name: &'static str,
) -> TokrepResult<Option<String>> {
	value
		.map(|value| normalize_token_delimiter(&StringNormalizer::default(), value, name))
		.transpose()
}
