use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::Deserialize;

use crate::TokrepError;

type CustomKeyFn = dyn Fn(&str) -> String + Send + Sync;

/// Transformation applied to the text captured between two delimiters before
/// it is looked up in a [`Source`](crate::Source).
#[derive(Clone, Default)]
#[non_exhaustive]
pub enum KeyNormalizer {
	/// Use the captured text as is.
	#[default]
	Identity,
	/// Strip surrounding whitespace, so `${ name }` resolves `name`.
	Trim,
	Lowercase,
	Uppercase,
	/// `Trim` followed by `Lowercase`.
	TrimLowercase,
	Custom(Arc<CustomKeyFn>),
}

impl KeyNormalizer {
	pub fn custom<F>(normalize: F) -> Self
	where
		F: Fn(&str) -> String + Send + Sync + 'static,
	{
		Self::Custom(Arc::new(normalize))
	}

	pub fn normalize(&self, key: &str) -> String {
		match self {
			Self::Identity => key.to_string(),
			Self::Trim => key.trim().to_string(),
			Self::Lowercase => key.to_lowercase(),
			Self::Uppercase => key.to_uppercase(),
			Self::TrimLowercase => key.trim().to_lowercase(),
			Self::Custom(normalize) => normalize(key),
		}
	}
}

impl fmt::Debug for KeyNormalizer {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Custom(_) => f.write_str("Custom(..)"),
			other => write!(f, "{other}"),
		}
	}
}

impl fmt::Display for KeyNormalizer {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Self::Identity => "identity",
			Self::Trim => "trim",
			Self::Lowercase => "lowercase",
			Self::Uppercase => "uppercase",
			Self::TrimLowercase => "trim-lowercase",
			Self::Custom(_) => "custom",
		};
		f.write_str(name)
	}
}

impl FromStr for KeyNormalizer {
	type Err = TokrepError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"identity" | "none" => Ok(Self::Identity),
			"trim" => Ok(Self::Trim),
			"lowercase" | "lower" => Ok(Self::Lowercase),
			"uppercase" | "upper" => Ok(Self::Uppercase),
			"trim-lowercase" | "trim_lowercase" => Ok(Self::TrimLowercase),
			other => Err(TokrepError::InvalidKeyNormalizer(other.to_string())),
		}
	}
}

impl<'de> Deserialize<'de> for KeyNormalizer {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: serde::Deserializer<'de>,
	{
		let name = String::deserialize(deserializer)?;
		name.parse().map_err(serde::de::Error::custom)
	}
}
