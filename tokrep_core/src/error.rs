use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum TokrepError {
	#[error(transparent)]
	#[diagnostic(code(tokrep::io_error))]
	Io(#[from] std::io::Error),

	#[error("invalid {name}: `{value}` cannot be converted to a string")]
	#[diagnostic(
		code(tokrep::invalid_argument),
		help("only strings, numbers and booleans can be used here")
	)]
	InvalidArgument { name: &'static str, value: String },

	#[error("the {name} delimiter must not be empty")]
	#[diagnostic(
		code(tokrep::empty_delimiter),
		help("use a non-empty delimiter such as `${{` and `}}`")
	)]
	EmptyDelimiter { name: &'static str },

	#[error("could not access reference value for key `{key}`")]
	#[diagnostic(code(tokrep::lookup))]
	Lookup {
		key: String,
		#[source]
		source: SourceError,
	},

	#[error("could not replace token with key `{key}`")]
	#[diagnostic(code(tokrep::replace))]
	Replace {
		key: String,
		#[source]
		source: Box<TokrepError>,
	},

	#[error("no value found for key `{0}`")]
	#[diagnostic(
		code(tokrep::missing_key),
		help("provide the key with `--set {0}=...` or a data file, or drop `--strict`")
	)]
	MissingKey(String),

	#[error("placeholder template has no {0} configured")]
	#[diagnostic(code(tokrep::missing_field))]
	MissingField(&'static str),

	#[error("failed to build token pattern: {0}")]
	#[diagnostic(code(tokrep::invalid_pattern))]
	InvalidPattern(#[from] regex::Error),

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(tokrep::config_parse),
		help("check that tokrep.toml is valid TOML with [tokens] and/or [data] sections")
	)]
	ConfigParse(String),

	#[error("failed to load data file `{path}`: {reason}")]
	#[diagnostic(code(tokrep::data_file))]
	DataFile { path: String, reason: String },

	#[error("unsupported data file format: `{0}`")]
	#[diagnostic(
		code(tokrep::unsupported_format),
		help("supported formats: text, json, toml, yaml, yml")
	)]
	UnsupportedDataFormat(String),

	#[error("unknown key normalizer: `{0}`")]
	#[diagnostic(
		code(tokrep::invalid_key_normalizer),
		help("available normalizers: identity, trim, lowercase, uppercase, trim-lowercase")
	)]
	InvalidKeyNormalizer(String),

	#[error("invalid assignment `{0}`")]
	#[diagnostic(code(tokrep::invalid_assignment), help("assignments take the form `KEY=VALUE`"))]
	InvalidAssignment(String),
}

/// Failure reported by a [`Source`](crate::Source) for reasons other than a
/// missing key.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct SourceError {
	message: String,
	#[source]
	cause: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl SourceError {
	pub fn new(message: impl Into<String>) -> Self {
		Self {
			message: message.into(),
			cause: None,
		}
	}

	pub fn with_cause(
		message: impl Into<String>,
		cause: impl Into<Box<dyn std::error::Error + Send + Sync>>,
	) -> Self {
		Self {
			message: message.into(),
			cause: Some(cause.into()),
		}
	}

	pub fn message(&self) -> &str {
		&self.message
	}
}

pub type TokrepResult<T> = Result<T, TokrepError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
