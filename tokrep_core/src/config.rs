use std::collections::HashMap;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde_json::Map;
use serde_json::Value;

use crate::KeyNormalizer;
use crate::TokenReplacer;
use crate::TokrepError;
use crate::TokrepResult;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] =
	["tokrep.toml", ".tokrep.toml", ".config/tokrep.toml"];

pub const DEFAULT_TOKEN_START: &str = "{{";
pub const DEFAULT_TOKEN_END: &str = "}}";

/// Data source entry for a `[data]` namespace.
///
/// ```toml
/// [data]
/// pkg = "package.json"
/// release = { path = "release-info", format = "json" }
/// ```
#[derive(Debug, Clone, Deserialize, Eq, PartialEq)]
#[serde(untagged)]
#[non_exhaustive]
pub enum DataSource {
	Path(PathBuf),
	Typed(TypedDataSource),
}

impl DataSource {
	pub fn path(&self) -> &Path {
		match self {
			Self::Path(path) => path.as_path(),
			Self::Typed(typed) => typed.path.as_path(),
		}
	}

	/// Returns the explicit format override, if configured.
	pub fn format(&self) -> Option<&str> {
		match self {
			Self::Path(_) => None,
			Self::Typed(typed) => Some(typed.format.as_str()),
		}
	}
}

#[derive(Debug, Clone, Deserialize, Eq, PartialEq)]
pub struct TypedDataSource {
	pub path: PathBuf,
	pub format: String,
}

/// Token settings from the `[tokens]` section.
///
/// ```toml
/// [tokens]
/// start = "${"
/// end = "}"
/// default = "N/A"
/// key = "trim"
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct TokensConfig {
	#[serde(default = "default_token_start")]
	pub start: String,
	#[serde(default = "default_token_end")]
	pub end: String,
	/// Substituted for keys missing from every data source. When absent,
	/// missing keys are replaced with an empty string.
	#[serde(default)]
	pub default: Option<String>,
	/// How captured keys are normalized before lookup.
	#[serde(default)]
	pub key: KeyNormalizer,
}

impl Default for TokensConfig {
	fn default() -> Self {
		Self {
			start: default_token_start(),
			end: default_token_end(),
			default: None,
			key: KeyNormalizer::default(),
		}
	}
}

fn default_token_start() -> String {
	DEFAULT_TOKEN_START.to_string()
}

fn default_token_end() -> String {
	DEFAULT_TOKEN_END.to_string()
}

/// Configuration loaded from a `tokrep.toml` file.
#[derive(Debug, Default, Deserialize)]
pub struct TokrepConfig {
	#[serde(default)]
	pub tokens: TokensConfig,
	/// Map of namespace name to a data file relative to the project root.
	#[serde(default)]
	pub data: HashMap<String, DataSource>,
}

impl TokrepConfig {
	/// Resolve the config path from known discovery candidates.
	#[must_use]
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if no config file exists.
	pub fn load(root: &Path) -> TokrepResult<Option<TokrepConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		tracing::debug!(path = %config_path.display(), "loading config");
		let content = std::fs::read_to_string(&config_path)?;
		let config = Self::parse(&content)?;

		Ok(Some(config))
	}

	pub fn parse(content: &str) -> TokrepResult<TokrepConfig> {
		toml::from_str(content).map_err(|e| TokrepError::ConfigParse(e.to_string()))
	}

	/// A replacer configured with this config's key normalizer.
	pub fn replacer(&self) -> TokenReplacer {
		TokenReplacer::new().with_key_normalizer(self.tokens.key.clone())
	}

	/// Read each data file and parse it into a value keyed by namespace.
	pub fn load_data(&self, root: &Path) -> TokrepResult<Map<String, Value>> {
		let mut data = Map::new();

		let mut namespaces: Vec<_> = self.data.keys().collect();
		namespaces.sort();

		for namespace in namespaces {
			let source = &self.data[namespace];
			let rel_path = source.path();
			let path_display = rel_path.display().to_string();
			let format = match source.format() {
				Some(format) => format.trim().to_ascii_lowercase(),
				None => format_from_extension(rel_path),
			};
			let value = load_data_file(&root.join(rel_path), &format, &path_display)?;

			tracing::debug!(%namespace, path = %path_display, %format, "loaded data source");
			data.insert(namespace.clone(), value);
		}

		Ok(data)
	}
}

/// Data file format inferred from the file extension.
pub fn format_from_extension(path: &Path) -> String {
	path.extension()
		.and_then(|e| e.to_str())
		.unwrap_or("")
		.to_ascii_lowercase()
}

/// Read and parse a single data file.
pub fn load_data_file(path: &Path, format: &str, path_display: &str) -> TokrepResult<Value> {
	let content = std::fs::read_to_string(path).map_err(|e| {
		TokrepError::DataFile {
			path: path_display.to_string(),
			reason: e.to_string(),
		}
	})?;

	parse_data_file(&content, format, path_display)
}

/// Parse a data file's content into a `serde_json::Value` based on its
/// format.
pub fn parse_data_file(content: &str, format: &str, path_display: &str) -> TokrepResult<Value> {
	let data_file_error = |reason: String| {
		TokrepError::DataFile {
			path: path_display.to_string(),
			reason,
		}
	};

	match format {
		"text" | "string" | "raw" | "txt" => Ok(Value::String(content.to_string())),
		"json" => serde_json::from_str(content).map_err(|e| data_file_error(e.to_string())),
		"toml" => {
			let toml_value: toml::Value =
				toml::from_str(content).map_err(|e| data_file_error(e.to_string()))?;
			toml_to_json(toml_value).map_err(data_file_error)
		}
		"yaml" | "yml" => serde_yaml_ng::from_str(content).map_err(|e| data_file_error(e.to_string())),
		other => Err(TokrepError::UnsupportedDataFormat(other.to_string())),
	}
}

/// Convert a `toml::Value` to a `serde_json::Value`.
fn toml_to_json(value: toml::Value) -> Result<Value, String> {
	let json = match value {
		toml::Value::String(s) => Value::String(s),
		toml::Value::Integer(i) => Value::Number(i.into()),
		toml::Value::Float(f) => {
			Value::Number(
				serde_json::Number::from_f64(f)
					.ok_or_else(|| format!("unconvertible float value: {f}"))?,
			)
		}
		toml::Value::Boolean(b) => Value::Bool(b),
		toml::Value::Datetime(dt) => Value::String(dt.to_string()),
		toml::Value::Array(arr) => {
			let items: Result<Vec<Value>, String> = arr.into_iter().map(toml_to_json).collect();
			Value::Array(items?)
		}
		toml::Value::Table(table) => {
			let mut map = Map::new();
			for (k, v) in table {
				map.insert(k, toml_to_json(v)?);
			}
			Value::Object(map)
		}
	};

	Ok(json)
}
