use std::path::Path;
use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use serde_json::Map;
use serde_json::Value;
use tokrep_core::TokrepError;
use tokrep_core::TokrepResult;
use tokrep_core::format_from_extension;
use tokrep_core::load_data_file;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Replace delimited tokens in text with values from data files.",
	long_about = "tokrep replaces tokens such as `{{name}}` or `${name}` in a template with \
	              values taken from data files, `--set` assignments and the `[data]` section \
	              of `tokrep.toml`.\n\nQuick start:\n  tokrep init              Create a \
	              tokrep.toml\n  tokrep render FILE       Print FILE with tokens replaced\n  \
	              tokrep keys FILE         List the keys FILE refers to"
)]
pub struct TokrepCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Path to the project root directory containing `tokrep.toml`.
	#[arg(long, short, global = true)]
	pub path: Option<PathBuf>,

	/// Enable verbose output.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,
}

/// Token settings shared by commands that scan templates. Each flag overrides
/// the matching `[tokens]` entry from `tokrep.toml`.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct TokenArgs {
	/// Start delimiter of a token. Defaults to `{{`.
	#[arg(long)]
	pub start: Option<String>,

	/// End delimiter of a token. Defaults to `}}`.
	#[arg(long)]
	pub end: Option<String>,

	/// Key normalization applied before lookup: identity, trim, lowercase,
	/// uppercase or trim-lowercase.
	#[arg(long)]
	pub key: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Create a sample `tokrep.toml` in the project root.
	///
	/// If the file already exists, this command is a no-op and exits
	/// successfully.
	Init,
	/// Render a template, replacing every token.
	///
	/// Values are resolved from the `[data]` section of `tokrep.toml`, then
	/// `--data` files, then `--set` assignments; later sources win. Nested
	/// values are reachable with dotted keys such as `pkg.version`.
	Render {
		/// Template file to render. Reads stdin when omitted or `-`.
		file: Option<PathBuf>,

		#[command(flatten)]
		tokens: TokenArgs,

		/// Data file (json, toml, yaml) whose top-level keys become
		/// available to tokens. Can be repeated.
		#[arg(long = "data", short = 'd')]
		data: Vec<PathBuf>,

		/// Set a single value with `KEY=VALUE`. Can be repeated.
		#[arg(long = "set", short = 's', value_parser = parse_assignment)]
		set: Vec<(String, String)>,

		/// Value substituted for keys that have no value.
		#[arg(long)]
		default: Option<String>,

		/// Fail instead of substituting the default value when a key is
		/// missing.
		#[arg(long, default_value_t = false)]
		strict: bool,

		/// Write the rendered output to this file instead of stdout.
		#[arg(long, short)]
		output: Option<PathBuf>,
	},
	/// List the distinct keys referenced by a template.
	Keys {
		/// Template file to scan. Reads stdin when omitted or `-`.
		file: Option<PathBuf>,

		#[command(flatten)]
		tokens: TokenArgs,

		/// Output format for the key list.
		#[arg(long, value_enum, default_value_t = KeysOutputFormat::Text)]
		format: KeysOutputFormat,
	},
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum KeysOutputFormat {
	/// One key per line.
	Text,
	/// A JSON array of keys.
	Json,
}

/// Parse a `KEY=VALUE` assignment. The value may contain further `=`
/// characters; the key may not be empty.
pub fn parse_assignment(input: &str) -> TokrepResult<(String, String)> {
	match input.split_once('=') {
		Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
		_ => Err(TokrepError::InvalidAssignment(input.to_string())),
	}
}

/// Merge the top-level entries of each data file into `data`. Files are
/// applied in order, so later files override earlier ones.
pub fn merge_data_files(data: &mut Map<String, Value>, files: &[PathBuf]) -> TokrepResult<()> {
	for file in files {
		let path_display = file.display().to_string();
		let value = load_data_file(file, &format_from_extension(file), &path_display)?;
		let Value::Object(entries) = value else {
			return Err(TokrepError::DataFile {
				path: path_display,
				reason: "the top-level value must be a table or object".to_string(),
			});
		};

		tracing::debug!(path = %path_display, keys = entries.len(), "merging data file");
		data.extend(entries);
	}

	Ok(())
}

/// Apply `--set` assignments on top of `data`.
pub fn merge_assignments(data: &mut Map<String, Value>, assignments: &[(String, String)]) {
	for (key, value) in assignments {
		data.insert(key.clone(), Value::String(value.clone()));
	}
}

/// Read a template from `file`, or stdin when `file` is `None` or `-`.
pub fn read_template(file: Option<&Path>) -> TokrepResult<String> {
	match file {
		Some(path) if path != Path::new("-") => Ok(std::fs::read_to_string(path)?),
		_ => Ok(std::io::read_to_string(std::io::stdin())?),
	}
}
