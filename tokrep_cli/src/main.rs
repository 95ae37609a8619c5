use std::path::Path;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use owo_colors::OwoColorize;
use serde_json::Value;
use tokrep_cli::Commands;
use tokrep_cli::KeysOutputFormat;
use tokrep_cli::TokenArgs;
use tokrep_cli::TokrepCli;
use tokrep_cli::merge_assignments;
use tokrep_cli::merge_data_files;
use tokrep_cli::read_template;
use tokrep_core::DottedSource;
use tokrep_core::KeyNormalizer;
use tokrep_core::MissingKeyPolicy;
use tokrep_core::TokenReplacer;
use tokrep_core::TokrepConfig;
use tokrep_core::TokrepError;
use tokrep_core::token_keys;
use tracing_subscriber::EnvFilter;

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,yellow) => {
		if color_enabled() {
			format!("{}", $text.yellow())
		} else {
			format!("{}", $text)
		}
	};
}

const SAMPLE_CONFIG: &str = "# tokrep configuration\n\n[tokens]\n# Delimiters surrounding each \
                             token key.\nstart = \"{{\"\nend = \"}}\"\n# Substituted for keys \
                             without a value.\n# default = \"\"\n# identity, trim, lowercase, \
                             uppercase or trim-lowercase.\nkey = \"trim\"\n\n# Map data files \
                             to namespaces.\n# Values are available in templates as {{ \
                             namespace.key }}.\n# [data]\n# pkg = \"package.json\"\n";

fn main() {
	let args = TokrepCli::parse();

	// Respect NO_COLOR env var, --no-color flag and terminal support.
	let use_color = !args.no_color
		&& std::env::var_os("NO_COLOR").is_none()
		&& supports_color::on(supports_color::Stream::Stderr).is_some();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	init_tracing(args.verbose, use_color);

	// Install miette's fancy handler for rich error diagnostics.
	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	let result = match &args.command {
		Some(Commands::Init) => run_init(&args),
		Some(Commands::Render {
			file,
			tokens,
			data,
			set,
			default,
			strict,
			output,
		}) => {
			run_render(
				&args,
				&RenderArgs {
					file: file.as_deref(),
					tokens,
					data,
					set,
					default: default.as_deref(),
					strict: *strict,
					output: output.as_deref(),
				},
			)
		}
		Some(Commands::Keys {
			file,
			tokens,
			format,
		}) => run_keys(&args, file.as_deref(), tokens, *format),
		None => {
			eprintln!("No subcommand specified. Run `tokrep --help` for usage.");
			process::exit(2);
		}
	};

	if let Err(e) = result {
		let code = if matches!(e, TokrepError::MissingKey(_)) {
			1
		} else {
			2
		};
		let report: miette::Report = e.into();
		eprintln!("{report:?}");
		process::exit(code);
	}
}

fn init_tracing(verbose: bool, use_color: bool) {
	let default_level = if verbose { "tokrep_core=debug" } else { "warn" };
	let filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_ansi(use_color)
		.with_writer(std::io::stderr)
		.without_time()
		.try_init()
		.ok();
}

fn resolve_root(args: &TokrepCli) -> PathBuf {
	args.path
		.clone()
		.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

fn run_init(args: &TokrepCli) -> Result<(), TokrepError> {
	let root = resolve_root(args);

	if let Some(existing) = TokrepConfig::resolve_path(&root) {
		println!("Config file already exists: {}", existing.display());
		return Ok(());
	}

	let config_path = root.join("tokrep.toml");
	std::fs::write(&config_path, SAMPLE_CONFIG)?;
	println!(
		"{} {}",
		colored!("Created", green),
		config_path.display()
	);

	Ok(())
}

/// Token settings after applying command-line overrides to the config.
struct ResolvedTokens {
	start: String,
	end: String,
	replacer: TokenReplacer,
}

fn resolve_tokens(config: &TokrepConfig, tokens: &TokenArgs) -> Result<ResolvedTokens, TokrepError> {
	let key = match &tokens.key {
		Some(name) => name.parse::<KeyNormalizer>()?,
		None => config.tokens.key.clone(),
	};

	Ok(ResolvedTokens {
		start: tokens
			.start
			.clone()
			.unwrap_or_else(|| config.tokens.start.clone()),
		end: tokens
			.end
			.clone()
			.unwrap_or_else(|| config.tokens.end.clone()),
		replacer: TokenReplacer::new().with_key_normalizer(key),
	})
}

fn load_config(args: &TokrepCli) -> Result<(PathBuf, TokrepConfig), TokrepError> {
	let root = resolve_root(args);
	let config = TokrepConfig::load(&root)?.unwrap_or_default();
	Ok((root, config))
}

struct RenderArgs<'a> {
	file: Option<&'a Path>,
	tokens: &'a TokenArgs,
	data: &'a [PathBuf],
	set: &'a [(String, String)],
	default: Option<&'a str>,
	strict: bool,
	output: Option<&'a Path>,
}

fn run_render(args: &TokrepCli, render: &RenderArgs<'_>) -> Result<(), TokrepError> {
	let (root, config) = load_config(args)?;
	let resolved = resolve_tokens(&config, render.tokens)?;

	let mut data = config.load_data(&root)?;
	merge_data_files(&mut data, render.data)?;
	merge_assignments(&mut data, render.set);

	if args.verbose {
		let mut keys: Vec<_> = data.keys().map(String::as_str).collect();
		keys.sort_unstable();
		eprintln!("Data keys: {}", keys.join(", "));
	}

	let policy = if render.strict {
		MissingKeyPolicy::Error
	} else {
		MissingKeyPolicy::UseDefault
	};
	let replacer = resolved.replacer.with_missing_key_policy(policy);
	let default = render.default.or(config.tokens.default.as_deref());

	let template = read_template(render.file)?;
	let data = Value::Object(data);
	let source = DottedSource::new(&data);
	let rendered = replacer.replace_str(
		&template,
		&source,
		&resolved.start,
		&resolved.end,
		default,
	)?;

	match render.output {
		Some(path) => {
			std::fs::write(path, rendered)?;
			if args.verbose {
				eprintln!("Wrote {}", path.display());
			}
		}
		None => print!("{rendered}"),
	}

	Ok(())
}

fn run_keys(
	args: &TokrepCli,
	file: Option<&Path>,
	tokens: &TokenArgs,
	format: KeysOutputFormat,
) -> Result<(), TokrepError> {
	let (_, config) = load_config(args)?;
	let resolved = resolve_tokens(&config, tokens)?;
	let template = read_template(file)?;
	let keys = token_keys(&resolved.replacer, &template, &resolved.start, &resolved.end)?;

	match format {
		KeysOutputFormat::Text => {
			if keys.is_empty() && args.verbose {
				eprintln!("{} no tokens found", colored!("warning:", yellow));
			}
			for key in keys {
				println!("{key}");
			}
		}
		KeysOutputFormat::Json => {
			println!("{}", serde_json::json!(keys));
		}
	}

	Ok(())
}
