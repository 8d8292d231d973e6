//! wdlforge CLI Entry Point
//!
//! Provides command-line interface for WDL generation.
//!
//! # Usage
//!
//! ```bash
//! # Print the generated WDL to stdout
//! wdlforge workflow.yaml
//!
//! # Write it to a file
//! wdlforge workflow.yaml --output workflow.wdl
//!
//! # Prepend environment variables in declaration order
//! wdlforge workflow.yaml --env-order declared
//!
//! # Fail on descriptor diagnostics
//! wdlforge workflow.json --strict
//! ```

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use colored::Colorize;
use log::{error, info, warn};

use wdlforge::generator::{render_document, EnvVarOrder, RenderOptions};
use wdlforge::workflow::loader::load_document;
use wdlforge::workflow::validator::validate_document;
use wdlforge::{APP_NAME, VERSION};

/// Default descriptor file used when none is specified.
const DEFAULT_DESCRIPTOR: &str = "workflow.yaml";

/// Default width of command line continuation indentation.
const DEFAULT_INDENT: usize = 4;

/// Command-line configuration parsed from arguments.
#[derive(Debug)]
struct Config {
    descriptor_path: String,
    output_path: Option<PathBuf>,
    env_var_order: EnvVarOrder,
    indent: usize,
    strict: bool,
    verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            descriptor_path: DEFAULT_DESCRIPTOR.to_string(),
            output_path: None,
            env_var_order: EnvVarOrder::default(),
            indent: DEFAULT_INDENT,
            strict: false,
            verbose: false,
        }
    }
}

impl Config {
    fn render_options(&self) -> RenderOptions {
        RenderOptions::default()
            .with_continuation_width(self.indent)
            .with_env_var_order(self.env_var_order)
    }
}

/// Configures the logging system with appropriate formatting.
///
/// Logs go to stderr so generated WDL on stdout stays clean.
fn setup_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format(|buf, record| {
            use std::io::Write;

            match record.level() {
                log::Level::Warn | log::Level::Error => {
                    writeln!(buf, "[{}] {}", record.level(), record.args())
                }
                _ => writeln!(buf, "{}", record.args()),
            }
        })
        .init();
}

/// Prints the application banner with version information.
fn print_banner() {
    eprintln!();
    eprintln!("{} v{}", APP_NAME.bold(), VERSION);
    eprintln!("WDL Source Generator");
    eprintln!();
}

/// Builds the usage text.
fn usage_text() -> String {
    format!(
        "\
Usage: wdlforge [OPTIONS] <DESCRIPTOR_FILE>

Arguments:
  <DESCRIPTOR_FILE>   Path to descriptor YAML or JSON file

Options:
  -o, --output PATH   Write generated WDL to PATH instead of stdout
  --env-order ORDER   Environment variable order: reversed (default) or declared
  --indent N          Command continuation indent width (default: {})
  --strict            Treat descriptor diagnostics as errors
  --verbose           Enable debug logging
  --help              Show this help message
  --version           Show version information

Examples:
  wdlforge pipeline.yaml
  wdlforge pipeline.yaml --output pipeline.wdl
  wdlforge tool.json --env-order declared --indent 8",
        DEFAULT_INDENT
    )
}

/// Parses command-line arguments into a Config struct.
fn parse_arguments(args: &[String]) -> Result<Config, String> {
    let mut config = Config::default();
    let mut positional_index = 0;
    let mut i = 1; // Skip program name

    while i < args.len() {
        let arg = &args[i];

        match arg.as_str() {
            "--help" | "-h" => {
                println!("{}", usage_text());
                std::process::exit(0);
            }
            "--version" | "-V" => {
                println!("{} {}", APP_NAME, VERSION);
                std::process::exit(0);
            }
            "--strict" => {
                config.strict = true;
            }
            "--verbose" | "-v" => {
                config.verbose = true;
            }
            "--output" | "-o" => {
                i += 1;
                if i >= args.len() {
                    return Err("--output requires a path argument".to_string());
                }
                config.output_path = Some(PathBuf::from(&args[i]));
            }
            "--env-order" => {
                i += 1;
                if i >= args.len() {
                    return Err("--env-order requires 'reversed' or 'declared'".to_string());
                }
                config.env_var_order = args[i].parse()?;
            }
            "--indent" => {
                i += 1;
                if i >= args.len() {
                    return Err("--indent requires a number argument".to_string());
                }
                config.indent = args[i]
                    .parse()
                    .map_err(|_| format!("Invalid indent value: {}", args[i]))?;
            }
            arg if arg.starts_with('-') => {
                return Err(format!("Unknown option: {}", arg));
            }
            _ => {
                match positional_index {
                    0 => config.descriptor_path = arg.clone(),
                    _ => return Err(format!("Unexpected argument: {}", arg)),
                }
                positional_index += 1;
            }
        }
        i += 1;
    }

    Ok(config)
}

/// Main application entry point.
fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();

    let config = parse_arguments(&args).map_err(|e| {
        eprintln!("Error: {}", e);
        eprintln!();
        eprintln!("{}", usage_text());
        e
    })?;

    setup_logging(config.verbose);
    print_banner();

    let document = load_document(&config.descriptor_path).map_err(|e| {
        error!("Failed to load descriptors: {}", e);
        format!(
            "Could not load descriptors from '{}': {}",
            config.descriptor_path, e
        )
    })?;

    let diagnostics = validate_document(&document);
    for diagnostic in &diagnostics {
        warn!("{}", diagnostic);
    }
    if config.strict && !diagnostics.is_empty() {
        return Err(format!(
            "{} descriptor diagnostics reported in strict mode",
            diagnostics.len()
        )
        .into());
    }

    let generated = render_document(&document, &config.render_options());
    info!(
        "Generated '{}' ({} steps consumed)",
        document.name(),
        generated.task_ids.len()
    );

    match &config.output_path {
        Some(path) => {
            fs::write(path, &generated.text)?;
            eprintln!("{} {}", "Wrote".green().bold(), path.display());
        }
        None => print!("{}", generated.text),
    }

    Ok(())
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!();
            eprintln!("{} {}", "Error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}
