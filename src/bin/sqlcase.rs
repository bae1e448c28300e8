//! sqlcase — render CASE WHEN expressions from the command line
//!
//! # Usage
//!
//! ```bash
//! # Clauses as arguments
//! sqlcase build "age > 65 => 'senior'" "age > 18 => 'adult'" --else "'minor'" --as age_group
//!
//! # Equality dispatch table
//! sqlcase map status active=1 inactive=0 --else 0
//!
//! # From a definition file, with the inline rendering
//! sqlcase build -f groups.case --inline --allow-strings
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use sqlcase::parser::{parse_clause, parse_definition, parse_map_entry, parse_value};
use sqlcase::prelude::*;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sqlcase")]
#[command(version)]
#[command(about = "Render SQL CASE WHEN expressions with positional bindings", long_about = None)]
#[command(after_help = "EXAMPLES:
    sqlcase build \"age > 18 => 'adult'\" --else \"'minor'\"
    sqlcase build 'raw \"deleted_at IS NOT NULL\" => gone' --as state
    sqlcase map status active=1 inactive=0 --inline")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Also print the statement with literals substituted
    #[arg(long, global = true)]
    inline: bool,

    /// Render string bindings as quoted literals in the inline statement
    /// (`--allow-strings=false` turns off a config-file default)
    #[arg(
        long,
        global = true,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    allow_strings: Option<bool>,

    /// Output format (defaults to the config file setting)
    #[arg(long, value_enum, global = true)]
    format: Option<FormatArg>,

    /// Config file path
    #[arg(long, env = "SQLCASE_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Text,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => OutputFormat::Text,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Build a CASE expression from clauses like "age > 18 => 'adult'"
    Build {
        /// WHEN clauses, applied after any from --file
        clauses: Vec<String>,

        /// Definition file, one clause per line
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// ELSE value
        #[arg(long = "else", allow_hyphen_values = true)]
        else_value: Option<String>,

        /// Output alias (AS `name`)
        #[arg(long = "as")]
        alias: Option<String>,
    },
    /// Build an equality dispatch table on one column
    Map {
        /// Column to compare
        column: String,

        /// KEY=VALUE pairs, in clause order
        #[arg(required = true)]
        entries: Vec<String>,

        /// ELSE value
        #[arg(long = "else", allow_hyphen_values = true)]
        else_value: Option<String>,

        /// Output alias (AS `name`)
        #[arg(long = "as")]
        alias: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "sqlcase=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    let settings = config.resolve(overrides(cli));
    if !settings.color {
        colored::control::set_override(false);
    }

    let case = build_case(&cli.command)?;
    if case.is_empty() {
        tracing::warn!("CASE expression has no WHEN clauses");
    }

    let inline = cli
        .inline
        .then(|| case.to_inline_statement(settings.allow_string_literals));

    match settings.format {
        OutputFormat::Json => {
            let out = json_output(&case, inline.as_deref());
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Text => print_text(&case, inline.as_deref()),
    }

    Ok(())
}

/// Command-line values that take precedence over the config file.
fn overrides(cli: &Cli) -> Overrides {
    Overrides {
        allow_string_literals: cli.allow_strings,
        format: cli.format.map(Into::into),
        color: cli.no_color.then_some(false),
    }
}

fn build_case(command: &Commands) -> Result<CaseBuilder> {
    match command {
        Commands::Build {
            clauses,
            file,
            else_value,
            alias,
        } => {
            let mut case = match file {
                Some(path) => {
                    let content = std::fs::read_to_string(path)
                        .with_context(|| format!("reading {}", path.display()))?;
                    parse_definition(&content)
                        .with_context(|| format!("in {}", path.display()))?
                }
                None => CaseBuilder::new(),
            };
            for clause in clauses {
                case = parse_clause(case, clause)
                    .with_context(|| format!("in clause \"{}\"", clause))?;
            }
            finish(case, else_value.as_deref(), alias.as_deref())
        }
        Commands::Map {
            column,
            entries,
            else_value,
            alias,
        } => {
            let pairs = entries
                .iter()
                .map(|entry| {
                    parse_map_entry(entry).with_context(|| format!("in entry \"{}\"", entry))
                })
                .collect::<Result<Vec<_>>>()?;
            finish(
                CaseBuilder::map_values(column, pairs),
                else_value.as_deref(),
                alias.as_deref(),
            )
        }
    }
}

/// Apply the --else / --as options.
fn finish(
    mut case: CaseBuilder,
    else_value: Option<&str>,
    alias: Option<&str>,
) -> Result<CaseBuilder> {
    if let Some(raw) = else_value {
        let value = parse_value(raw).with_context(|| format!("in --else \"{}\"", raw))?;
        case = case.otherwise(value);
    }
    if let Some(alias) = alias {
        case = case.alias(alias);
    }
    Ok(case)
}

fn print_text(case: &CaseBuilder, inline: Option<&str>) {
    let (sql, bindings) = case.to_statement_and_bindings();

    println!("{}", "Statement:".green().bold());
    println!("  {}", sql.white());

    println!();
    println!("{}", "Bindings:".cyan());
    if bindings.is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    for (i, value) in bindings.iter().enumerate() {
        println!(
            "  {:>2} = {} {}",
            i + 1,
            value.to_string().yellow(),
            format!("({})", value.type_name()).dimmed()
        );
    }

    if let Some(inline) = inline {
        println!();
        println!("{}", "Inline:".green().bold());
        println!("  {}", inline.white());
    }
}

/// `{statement, bindings, inline?}`
fn json_output(case: &CaseBuilder, inline: Option<&str>) -> serde_json::Value {
    let (sql, bindings) = case.to_statement_and_bindings();
    let mut out = serde_json::json!({
        "statement": sql,
        "bindings": bindings,
    });
    if let Some(inline) = inline {
        out["inline"] = serde_json::Value::String(inline.to_string());
    }
    out
}
