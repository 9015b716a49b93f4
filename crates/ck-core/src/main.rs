//! ckagent: run monitoring checks from the command line.

use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;

use ck_common::{Error, Result};
use ck_config::{resolve_config, AgentConfig, ConfigPaths, ResolvedConfig};
use ck_core::check::registry;
use ck_core::check::COMMON_ARGUMENTS;
use ck_core::logging::{self, LogFormat};
use ck_core::{Agent, CheckContext, CheckResult, ExitCode, Registry};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "ckagent", version, about = "Run monitoring checks and report plugin output")]
struct Cli {
    /// Configuration file (defaults to $CKAGENT_CONFIG, then ~/.config/ckagent/config.json)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Log filter directive (e.g. debug, ck_core=trace)
    #[arg(long, global = true, value_name = "LEVEL")]
    loglevel: Option<String>,

    /// Log line format
    #[arg(long, global = true, value_enum, default_value_t = LogFormatArg::Text)]
    logformat: LogFormatArg,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormatArg {
    Text,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Text => LogFormat::Text,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a check and print its plugin output; exits with the check state
    Run {
        /// Check name or alias
        check: String,

        /// Abort the check after this many seconds
        #[arg(long, value_name = "SECONDS")]
        timeout: Option<u64>,

        /// Check arguments as key=value or bare flags
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// List available checks and their aliases
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show arguments, attributes and templates of a check
    Describe {
        check: String,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Parse plugin output from stdin and print it as JSON
    Parse,

    /// Inspect the configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Print the resolved configuration
    Show,
    /// Print the JSON schema of the configuration file
    Schema,
}

fn main() {
    let cli = Cli::parse();
    let code = match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("ckagent: {}", e);
            ExitCode::from_error(&e)
        }
    };
    std::process::exit(code.as_i32());
}

fn run(cli: Cli) -> Result<ExitCode> {
    let resolved = resolve_config(&ConfigPaths::discover(cli.config.as_deref()))
        .map_err(|e| Error::Config(e.to_string()));

    let configured = resolved
        .as_ref()
        .ok()
        .and_then(|r| r.config.log_level)
        .map(|level| level.as_str());
    let env = std::env::var(logging::LOG_ENV_VAR).ok();
    let directive = logging::directive(
        cli.loglevel.as_deref(),
        cli.verbose,
        cli.quiet,
        env.as_deref(),
        configured,
    );
    logging::init(&directive, cli.logformat.into())?;

    match cli.command {
        Commands::Run {
            check,
            timeout,
            args,
        } => {
            // A plugin always answers with plugin output, even when the
            // agent itself cannot start.
            let result = match resolved.and_then(|r| agent(r.config)) {
                Ok(agent) => {
                    let ctx = match timeout {
                        Some(secs) => CheckContext::with_timeout(Duration::from_secs(secs)),
                        None => CheckContext::new(),
                    };
                    agent.run_check_with(&ctx, &check, &args)
                }
                Err(e) => CheckResult::unknown(e),
            };
            println!("{}", result.build_plugin_output());
            Ok(result.state.into())
        }
        Commands::List { json } => {
            let registry = Registry::builtin()?;
            let checks = registry.list();
            if json {
                println!("{}", serde_json::to_string_pretty(&checks)?);
            } else {
                for check in checks {
                    let aliases = if check.aliases.is_empty() {
                        String::new()
                    } else {
                        format!(" (aliases: {})", check.aliases.join(", "))
                    };
                    println!("{}{}\n    {}", check.name, aliases, check.description);
                }
            }
            Ok(ExitCode::Ok)
        }
        Commands::Describe { check, json } => {
            let registry = Registry::builtin()?;
            let info = registry.describe(&check)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                print_info(&info);
            }
            Ok(ExitCode::Ok)
        }
        Commands::Parse => {
            let mut input = String::new();
            std::io::stdin().read_to_string(&mut input)?;
            let result = CheckResult::parse_plugin_output(&input);
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(ExitCode::Ok)
        }
        Commands::Config { action } => {
            let ResolvedConfig { config, source } = resolved?;
            match action {
                ConfigCommand::Show => {
                    eprintln!("# source: {}", source);
                    println!("{}", serde_json::to_string_pretty(&config)?);
                }
                ConfigCommand::Schema => {
                    println!("{}", serde_json::to_string_pretty(&AgentConfig::json_schema())?);
                }
            }
            Ok(ExitCode::Ok)
        }
    }
}

fn agent(config: AgentConfig) -> Result<Agent> {
    let registry = registry::install(Registry::builtin()?)?;
    debug!(checks = registry.len(), "registry installed");
    Ok(Agent::new(config, registry))
}

fn print_info(info: &ck_core::check::CheckInfo) {
    println!("{}", info.name);
    println!("    {}", info.description);

    println!("\nArguments:");
    let common = COMMON_ARGUMENTS.iter().map(|(k, d)| (k.to_string(), d.to_string()));
    let own = info
        .arguments
        .iter()
        .map(|a| (a.key.clone(), a.description.clone()));
    for (key, description) in own.chain(common) {
        println!("    {:<14} {}", key, description);
    }
    if info.args_passthrough {
        println!("    (unrecognized arguments are passed to the check)");
    }

    if !info.attributes.is_empty() {
        println!("\nAttributes:");
        for attr in &info.attributes {
            println!("    {:<14} {}", attr.name, attr.description);
        }
    }

    println!("\nDefaults:");
    let defaults = [
        ("filter", &info.default_filter),
        ("warn", &info.default_warning),
        ("crit", &info.default_critical),
        ("detail-syntax", &info.detail_syntax),
        ("top-syntax", &info.top_syntax),
        ("ok-syntax", &info.ok_syntax),
        ("empty-syntax", &info.empty_syntax),
    ];
    for (key, value) in defaults.iter().filter(|(_, v)| !v.is_empty()) {
        println!("    {:<14} {}", key, value);
    }
    println!("    {:<14} {}", "empty-state", info.empty_state);
}
