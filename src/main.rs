//! Identity Firewall - per-site browser persona resolution
//!
//! Entry point for the `identity-firewall` binary.

use std::io::{self, Write};
use std::path::Path;

use clap::Parser;
use tracing::info;

use identity_firewall::cli::{Cli, Commands, ConfigSubcommand, PolicySubcommand};
use identity_firewall::config::{self, FirewallConfig};
use identity_firewall::error::{Error, Result};
use identity_firewall::logging::{self, LogGuards};
use identity_firewall::policy::{self, bundled, Policy, PolicyDocument};
use identity_firewall::protocol::MessageHandler;
use identity_firewall::resolver::{host_from_input, EngineOptions, PersonaEngine};
use identity_firewall::version;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprint!("{}", e.format_for_terminal());
        std::process::exit(e.exit_code());
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Version => {
            version::print_version();
            Ok(())
        }
        Commands::Config { subcommand } => {
            logging::init_simple(tracing::Level::WARN)?;
            handle_config_command(subcommand)
        }
        Commands::Policy { subcommand } => {
            logging::init_simple(tracing::Level::WARN)?;
            handle_policy_command(subcommand)
        }
        Commands::Resolve {
            hosts,
            config,
            policy,
            json,
        } => {
            let config = load_config(config.as_deref(), policy)?;
            let _log_guards = init_logging_from_config(&config, cli.verbose, cli.quiet)?;
            run_resolve(&config, &hosts, json)
        }
        Commands::Serve { config, policy } => {
            let config = load_config(config.as_deref(), policy)?;
            let _log_guards = init_logging_from_config(&config, cli.verbose, cli.quiet)?;
            run_serve(&config)
        }
    }
}

/// Load configuration, letting `--policy` override the configured path
fn load_config(config_path: Option<&str>, policy: Option<String>) -> Result<FirewallConfig> {
    let mut config = FirewallConfig::load(config_path)?;
    if let Some(path) = policy {
        config.policy.path = Some(config::expand_path(&path));
    }
    Ok(config)
}

fn init_logging_from_config(config: &FirewallConfig, verbose: u8, quiet: bool) -> Result<LogGuards> {
    logging::init_logging(&config.logging, verbose, quiet)
}

fn build_engine(config: &FirewallConfig) -> Result<PersonaEngine> {
    let policy = policy::load_policy(&config.policy)?;
    let options = EngineOptions::from_config(config);
    policy.log_dangling_references();
    info!(
        source = config.policy.path.as_deref().unwrap_or("(bundled)"),
        personas = policy.persona_count(),
        rules = policy.rules().len(),
        strict = options.strict_references,
        "Policy loaded"
    );
    Ok(PersonaEngine::with_options(policy, options))
}

/// Resolve each host or URL and print the outcome
fn run_resolve(config: &FirewallConfig, inputs: &[String], json: bool) -> Result<()> {
    let engine = build_engine(config)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for input in inputs {
        let host = host_from_input(input)?;
        let persona = engine.resolve(&host);

        if json {
            let line = serde_json::json!({
                "host": host,
                "persona": persona.as_deref(),
            });
            writeln!(out, "{}", line)?;
        } else {
            match persona {
                Some(p) => writeln!(
                    out,
                    "{} -> {} ({}, {}, {}x{})",
                    host, p.id, p.accept_language, p.timezone, p.screen.width, p.screen.height
                )?,
                None => writeln!(out, "{} -> (none)", host)?,
            }
        }
    }

    Ok(())
}

/// Answer protocol requests on stdin until it closes
fn run_serve(config: &FirewallConfig) -> Result<()> {
    let engine = build_engine(config)?;
    let handler = MessageHandler::new(&engine);

    info!("Serving JSON-lines requests on stdin");
    let stdin = io::stdin();
    let stdout = io::stdout();
    handler.serve(stdin.lock(), stdout.lock())?;
    Ok(())
}

/// Handle policy subcommands
fn handle_policy_command(subcommand: PolicySubcommand) -> Result<()> {
    match subcommand {
        PolicySubcommand::Show {
            config,
            policy,
            json,
        } => {
            let cfg = load_config(config.as_deref(), policy)?;
            let document = policy::load_policy(&cfg.policy)?.to_document();
            if json {
                println!("{}", document.to_json_pretty()?);
            } else {
                print!("{}", document.to_toml_string()?);
            }
        }
        PolicySubcommand::Validate { path, strict } => {
            let path = config::expand_path(&path);
            let document = PolicyDocument::from_path(&path)?;
            let policy = Policy::from_document(document, strict)?;

            println!(
                "Policy is valid: {} personas, {} rules.",
                policy.persona_count(),
                policy.rules().len()
            );
            for d in policy.dangling_references() {
                println!(
                    "Warning: rule {} references undefined persona '{}' and will be skipped.",
                    d.rule_index, d.persona_id
                );
            }
        }
        PolicySubcommand::Init { path, force } => {
            let path = config::expand_path(&path);
            let target = Path::new(&path);
            if target.exists() && !force {
                return Err(Error::Config(format!(
                    "Policy file already exists: {}. Use --force to overwrite.",
                    target.display()
                )));
            }
            if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|e| Error::IoWrite {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
            bundled::default_document()?.write_to_path(target)?;
            println!("Policy written to {}", target.display());
        }
    }

    Ok(())
}

/// Handle configuration subcommands
fn handle_config_command(subcommand: ConfigSubcommand) -> Result<()> {
    match subcommand {
        ConfigSubcommand::Show { config } => {
            let cfg = FirewallConfig::load(config.as_deref())?;
            print!("{}", toml::to_string_pretty(&cfg)?);
        }
        ConfigSubcommand::Init { path, force } => {
            let written = config::init_config(path.as_deref(), force)?;
            println!("Configuration written to {}", written.display());
        }
        ConfigSubcommand::Validate { config } => {
            FirewallConfig::load(config.as_deref())?;
            println!("Configuration is valid.");
        }
    }

    Ok(())
}
