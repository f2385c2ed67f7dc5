//! CLI argument parsing using clap v4
//!
//! Defines the command-line interface for the identity firewall.

use clap::{Parser, Subcommand};

/// Identity Firewall - per-site browser persona resolution
///
/// Maps hostnames to browser personas (user agent, language, timezone,
/// screen) using an ordered rule policy. First matching rule wins.
#[derive(Parser, Debug)]
#[command(name = "identity-firewall")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve the persona for one or more hostnames or URLs
    Resolve {
        /// Hostnames (www.amazon.com) or URLs (https://www.amazon.com/cart)
        #[arg(required = true)]
        hosts: Vec<String>,

        /// Path to configuration file
        #[arg(short, long, env = "IDFW_CONFIG")]
        config: Option<String>,

        /// Policy document to use instead of the configured one
        #[arg(short, long)]
        policy: Option<String>,

        /// Print results as JSON lines
        #[arg(long)]
        json: bool,
    },

    /// Answer JSON-lines protocol requests on stdin/stdout
    Serve {
        /// Path to configuration file
        #[arg(short, long, env = "IDFW_CONFIG")]
        config: Option<String>,

        /// Policy document to use instead of the configured one
        #[arg(short, long)]
        policy: Option<String>,
    },

    /// Policy document management
    Policy {
        #[command(subcommand)]
        subcommand: PolicySubcommand,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },

    /// Display version and build information
    Version,
}

/// Policy subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum PolicySubcommand {
    /// Print the active policy document
    Show {
        /// Path to configuration file
        #[arg(short, long, env = "IDFW_CONFIG")]
        config: Option<String>,

        /// Policy document to show instead of the configured one
        #[arg(short, long)]
        policy: Option<String>,

        /// Print as JSON instead of TOML
        #[arg(long)]
        json: bool,
    },

    /// Check a policy document for malformed patterns and dangling references
    Validate {
        /// Policy document (.json or .toml)
        path: String,

        /// Treat rules referencing undefined personas as errors
        #[arg(long)]
        strict: bool,
    },

    /// Write the bundled default policy to a file
    Init {
        /// Destination path (.json or .toml)
        path: String,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

/// Configuration subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigSubcommand {
    /// Display the current configuration
    Show {
        /// Path to configuration file
        #[arg(short, long)]
        config: Option<String>,
    },

    /// Initialize a new configuration file
    Init {
        /// Path where to create the config file
        #[arg(short, long)]
        path: Option<String>,

        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Validate a configuration file
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        config: Option<String>,
    },
}
