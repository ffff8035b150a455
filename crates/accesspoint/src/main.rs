//! AccessPoint operator CLI
//!
//! Drives the console controllers from the command line:
//! - `lookup`: list the servers a user can reach
//! - `grant`: grant a user access to groups and/or IPs
//! - `revoke`: remove a user's access from some or all of their servers
//! - `groups`: list known server groups

use std::path::PathBuf;

use accesspoint_console::{
    ConsoleConfig, DEFAULT_BASE_URL, DEFAULT_GRANT_ACTION, DEFAULT_REVOKE_ACTION, HttpBackend,
};
use clap::{Parser, Subcommand};
use miette::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod grant;
mod groups;
mod render;
mod revoke;

#[derive(Parser)]
#[command(name = "accesspoint")]
#[command(about = "Grant and revoke SSH access to servers", long_about = None)]
struct Cli {
    /// Backend URL
    #[arg(long, global = true, env = "ACCESSPOINT_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Path the grant form posts to
    #[arg(long, global = true, env = "ACCESSPOINT_GRANT_ACTION", default_value = DEFAULT_GRANT_ACTION)]
    grant_action: String,

    /// Path the removal form posts to
    #[arg(long, global = true, env = "ACCESSPOINT_REVOKE_ACTION", default_value = DEFAULT_REVOKE_ACTION)]
    revoke_action: String,

    /// Clear the form after a request that succeeded on every server
    #[arg(long, global = true)]
    reset_on_success: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the servers a user currently has access to
    Lookup {
        /// Username to look up
        #[arg(value_name = "USERNAME")]
        username: String,
    },

    /// Grant a user access to server groups and/or individual IPs
    Grant {
        /// Username to create on the servers
        #[arg(long)]
        username: String,

        /// Public key to install
        #[arg(long, conflicts_with = "pub_key_file", required_unless_present = "pub_key_file")]
        pub_key: Option<String>,

        /// Read the public key from a file
        #[arg(long)]
        pub_key_file: Option<PathBuf>,

        /// Server group (repeatable)
        #[arg(long = "group", value_name = "GROUP")]
        groups: Vec<String>,

        /// Server IP (repeatable)
        #[arg(long = "ip", value_name = "IP")]
        ips: Vec<String>,

        /// Add the user to sudoers
        #[arg(long)]
        sudo: bool,

        /// Directory of `<group>.txt` files; groups are checked against it
        #[arg(long, env = "ACCESSPOINT_GROUPS_DIR")]
        groups_dir: Option<PathBuf>,
    },

    /// Remove a user's access from some or all of their servers
    Revoke {
        /// Username to remove
        #[arg(long)]
        username: String,

        /// Server IP to remove access from (repeatable)
        #[arg(long = "ip", value_name = "IP")]
        ips: Vec<String>,

        /// Remove access from every listed server matching the filter
        #[arg(long, conflicts_with = "ips")]
        all: bool,

        /// Only consider servers whose IP contains this text
        #[arg(long)]
        filter: Option<String>,
    },

    /// List known server groups
    Groups {
        /// Only show groups containing this text
        #[arg(value_name = "QUERY")]
        query: Option<String>,

        /// Directory of `<group>.txt` files
        #[arg(long, env = "ACCESSPOINT_GROUPS_DIR")]
        groups_dir: PathBuf,
    },
}

impl Cli {
    fn console_config(&self) -> Result<ConsoleConfig> {
        let config = ConsoleConfig::new(self.base_url.clone())
            .with_grant_action(self.grant_action.clone())
            .with_revoke_action(self.revoke_action.clone())
            .with_reset_on_success(self.reset_on_success);
        config
            .validate()
            .map_err(|e| miette::miette!("{}", e))?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "accesspoint=info".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = cli.console_config()?;

    match cli.command {
        Commands::Lookup { username } => revoke::lookup(connect(&config)?, config, &username).await,

        Commands::Grant {
            username,
            pub_key,
            pub_key_file,
            groups,
            ips,
            sudo,
            groups_dir,
        } => {
            let pub_key = match (pub_key, pub_key_file) {
                (Some(key), _) => key,
                (None, Some(path)) => grant::read_pub_key(&path).await?,
                (None, None) => miette::bail!("either --pub-key or --pub-key-file is required"),
            };
            let form = grant::GrantForm {
                username,
                pub_key,
                groups,
                ips,
                sudo,
            };
            grant::run(connect(&config)?, config, form, groups_dir.as_deref()).await
        }

        Commands::Revoke {
            username,
            ips,
            all,
            filter,
        } => {
            let selection = if all {
                revoke::Selection::All
            } else {
                revoke::Selection::Ips(ips)
            };
            revoke::run(
                connect(&config)?,
                config,
                &username,
                filter.as_deref(),
                selection,
            )
            .await
        }

        Commands::Groups { query, groups_dir } => groups::run(&groups_dir, query.as_deref()).await,
    }
}

fn connect(config: &ConsoleConfig) -> Result<HttpBackend> {
    HttpBackend::new(&config.base_url).map_err(|e| miette::miette!("{}", e))
}
