use clap::{Parser, Subcommand};
use std::path::PathBuf;

const HELP_EPILOG: &str = r#"Server options can also be provided via environment variables:
  CONFIG_PATH (default: ./config.yaml)
  JWT_SECRET  (overrides jwt_secret from the config)
  DB_PATH     (default: data/advenchores.db)
  PORT        (default: 8080 or config.listen_port)
  RUST_LOG    (default: info)

Run `init` once to write a config with a freshly generated secret.
"#;

#[derive(Debug, Parser)]
#[command(
    name = "advenchores-server",
    version,
    about = "AdvenChores household chore tracker",
    long_about = None,
    after_long_help = HELP_EPILOG,
)]
pub struct Cli {
    /// Optional subcommand. Without one, runs the server.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Write a default config file with a random signing secret
    Init {
        /// Destination path for the config
        #[arg(long, env = "CONFIG_PATH", default_value = "config.yaml")]
        config_path: PathBuf,
        /// Overwrite the file if it already exists
        #[arg(long)]
        force: bool,
    },
    /// Set the parent PIN of an account (e.g. when it was forgotten)
    ResetPin {
        /// Account username
        username: String,
        /// New 4-digit PIN
        pin: String,
        /// SQLite database file
        #[arg(long, env = "DB_PATH", default_value = "data/advenchores.db")]
        db_path: String,
    },
}
