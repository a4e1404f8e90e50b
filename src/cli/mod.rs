//! CLI module for keymem
//!
//! - `serve`: run the HTTP service
//! - `add-management-key`: write a management key straight to the store
//! - `client`: call a running service

pub mod client;
pub mod management;
pub mod serve;

use clap::{Parser, Subcommand};

/// Keymem - API keys, entitlements, route quotas and signed tokens
#[derive(Parser)]
#[command(name = "keymem")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP service
    Serve,

    /// Register a management key in the configured store
    AddManagementKey(management::ManagementKeyArgs),

    /// Call a running service
    Client(client::ClientArgs),
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn test_parse_client_token() {
        let cli = Cli::try_parse_from([
            "keymem", "client", "--url", "http://h:1", "--key", "k", "token", "--path", "/v1",
        ])
        .unwrap();

        match cli.command {
            Command::Client(args) => {
                assert_eq!(args.url, "http://h:1");
                assert!(matches!(args.command, client::ClientCommand::Token { ref path } if path == "/v1"));
            }
            _ => panic!("expected client command"),
        }
    }

    #[test]
    fn test_parse_add_management_key() {
        let cli = Cli::try_parse_from([
            "keymem",
            "add-management-key",
            "--secret",
            "s3cret",
        ])
        .unwrap();

        match cli.command {
            Command::AddManagementKey(args) => {
                assert_eq!(args.secret, "s3cret");
                assert_eq!(args.label, "admin");
            }
            _ => panic!("expected add-management-key"),
        }
    }
}
