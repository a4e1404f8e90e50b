use clap::Parser;
use keymem::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve => cli::serve::run().await,
        Command::AddManagementKey(args) => cli::management::run(args).await,
        Command::Client(args) => cli::client::run(args).await,
    }
}
