use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "sei-wallet-tracker", version, about = "Sei wallet expense tracker")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the dashboard HTTP server
    Serve {
        /// Override PORT
        #[arg(long)]
        port: Option<u16>,
    },
    /// Fetch one wallet and print the dashboard data as JSON
    Fetch {
        /// Wallet address (EVM format)
        address: String,
        /// Skip the indexing API and scan blocks over RPC
        #[arg(long)]
        rpc: bool,
        /// Override RPC_SCAN_BLOCKS
        #[arg(long)]
        blocks: Option<u64>,
    },
}
