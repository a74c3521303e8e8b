use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use certchain_core::validate::DEFAULT_VALIDITY_DAYS;
use certchain_core::Network;

#[derive(Parser, Debug)]
#[command(
    name = "certchain",
    version,
    about = "Issue and verify certificates recorded by a ledger contract"
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Config file (default: <config dir>/certchain/config.yaml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the configured network
    #[arg(long, global = true, value_parser = parse_network)]
    pub network: Option<Network>,

    /// Override the node API base URL
    #[arg(long, global = true)]
    pub node_url: Option<String>,

    /// Machine-readable JSON output
    #[arg(long, global = true)]
    pub json: bool,

    /// More logging (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

fn parse_network(s: &str) -> Result<Network, String> {
    s.parse()
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Issue a certificate through the connected wallet
    Issue(IssueArgs),
    /// Verify a certificate by id
    Verify(VerifyArgs),
    /// Decode a saved verify-certificate response (JSON envelope or 0x hex)
    Decode(DecodeArgs),
    /// Print the effective configuration
    Config,
    Version,
}

#[derive(Args, Debug, Clone)]
pub struct IssueArgs {
    /// Student address (standard principal)
    #[arg(long)]
    pub student: String,

    /// Course name, at most 100 characters
    #[arg(long)]
    pub course: String,

    /// Issuing organization, at most 100 characters
    #[arg(long)]
    pub organization: String,

    /// Validity period in days (1..=10000)
    #[arg(long, default_value = DEFAULT_VALIDITY_DAYS, allow_hyphen_values = true)]
    pub validity_days: String,

    /// Wallet agent bridge URL
    #[arg(long)]
    pub wallet_url: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct VerifyArgs {
    /// Certificate id
    #[arg(allow_hyphen_values = true)]
    pub id: String,
}

#[derive(Args, Debug, Clone)]
pub struct DecodeArgs {
    /// Input file; `-` or omitted reads stdin
    pub input: Option<PathBuf>,
}
