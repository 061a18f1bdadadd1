use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "notary",
    about = "Document notary: off-ledger blobs with ledger-recorded fingerprints",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the notary server
    Serve(ServeArgs),
    /// Compute the content fingerprint of a local file
    Fingerprint(FingerprintArgs),
    /// Show the ledger record of a document
    Show(LookupArgs),
    /// Check a stored document against its ledger record
    Verify(LookupArgs),
    /// Print the default configuration
    Config,
}

#[derive(Args)]
pub struct ServeArgs {
    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Override the listen address
    #[arg(long)]
    pub bind: Option<SocketAddr>,
    /// Override the blob store root
    #[arg(long)]
    pub storage_root: Option<PathBuf>,
    /// Override the ledger journal file
    #[arg(long)]
    pub journal: Option<PathBuf>,
}

#[derive(Args)]
pub struct FingerprintArgs {
    pub file: PathBuf,
    /// sha256 or blake3
    #[arg(short, long, default_value = "sha256")]
    pub algorithm: String,
}

#[derive(Args)]
pub struct LookupArgs {
    /// Document identifier
    pub id: String,
    /// TOML configuration file of the deployment
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}
