use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use notary_crypto::{ContentAddresser, FingerprintAlgorithm};
use notary_query::{QueryResponse, VerificationOutcome, VerificationReport};
use notary_server::{AppState, NotaryServer, ServerConfig};
use notary_types::Fingerprint;
use serde_json::json;

use crate::cli::*;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Serve(args) => cmd_serve(args).await,
        Command::Fingerprint(args) => cmd_fingerprint(args, cli.format).await,
        Command::Show(args) => cmd_show(args, cli.format).await,
        Command::Verify(args) => cmd_verify(args, cli.format).await,
        Command::Config => cmd_config(),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<ServerConfig> {
    match path {
        Some(path) => ServerConfig::load(path).context("loading configuration"),
        None => Ok(ServerConfig::default()),
    }
}

async fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if let Some(root) = args.storage_root {
        config.storage.root = root;
    }
    if let Some(journal) = args.journal {
        config.ledger.path = Some(journal);
    }

    println!(
        "Notary server on {} (blobs: {}, fingerprint: {})",
        config.bind_addr.to_string().bold(),
        config.storage.root.display(),
        config.storage.fingerprint.name().cyan()
    );
    NotaryServer::new(config)?.serve().await?;
    Ok(())
}

async fn fingerprint_file(path: &Path, algorithm: FingerprintAlgorithm) -> anyhow::Result<(Fingerprint, u64)> {
    let mut file = tokio::fs::File::open(path)
        .await
        .with_context(|| format!("opening {}", path.display()))?;
    ContentAddresser::fingerprint_reader(algorithm, &mut file)
        .await
        .with_context(|| format!("reading {}", path.display()))
}

async fn cmd_fingerprint(args: FingerprintArgs, format: OutputFormat) -> anyhow::Result<()> {
    let algorithm: FingerprintAlgorithm = args.algorithm.parse()?;
    let (fingerprint, bytes) = fingerprint_file(&args.file, algorithm).await?;
    match format {
        OutputFormat::Json => println!(
            "{}",
            json!({
                "file": args.file.display().to_string(),
                "algorithm": algorithm.name(),
                "bytes": bytes,
                "fingerprint": fingerprint,
            })
        ),
        OutputFormat::Text => println!("{}  {}", fingerprint.as_str().yellow(), args.file.display()),
    }
    Ok(())
}

async fn cmd_show(args: LookupArgs, format: OutputFormat) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    let state = AppState::from_config(&config)?;
    let resp = state.query.query(&args.id).await;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&resp)?),
        OutputFormat::Text => print_query(&resp),
    }
    Ok(())
}

fn print_query(resp: &QueryResponse) {
    if !resp.found {
        println!("{} {} {}", "✗".red().bold(), resp.document_id.bold(), resp.message);
        if let Some(error) = &resp.error {
            println!("  Error: {}", error.red());
        }
        return;
    }
    println!("{} {}", "Document".bold(), resp.document_id.yellow().bold());
    if let Some(owner) = &resp.owner_id {
        println!("  Owner: {owner}");
    }
    if let (Some(name), Some(kind)) = (&resp.file_name, &resp.file_type) {
        println!("  File: {name} ({kind})");
    }
    if let Some(fp) = &resp.content_fingerprint {
        println!("  Fingerprint: {}", fp.as_str().cyan());
    }
    if let Some(location) = &resp.blob_location {
        println!("  Blob: {location}");
    }
    if let Some(ts) = &resp.timestamp {
        println!("  Recorded: {}", ts.to_rfc3339());
    }
}

async fn cmd_verify(args: LookupArgs, format: OutputFormat) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    let state = AppState::from_config(&config)?;
    let report = state.verifier.verify(&args.id).await;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print_report(&report),
    }
    if !report.is_intact() {
        anyhow::bail!("verification of {} failed", report.document_id);
    }
    Ok(())
}

fn print_report(report: &VerificationReport) {
    let id = report.document_id.bold();
    match &report.outcome {
        VerificationOutcome::Intact => println!("{} {id} is intact", "✓".green().bold()),
        VerificationOutcome::Tampered { actual } => {
            println!("{} {id} was modified after commit", "✗".red().bold());
            if let Some(recorded) = &report.recorded_fingerprint {
                println!("  Recorded: {}", recorded.as_str().cyan());
            }
            println!("  Actual:   {}", actual.as_str().red());
        }
        VerificationOutcome::BlobUnreadable { reason } => {
            println!("{} {id} blob unreadable: {reason}", "✗".red().bold())
        }
        VerificationOutcome::NotRecorded => println!("{} {id} is not recorded", "✗".red().bold()),
        VerificationOutcome::LedgerUnavailable { reason } => {
            println!("{} ledger unavailable: {reason}", "✗".red().bold())
        }
    }
}

fn cmd_config() -> anyhow::Result<()> {
    print!("{}", ServerConfig::default().to_toml()?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fingerprint_file_matches_one_shot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.bin");
        let data = vec![7u8; 200_000];
        std::fs::write(&path, &data).unwrap();

        let (fp, bytes) = fingerprint_file(&path, FingerprintAlgorithm::Blake3).await.unwrap();
        assert_eq!(bytes, data.len() as u64);
        assert_eq!(fp, ContentAddresser::fingerprint(FingerprintAlgorithm::Blake3, &data));
    }

    #[tokio::test]
    async fn fingerprint_of_missing_file_names_the_path() {
        let err = fingerprint_file(Path::new("/nonexistent/x"), FingerprintAlgorithm::Sha256)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("/nonexistent/x"));
    }

    #[test]
    fn missing_config_path_uses_defaults() {
        assert_eq!(load_config(None).unwrap(), ServerConfig::default());
        assert!(load_config(Some(Path::new("/nonexistent/notary.toml"))).is_err());
    }
}
