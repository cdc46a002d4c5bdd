// sourcetrace CLI - proof pack verification and retrieval

use std::io::Read;
use std::path::Path;

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use colored::Colorize;

use sourcetrace_core::{verify_pack_archive, verify_pack_dir, VerificationReport};

/// sourcetrace - capture chain & proof pack tool
#[derive(Parser)]
#[command(name = "sourcetrace")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify a proof pack (an unpacked directory or a .zip archive)
    Verify {
        /// Path to the pack directory or archive
        path: String,
    },
    /// Download a proof pack from a sourcetrace server
    Pack {
        /// Source identifier
        source_id: String,

        /// Server base URL
        #[arg(short, long, default_value = "http://localhost:8080")]
        server: String,

        /// Maximum captures to include
        #[arg(short, long)]
        limit: Option<i64>,

        /// Output path (defaults to the server-provided filename)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Print the capture timeline for a source
    Timeline {
        /// Source identifier
        source_id: String,

        /// Server base URL
        #[arg(short, long, default_value = "http://localhost:8080")]
        server: String,

        /// Maximum captures to list
        #[arg(short, long)]
        limit: Option<i64>,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Verify { path } => handle_verify(&path),
        Commands::Pack {
            source_id,
            server,
            limit,
            output,
        } => handle_pack(&source_id, &server, limit, output.as_deref()),
        Commands::Timeline {
            source_id,
            server,
            limit,
        } => handle_timeline(&source_id, &server, limit),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Verifies a pack and prints the per-check report. Returns an error
/// (and thus exit code 1) when any check failed.
fn handle_verify(path: &str) -> anyhow::Result<()> {
    let path = Path::new(path);
    let report = load_report(path)?;
    print_report(&report);
    if report.passed() {
        Ok(())
    } else {
        Err(anyhow!("proof pack verification failed"))
    }
}

fn load_report(path: &Path) -> anyhow::Result<VerificationReport> {
    if path.is_dir() {
        verify_pack_dir(path)
    } else {
        let bytes =
            std::fs::read(path).with_context(|| format!("cannot read {}", path.display()))?;
        verify_pack_archive(&bytes)
    }
}

fn print_report(report: &VerificationReport) {
    for line in report.render().lines() {
        if line.starts_with("FAIL") {
            println!("{}", line.red());
        } else if line.starts_with("PASS") {
            println!("{}", line.green());
        } else if line.starts_with("SKIP") {
            println!("{}", line.yellow());
        } else {
            println!("{line}");
        }
    }
}

fn handle_pack(
    source_id: &str,
    server: &str,
    limit: Option<i64>,
    output: Option<&str>,
) -> anyhow::Result<()> {
    let mut url = format!("{server}/api/v1/sources/{source_id}/proofpack");
    if let Some(limit) = limit {
        url.push_str(&format!("?limit={limit}"));
    }

    let response = ureq::get(&url)
        .call()
        .with_context(|| format!("request to {url} failed"))?;
    let disposition = response
        .header("content-disposition")
        .unwrap_or_default()
        .to_string();

    let mut bytes = Vec::new();
    response.into_reader().read_to_end(&mut bytes)?;

    let filename = match output {
        Some(output) => output.to_string(),
        None => filename_from_disposition(&disposition)
            .unwrap_or_else(|| format!("proofpack_{source_id}.zip")),
    };
    std::fs::write(&filename, &bytes)
        .with_context(|| format!("cannot write {filename}"))?;

    println!("Wrote {} ({} bytes)", filename, bytes.len());
    println!("Verify it with: sourcetrace verify {filename}");
    Ok(())
}

fn handle_timeline(source_id: &str, server: &str, limit: Option<i64>) -> anyhow::Result<()> {
    let mut url = format!("{server}/api/v1/sources/{source_id}/timeline");
    if let Some(limit) = limit {
        url.push_str(&format!("?limit={limit}"));
    }

    let response = ureq::get(&url)
        .call()
        .with_context(|| format!("request to {url} failed"))?;
    let timeline: serde_json::Value = response.into_json()?;

    let items = timeline["items"].as_array().cloned().unwrap_or_default();
    println!("Timeline for source {source_id} ({} captures):", items.len());
    for item in items {
        let status = item["fetch_status"].as_i64().unwrap_or_default();
        let status_str = if status == 0 {
            "fetch failed".red().to_string()
        } else {
            format!("HTTP {status}")
        };
        println!(
            "  {}  {}  chain {}",
            item["captured_at"].as_str().unwrap_or("?"),
            status_str,
            item["chain_sha256"]
                .as_str()
                .map(|chain| &chain[..12.min(chain.len())])
                .unwrap_or("?")
        );
    }
    Ok(())
}

/// Extracts the filename from a `Content-Disposition: attachment;
/// filename="..."` header.
fn filename_from_disposition(disposition: &str) -> Option<String> {
    let marker = "filename=\"";
    let start = disposition.find(marker)? + marker.len();
    let rest = &disposition[start..];
    let end = rest.find('"')?;
    Some(rest[..end].to_string())
}
