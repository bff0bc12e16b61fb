//! Regenerates the write-access classification table.
//!
//! Reads the backend's OpenAPI document, keeps every operation flagged with
//! `x-requires-youtube-write: true` and writes them out as the Rust table
//! bundled by `youtubester-core`.

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;
use youtubester_core::consent::{collect_requires_write_entries, render_requires_write_module};

const DEFAULT_SWAGGER_URL: &str = "http://localhost:5094/swagger/v1/swagger.json";
const DEFAULT_OUTPUT: &str = "youtubester-core/src/consent/requires_write.rs";

#[derive(Parser, Debug)]
#[command(name = "youtubester-codegen", version, about)]
/// Generate the YouTube write-access classification table
struct Args {
    /// URL of the running backend's OpenAPI document
    #[arg(long, default_value = DEFAULT_SWAGGER_URL)]
    swagger_url: String,

    /// Read the OpenAPI document from a file instead of the URL
    #[arg(long)]
    input: Option<PathBuf>,

    /// Where to write the generated module
    #[arg(long, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let document = match &args.input {
        Some(path) => read_document(path)?,
        None => fetch_document(&args.swagger_url).await?,
    };

    let count = generate(&document, &args.output)?;
    info!(
        "Generated {} write-protected endpoint entries to {}",
        count,
        args.output.display()
    );
    Ok(())
}

fn read_document(path: &Path) -> Result<serde_json::Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("{} is not valid JSON", path.display()))
}

async fn fetch_document(url: &str) -> Result<serde_json::Value> {
    info!("Fetching OpenAPI document from {}", url);
    let response = reqwest::get(url)
        .await
        .with_context(|| format!("Failed to fetch {}", url))?;

    let status = response.status();
    if status != reqwest::StatusCode::OK {
        bail!(
            "Failed to fetch Swagger JSON. Status code: {}",
            status.as_u16()
        );
    }

    response
        .json()
        .await
        .context("OpenAPI document is not valid JSON")
}

/// Write the table for `document` to `output`, returning the entry count.
fn generate(document: &serde_json::Value, output: &Path) -> Result<usize> {
    let entries = collect_requires_write_entries(document);
    let source = render_requires_write_module(&entries);

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(output, source)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    Ok(entries.len())
}
