//! Ingest command implementation

use crate::config::Config;
use crate::convert::{HttpConverter, PageDocument};
use crate::error::{Error, Result};
use crate::ingest::{IngestStats, Ingestor};
use crate::store::ChunkStore;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Ingest a filing from disk.
///
/// `markdown` skips the conversion service and treats the file as
/// already-normalized markdown with no page metadata.
pub async fn cmd_ingest(
    config: &Config,
    store: &dyn ChunkStore,
    path: &Path,
    markdown: bool,
) -> Result<IngestStats> {
    info!("Ingesting {}", path.display());

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.enable_steady_tick(Duration::from_millis(120));

    let ingestor = Ingestor::new(store, config.split.child_window);

    let stats = if markdown {
        spinner.set_message("Splitting markdown and writing chunks...");
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::SourceUnavailable(format!("{}: {}", path.display(), e)))?;
        ingestor
            .ingest_pages(&[PageDocument::unlabelled(text)])
            .await
    } else {
        spinner.set_message("Converting source document...");
        let bytes = std::fs::read(path)
            .map_err(|e| Error::SourceUnavailable(format!("{}: {}", path.display(), e)))?;
        let converter = HttpConverter::new(&config.conversion, config.request_timeout())?;
        ingestor
            .ingest_source(&converter, &bytes, &config.conversion.instructions)
            .await
    };

    spinner.finish_and_clear();
    stats
}

/// Print ingestion outcome to console
pub fn print_ingest_stats(stats: &IngestStats) {
    println!(
        "Ingested {} parents and {} children ({} chunks total)",
        stats.parents_written,
        stats.children_written,
        stats.written()
    );

    if stats.is_partial() {
        println!(
            "WARNING: partial ingestion, {} of {} chunks written:",
            stats.written(),
            stats.expected
        );
        for error in &stats.errors {
            println!("  - {}", error);
        }
    }
}
