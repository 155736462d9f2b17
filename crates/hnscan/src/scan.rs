use crate::prelude::{eprintln, println, *};
use std::future::Future;
use std::time::Duration;

use chrono::Utc;
use colored::Colorize;
use futures::{stream, StreamExt};
use hnscan_core::hn::{
    build_scan_output, is_fresh_story, rank_and_truncate, rank_index, transform_stories,
    FetchFailure, HnItem, ScanOutput,
};

use crate::client::{HnClient, StoryList, HN_API_BASE};

/// Output encodings for scan results.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Jsonl,
    Text,
}

#[derive(Debug, clap::Args, serde::Serialize, serde::Deserialize, Clone)]
pub struct ScanOptions {
    /// Maximum number of stories to return
    #[arg(long, default_value = "25")]
    pub limit: usize,

    /// Only include stories newer than this many hours
    #[arg(long, default_value = "24")]
    pub hours: u32,

    /// Ranked list to scan
    #[arg(long, value_enum, default_value_t = StoryList::Topstories)]
    pub list: StoryList,

    /// How many ids from the head of the list to consider (0 = all)
    #[arg(long, default_value = "200")]
    pub scan: usize,

    /// Ids fetched per sequential batch
    #[arg(long, default_value = "25")]
    pub batch_size: usize,

    /// Concurrent fetches within a batch
    #[arg(long, default_value = "10")]
    pub max_workers: usize,

    /// Per-request timeout in seconds
    #[arg(long, default_value = "10.0")]
    pub timeout: f64,

    /// Extra attempts per request after the first
    #[arg(long, default_value = "2")]
    pub retries: u32,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// User-Agent header sent with every request
    #[arg(long, default_value = "hnscan/1.0")]
    pub user_agent: String,
}

pub async fn run(options: ScanOptions, global: crate::Global) -> Result<()> {
    if global.verbose {
        println!("HackerNews API Base: {}", HN_API_BASE);
        println!(
            "Scanning {} for stories from the last {} hours...",
            options.list.as_str(),
            options.hours
        );
        println!();
    }

    let output = scan_data(&options).await?;

    output_scan(&output, options.format)
}

/// Scans the ranked list and returns fresh stories as a structured ScanOutput
pub async fn scan_data(options: &ScanOptions) -> Result<ScanOutput> {
    let client = HnClient::new(
        request_timeout(options.timeout),
        options.retries,
        &options.user_agent,
    )?;

    scan_with_client(&client, options).await
}

/// Per-request timeout from the timeout flag. Non-finite values disable the
/// timeout; negative values clamp to zero.
fn request_timeout(seconds: f64) -> Duration {
    if !seconds.is_finite() {
        return Duration::MAX;
    }

    Duration::try_from_secs_f64(seconds.max(0.0)).unwrap_or(Duration::MAX)
}

/// The pipeline behind [`scan_data`], with the client supplied by the caller
/// so tests can aim it at a local server.
async fn scan_with_client(client: &HnClient, options: &ScanOptions) -> Result<ScanOutput> {
    let mut candidate_ids = client.story_ids(options.list).await?;
    if options.scan > 0 {
        candidate_ids.truncate(options.scan);
    }

    // The cutoff is computed once, before any fetch is dispatched.
    let cutoff = Utc::now().timestamp() - i64::from(options.hours) * 3600;

    let (found, failures) = scan_batches(
        &candidate_ids,
        options.batch_size,
        options.max_workers,
        options.limit,
        cutoff,
        |id| client.item(id),
    )
    .await;

    let index = rank_index(&candidate_ids);
    let ranked = rank_and_truncate(found, &index, options.limit);
    let items = transform_stories(&ranked, &index);

    Ok(build_scan_output(
        options.list.as_str().to_string(),
        options.limit,
        options.hours,
        Utc::now(),
        failures,
        items,
    ))
}

/// Fetch candidate ids in sequential batches with bounded parallelism
///
/// Batches never overlap, so `max_workers` bounds the whole scan. Completed
/// fetches are filtered as they land, in whatever order they finish. A failed
/// fetch is recorded and never aborts the scan. Scheduling stops after the
/// first batch that satisfies the limit, so the last batch may overshoot;
/// the rank-and-truncate step restores the final count.
async fn scan_batches<F, Fut, E>(
    ids: &[u64],
    batch_size: usize,
    max_workers: usize,
    limit: usize,
    cutoff: i64,
    fetch: F,
) -> (Vec<HnItem>, Vec<FetchFailure>)
where
    F: Fn(u64) -> Fut,
    Fut: Future<Output = Result<Option<HnItem>, E>>,
    E: std::fmt::Display,
{
    let mut found = Vec::new();
    let mut failures = Vec::new();

    for batch in ids.chunks(batch_size.max(1)) {
        let mut fetches = stream::iter(batch.iter().map(|&id| {
            let item = fetch(id);
            async move { (id, item.await) }
        }))
        .buffer_unordered(max_workers.max(1));

        while let Some((id, result)) = fetches.next().await {
            match result {
                Ok(Some(item)) if is_fresh_story(&item, cutoff) => found.push(item),
                Ok(_) => {}
                Err(err) => failures.push(FetchFailure {
                    id,
                    error: err.to_string(),
                }),
            }
        }

        if found.len() >= limit {
            break;
        }
    }

    (found, failures)
}

/// Convert scan output to JSON string
fn format_scan_json(output: &ScanOutput) -> Result<String> {
    serde_json::to_string_pretty(output).map_err(|e| eyre!("JSON serialization failed: {}", e))
}

/// Convert scan output to JSON Lines, one story per line, no envelope
fn format_scan_jsonl(output: &ScanOutput) -> Result<String> {
    let mut lines = Vec::with_capacity(output.items.len());
    for item in &output.items {
        let line = serde_json::to_string(item)
            .map_err(|e| eyre!("JSON serialization failed: {}", e))?;
        lines.push(line);
    }
    Ok(lines.join("\n"))
}

/// Convert scan output to formatted text with colors
fn format_scan_text(output: &ScanOutput) -> String {
    let mut result = String::new();

    for item in &output.items {
        let title = item.title.as_deref().unwrap_or("(No title)");
        result.push_str(&format!(
            "{} ({} points)\n",
            format!("{}. {}", item.rank, title).bold(),
            item.score.unwrap_or(0)
        ));
        result.push_str(&format!("   {}\n", item.url.cyan()));
        result.push_str(&format!("   {}\n", item.comments_url.cyan()));
    }

    result
}

/// Report fetch failures on stderr, then print the scan in the selected format
fn output_scan(output: &ScanOutput, format: OutputFormat) -> Result<()> {
    if !output.failures.is_empty() {
        eprintln!("Warning: {} items failed to fetch", output.failures.len());
    }

    match format {
        OutputFormat::Json => output_json(output),
        OutputFormat::Jsonl => output_jsonl(output),
        OutputFormat::Text => output_formatted(output),
    }
}

fn output_json(output: &ScanOutput) -> Result<()> {
    let json = format_scan_json(output)?;
    println!("{}", json);
    Ok(())
}

fn output_jsonl(output: &ScanOutput) -> Result<()> {
    let jsonl = format_scan_jsonl(output)?;
    if !jsonl.is_empty() {
        println!("{}", jsonl);
    }
    Ok(())
}

fn output_formatted(output: &ScanOutput) -> Result<()> {
    let formatted = format_scan_text(output);
    print!("{}", formatted);
    Ok(())
}
