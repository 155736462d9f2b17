use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Canonical item page on news.ycombinator.com.
const ITEM_PAGE_URL: &str = "https://news.ycombinator.com/item?id=";

/// HackerNews item from API
///
/// Every field is optional: the upstream serves partial records for deleted
/// and erased items, and nothing about the shape is guaranteed.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HnItem {
    pub id: Option<u64>,
    #[serde(rename = "type")]
    pub item_type: Option<String>,
    pub by: Option<String>,
    pub time: Option<u64>,
    pub text: Option<String>,
    pub dead: Option<bool>,
    pub deleted: Option<bool>,
    pub parent: Option<u64>,
    pub kids: Option<Vec<u64>>,
    pub url: Option<String>,
    pub score: Option<u64>,
    pub title: Option<String>,
    pub descendants: Option<u64>,
}

/// Individual story output
#[derive(Debug, Serialize, Clone)]
pub struct StoryOutput {
    pub id: Option<u64>,
    pub rank: usize,
    pub title: Option<String>,
    pub url: String,
    pub hn_url: String,
    pub comments_url: String,
    pub score: Option<u64>,
    pub by: Option<String>,
    pub time: Option<u64>,
    pub time_iso: Option<String>,
    pub descendants: Option<u64>,
    pub kids_count: usize,
    #[serde(rename = "type")]
    pub item_type: Option<String>,
}

/// One item that could not be fetched after retries
#[derive(Debug, Serialize, Clone)]
pub struct FetchFailure {
    pub id: u64,
    pub error: String,
}

/// Complete scan output with run metadata and ranked stories
#[derive(Debug, Serialize, Clone)]
pub struct ScanOutput {
    pub generated_at: String,
    pub story_list: String,
    pub limit: usize,
    pub hours: u32,
    pub count: usize,
    pub failures: Vec<FetchFailure>,
    pub items: Vec<StoryOutput>,
}

/// Map each candidate id to its 1-based position in the ranked list
///
/// Later occurrences win when the upstream list repeats an id.
pub fn rank_index(ids: &[u64]) -> HashMap<u64, usize> {
    ids.iter()
        .enumerate()
        .map(|(idx, id)| (*id, idx + 1))
        .collect()
}

/// Whether an item is a live story with a timestamp at or after the cutoff
///
/// Deleted and dead items are rejected, as is anything whose type tag is not
/// exactly "story". The cutoff comparison is inclusive.
pub fn is_fresh_story(item: &HnItem, cutoff: i64) -> bool {
    if item.deleted.unwrap_or(false) || item.dead.unwrap_or(false) {
        return false;
    }

    if item.item_type.as_deref() != Some("story") {
        return false;
    }

    match item.time.and_then(|t| i64::try_from(t).ok()) {
        Some(time) => time >= cutoff,
        None => false,
    }
}

fn candidate_rank(index: &HashMap<u64, usize>, item: &HnItem) -> Option<usize> {
    item.id.and_then(|id| index.get(&id).copied())
}

/// Restore original rank order and truncate to the limit
///
/// Fetches complete in arbitrary order, so the collected items are re-sorted
/// by their position in the original candidate list. Items whose id is absent
/// from the index sort last. The sort is stable, so applying this twice gives
/// the same result as applying it once.
pub fn rank_and_truncate(
    mut items: Vec<HnItem>,
    index: &HashMap<u64, usize>,
    limit: usize,
) -> Vec<HnItem> {
    items.sort_by_key(|item| candidate_rank(index, item).unwrap_or(usize::MAX));
    items.truncate(limit);
    items
}

/// Convert Unix timestamp to an ISO-8601 UTC string
pub fn iso_timestamp(timestamp: Option<u64>) -> Option<String> {
    timestamp.and_then(|ts| {
        let secs = i64::try_from(ts).ok()?;
        let dt = DateTime::<Utc>::from_timestamp(secs, 0)?;
        Some(dt.to_rfc3339())
    })
}

/// Project one item into its output record
///
/// The canonical item page doubles as the comments url, and stands in for the
/// story url when the item carries none. An empty url string counts as none.
pub fn transform_story(item: &HnItem, rank: usize) -> StoryOutput {
    let hn_url = format!("{ITEM_PAGE_URL}{}", item.id.unwrap_or(0));
    let url = item
        .url
        .as_ref()
        .filter(|u| !u.is_empty())
        .cloned()
        .unwrap_or_else(|| hn_url.clone());

    StoryOutput {
        id: item.id,
        rank,
        title: item.title.clone(),
        url,
        hn_url: hn_url.clone(),
        comments_url: hn_url,
        score: item.score,
        by: item.by.clone(),
        time: item.time,
        time_iso: iso_timestamp(item.time),
        descendants: item.descendants,
        kids_count: item.kids.as_ref().map(|k| k.len()).unwrap_or(0),
        item_type: item.item_type.clone(),
    }
}

/// Project items into output records, ranked by the candidate index
///
/// Items whose id is absent from the index get rank 0.
pub fn transform_stories(items: &[HnItem], index: &HashMap<u64, usize>) -> Vec<StoryOutput> {
    items
        .iter()
        .map(|item| transform_story(item, candidate_rank(index, item).unwrap_or(0)))
        .collect()
}

/// Build the scan output envelope
///
/// `count` reflects the items actually included, not the candidates scanned.
pub fn build_scan_output(
    story_list: String,
    limit: usize,
    hours: u32,
    generated_at: DateTime<Utc>,
    failures: Vec<FetchFailure>,
    items: Vec<StoryOutput>,
) -> ScanOutput {
    ScanOutput {
        generated_at: generated_at.to_rfc3339(),
        story_list,
        limit,
        hours,
        count: items.len(),
        failures,
        items,
    }
}
