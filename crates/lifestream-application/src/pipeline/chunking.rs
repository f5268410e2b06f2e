//! Chunk generation from a daily summary.
//!
//! Per time block: one `summary_block` chunk; `transcript_block` chunks
//! when the transcript exceeds the configured threshold; one `action_item`
//! chunk per item. Chunk ids are deterministic, so re-running on identical
//! input produces identical ids and re-indexing upserts in place.

use std::collections::BTreeMap;

use lifestream_domain::entities::{Chunk, DailySummary, SourceType, TimeBlock};

use super::blocks::normalize_time;

/// Offset that keeps sibling action-item chunks of one block distinct in
/// the `(video_id, start, end, source_type)` hash input.
const ACTION_ITEM_OFFSET_SECONDS: f64 = 0.001;

/// Generate the chunks for one summary.
pub fn chunks_from_summary(summary: &DailySummary, transcript_threshold: usize) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    for block in &summary.time_blocks {
        chunks.push(summary_block_chunk(summary, block));
        chunks.extend(transcript_chunks(summary, block, transcript_threshold));
        chunks.extend(action_item_chunks(summary, block));
    }
    chunks
}

fn base_metadata(summary: &DailySummary, block: &TimeBlock) -> BTreeMap<String, String> {
    let mut metadata = BTreeMap::new();
    metadata.insert("video_id".to_owned(), summary.video_id.clone());
    metadata.insert("date".to_owned(), summary.date.clone());
    metadata.insert("activity".to_owned(), block.activity.clone());
    if !block.location.is_empty() {
        metadata.insert("location".to_owned(), block.location.clone());
    }
    metadata.insert(
        "context_type".to_owned(),
        serde_variant_name(block.context_type),
    );
    let speakers = block
        .participants
        .iter()
        .map(|p| p.speaker_id.as_str())
        .collect::<Vec<_>>()
        .join(",");
    metadata.insert("speakers".to_owned(), speakers);
    metadata
}

fn serde_variant_name(context_type: lifestream_domain::entities::ContextType) -> String {
    use lifestream_domain::entities::ContextType;
    match context_type {
        ContextType::Meeting => "meeting",
        ContextType::Vlog => "vlog",
        ContextType::Unknown => "unknown",
    }
    .to_owned()
}

fn make_chunk(
    summary: &DailySummary,
    block: &TimeBlock,
    start: f64,
    end: f64,
    source_type: SourceType,
    text: String,
) -> Chunk {
    let mut metadata = base_metadata(summary, block);
    metadata.insert("source_type".to_owned(), source_type.as_str().to_owned());
    Chunk {
        chunk_id: Chunk::compute_id(&summary.video_id, start, end, source_type),
        video_id: summary.video_id.clone(),
        date: summary.date.clone(),
        start_seconds: start,
        end_seconds: end,
        speakers: block
            .participants
            .iter()
            .map(|p| p.speaker_id.clone())
            .collect(),
        source_type,
        text,
        metadata,
    }
}

fn summary_block_chunk(summary: &DailySummary, block: &TimeBlock) -> Chunk {
    let participants = block
        .participants
        .iter()
        .map(|p| p.display_name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let mut text = format!(
        "[{} - {}] {}",
        normalize_time(block.start_seconds),
        normalize_time(block.end_seconds),
        block.activity
    );
    if !block.location.is_empty() {
        text.push_str(&format!(" at {}", block.location));
    }
    if !participants.is_empty() {
        text.push_str(&format!(" with {participants}"));
    }
    if !block.transcript_summary.is_empty() {
        text.push_str(&format!(". {}", block.transcript_summary));
    }
    make_chunk(
        summary,
        block,
        block.start_seconds,
        block.end_seconds,
        SourceType::SummaryBlock,
        text,
    )
}

fn transcript_chunks(
    summary: &DailySummary,
    block: &TimeBlock,
    threshold: usize,
) -> Vec<Chunk> {
    let transcript = block.transcript_summary.as_str();
    if transcript.len() <= threshold || threshold == 0 {
        return Vec::new();
    }

    let pieces = split_by_chars(transcript, threshold);
    let span = block.end_seconds - block.start_seconds;
    let count = pieces.len();
    pieces
        .into_iter()
        .enumerate()
        .map(|(i, piece)| {
            // Interpolate each slice's window proportionally into the block.
            let start = block.start_seconds + span * (i as f64 / count as f64);
            let end = block.start_seconds + span * ((i + 1) as f64 / count as f64);
            make_chunk(
                summary,
                block,
                start,
                end,
                SourceType::TranscriptBlock,
                piece,
            )
        })
        .collect()
}

fn action_item_chunks(summary: &DailySummary, block: &TimeBlock) -> Vec<Chunk> {
    block
        .action_items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let start = block.start_seconds + i as f64 * ACTION_ITEM_OFFSET_SECONDS;
            make_chunk(
                summary,
                block,
                start,
                block.end_seconds,
                SourceType::ActionItem,
                format!("Action item: {item}"),
            )
        })
        .collect()
}

/// Split text into pieces of at most `budget` characters, breaking on
/// whitespace where possible.
fn split_by_chars(text: &str, budget: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.len() + word.len() + 1 > budget {
            pieces.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}
