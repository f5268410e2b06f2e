//! Time-block construction from summarizer output.
//!
//! Applies the post-processing the summarizer contract requires: rejecting
//! the degenerate `"Activity"` value, resolving speaker ids through the
//! registry, and emitting default blocks for windows with no signal.

use lifestream_domain::constants::{
    ACTIVITY_FALLBACK_CHARS, DEGENERATE_ACTIVITY, NO_SPEECH_ACTIVITY,
};
use lifestream_domain::entities::{
    ContextType, Participant, SourceReliability, SpeakerRegistry, SynchronizedContext, TimeBlock,
};
use lifestream_domain::ports::BlockSummary;

/// Format seconds as `HH:MM:SS`, flooring sub-second precision.
pub fn normalize_time(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

/// Build the final time block for a context from the summarizer's response.
///
/// `classified` is the meeting-classification stage's result; when that
/// stage degraded the summarizer's own call is used instead.
pub fn build_time_block(
    context: &SynchronizedContext,
    summary: BlockSummary,
    registry: &SpeakerRegistry,
    classified: Option<ContextType>,
) -> TimeBlock {
    let activity = sanitize_activity(&summary.activity, context);

    let speaker_ids = if summary.participants.is_empty() {
        observed_speakers(context)
    } else {
        summary.participants.clone()
    };
    let participants = speaker_ids
        .iter()
        .map(|id| {
            let info = registry.resolve(id);
            Participant {
                speaker_id: id.clone(),
                display_name: info.display_name,
                role: info.role,
            }
        })
        .collect();

    TimeBlock {
        start_seconds: context.start_seconds,
        end_seconds: context.end_seconds,
        activity,
        location: summary.location,
        participants,
        transcript_summary: summary.transcript_summary,
        action_items: summary.action_items,
        context_type: classified.unwrap_or(summary.context_type),
        source_reliability: summary.source_reliability,
    }
}

/// The block emitted without an LLM call when a window has neither audio
/// nor visual signal.
pub fn default_block(context: &SynchronizedContext) -> TimeBlock {
    TimeBlock {
        start_seconds: context.start_seconds,
        end_seconds: context.end_seconds,
        activity: NO_SPEECH_ACTIVITY.to_owned(),
        location: String::new(),
        participants: Vec::new(),
        transcript_summary: String::new(),
        action_items: Vec::new(),
        context_type: ContextType::Unknown,
        source_reliability: SourceReliability::Low,
    }
}

/// Heuristic classification used when the classifier backend degrades:
/// two or more distinct speakers reads as a meeting, any single speaker as
/// a vlog.
pub fn heuristic_context_type(context: &SynchronizedContext) -> ContextType {
    match observed_speakers(context).len() {
        0 => ContextType::Unknown,
        1 => ContextType::Vlog,
        _ => ContextType::Meeting,
    }
}

fn sanitize_activity(activity: &str, context: &SynchronizedContext) -> String {
    let trimmed = activity.trim();
    if !trimmed.is_empty() && trimmed != DEGENERATE_ACTIVITY {
        return trimmed.to_owned();
    }
    let transcript = context.labeled_transcript();
    if transcript.is_empty() {
        return NO_SPEECH_ACTIVITY.to_owned();
    }
    let mut derived: String = transcript.chars().take(ACTIVITY_FALLBACK_CHARS).collect();
    if derived.len() < transcript.len() {
        derived.push('…');
    }
    derived
}

fn observed_speakers(context: &SynchronizedContext) -> Vec<String> {
    let mut ids: Vec<String> = context
        .audio_segments
        .iter()
        .filter(|s| !s.text.trim().is_empty())
        .map(|s| s.speaker_id.clone())
        .collect();
    ids.sort();
    ids.dedup();
    ids
}
