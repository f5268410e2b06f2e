//! Temporal synchronization: join audio segments and keyframes into
//! fixed-size context windows.

use std::collections::BTreeMap;

use lifestream_domain::entities::{AudioSegment, Keyframe, SynchronizedContext};

/// Split the content into windows of `window_seconds` and assign each
/// window the audio segments overlapping it and the keyframes inside it.
///
/// The effective duration is the maximum of the probed stream duration and
/// the last signal timestamp, so late segments are never dropped. Content
/// shorter than one window produces exactly one context covering the whole
/// video; zero-duration content still produces one (empty) context so the
/// summary always has at least one block.
pub fn build_contexts(
    segments: &[AudioSegment],
    keyframes: &[Keyframe],
    duration_seconds: f64,
    window_seconds: f64,
) -> Vec<SynchronizedContext> {
    let last_audio = segments
        .iter()
        .map(|s| s.end_seconds)
        .fold(0.0f64, f64::max);
    let last_frame = keyframes
        .iter()
        .map(|k| k.timestamp_seconds)
        .fold(0.0f64, f64::max);
    let effective = duration_seconds.max(last_audio).max(last_frame);

    if effective <= 0.0 {
        return vec![make_window(0.0, 0.0, segments, keyframes)];
    }
    if window_seconds <= 0.0 || effective <= window_seconds {
        return vec![make_window(0.0, effective, segments, keyframes)];
    }

    let mut contexts = Vec::new();
    let mut start = 0.0f64;
    while start < effective {
        let end = (start + window_seconds).min(effective);
        contexts.push(make_window(start, end, segments, keyframes));
        start = end;
    }
    contexts
}

fn make_window(
    start: f64,
    end: f64,
    segments: &[AudioSegment],
    keyframes: &[Keyframe],
) -> SynchronizedContext {
    let audio_segments = segments
        .iter()
        .filter(|s| s.overlaps(start, end) || (start == end && s.start_seconds == start))
        .cloned()
        .collect();
    let frames = keyframes
        .iter()
        .filter(|k| k.timestamp_seconds >= start && (k.timestamp_seconds < end || start == end))
        .cloned()
        .collect();
    SynchronizedContext {
        start_seconds: start,
        end_seconds: end,
        audio_segments,
        keyframes: frames,
        metadata: BTreeMap::new(),
    }
}
