//! Processing pipeline constants.

/// Default synchronization window, in seconds.
pub const DEFAULT_CHUNK_WINDOW_SECONDS: f64 = 300.0;

/// Fixed interval scene detection degrades to when the detector is
/// unavailable, in seconds.
pub const FALLBACK_SCENE_INTERVAL_SECONDS: f64 = 5.0;

/// Default number of workers for the within-task audio/visual branches.
pub const DEFAULT_PARALLEL_MAX_WORKERS: usize = 2;

/// Default frame skip for scene detection (speed vs. granularity).
pub const DEFAULT_SCENE_DETECTION_FRAME_SKIP: u32 = 2;

/// Default per-stage soft timeout, in seconds.
pub const DEFAULT_STAGE_TIMEOUT_SECONDS: u64 = 600;

/// Relative divergence between the client duration hint and the probed
/// stream duration above which a warning is logged.
pub const DURATION_DIVERGENCE_THRESHOLD: f64 = 0.20;

/// Number of transcript characters used to derive an activity label when
/// the summarizer returns the degenerate `"Activity"` value.
pub const ACTIVITY_FALLBACK_CHARS: usize = 80;

/// Activity label emitted for contexts with no usable speech.
pub const NO_SPEECH_ACTIVITY: &str = "No speech detected";

/// Degenerate activity value some summarizer backends return verbatim.
pub const DEGENERATE_ACTIVITY: &str = "Activity";

/// Display name for speaker IDs absent from the registry.
pub const UNIDENTIFIED_SPEAKER: &str = "Unidentified speaker";

/// Speaker ID assigned when diarization degrades to a single speaker.
pub const FALLBACK_SPEAKER_ID: &str = "Speaker_01";
