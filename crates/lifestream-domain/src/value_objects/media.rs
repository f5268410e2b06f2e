//! Audio-pipeline value objects.

/// A decoded 16 kHz mono PCM waveform.
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    /// PCM samples in `[-1, 1]`
    pub samples: Vec<f32>,
    /// Samples per second (16 000 for the pipeline)
    pub sample_rate: u32,
}

impl Waveform {
    /// Duration of the waveform in seconds.
    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / f64::from(self.sample_rate)
    }

    /// Whether the waveform carries no signal.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// A diarized span: who spoke when.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeakerTurn {
    /// Turn start, seconds
    pub start_seconds: f64,
    /// Turn end, seconds
    pub end_seconds: f64,
    /// Opaque speaker id (e.g. `Speaker_01`)
    pub speaker_id: String,
}
