//! The speaker registry: opaque diarizer ids to display names and roles.
//!
//! Edited out-of-band; loaded read-only at every task start. Unknown ids
//! resolve to a stable placeholder.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::UNIDENTIFIED_SPEAKER;
use crate::error::{Error, Result};

/// Display information for one known speaker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SpeakerInfo {
    /// Human-readable name
    pub display_name: String,
    /// Role, if recorded (e.g. "Engineering Manager")
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub role: Option<String>,
}

/// Mapping from opaque speaker ids (e.g. `Speaker_01`) to display info.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpeakerRegistry {
    speakers: HashMap<String, SpeakerInfo>,
}

impl SpeakerRegistry {
    /// An empty registry; every id resolves to the placeholder.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a registry from explicit entries.
    pub fn from_entries(entries: impl IntoIterator<Item = (String, SpeakerInfo)>) -> Self {
        Self {
            speakers: entries.into_iter().collect(),
        }
    }

    /// Load the registry from a YAML file.
    ///
    /// A missing file is not an error: tasks run with an empty registry and
    /// every speaker renders as the placeholder.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::empty());
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::io_with_source("failed to read speaker registry", e))?;
        let speakers: HashMap<String, SpeakerInfo> = serde_yaml::from_str(&content)
            .map_err(|e| Error::config(format!("invalid speaker registry: {e}")))?;
        Ok(Self { speakers })
    }

    /// Resolve a speaker id to display info, falling back to the
    /// `Unidentified speaker` placeholder.
    pub fn resolve(&self, speaker_id: &str) -> SpeakerInfo {
        self.speakers
            .get(speaker_id)
            .cloned()
            .unwrap_or_else(|| SpeakerInfo {
                display_name: UNIDENTIFIED_SPEAKER.to_owned(),
                role: None,
            })
    }

    /// Number of known speakers.
    pub fn len(&self) -> usize {
        self.speakers.len()
    }

    /// Whether the registry has no entries.
    pub fn is_empty(&self) -> bool {
        self.speakers.is_empty()
    }
}
