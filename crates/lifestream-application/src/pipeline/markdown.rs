//! Markdown rendering of a daily summary.
//!
//! The format is stable — downstream consumers parse it — so changes here
//! are breaking:
//!
//! ```text
//! ## HH:MM:SS - HH:MM:SS: <activity>
//! * **Location:** <location>
//! * **Participants:**
//!   * **<speaker_id>:** <display_name> (<role>)
//! * **Transcript Summary:** <text>
//! * **Action Items:**
//!   * [ ] <item>
//! ```

use std::fmt::Write as _;

use lifestream_domain::entities::{DailySummary, TimeBlock};

use super::blocks::normalize_time;

/// Render the full summary document.
pub fn render_markdown(summary: &DailySummary) -> String {
    let mut out = format!("# Daily Summary - {}\n\n", summary.date);
    for block in &summary.time_blocks {
        render_block(&mut out, block);
        out.push('\n');
    }
    out
}

fn render_block(out: &mut String, block: &TimeBlock) {
    let _ = writeln!(
        out,
        "## {} - {}: {}",
        normalize_time(block.start_seconds),
        normalize_time(block.end_seconds),
        block.activity
    );
    let location = if block.location.is_empty() {
        "Unknown"
    } else {
        block.location.as_str()
    };
    let _ = writeln!(out, "* **Location:** {location}");

    let _ = writeln!(out, "* **Participants:**");
    for p in &block.participants {
        match &p.role {
            Some(role) => {
                let _ = writeln!(out, "  * **{}:** {} ({role})", p.speaker_id, p.display_name);
            }
            None => {
                let _ = writeln!(out, "  * **{}:** {}", p.speaker_id, p.display_name);
            }
        }
    }

    let _ = writeln!(out, "* **Transcript Summary:** {}", block.transcript_summary);

    if !block.action_items.is_empty() {
        let _ = writeln!(out, "* **Action Items:**");
        for item in &block.action_items {
            let _ = writeln!(out, "  * [ ] {item}");
        }
    }
}
