//! Project-wide constants used across multiple modules.
//!
//! This module centralizes constant definitions to avoid duplication and ensure
//! consistency across the codebase.

use std::time::Duration;

/// Interval for the segment-end poll. Native time-update delivery is too
/// coarse to catch a segment boundary, so the poll bounds overshoot to one
/// interval.
pub const SEGMENT_POLL_INTERVAL: Duration = Duration::from_millis(30);

/// Interval between time-update dispatches from the bundled media elements.
/// Deliberately coarser than the segment poll.
pub const TIMEUPDATE_INTERVAL: Duration = Duration::from_millis(250);

/// Audio file extensions the play command will accept without a warning
pub const AUDIO_EXTENSIONS: &[&str] = &["wav", "flac", "ogg", "mp3"];
