//! Video slot state for galleries carrying a playable video.
//!
//! The slot moves `Idle -> Playing -> {Completed, Failed}`. `Completed`
//! loops the video in place instead of resuming rotation; `Failed` removes
//! the slot for the rest of the session.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VideoPhase {
    /// Slot is active but playback has not started.
    #[default]
    Idle,
    /// Playback is running (or visibility-paused mid-stream).
    Playing,
    /// Reached the end at least once; keeps looping from the beginning.
    Completed,
    /// Resource error; the gallery fell back to images for the session.
    Failed,
}

impl VideoPhase {
    pub fn is_playing(self) -> bool {
        matches!(self, Self::Playing)
    }
}

/// Playback lifecycle notifications reported by the rendering surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEvent {
    /// Playback actually began.
    Started,
    /// The runtime's media policy refused to start playback.
    AutoplayRejected,
    /// Playback reached the end of the stream.
    Ended,
    /// The video resource could not be loaded or decoded.
    Error,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct VideoSlot {
    pub phase: VideoPhase,
    /// Whether the single muted autoplay retry has been spent.
    pub retried: bool,
}

impl VideoSlot {
    pub fn new() -> Self {
        Self {
            phase: VideoPhase::Idle,
            retried: false,
        }
    }

    /// Re-enter the autoplay sequence from the top (slot became active).
    pub fn reset(&mut self) {
        self.phase = VideoPhase::Idle;
        self.retried = false;
    }
}
