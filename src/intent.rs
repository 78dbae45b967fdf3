//! Messages the engine emits toward the rendering surface.
//!
//! The engine owns logical state only. Every visible change is requested
//! through one of these intents; the view layer translates them into CSS
//! class flips, media element swaps, and playback calls.

use crate::gallery::GalleryId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Mark exactly this item active within the gallery, clearing the
    /// previous marker. `mood` carries the decoration re-roll for galleries
    /// configured with an overlay.
    SetActive {
        gallery: GalleryId,
        index: usize,
        mood: Option<&'static str>,
    },
    /// Begin playback of the gallery's video slot from the start.
    PlayVideo { gallery: GalleryId, muted: bool },
    /// Suspend playback without losing position.
    PauseVideo { gallery: GalleryId },
    /// Continue playback from the paused position.
    ResumeVideo { gallery: GalleryId },
    /// Seek to the beginning and play again (loop-on-complete).
    RestartVideo { gallery: GalleryId },
    /// Remove the failed video slot from the rendered gallery.
    HideVideoSlot { gallery: GalleryId },
    /// Autoplay was rejected twice; show a tap-to-play affordance.
    ShowPlayPrompt { gallery: GalleryId },
    /// Display the popup viewer on the catalog item at `index`.
    ShowPopup { index: usize, total: usize },
    /// Hide the popup viewer and pause any playing media in it.
    HidePopup,
    /// The catalog could not be loaded; show a retryable error state.
    CatalogUnavailable { reason: String },
}
