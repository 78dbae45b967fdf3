#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "jpg" | "jpeg" | "png" | "webp" | "gif" | "bmp" | "tiff" | "tif" => Some(Self::Image),
            "webm" | "mp4" | "mkv" | "avi" | "mov" => Some(Self::Video),
            _ => None,
        }
    }

    pub fn is_video(self) -> bool {
        self == Self::Video
    }
}

/// One displayable catalog entry. Immutable once loaded; galleries and the
/// popup refer to it by catalog index and never copy it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaItem {
    /// Source reference the view layer resolves (file path or URL path).
    pub source: String,
    pub kind: MediaKind,
    pub caption: String,
    /// Still frame shown before a video starts; images have none.
    pub poster: Option<String>,
}

impl MediaItem {
    pub fn image(source: impl Into<String>, caption: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            kind: MediaKind::Image,
            caption: caption.into(),
            poster: None,
        }
    }

    pub fn video(
        source: impl Into<String>,
        caption: impl Into<String>,
        poster: Option<String>,
    ) -> Self {
        Self {
            source: source.into(),
            kind: MediaKind::Video,
            caption: caption.into(),
            poster,
        }
    }

    /// Check if this entry is a playable video
    pub fn is_video(&self) -> bool {
        self.kind.is_video()
    }
}
