use thiserror::Error;
use url::Url;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MediaError {
    #[error("media reference is empty")]
    Empty,
}

//
// ─── MEDIA REFERENCES ──────────────────────────────────────────────────────────
//

/// Location of an image or audio asset attached to a question.
///
/// The backend returns either absolute URLs or server-relative paths
/// (`/media/n5/q12.mp3`); relative paths are resolved against the API base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaRef {
    Url(Url),
    ServerPath(String),
}

impl MediaRef {
    /// Parse a raw media reference.
    ///
    /// # Errors
    ///
    /// Returns `MediaError::Empty` for blank input.
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, MediaError> {
        let s = raw.as_ref().trim();
        if s.is_empty() {
            return Err(MediaError::Empty);
        }
        match Url::parse(s) {
            Ok(url) => Ok(MediaRef::Url(url)),
            Err(_) => Ok(MediaRef::ServerPath(s.to_owned())),
        }
    }

    /// Resolve to an absolute URL, joining server paths onto `base`.
    #[must_use]
    pub fn resolve(&self, base: &Url) -> Option<Url> {
        match self {
            MediaRef::Url(url) => Some(url.clone()),
            MediaRef::ServerPath(path) => base.join(path).ok(),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            MediaRef::Url(url) => url.as_str(),
            MediaRef::ServerPath(path) => path,
        }
    }
}

/// Listening clip with its playback length, when the backend knows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioClip {
    source: MediaRef,
    duration_secs: Option<u32>,
}

impl AudioClip {
    /// A zero duration is treated as unknown.
    #[must_use]
    pub fn new(source: MediaRef, duration_secs: Option<u32>) -> Self {
        Self {
            source,
            duration_secs: duration_secs.filter(|secs| *secs > 0),
        }
    }

    #[must_use]
    pub fn source(&self) -> &MediaRef {
        &self.source
    }

    #[must_use]
    pub fn duration_secs(&self) -> Option<u32> {
        self.duration_secs
    }
}
