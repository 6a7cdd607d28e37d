//! Slash-delimited namespace paths.

use std::fmt;

use crate::namespace::ROOT_NAME;

/// A path from the root folder, as a list of segment names.
///
/// The root contributes no segment: the empty path is the root folder itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NsPath {
    segments: Vec<String>,
}

impl NsPath {
    /// The root folder.
    #[must_use]
    pub const fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Split a path string on `/`.
    ///
    /// Empty segments are ignored, so `""`, `"/"` and `"docs/"` resolve as
    /// the root, the root, and `docs` respectively.
    #[must_use]
    pub fn parse(path: &str) -> Self {
        Self::from_segments(path.split('/').filter(|s| !s.is_empty()))
    }

    #[must_use]
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Vec::is_empty() is not const-stable
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of segments (the depth below the root).
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// The path of a child named `name` under this path.
    #[must_use]
    pub fn join(&self, name: &str) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.extend_from_slice(&self.segments);
        segments.push(name.to_string());
        Self { segments }
    }

    /// Split into the parent path and the final segment.
    ///
    /// Returns `None` for the root.
    #[must_use]
    pub fn split_last(&self) -> Option<(Self, &str)> {
        let (last, parent) = self.segments.split_last()?;
        Some((
            Self {
                segments: parent.to_vec(),
            },
            last.as_str(),
        ))
    }

    /// The first `len` segments of this path.
    #[must_use]
    pub fn prefix(&self, len: usize) -> Self {
        Self {
            segments: self.segments[..len.min(self.segments.len())].to_vec(),
        }
    }

    /// Whether `other` is this path or one of its ancestors.
    #[must_use]
    pub fn starts_with(&self, other: &Self) -> bool {
        self.segments.starts_with(&other.segments)
    }

    /// The persisted form: segments joined by `/`, root contributing nothing.
    #[must_use]
    pub fn state_string(&self) -> String {
        self.segments.join("/")
    }
}

impl fmt::Display for NsPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(ROOT_NAME)?;
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}
