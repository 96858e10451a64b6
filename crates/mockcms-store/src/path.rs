//! Content paths for addressing nodes in the content tree
//!
//! Provides [`ContentPath`], an absolute, slash-separated node address.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Absolute path of a node in the content tree
///
/// Hierarchical structure using string segments, rendered with `/`.
///
/// # Examples
/// - `[]` → `/`
/// - `["content", "dam", "sample.jpg"]` → `/content/dam/sample.jpg`
/// - `["content", "page", "jcr:content"]` → `/content/page/jcr:content`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContentPath(Vec<String>);

impl ContentPath {
    /// The root path (`/`)
    #[inline]
    #[must_use]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Get path segments
    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Number of segments (depth below root)
    #[inline]
    #[must_use]
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// Check if this is the root path
    #[inline]
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Get parent path (if not root)
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.0.is_empty() {
            None
        } else {
            Some(Self(self.0[..self.0.len() - 1].to_vec()))
        }
    }

    /// Node name (last segment), empty for root
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        self.0.last().map_or("", String::as_str)
    }

    /// Append a segment, returning new path
    ///
    /// # Errors
    /// Returns error if `segment` is not a valid node name
    pub fn child(&self, segment: &str) -> Result<Self, PathError> {
        validate_segment(segment)?;
        let mut new = self.clone();
        new.0.push(segment.to_string());
        Ok(new)
    }

    /// Append a relative, slash-separated path (e.g. `jcr:content/metadata`)
    ///
    /// # Errors
    /// Returns error if any segment is invalid
    pub fn join(&self, relative: &str) -> Result<Self, PathError> {
        let mut new = self.clone();
        for seg in relative.split('/') {
            validate_segment(seg)?;
            new.0.push(seg.to_string());
        }
        Ok(new)
    }

    /// Check if this path is an ancestor of another (strict prefix)
    #[inline]
    #[must_use]
    pub fn is_ancestor_of(&self, other: &Self) -> bool {
        self.0.len() < other.0.len() && self.0 == other.0[..self.0.len()]
    }

    /// Ancestors from the first level below root down to the parent
    ///
    /// `/a/b/c` yields `/a`, `/a/b`. Root and the path itself are excluded.
    pub fn ancestors(&self) -> impl Iterator<Item = ContentPath> + '_ {
        (1..self.0.len()).map(move |len| Self(self.0[..len].to_vec()))
    }
}

fn validate_segment(seg: &str) -> Result<(), PathError> {
    if seg.is_empty() {
        Err(PathError::EmptySegment)
    } else if seg == "." || seg == ".." {
        Err(PathError::RelativeSegment(seg.to_string()))
    } else if seg
        .chars()
        .any(|c| !(c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ':' | ' ')))
    {
        Err(PathError::InvalidSegment(seg.to_string()))
    } else {
        Ok(())
    }
}

impl Display for ContentPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("/");
        }
        for seg in &self.0 {
            write!(f, "/{seg}")?;
        }
        Ok(())
    }
}

impl FromStr for ContentPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some(rest) = s.strip_prefix('/') else {
            return Err(PathError::NotAbsolute(s.to_string()));
        };
        if rest.is_empty() {
            return Ok(Self::root());
        }

        let segments: Vec<String> = rest
            .split('/')
            .map(|seg| validate_segment(seg).map(|()| seg.to_string()))
            .collect::<Result<_, _>>()?;

        Ok(Self(segments))
    }
}

impl TryFrom<&str> for ContentPath {
    type Error = PathError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl Default for ContentPath {
    fn default() -> Self {
        Self::root()
    }
}

/// Errors related to content paths
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// Path does not start with `/`
    #[error("path '{0}' is not absolute")]
    NotAbsolute(String),

    /// Empty segment in path (`//` or trailing `/`)
    #[error("path contains empty segment")]
    EmptySegment,

    /// `.` or `..`
    #[error("relative segment '{0}' is not allowed")]
    RelativeSegment(String),

    /// Invalid segment characters
    #[error("invalid segment: {0}")]
    InvalidSegment(String),
}
