use std::fmt;
use std::str::FromStr;

use snafu::prelude::*;

const SEPARATOR: char = '.';
const ESCAPE: char = '\\';

/// Address of a node in a [`DirectoryTree`](super::DirectoryTree).
///
/// The string form joins segments with `.`. Segments that contain a dot
/// themselves (file names such as `index.js`) escape it as `\.`, and a
/// literal backslash is written `\\`.
///
/// Every unescaped dot separates segments, so `backend.server.js` is the
/// three segment path `backend`, `server`, `js`. Write `backend.server\.js`
/// or build the path with [`TreePath::from_segments`] to address the file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TreePath {
    segments: Vec<String>,
}

impl TreePath {
    pub fn from_segments<I, S>(segments: I) -> Result<Self, PathError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments = segments.into_iter().map(Into::into).collect::<Vec<_>>();
        ensure!(!segments.is_empty(), EmptyPathSnafu);
        for segment in &segments {
            validate_segment(segment)?;
        }
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Last segment, the name of the addressed node.
    pub fn name(&self) -> &str {
        // Construction guarantees at least one segment.
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    /// Segments leading to the parent folder, empty for top-level entries.
    pub fn parent_segments(&self) -> &[String] {
        &self.segments[..self.segments.len() - 1]
    }

    pub fn parent(&self) -> Option<TreePath> {
        let parent = self.parent_segments();
        if parent.is_empty() {
            None
        } else {
            Some(Self {
                segments: parent.to_vec(),
            })
        }
    }

    /// Path of a direct child of this path.
    pub fn join(&self, name: impl Into<String>) -> Result<TreePath, PathError> {
        let name = name.into();
        validate_segment(&name)?;
        let mut segments = self.segments.clone();
        segments.push(name);
        Ok(Self { segments })
    }

    /// Path of a sibling, i.e. this path with the last segment replaced.
    pub fn with_name(&self, name: impl Into<String>) -> Result<TreePath, PathError> {
        let name = name.into();
        validate_segment(&name)?;
        let mut segments = self.parent_segments().to_vec();
        segments.push(name);
        Ok(Self { segments })
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }
}

impl FromStr for TreePath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ensure!(!s.is_empty(), EmptyPathSnafu);

        let mut segments = Vec::new();
        let mut current = String::new();
        let mut chars = s.chars();
        while let Some(c) = chars.next() {
            match c {
                ESCAPE => match chars.next() {
                    Some(escaped @ (SEPARATOR | ESCAPE)) => current.push(escaped),
                    _ => return InvalidEscapeSnafu { path: s }.fail(),
                },
                SEPARATOR => segments.push(std::mem::take(&mut current)),
                other => current.push(other),
            }
        }
        segments.push(current);

        Self::from_segments(segments)
    }
}

impl TryFrom<&str> for TreePath {
    type Error = PathError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for TreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "{SEPARATOR}")?;
            }
            for c in segment.chars() {
                if c == SEPARATOR || c == ESCAPE {
                    write!(f, "{ESCAPE}")?;
                }
                write!(f, "{c}")?;
            }
        }
        Ok(())
    }
}

/// Checks that `segment` can be used as an entry name.
pub fn validate_segment(segment: &str) -> Result<(), PathError> {
    ensure!(
        !segment.trim().is_empty(),
        InvalidSegmentSnafu {
            segment,
            reason: "name is empty",
        }
    );
    ensure!(
        !segment.contains('/'),
        InvalidSegmentSnafu {
            segment,
            reason: "name contains '/'",
        }
    );
    ensure!(
        !segment.chars().any(char::is_control),
        InvalidSegmentSnafu {
            segment,
            reason: "name contains control characters",
        }
    );
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum PathError {
    #[snafu(display("Path is empty"))]
    EmptyPath,
    #[snafu(display("Invalid path segment '{}': {}", segment, reason))]
    InvalidSegment { segment: String, reason: String },
    #[snafu(display("Path '{}' contains an invalid escape sequence", path))]
    InvalidEscape { path: String },
}
