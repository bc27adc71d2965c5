//! Field path representation for locating values inside a form's value tree.
//!
//! This module provides [`FieldPath`] and [`PathSegment`]. Paths render in the
//! dotted form used as error-map keys by form renderers: `address.zipCode`,
//! `skills.2`, `contacts.0.phone`.

use std::convert::Infallible;
use std::fmt::{self, Display};
use std::str::FromStr;

/// A segment of a field path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathSegment {
    /// A named field of an object (e.g. `address`, `zipCode`)
    Field(String),
    /// A position inside an array field (e.g. the `2` in `skills.2`)
    Index(usize),
}

impl PathSegment {
    pub fn field(name: impl Into<String>) -> Self {
        PathSegment::Field(name.into())
    }

    pub fn index(position: usize) -> Self {
        PathSegment::Index(position)
    }

    /// The field name, or `None` for an index.
    pub fn as_field(&self) -> Option<&str> {
        match self {
            PathSegment::Field(name) => Some(name),
            PathSegment::Index(_) => None,
        }
    }
}

/// A path to a value in a form's value tree.
///
/// Paths are immutable: the `push_*` methods return new paths so a parent
/// path can be shared between sibling fields.
///
/// An array's own path (`skills`) and the paths of its elements (`skills.0`)
/// are different values, so array-level and element-level errors never share
/// a key.
///
/// # Example
///
/// ```rust
/// use formcheck::FieldPath;
///
/// let path = FieldPath::root()
///     .push_field("contacts")
///     .push_index(0)
///     .push_field("phone");
///
/// assert_eq!(path.to_string(), "contacts.0.phone");
/// assert_eq!("contacts.0.phone".parse::<FieldPath>().unwrap(), path);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct FieldPath {
    segments: Vec<PathSegment>,
}

impl FieldPath {
    /// The path of the whole form value.
    pub fn root() -> Self {
        Self::default()
    }

    /// A one-segment path naming a top-level field.
    pub fn from_field(name: impl Into<String>) -> Self {
        Self::root().with(PathSegment::field(name))
    }

    /// A one-segment path naming a position of a top-level list.
    pub fn from_index(position: usize) -> Self {
        Self::root().with(PathSegment::index(position))
    }

    fn with(&self, segment: PathSegment) -> Self {
        let mut next = self.clone();
        next.segments.push(segment);
        next
    }

    /// Parses a dotted path. Segments made only of ASCII digits become
    /// index segments; empty segments are ignored.
    ///
    /// Parsing cannot tell an object field named `"1"` from list position 1,
    /// so paths through such fields must be built with [`FieldPath::push_field`]
    /// or [`FieldPath::from_field`].
    ///
    /// ```rust
    /// use formcheck::{FieldPath, PathSegment};
    ///
    /// assert_eq!(FieldPath::parse("1").last(), Some(&PathSegment::index(1)));
    /// assert_eq!(FieldPath::from_field("1").last(), Some(&PathSegment::field("1")));
    /// ```
    pub fn parse(input: &str) -> Self {
        let segments = input
            .split('.')
            .filter(|s| !s.is_empty())
            .map(|s| {
                if s.bytes().all(|b| b.is_ascii_digit()) {
                    match s.parse::<usize>() {
                        Ok(idx) => PathSegment::Index(idx),
                        Err(_) => PathSegment::Field(s.to_string()),
                    }
                } else {
                    PathSegment::Field(s.to_string())
                }
            })
            .collect();
        Self { segments }
    }

    /// The path of field `name` inside the value at this path.
    pub fn push_field(&self, name: impl Into<String>) -> Self {
        self.with(PathSegment::field(name))
    }

    /// The path of list element `position` inside the value at this path.
    pub fn push_index(&self, position: usize) -> Self {
        self.with(PathSegment::index(position))
    }

    /// Resolves `relative` against this path, e.g. a refinement target
    /// against the object it is declared on.
    pub fn join(&self, relative: &FieldPath) -> Self {
        let mut joined = self.clone();
        joined.segments.extend_from_slice(&relative.segments);
        joined
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.is_root()
    }

    pub fn segments(&self) -> impl Iterator<Item = &PathSegment> {
        self.segments.iter()
    }

    /// The enclosing path; `None` at the root.
    pub fn parent(&self) -> Option<Self> {
        let (_, init) = self.segments.split_last()?;
        Some(Self {
            segments: init.to_vec(),
        })
    }

    pub fn last(&self) -> Option<&PathSegment> {
        self.segments.last()
    }

    /// Returns the name of the leading field segment.
    ///
    /// For `address.zipCode` this is `address`; used to decide which
    /// top-level field of a form an error belongs to.
    pub fn first_field(&self) -> Option<&str> {
        self.segments.first().and_then(PathSegment::as_field)
    }

    /// Returns true if `prefix` is a leading run of this path's segments.
    pub fn starts_with(&self, prefix: &FieldPath) -> bool {
        self.segments.starts_with(&prefix.segments)
    }

    /// Returns the path that remains after stripping `prefix`, or `None`
    /// when `prefix` does not lead this path.
    pub fn strip_prefix(&self, prefix: &FieldPath) -> Option<Self> {
        if self.starts_with(prefix) {
            Some(Self {
                segments: self.segments[prefix.segments.len()..].to_vec(),
            })
        } else {
            None
        }
    }
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut separator = "";
        for segment in &self.segments {
            f.write_str(separator)?;
            match segment {
                PathSegment::Field(name) => f.write_str(name)?,
                PathSegment::Index(position) => write!(f, "{position}")?,
            }
            separator = ".";
        }
        Ok(())
    }
}

impl FromStr for FieldPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for FieldPath {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}
