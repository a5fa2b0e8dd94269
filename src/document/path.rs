//! Key paths into a document's data tree.
//!
//! A [`KeyPath`] is an ordered list of [`Segment`]s: map keys and sequence
//! indices. Paths can be built in code or parsed from their text form.
//!
//! # Syntax
//!
//! - `spec.replicas` - dot-separated map keys
//! - `spec.containers[0].image` - bracketed sequence index
//! - `spec.containers.0.image` - an all-digit dotted segment is also an index
//! - `metadata.annotations['example.com/owner']` - quoted key containing dots
//! - `data['it\'s']` - inside quotes, `\'` is a quote and `\\` a backslash
//!
//! ```
//! use bundlequill::document::path::{KeyPath, Segment};
//!
//! let path = KeyPath::parse("spec.containers[0].image").unwrap();
//! assert_eq!(path.segments()[2], Segment::Index(0));
//! assert_eq!(path.to_string(), "spec.containers[0].image");
//! ```

use std::fmt;
use std::str::FromStr;

use super::error::DocumentError;

/// One step of a key path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Map lookup
    Key(String),
    /// Sequence position (0-based)
    Index(usize),
}

impl From<&str> for Segment {
    fn from(key: &str) -> Self {
        Segment::Key(key.to_string())
    }
}

impl From<String> for Segment {
    fn from(key: String) -> Self {
        Segment::Key(key)
    }
}

impl From<usize> for Segment {
    fn from(index: usize) -> Self {
        Segment::Index(index)
    }
}

/// An ordered sequence of segments navigating nested maps and sequences.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct KeyPath {
    segments: Vec<Segment>,
}

impl KeyPath {
    /// Creates a path from the given segments.
    pub fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    /// The empty path, addressing the root of the data tree.
    pub fn root() -> Self {
        Self::default()
    }

    /// Parses the textual form of a path.
    pub fn parse(path: &str) -> Result<Self, DocumentError> {
        PathParser::new(path).parse()
    }

    /// The segments, root first.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns true for the root path.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns a new path with `segment` appended.
    pub fn child(&self, segment: impl Into<Segment>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self { segments }
    }
}

impl<S: Into<Segment>> FromIterator<S> for KeyPath {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect())
    }
}

impl FromStr for KeyPath {
    type Err = DocumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KeyPath::parse(s)
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Index(index) => write!(f, "[{}]", index)?,
                Segment::Key(key) if needs_quoting(key) => {
                    write!(f, "['{}']", key.replace('\\', "\\\\").replace('\'', "\\'"))?
                }
                Segment::Key(key) => {
                    if position > 0 {
                        write!(f, ".")?;
                    }
                    write!(f, "{}", key)?;
                }
            }
        }
        Ok(())
    }
}

fn needs_quoting(key: &str) -> bool {
    key.is_empty()
        || key.chars().all(|c| c.is_ascii_digit())
        || key.contains(['.', '[', ']', '\''])
}

/// Character-level parser for the textual path form.
struct PathParser<'a> {
    input: &'a str,
    position: usize,
}

impl<'a> PathParser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, position: 0 }
    }

    fn parse(&mut self) -> Result<KeyPath, DocumentError> {
        let mut segments = Vec::new();

        if self.input.trim().is_empty() {
            return Ok(KeyPath::root());
        }

        // A path may not start with a dot, but may start with a bracket
        if self.peek() != Some('[') {
            segments.push(self.parse_dotted()?);
        }

        while let Some(ch) = self.peek() {
            match ch {
                '.' => {
                    self.next();
                    segments.push(self.parse_dotted()?);
                }
                '[' => segments.push(self.parse_bracket()?),
                other => {
                    return Err(self.error(format!(
                        "unexpected '{}' at position {}",
                        other, self.position
                    )))
                }
            }
        }

        Ok(KeyPath::new(segments))
    }

    fn peek(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    fn next(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.position += ch.len_utf8();
        Some(ch)
    }

    fn error(&self, message: impl Into<String>) -> DocumentError {
        DocumentError::InvalidKeyPath {
            path: self.input.to_string(),
            message: message.into(),
        }
    }

    /// Parses a bare segment up to the next `.` or `[`.
    fn parse_dotted(&mut self) -> Result<Segment, DocumentError> {
        let start = self.position;
        while let Some(ch) = self.peek() {
            if ch == '.' || ch == '[' {
                break;
            }
            if ch == ']' || ch == '\'' {
                return Err(self.error(format!(
                    "unexpected '{}' at position {}",
                    ch, self.position
                )));
            }
            self.next();
        }

        let raw = &self.input[start..self.position];
        if raw.is_empty() {
            return Err(self.error(format!("empty segment at position {}", start)));
        }
        if raw.chars().all(|c| c.is_ascii_digit()) {
            return raw
                .parse()
                .map(Segment::Index)
                .map_err(|_| self.error(format!("index {} is too large", raw)));
        }
        Ok(Segment::Key(raw.to_string()))
    }

    /// Parses `[n]` or `['key']`.
    fn parse_bracket(&mut self) -> Result<Segment, DocumentError> {
        self.next(); // '['
        let segment = if self.peek() == Some('\'') {
            self.next();
            let mut key = String::new();
            loop {
                match self.next() {
                    Some('\'') => break,
                    Some('\\') => match self.next() {
                        Some(escaped) => key.push(escaped),
                        None => return Err(self.error("unterminated quoted key")),
                    },
                    Some(ch) => key.push(ch),
                    None => return Err(self.error("unterminated quoted key")),
                }
            }
            Segment::Key(key)
        } else {
            let start = self.position;
            while let Some(ch) = self.peek() {
                if !ch.is_ascii_digit() {
                    break;
                }
                self.next();
            }
            let digits = &self.input[start..self.position];
            if digits.is_empty() {
                return Err(self.error(format!("expected index at position {}", start)));
            }
            let index = digits
                .parse()
                .map_err(|_| self.error(format!("index {} is too large", digits)))?;
            Segment::Index(index)
        };

        match self.next() {
            Some(']') => Ok(segment),
            Some(ch) => Err(self.error(format!(
                "expected ']' but found '{}' at position {}",
                ch,
                self.position - ch.len_utf8()
            ))),
            None => Err(self.error("expected ']' but reached end of path")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dotted_keys() {
        let path = KeyPath::parse("spec.replicas").unwrap();
        assert_eq!(
            path.segments(),
            &[Segment::from("spec"), Segment::from("replicas")]
        );
    }

    #[test]
    fn test_parse_bracket_index() {
        let path = KeyPath::parse("spec.containers[1].image").unwrap();
        assert_eq!(
            path.segments(),
            &[
                Segment::from("spec"),
                Segment::from("containers"),
                Segment::Index(1),
                Segment::from("image"),
            ]
        );
    }

    #[test]
    fn test_parse_numeric_dotted_segment_is_index() {
        let path = KeyPath::parse("items.0.name").unwrap();
        assert_eq!(path.segments()[1], Segment::Index(0));
    }

    #[test]
    fn test_parse_quoted_key() {
        let path = KeyPath::parse("metadata.annotations['example.com/owner']").unwrap();
        assert_eq!(path.len(), 3);
        assert_eq!(path.segments()[2], Segment::from("example.com/owner"));
    }

    #[test]
    fn test_parse_leading_bracket() {
        let path = KeyPath::parse("[2].name").unwrap();
        assert_eq!(path.segments(), &[Segment::Index(2), Segment::from("name")]);
    }

    #[test]
    fn test_parse_empty_is_root() {
        assert!(KeyPath::parse("").unwrap().is_empty());
        assert_eq!(KeyPath::root().to_string(), "");
    }

    #[test]
    fn test_parse_errors() {
        for bad in ["spec..replicas", ".spec", "spec.", "a[", "a[x]", "a['b", "a[0", "a]b"] {
            match KeyPath::parse(bad) {
                Err(DocumentError::InvalidKeyPath { path, .. }) => assert_eq!(path, bad),
                other => panic!("Expected InvalidKeyPath for {:?}, got {:?}", bad, other),
            }
        }
    }

    #[test]
    fn test_display_round_trips_text_form() {
        for text in [
            "spec.replicas",
            "spec.containers[0].image",
            "metadata.annotations['example.com/owner']",
            "[3]",
        ] {
            assert_eq!(KeyPath::parse(text).unwrap().to_string(), text);
        }
    }

    #[test]
    fn test_quoted_key_escapes_round_trip() {
        let path: KeyPath = vec![Segment::from("data"), Segment::from("it's.x\\y")]
            .into_iter()
            .collect();
        let text = path.to_string();
        assert_eq!(text, r"data['it\'s.x\\y']");
        assert_eq!(KeyPath::parse(&text).unwrap(), path);
    }

    #[test]
    fn test_parse_escaped_quote() {
        let path = KeyPath::parse(r"a['b\'c']").unwrap();
        assert_eq!(path.segments()[1], Segment::from("b'c"));
        assert!(KeyPath::parse(r"a['b\").is_err());
    }

    #[test]
    fn test_display_quotes_numeric_keys() {
        let path: KeyPath = vec![Segment::from("data"), Segment::from("42")].into_iter().collect();
        assert_eq!(path.to_string(), "data['42']");
    }

    #[test]
    fn test_child_does_not_modify_parent() {
        let parent = KeyPath::parse("spec").unwrap();
        let child = parent.child("replicas");
        assert_eq!(parent.to_string(), "spec");
        assert_eq!(child.to_string(), "spec.replicas");
    }
}
