//! Domain types produced by the pipeline.

use std::fmt;
use std::str::FromStr;

use tree_patch_node::Node;

use crate::error::{InvalidSegment, UnknownOp};

// ── Op ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Add,
    Remove,
    Replace,
    Move,
    Copy,
    Test,
}

impl Op {
    pub const ALL: [Op; 6] = [Op::Add, Op::Remove, Op::Replace, Op::Move, Op::Copy, Op::Test];

    pub fn as_str(self) -> &'static str {
        match self {
            Op::Add => "add",
            Op::Remove => "remove",
            Op::Replace => "replace",
            Op::Move => "move",
            Op::Copy => "copy",
            Op::Test => "test",
        }
    }

    /// Ops that read a `value` operand.
    pub fn takes_value(self) -> bool {
        matches!(self, Op::Add | Op::Replace | Op::Test)
    }

    /// Ops that read a `from` operand.
    pub fn takes_from(self) -> bool {
        matches!(self, Op::Move | Op::Copy)
    }
}

impl FromStr for Op {
    type Err = UnknownOp;

    fn from_str(s: &str) -> Result<Self, UnknownOp> {
        Op::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| UnknownOp(s.to_string()))
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Path ──────────────────────────────────────────────────────────────────

/// A location in a tree, as ordered segments. No segments is the root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path(Vec<String>);

impl Path {
    pub fn root() -> Self {
        Self::default()
    }

    /// Split a slash-delimited string. Empty segments are dropped, so `""`,
    /// `"/"` and `"//"` all denote the root and `"/a//b"` is `["a", "b"]`.
    /// Segments are taken verbatim; there is no escape syntax.
    pub fn parse(s: &str) -> Self {
        Self(
            s.split('/')
                .filter(|segment| !segment.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// The enclosing location; `None` for the root.
    pub fn parent(&self) -> Option<Path> {
        let (_, parent) = self.0.split_last()?;
        Some(Path(parent.to_vec()))
    }

    pub fn join(&self, segment: impl Into<String>) -> Path {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        Path(segments)
    }

    /// The slash-delimited wire form. Unlike `Display`, this refuses paths
    /// that [`parse`](Self::parse) would read back differently.
    pub fn to_wire_string(&self) -> Result<String, InvalidSegment> {
        match self
            .0
            .iter()
            .position(|segment| segment.is_empty() || segment.contains('/'))
        {
            Some(position) => Err(InvalidSegment {
                position,
                segment: self.0[position].clone(),
            }),
            None => Ok(self.to_string()),
        }
    }

    /// True if `self` is `other` or lies beneath it.
    pub fn starts_with(&self, other: &Path) -> bool {
        self.0.starts_with(&other.0)
    }
}

/// Segments are written verbatim; see [`Path::to_wire_string`] for the
/// checked form.
impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.0 {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

impl From<Vec<String>> for Path {
    fn from(segments: Vec<String>) -> Self {
        Self(segments)
    }
}

impl<S: Into<String>> FromIterator<S> for Path {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

// ── Operation ─────────────────────────────────────────────────────────────

/// One addressed edit. `value` and `from` are independent of `op`.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub op: Op,
    pub path: Path,
    pub value: Option<Node>,
    pub from: Option<Path>,
}

impl Operation {
    pub fn new(op: Op, path: Path) -> Self {
        Self {
            op,
            path,
            value: None,
            from: None,
        }
    }

    pub fn with_value(mut self, value: impl Into<Node>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_from(mut self, from: Path) -> Self {
        self.from = Some(from);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn op_parses_only_the_six_tags() {
        for op in Op::ALL {
            assert_eq!(op.as_str().parse::<Op>(), Ok(op));
        }
        assert_eq!("Add".parse::<Op>(), Err(UnknownOp("Add".into())));
        assert_eq!("merge".parse::<Op>(), Err(UnknownOp("merge".into())));
    }

    #[test]
    fn path_parsing() {
        assert_eq!(Path::parse("/a/b/0").segments(), ["a", "b", "0"]);
        assert!(Path::parse("").is_root());
        assert!(Path::parse("/").is_root());
        assert_eq!(Path::parse("/a//b/"), Path::from_iter(["a", "b"]));
        assert_eq!(Path::parse("a/b"), Path::from_iter(["a", "b"]));
        assert_eq!(Path::parse("/a~1b").segments(), ["a~1b"]);
    }

    #[test]
    fn path_display_round_trips() {
        assert_eq!(Path::root().to_string(), "");
        let p = Path::parse("/x/1");
        assert_eq!(p.to_string(), "/x/1");
        assert_eq!(Path::parse(&p.to_string()), p);
    }

    #[test]
    fn unwritable_segments_are_refused() {
        assert_eq!(Path::parse("/a/b").to_wire_string(), Ok("/a/b".to_string()));
        assert_eq!(Path::root().to_wire_string(), Ok(String::new()));
        assert_eq!(
            Path::from_iter(["a/b"]).to_wire_string(),
            Err(InvalidSegment {
                position: 0,
                segment: "a/b".into()
            })
        );
        assert_eq!(
            Path::parse("/a").join("").to_wire_string(),
            Err(InvalidSegment {
                position: 1,
                segment: String::new()
            })
        );
    }

    #[test]
    fn parent_and_join() {
        let p = Path::parse("/a/b");
        assert_eq!(p.parent(), Some(Path::parse("/a")));
        assert_eq!(Path::root().parent(), None);
        assert_eq!(Path::parse("/a").join("b"), p);
        assert_eq!(p.last(), Some("b"));
        assert!(p.starts_with(&Path::parse("/a")));
        assert!(!Path::parse("/a").starts_with(&p));
    }

    #[test]
    fn operation_builders() {
        let op = Operation::new(Op::Move, Path::parse("/b")).with_from(Path::parse("/a"));
        assert_eq!(op.from, Some(Path::parse("/a")));
        assert_eq!(op.value, None);
        let op = Operation::new(Op::Add, Path::root()).with_value("x");
        assert_eq!(op.value, Some(Node::from("x")));
    }
}
