use serde::{Deserialize, Serialize};

use super::protocol::TaskKey;

/// The kind of one path segment, in nesting order.
///
/// `Invalid` is what an unrecognized tag parses to — a corrupt stored path
/// degrades to a no-op navigation instead of an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    Dir,
    Group,
    SubGroup,
    Task,
    Invalid,
}

impl SegmentKind {
    /// The tag used in the slash-delimited path form.
    pub fn tag(self) -> &'static str {
        match self {
            SegmentKind::Dir => "dir",
            SegmentKind::Group => "grp",
            SegmentKind::SubGroup => "subgrp",
            SegmentKind::Task => "task",
            SegmentKind::Invalid => "invalid",
        }
    }

    fn from_tag(tag: &str) -> SegmentKind {
        match tag {
            "dir" => SegmentKind::Dir,
            "grp" => SegmentKind::Group,
            "subgrp" => SegmentKind::SubGroup,
            "task" => SegmentKind::Task,
            _ => SegmentKind::Invalid,
        }
    }
}

/// One `(kind, id)` pair in an address path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub kind: SegmentKind,
    pub id: u32,
}

/// A typed path locating a node in the Dir/Group/SubGroup/Task hierarchy.
///
/// Segments nest in the fixed order Dir → Group → SubGroup → Task; Task
/// segments may repeat to express sub-task nesting. The `user_id` is the
/// root scope, not a segment.
///
/// An `Addr` is never mutated through an alias: extension goes through
/// [`Addr::extended`], which clones first. Multiple views hold "the same"
/// address at different extension depths simultaneously, so copy-on-extend
/// is mandatory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Addr {
    user_id: String,
    segments: Vec<Segment>,
}

impl Addr {
    /// An empty address scoped to one user.
    pub fn new(user_id: impl Into<String>) -> Addr {
        Addr {
            user_id: user_id.into(),
            segments: Vec::new(),
        }
    }

    /// Parse a slash-delimited `tag-id` path (e.g. `dir-1/grp-2/subgrp-3`).
    ///
    /// Unknown tags and malformed ids become `Invalid` segments rather than
    /// errors; check [`Addr::is_valid`] before navigating.
    pub fn parse_path_string(path: &str, user_id: impl Into<String>) -> Addr {
        let mut addr = Addr::new(user_id);
        if path.is_empty() {
            return addr;
        }
        for token in path.split('/') {
            let segment = match token.split_once('-') {
                Some((tag, id)) => {
                    let kind = SegmentKind::from_tag(tag);
                    match id.parse::<u32>() {
                        Ok(id) => Segment { kind, id },
                        Err(_) => Segment {
                            kind: SegmentKind::Invalid,
                            id: 0,
                        },
                    }
                }
                None => Segment {
                    kind: SegmentKind::Invalid,
                    id: 0,
                },
            };
            addr.segments.push(segment);
        }
        addr
    }

    /// Serialize to the slash-delimited `tag-id` form. Round-trips with
    /// [`Addr::parse_path_string`] for valid addresses.
    pub fn to_path_string(&self) -> String {
        self.segments
            .iter()
            .map(|s| format!("{}-{}", s.kind.tag(), s.id))
            .collect::<Vec<_>>()
            .join("/")
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segment(&self, index: usize) -> Option<Segment> {
        self.segments.get(index).copied()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn last_segment(&self) -> Option<Segment> {
        self.segments.last().copied()
    }

    /// The segment directly above the last one (the enclosing container).
    pub fn parent_segment(&self) -> Option<Segment> {
        let n = self.segments.len();
        if n < 2 {
            return None;
        }
        self.segments.get(n - 2).copied()
    }

    /// True if every segment parsed cleanly and the nesting order holds.
    pub fn is_valid(&self) -> bool {
        let mut prev: Option<SegmentKind> = None;
        for seg in &self.segments {
            if seg.kind == SegmentKind::Invalid || !can_follow(prev, seg.kind) {
                return false;
            }
            prev = Some(seg.kind);
        }
        true
    }

    /// Whether a segment of `kind` may legally be appended.
    pub fn can_extend(&self, kind: SegmentKind) -> bool {
        can_follow(self.last_segment().map(|s| s.kind), kind)
    }

    /// Return a new address with one more segment appended.
    ///
    /// Panics if `kind` violates the nesting invariant — that is a programmer
    /// error, not a recoverable condition.
    #[must_use]
    pub fn extended(&self, kind: SegmentKind, id: u32) -> Addr {
        assert!(
            self.can_extend(kind),
            "segment {:?} cannot follow {:?}",
            kind,
            self.last_segment().map(|s| s.kind),
        );
        let mut next = self.clone();
        next.segments.push(Segment { kind, id });
        next
    }

    /// Scan from the tail for the last segment of the given kind.
    ///
    /// Recovers "the enclosing Dir ID" etc. regardless of how many Task
    /// segments are stacked on top.
    pub fn last_of_kind(&self, kind: SegmentKind) -> Option<u32> {
        self.segments
            .iter()
            .rev()
            .find(|s| s.kind == kind)
            .map(|s| s.id)
    }

    pub fn last_dir_id(&self) -> u32 {
        self.last_of_kind(SegmentKind::Dir).unwrap_or(0)
    }

    pub fn last_group_id(&self) -> u32 {
        self.last_of_kind(SegmentKind::Group).unwrap_or(0)
    }

    pub fn last_sub_group_id(&self) -> u32 {
        self.last_of_kind(SegmentKind::SubGroup).unwrap_or(0)
    }

    pub fn last_task_id(&self) -> u32 {
        self.last_of_kind(SegmentKind::Task).unwrap_or(0)
    }

    /// The full remote-call key for this address (missing levels are 0).
    pub fn key(&self) -> TaskKey {
        TaskKey {
            dir_id: self.last_dir_id(),
            group_id: self.last_group_id(),
            sub_group_id: self.last_sub_group_id(),
            task_id: self.last_task_id(),
        }
    }
}

/// Nesting rule: Dir* → Group → SubGroup → Task*.
fn can_follow(prev: Option<SegmentKind>, next: SegmentKind) -> bool {
    match (prev, next) {
        (None, SegmentKind::Dir) => true,
        (Some(SegmentKind::Dir), SegmentKind::Dir | SegmentKind::Group) => true,
        (Some(SegmentKind::Group), SegmentKind::SubGroup) => true,
        (Some(SegmentKind::SubGroup), SegmentKind::Task) => true,
        (Some(SegmentKind::Task), SegmentKind::Task) => true,
        _ => false,
    }
}
