//! Comments recorded alongside the tree.

use rbparse_core::text::Location;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommentKind {
    /// `# ...` up to, not including, the newline.
    Inline,
    /// `=begin` ... `=end`, inclusive of both marker lines.
    EmbeddedDocument,
    /// `__END__` and everything after it.
    TrailingDataMarker,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Comment {
    pub kind: CommentKind,
    pub location: Location,
}

impl Comment {
    pub fn new(kind: CommentKind, location: Location) -> Self {
        Self { kind, location }
    }
}
