//! Computing node locations from their parts.
//!
//! A node spans from the start of its first present part to the end of its
//! last present part. Builders list the candidates for each side in order of
//! preference; absent optional parts and empty lists are skipped.
//!
//! A heredoc body lies on the lines after its opener, so a node holding a
//! heredoc can end before the heredoc does. [`Node::covering_children`]
//! stretches a node over its children once they are final.

use crate::field::FieldVisitor;
use crate::node::Node;
use crate::token::Token;
use rbparse_core::text::{Location, TextPos};

/// Something that may contribute a boundary to a node's location.
pub trait Bound {
    fn bounds(&self) -> Option<Location>;
}

impl Bound for Token {
    fn bounds(&self) -> Option<Location> {
        Some(self.location)
    }
}

impl Bound for Option<Token> {
    fn bounds(&self) -> Option<Location> {
        self.map(|token| token.location)
    }
}

impl<'a> Bound for &'a Node<'a> {
    fn bounds(&self) -> Option<Location> {
        Some(self.location())
    }
}

impl<'a> Bound for Option<&'a Node<'a>> {
    fn bounds(&self) -> Option<Location> {
        self.map(|node| node.location())
    }
}

impl<'a> Bound for &'a [Node<'a>] {
    fn bounds(&self) -> Option<Location> {
        let first = self.first()?;
        let last = self.last()?;
        Some(first.location().join(&last.location()))
    }
}

impl<'a> Bound for &'a [Token] {
    fn bounds(&self) -> Option<Location> {
        let first = self.first()?;
        let last = self.last()?;
        Some(first.location.join(&last.location))
    }
}

impl Bound for Location {
    fn bounds(&self) -> Option<Location> {
        Some(*self)
    }
}

impl Bound for Option<Location> {
    fn bounds(&self) -> Option<Location> {
        *self
    }
}

/// Span from the first present start candidate to the first present end
/// candidate. `ends` is ordered last part first.
///
/// An end before the start collapses to the start. When nothing is present
/// the result is an empty location at 0.
pub fn span(starts: &[&dyn Bound], ends: &[&dyn Bound]) -> Location {
    let start = starts.iter().find_map(|bound| bound.bounds()).map(|loc| loc.start);
    let end = ends.iter().find_map(|bound| bound.bounds()).map(|loc| loc.end);
    match (start, end) {
        (Some(start), Some(end)) => Location::new(start, end.max(start)),
        (Some(start), None) => {
            let end = starts
                .iter()
                .find_map(|bound| bound.bounds())
                .map_or(start, |loc| loc.end);
            Location::new(start, end)
        }
        (None, Some(end)) => {
            let start = ends
                .iter()
                .find_map(|bound| bound.bounds())
                .map_or(end, |loc| loc.start);
            Location::new(start, end)
        }
        (None, None) => Location::empty(0),
    }
}

/// The span covering both `left` and `right`.
#[inline]
pub fn between(left: impl Bound, right: impl Bound) -> Location {
    span(&[&left, &right], &[&right, &left])
}

/// A zero-width location at `pos`.
#[inline]
pub fn at(pos: TextPos) -> Location {
    Location::empty(pos)
}

struct Cover(Location);

impl<'a> FieldVisitor<'a> for Cover {
    fn visit_node(&mut self, node: &'a Node<'a>) {
        self.0 = self.0.join(&node.location());
    }
}

impl<'a> Node<'a> {
    /// This node with its location widened to include every direct child.
    pub fn covering_children(mut self) -> Node<'a> {
        let mut cover = Cover(self.location());
        self.for_each_field(&mut cover);
        *self.location_mut() = cover.0;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenKind;

    #[test]
    fn test_span_skips_absent_parts() {
        let keyword = Token::new(TokenKind::KeywordReturn, 0, 6);
        let value = Node::Integer { location: Location::new(7, 8) };
        let absent: Option<&Node> = None;
        let loc = span(&[&keyword], &[&absent, &&value, &keyword]);
        assert_eq!(loc, Location::new(0, 8));

        let loc = span(&[&keyword], &[&absent, &keyword]);
        assert_eq!(loc, Location::new(0, 6));
    }

    #[test]
    fn test_span_empty_lists() {
        let empty: &[Node] = &[];
        let closing = Token::new(TokenKind::BracketRight, 1, 2);
        let opening = Token::new(TokenKind::BracketLeftArray, 0, 1);
        assert_eq!(span(&[&opening, &empty], &[&closing, &empty]), Location::new(0, 2));
        assert_eq!(span(&[&empty], &[&empty]), Location::empty(0));
    }

    #[test]
    fn test_covering_children_reaches_later_lines() {
        let body = Node::Integer { location: Location::new(10, 12) };
        let list = [body];
        let arguments = Node::Arguments {
            location: Location::new(4, 8),
            arguments: &list,
        };
        assert_eq!(arguments.covering_children().location(), Location::new(4, 12));

        let inside = Node::Arguments {
            location: Location::new(0, 20),
            arguments: &list,
        };
        assert_eq!(inside.covering_children().location(), Location::new(0, 20));
    }

    #[test]
    fn test_span_clamps_inverted_end() {
        let first = Token::new(TokenKind::Identifier, 5, 8);
        let missing = Token::missing(3);
        assert_eq!(span(&[&first], &[&missing]), Location::new(5, 5));
        assert_eq!(between(first, Token::new(TokenKind::Integer, 9, 10)), Location::new(5, 10));
    }
}
