//! Lexer state: what the previous token allows to come next.
//!
//! The state decides between readings of ambiguous bytes, such as `/`
//! opening a regular expression or dividing, or `[` opening an array
//! literal or indexing.

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct LexState: u32 {
        /// Start of an expression.
        const BEG       = 1 << 0;
        /// End of an expression.
        const END       = 1 << 1;
        /// Closing parenthesis of a command argument.
        const ENDARG    = 1 << 2;
        /// End of a method definition name or lambda parameters.
        const ENDFN     = 1 << 3;
        /// After a method name, before its arguments.
        const ARG       = 1 << 4;
        /// After a command name at the start of a statement.
        const CMDARG    = 1 << 5;
        /// After `return`, `break`, `next` or `rescue`.
        const MID       = 1 << 6;
        /// Expecting a method name, after `def`, `alias`, `undef` or `:`.
        const FNAME     = 1 << 7;
        /// After `.`, `&.` or `::`.
        const DOT       = 1 << 8;
        /// After `class`, where `<<` opens a singleton class.
        const CLASS     = 1 << 9;
        /// A label such as `key:` may come next.
        const LABEL     = 1 << 10;
        /// A label was just lexed.
        const LABELED   = 1 << 11;
        /// After `alias`/`undef` names.
        const FITEM     = 1 << 12;
    }
}

impl LexState {
    /// Whether the next token starts an expression.
    #[inline]
    pub fn is_beg(self) -> bool {
        self.intersects(LexState::BEG | LexState::MID | LexState::CLASS)
            || self.contains(LexState::LABELED) && !self.intersects(LexState::END)
    }

    #[inline]
    pub fn is_arg(self) -> bool {
        self.intersects(LexState::ARG | LexState::CMDARG)
    }

    #[inline]
    pub fn is_end(self) -> bool {
        self.intersects(LexState::END | LexState::ENDARG | LexState::ENDFN)
    }

    /// Whether a method-name position, where operators and keywords lex as names.
    #[inline]
    pub fn is_fname(self) -> bool {
        self.intersects(LexState::FNAME | LexState::DOT)
    }

    /// Whether a following newline is insignificant.
    #[inline]
    pub fn ignores_newline(self) -> bool {
        self.intersects(LexState::BEG | LexState::CLASS | LexState::FNAME | LexState::DOT)
            || self.contains(LexState::LABELED)
    }

    /// Whether a keyword like `if` keeps its statement form rather than
    /// becoming a modifier.
    #[inline]
    pub fn allows_statement_keyword(self) -> bool {
        self.intersects(LexState::BEG | LexState::LABELED | LexState::CLASS)
    }

    /// Whether `ident:` may lex as a label.
    #[inline]
    pub fn allows_label(self) -> bool {
        (self.intersects(LexState::LABEL | LexState::ENDFN) || self.is_arg())
            && !self.intersects(LexState::DOT | LexState::FNAME)
    }
}
