//! TokenKind enum and the `Token` value produced by the lexer.

use rbparse_core::text::{Location, TextPos};

/// The kind of a lexical token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum TokenKind {
    // ========================================================================
    // Markers
    // ========================================================================
    Eof = 0,
    /// A required token that was absent; always zero-width.
    Missing,
    /// Bytes the lexer could not make sense of.
    Invalid,

    // ========================================================================
    // Punctuation and operators
    // ========================================================================
    Ampersand,
    AmpersandAmpersand,
    AmpersandAmpersandEqual,
    AmpersandDot,
    AmpersandEqual,
    Backtick,
    Bang,
    BangEqual,
    BangTilde,
    BraceLeft,
    BraceRight,
    BracketLeft,
    /// `[` starting an array literal rather than an index.
    BracketLeftArray,
    /// `[]` as a method name.
    BracketLeftRight,
    /// `[]=` as a method name.
    BracketLeftRightEqual,
    BracketRight,
    Caret,
    CaretEqual,
    Colon,
    ColonColon,
    Comma,
    Dot,
    DotDot,
    DotDotDot,
    Equal,
    EqualEqual,
    EqualEqualEqual,
    EqualGreater,
    EqualTilde,
    Greater,
    GreaterEqual,
    GreaterGreater,
    GreaterGreaterEqual,
    Less,
    LessEqual,
    LessEqualGreater,
    LessLess,
    LessLessEqual,
    Minus,
    MinusEqual,
    MinusGreater,
    Newline,
    ParenthesisLeft,
    /// `(` opening a grouped expression rather than call arguments.
    ParenthesisLeftParentheses,
    ParenthesisRight,
    Percent,
    PercentEqual,
    Pipe,
    PipeEqual,
    PipePipe,
    PipePipeEqual,
    Plus,
    PlusEqual,
    QuestionMark,
    Semicolon,
    Slash,
    SlashEqual,
    Star,
    StarEqual,
    StarStar,
    StarStarEqual,
    Tilde,

    // Prefix forms chosen by the lexer state.
    UAmpersand,
    UColonColon,
    UDotDot,
    UDotDotDot,
    UMinus,
    /// `-` immediately followed by a numeric literal.
    UMinusNum,
    UPlus,
    UStar,
    UStarStar,

    // ========================================================================
    // Names and variables
    // ========================================================================
    Identifier,
    Constant,
    Label,
    InstanceVariable,
    ClassVariable,
    GlobalVariable,
    BackReference,
    NthReference,

    // ========================================================================
    // Literals
    // ========================================================================
    Integer,
    Float,
    RationalNumber,
    ImaginaryNumber,
    CharacterLiteral,
    StringBegin,
    StringContent,
    StringEnd,
    /// Closing quote of a string used as a hash label, `"key":`.
    LabelEnd,
    SymbolBegin,
    RegexpBegin,
    RegexpEnd,
    PercentLowerI,
    PercentUpperI,
    PercentLowerW,
    PercentUpperW,
    PercentLowerX,
    WordsSep,
    HeredocStart,
    HeredocEnd,
    EmbexprBegin,
    EmbexprEnd,
    Embvar,

    // ========================================================================
    // Comments and trivia reported to `lex`
    // ========================================================================
    Comment,
    EmbdocBegin,
    EmbdocLine,
    EmbdocEnd,
    EndData,

    // ========================================================================
    // Keywords
    // ========================================================================
    KeywordAlias,
    KeywordAnd,
    KeywordBegin,
    KeywordBeginUpcase,
    KeywordBreak,
    KeywordCase,
    KeywordClass,
    KeywordDef,
    KeywordDefined,
    KeywordDo,
    KeywordElse,
    KeywordElsif,
    KeywordEnd,
    KeywordEndUpcase,
    KeywordEnsure,
    KeywordFalse,
    KeywordFor,
    KeywordIf,
    KeywordIfModifier,
    KeywordIn,
    KeywordModule,
    KeywordNext,
    KeywordNil,
    KeywordNot,
    KeywordOr,
    KeywordRedo,
    KeywordRescue,
    KeywordRescueModifier,
    KeywordRetry,
    KeywordReturn,
    KeywordSelf,
    KeywordSuper,
    KeywordThen,
    KeywordTrue,
    KeywordUndef,
    KeywordUnless,
    KeywordUnlessModifier,
    KeywordUntil,
    KeywordUntilModifier,
    KeywordWhen,
    KeywordWhile,
    KeywordWhileModifier,
    KeywordYield,
    KeywordEncoding,
    KeywordFile,
    KeywordLine,
}

impl TokenKind {
    /// Map identifier text to its keyword kind, if it is one.
    ///
    /// Modifier forms are not returned here; the lexer picks them from its state.
    pub fn keyword(text: &[u8]) -> Option<TokenKind> {
        Some(match text {
            b"__ENCODING__" => TokenKind::KeywordEncoding,
            b"__LINE__" => TokenKind::KeywordLine,
            b"__FILE__" => TokenKind::KeywordFile,
            b"alias" => TokenKind::KeywordAlias,
            b"and" => TokenKind::KeywordAnd,
            b"begin" => TokenKind::KeywordBegin,
            b"BEGIN" => TokenKind::KeywordBeginUpcase,
            b"break" => TokenKind::KeywordBreak,
            b"case" => TokenKind::KeywordCase,
            b"class" => TokenKind::KeywordClass,
            b"def" => TokenKind::KeywordDef,
            b"defined?" => TokenKind::KeywordDefined,
            b"do" => TokenKind::KeywordDo,
            b"else" => TokenKind::KeywordElse,
            b"elsif" => TokenKind::KeywordElsif,
            b"end" => TokenKind::KeywordEnd,
            b"END" => TokenKind::KeywordEndUpcase,
            b"ensure" => TokenKind::KeywordEnsure,
            b"false" => TokenKind::KeywordFalse,
            b"for" => TokenKind::KeywordFor,
            b"if" => TokenKind::KeywordIf,
            b"in" => TokenKind::KeywordIn,
            b"module" => TokenKind::KeywordModule,
            b"next" => TokenKind::KeywordNext,
            b"nil" => TokenKind::KeywordNil,
            b"not" => TokenKind::KeywordNot,
            b"or" => TokenKind::KeywordOr,
            b"redo" => TokenKind::KeywordRedo,
            b"rescue" => TokenKind::KeywordRescue,
            b"retry" => TokenKind::KeywordRetry,
            b"return" => TokenKind::KeywordReturn,
            b"self" => TokenKind::KeywordSelf,
            b"super" => TokenKind::KeywordSuper,
            b"then" => TokenKind::KeywordThen,
            b"true" => TokenKind::KeywordTrue,
            b"undef" => TokenKind::KeywordUndef,
            b"unless" => TokenKind::KeywordUnless,
            b"until" => TokenKind::KeywordUntil,
            b"when" => TokenKind::KeywordWhen,
            b"while" => TokenKind::KeywordWhile,
            b"yield" => TokenKind::KeywordYield,
            _ => return None,
        })
    }

    /// The modifier form of a keyword, for keywords that have one.
    pub fn modifier_form(self) -> Option<TokenKind> {
        match self {
            TokenKind::KeywordIf => Some(TokenKind::KeywordIfModifier),
            TokenKind::KeywordUnless => Some(TokenKind::KeywordUnlessModifier),
            TokenKind::KeywordWhile => Some(TokenKind::KeywordWhileModifier),
            TokenKind::KeywordUntil => Some(TokenKind::KeywordUntilModifier),
            TokenKind::KeywordRescue => Some(TokenKind::KeywordRescueModifier),
            _ => None,
        }
    }

    /// Whether this is any keyword kind.
    pub fn is_keyword(self) -> bool {
        self >= TokenKind::KeywordAlias
    }

    /// Whether this token is a comment piece that the parser skips.
    pub fn is_comment(self) -> bool {
        matches!(
            self,
            TokenKind::Comment | TokenKind::EmbdocBegin | TokenKind::EmbdocLine | TokenKind::EmbdocEnd
        )
    }

    /// Whether this kind is an assignment operator (`=` and the operator-assign forms).
    pub fn is_assignment(self) -> bool {
        matches!(
            self,
            TokenKind::Equal
                | TokenKind::AmpersandAmpersandEqual
                | TokenKind::AmpersandEqual
                | TokenKind::CaretEqual
                | TokenKind::GreaterGreaterEqual
                | TokenKind::LessLessEqual
                | TokenKind::MinusEqual
                | TokenKind::PercentEqual
                | TokenKind::PipeEqual
                | TokenKind::PipePipeEqual
                | TokenKind::PlusEqual
                | TokenKind::SlashEqual
                | TokenKind::StarEqual
                | TokenKind::StarStarEqual
        )
    }
}

/// A token: its kind and where it sits in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub location: Location,
}

impl Token {
    pub fn new(kind: TokenKind, start: TextPos, end: TextPos) -> Self {
        Self {
            kind,
            location: Location::new(start, end),
        }
    }

    /// A zero-width placeholder for a required token that was not found.
    pub fn missing(pos: TextPos) -> Self {
        Self::new(TokenKind::Missing, pos, pos)
    }

    /// Whether this token is a recovery placeholder.
    pub fn is_missing(&self) -> bool {
        self.kind == TokenKind::Missing
    }

    #[inline]
    pub fn start(&self) -> TextPos {
        self.location.start
    }

    #[inline]
    pub fn end(&self) -> TextPos {
        self.location.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_lookup() {
        assert_eq!(TokenKind::keyword(b"def"), Some(TokenKind::KeywordDef));
        assert_eq!(TokenKind::keyword(b"defined?"), Some(TokenKind::KeywordDefined));
        assert_eq!(TokenKind::keyword(b"BEGIN"), Some(TokenKind::KeywordBeginUpcase));
        assert_eq!(TokenKind::keyword(b"foo"), None);
    }

    #[test]
    fn test_keyword_range() {
        assert!(TokenKind::KeywordAlias.is_keyword());
        assert!(TokenKind::KeywordLine.is_keyword());
        assert!(!TokenKind::EndData.is_keyword());
        assert_eq!(TokenKind::KeywordIf.modifier_form(), Some(TokenKind::KeywordIfModifier));
        assert_eq!(TokenKind::KeywordDo.modifier_form(), None);
    }

    #[test]
    fn test_missing_token() {
        let token = Token::missing(4);
        assert!(token.is_missing());
        assert!(token.location.is_empty());
        assert_eq!(token.start(), 4);
    }
}
