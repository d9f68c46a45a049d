//! The lex-mode stack.
//!
//! Lexical context is data: entering a literal pushes a mode, reaching its
//! terminator pops it. `#{` inside an interpolating literal pushes
//! `Embexpr`, so the enclosing literal resumes when the matching `}` pops.

/// How a heredoc body's indentation is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeredocIndent {
    /// `<<ID`: the terminator must start the line.
    Plain,
    /// `<<-ID`: the terminator may be indented.
    Dash,
    /// `<<~ID`: the terminator may be indented and common leading
    /// whitespace is removed from the body.
    Squiggly,
}

/// The quoting of a heredoc identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeredocQuote {
    None,
    Single,
    Double,
    Backtick,
}

impl HeredocQuote {
    #[inline]
    pub fn interpolates(self) -> bool {
        !matches!(self, HeredocQuote::Single)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexMode {
    /// Ordinary code.
    Default,
    /// Code inside `#{ ... }`. Holds the brace depth of the enclosing code.
    Embexpr { outer_brace_depth: u32 },
    /// A string, symbol or xstring body.
    String {
        terminator: u8,
        incrementor: u8,
        nesting: u32,
        interpolation: bool,
        /// `"key":` may close as a label.
        label_allowed: bool,
    },
    /// A `%w`, `%W`, `%i` or `%I` word list.
    List {
        terminator: u8,
        incrementor: u8,
        nesting: u32,
        interpolation: bool,
    },
    /// A regular expression body.
    Regexp {
        terminator: u8,
        incrementor: u8,
        nesting: u32,
    },
    /// A heredoc body. `ident` is the byte range of the terminator name.
    Heredoc {
        ident_start: usize,
        ident_end: usize,
        indent: HeredocIndent,
        quote: HeredocQuote,
        /// Where lexing continues once the body is finished.
        resume: usize,
    },
    /// Inside `=begin` ... `=end`. Holds the start of the `=begin` line.
    Embdoc { begin: usize },
}

impl LexMode {
    /// Whether `#{`, `#@` and `#$` start interpolation in this mode.
    pub fn interpolates(&self) -> bool {
        match self {
            LexMode::String { interpolation, .. } | LexMode::List { interpolation, .. } => *interpolation,
            LexMode::Regexp { .. } => true,
            LexMode::Heredoc { quote, .. } => quote.interpolates(),
            LexMode::Default | LexMode::Embexpr { .. } | LexMode::Embdoc { .. } => false,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            LexMode::Default => "default",
            LexMode::Embexpr { .. } => "embexpr",
            LexMode::String { .. } => "string",
            LexMode::List { .. } => "list",
            LexMode::Regexp { .. } => "regexp",
            LexMode::Heredoc { .. } => "heredoc",
            LexMode::Embdoc { .. } => "embdoc",
        }
    }
}
