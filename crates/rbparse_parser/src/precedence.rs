//! Binding powers for infix and postfix operators.

use rbparse_ast::token::TokenKind;

/// Binding power levels, lowest first.
///
/// Left-associative operators bind their right operand one level tighter
/// than their own level; right-associative ones bind it at the same level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum BindingPower {
    Unset = 0,
    Statement = 2,
    /// `rescue` modifier
    ModifierRescue = 4,
    /// `if`, `unless`, `while`, `until` modifiers
    Modifier = 6,
    /// `and`, `or`
    Composition = 8,
    Not = 10,
    /// `=>`, `in`
    Match = 12,
    Defined = 14,
    Assignment = 16,
    Ternary = 18,
    Range = 20,
    LogicalOr = 22,
    LogicalAnd = 24,
    Equality = 26,
    Comparison = 28,
    BitwiseOr = 30,
    BitwiseAnd = 32,
    Shift = 34,
    Term = 36,
    Factor = 38,
    UMinus = 40,
    Exponent = 42,
    Unary = 44,
    Index = 46,
    Call = 48,
    Max = 50,
}

impl BindingPower {
    /// The next level up, used as the right binding power of
    /// left-associative operators.
    pub fn tighter(self) -> BindingPower {
        use BindingPower::*;
        match self {
            Unset => Statement,
            Statement => ModifierRescue,
            ModifierRescue => Modifier,
            Modifier => Composition,
            Composition => Not,
            Not => Match,
            Match => Defined,
            Defined => Assignment,
            Assignment => Ternary,
            Ternary => Range,
            Range => LogicalOr,
            LogicalOr => LogicalAnd,
            LogicalAnd => Equality,
            Equality => Comparison,
            Comparison => BitwiseOr,
            BitwiseOr => BitwiseAnd,
            BitwiseAnd => Shift,
            Shift => Term,
            Term => Factor,
            Factor => UMinus,
            UMinus => Exponent,
            Exponent => Unary,
            Unary => Index,
            Index => Call,
            Call | Max => Max,
        }
    }
}

/// How an infix token binds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    /// The level at which the operator takes a left operand.
    pub left: BindingPower,
    /// The level used to parse the right operand.
    pub right: BindingPower,
    /// Chaining two operators of this level, `a == b == c`, is not allowed.
    pub nonassoc: bool,
}

impl Binding {
    const NONE: Binding = Binding {
        left: BindingPower::Unset,
        right: BindingPower::Unset,
        nonassoc: false,
    };

    fn left(level: BindingPower) -> Binding {
        Binding {
            left: level,
            right: level.tighter(),
            nonassoc: false,
        }
    }

    fn right(level: BindingPower) -> Binding {
        Binding {
            left: level,
            right: level,
            nonassoc: false,
        }
    }

    fn nonassoc(level: BindingPower) -> Binding {
        Binding {
            left: level,
            right: level.tighter(),
            nonassoc: true,
        }
    }
}

/// The binding of `kind` when it follows a complete expression.
pub fn binding_power(kind: TokenKind) -> Binding {
    use BindingPower as P;
    match kind {
        TokenKind::KeywordRescueModifier => Binding::left(P::ModifierRescue),

        TokenKind::KeywordIfModifier
        | TokenKind::KeywordUnlessModifier
        | TokenKind::KeywordWhileModifier
        | TokenKind::KeywordUntilModifier => Binding::left(P::Modifier),

        TokenKind::KeywordAnd | TokenKind::KeywordOr => Binding::left(P::Composition),

        TokenKind::EqualGreater | TokenKind::KeywordIn => Binding::nonassoc(P::Match),

        kind if kind.is_assignment() => Binding::right(P::Assignment),

        TokenKind::QuestionMark => Binding::right(P::Ternary),

        TokenKind::DotDot | TokenKind::DotDotDot => Binding::nonassoc(P::Range),

        TokenKind::PipePipe => Binding::left(P::LogicalOr),
        TokenKind::AmpersandAmpersand => Binding::left(P::LogicalAnd),

        TokenKind::EqualEqual
        | TokenKind::EqualEqualEqual
        | TokenKind::BangEqual
        | TokenKind::EqualTilde
        | TokenKind::BangTilde
        | TokenKind::LessEqualGreater => Binding::nonassoc(P::Equality),

        TokenKind::Greater | TokenKind::GreaterEqual | TokenKind::Less | TokenKind::LessEqual => {
            Binding::left(P::Comparison)
        }

        TokenKind::Pipe | TokenKind::Caret => Binding::left(P::BitwiseOr),
        TokenKind::Ampersand => Binding::left(P::BitwiseAnd),
        TokenKind::LessLess | TokenKind::GreaterGreater => Binding::left(P::Shift),
        TokenKind::Plus | TokenKind::Minus => Binding::left(P::Term),
        TokenKind::Star | TokenKind::Slash | TokenKind::Percent => Binding::left(P::Factor),
        TokenKind::StarStar => Binding::right(P::Exponent),

        TokenKind::BracketLeft => Binding::left(P::Index),

        TokenKind::Dot | TokenKind::AmpersandDot | TokenKind::ColonColon => Binding::left(P::Call),

        _ => Binding::NONE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_are_ordered() {
        assert!(BindingPower::Statement < BindingPower::ModifierRescue);
        assert!(BindingPower::Term < BindingPower::Factor);
        assert!(BindingPower::UMinus < BindingPower::Exponent);
        assert_eq!(BindingPower::Call.tighter(), BindingPower::Max);
    }

    #[test]
    fn test_associativity() {
        let plus = binding_power(TokenKind::Plus);
        assert_eq!(plus.left, BindingPower::Term);
        assert_eq!(plus.right, BindingPower::Factor);

        let power = binding_power(TokenKind::StarStar);
        assert_eq!(power.left, power.right);

        let assign = binding_power(TokenKind::PipePipeEqual);
        assert_eq!(assign.left, BindingPower::Assignment);
        assert_eq!(assign.right, BindingPower::Assignment);

        assert!(binding_power(TokenKind::EqualEqual).nonassoc);
        assert_eq!(binding_power(TokenKind::Comma).left, BindingPower::Unset);
    }
}
