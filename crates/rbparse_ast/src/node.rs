//! Syntax tree node definitions.
//!
//! The tree is a closed sum type, `Node`, with one variant per grammar
//! production. Every variant carries its own `location` followed by its
//! fields in declaration order. Children live in the parse arena and are
//! referenced with the arena lifetime `'a`.
//!
//! The `define_nodes!` table below is the single source for the variant
//! list, the stable serialization tags in `NodeKind`, and field visiting.

use crate::field::{Field, FieldVisitor};
use crate::flags::{CallFlags, RangeFlags, RegexFlags, StringFlags};
use crate::token::Token;
use rbparse_core::text::Location;

/// A required child node.
pub type NodeRef<'a> = &'a Node<'a>;

/// An optional child node; `None` when the source omits it.
pub type OptionalNode<'a> = Option<&'a Node<'a>>;

/// An ordered list of child nodes, allocated in the arena.
pub type NodeList<'a> = &'a [Node<'a>];

/// An ordered list of tokens, allocated in the arena.
pub type TokenList<'a> = &'a [Token];

/// Unescaped literal contents. Not necessarily valid UTF-8.
pub type Bytes<'a> = &'a [u8];

/// A resolved identifier such as a method or variable name.
pub type Name<'a> = &'a str;

/// The local variable table of a scope, in binding order.
pub type Locals<'a> = &'a [&'a str];

macro_rules! define_nodes {
    ($(
        $(#[$meta:meta])*
        $variant:ident = $tag:literal {
            $( $field:ident : $ty:ty ),* $(,)?
        }
    )*) => {
        /// A node of the syntax tree.
        #[derive(Debug, Clone, Copy, PartialEq)]
        pub enum Node<'a> {
            $(
                $(#[$meta])*
                $variant {
                    location: Location,
                    $( $field: $ty, )*
                },
            )*
        }

        /// The kind of a node, with its stable serialization tag.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u8)]
        pub enum NodeKind {
            $( $variant = $tag, )*
        }

        impl NodeKind {
            /// The variant name, e.g. `"ConstantPath"`.
            pub fn name(self) -> &'static str {
                match self {
                    $( NodeKind::$variant => stringify!($variant), )*
                }
            }

            /// The serialization tag.
            #[inline]
            pub fn tag(self) -> u8 {
                self as u8
            }
        }

        impl<'a> Node<'a> {
            pub fn kind(&self) -> NodeKind {
                match self {
                    $( Node::$variant { .. } => NodeKind::$variant, )*
                }
            }

            pub fn location(&self) -> Location {
                match self {
                    $( Node::$variant { location, .. } => *location, )*
                }
            }

            pub(crate) fn location_mut(&mut self) -> &mut Location {
                match self {
                    $( Node::$variant { location, .. } => location, )*
                }
            }

            /// Feed every field of this node to `visitor`, in declaration order.
            pub fn for_each_field<V: FieldVisitor<'a> + ?Sized>(&self, visitor: &mut V) {
                match self {
                    $(
                        Node::$variant { location: _, $( $field, )* } => {
                            $( Field::accept($field, visitor); )*
                        }
                    )*
                }
            }
        }
    };
}

define_nodes! {
    /// `alias new old` for methods or global variables.
    Alias = 1 { new_name: NodeRef<'a>, old_name: NodeRef<'a>, keyword: Token }

    /// `pattern | pattern`
    AlternationPattern = 2 { left: NodeRef<'a>, right: NodeRef<'a>, operator: Token }

    /// `left && right` or `left and right`.
    And = 3 { left: NodeRef<'a>, right: NodeRef<'a>, operator: Token }

    /// The argument list of a call, `super`, `yield` or a jump keyword.
    Arguments = 4 { arguments: NodeList<'a> }

    /// Array literals, including `%w`/`%i` lists and implicit arrays such as
    /// the right-hand side of `a = 1, 2`.
    Array = 5 { elements: NodeList<'a>, opening: Option<Token>, closing: Option<Token> }

    /// `in [a, *b, c]` or `in Const(a, b)`.
    ArrayPattern = 6 {
        constant: OptionalNode<'a>,
        requireds: NodeList<'a>,
        rest: OptionalNode<'a>,
        posts: NodeList<'a>,
        opening: Option<Token>,
        closing: Option<Token>,
    }

    /// A `key => value` or `key: value` pair. `value` is absent for the
    /// `{x:}` shorthand.
    Assoc = 7 { key: NodeRef<'a>, value: OptionalNode<'a>, operator: Option<Token> }

    /// `**value` inside a hash or keyword arguments.
    AssocSplat = 8 { value: OptionalNode<'a>, operator: Token }

    /// `$&`, `` $` ``, `$'`, `$+`
    BackReferenceRead = 9 { name: Name<'a> }

    /// `begin ... end`, or the implicit begin of a body with `rescue`/`ensure`.
    Begin = 10 {
        begin_keyword: Option<Token>,
        statements: OptionalNode<'a>,
        rescue_clause: OptionalNode<'a>,
        else_clause: OptionalNode<'a>,
        ensure_clause: OptionalNode<'a>,
        end_keyword: Option<Token>,
    }

    /// `&block` in an argument list.
    BlockArgument = 11 { expression: OptionalNode<'a>, operator: Token }

    /// `{ |x| ... }` or `do |x| ... end` attached to a call.
    Block = 12 {
        locals: Locals<'a>,
        parameters: OptionalNode<'a>,
        body: OptionalNode<'a>,
        opening: Token,
        closing: Token,
    }

    /// `&block` in a parameter list.
    BlockParameter = 13 { name: Option<Token>, operator: Token }

    /// `|a, b; c|` on a block or `(a, b)` on a lambda.
    BlockParameters = 14 {
        parameters: OptionalNode<'a>,
        locals: TokenList<'a>,
        opening: Option<Token>,
        closing: Option<Token>,
    }

    Break = 15 { arguments: OptionalNode<'a>, keyword: Token }

    /// Method calls, including operator calls such as `a + b` and `!a`.
    Call = 16 {
        receiver: OptionalNode<'a>,
        operator: Option<Token>,
        message: Option<Token>,
        opening: Option<Token>,
        arguments: OptionalNode<'a>,
        closing: Option<Token>,
        block: OptionalNode<'a>,
        flags: CallFlags,
        name: Name<'a>,
    }

    /// `pattern => binding`
    CapturePattern = 17 { value: NodeRef<'a>, target: NodeRef<'a>, operator: Token }

    /// `case` with `when` or `in` clauses.
    Case = 18 {
        predicate: OptionalNode<'a>,
        conditions: NodeList<'a>,
        consequent: OptionalNode<'a>,
        case_keyword: Token,
        end_keyword: Token,
    }

    Class = 19 {
        locals: Locals<'a>,
        class_keyword: Token,
        constant_path: NodeRef<'a>,
        inheritance_operator: Option<Token>,
        superclass: OptionalNode<'a>,
        body: OptionalNode<'a>,
        end_keyword: Token,
        name: Name<'a>,
    }

    ClassVariableRead = 20 { name: Name<'a> }
    ClassVariableTarget = 21 { name: Name<'a> }
    ClassVariableWrite = 22 { name: Name<'a>, name_token: Token, value: NodeRef<'a>, operator: Token }

    /// `Parent::Child`, or `::Child` when `parent` is absent.
    ConstantPath = 23 { parent: OptionalNode<'a>, child: NodeRef<'a>, delimiter: Token }

    ConstantPathTarget = 24 { parent: OptionalNode<'a>, child: NodeRef<'a>, delimiter: Token }

    /// `Parent::Child = value`; `target` is a `ConstantPath`.
    ConstantPathWrite = 25 { target: NodeRef<'a>, operator: Token, value: NodeRef<'a> }

    ConstantRead = 26 { name: Name<'a> }
    ConstantTarget = 27 { name: Name<'a> }
    ConstantWrite = 28 { name: Name<'a>, name_token: Token, value: NodeRef<'a>, operator: Token }

    /// A method definition. `equal` is present for endless definitions, in
    /// which case `end_keyword` is absent.
    Def = 29 {
        name: Name<'a>,
        name_token: Token,
        receiver: OptionalNode<'a>,
        parameters: OptionalNode<'a>,
        body: OptionalNode<'a>,
        locals: Locals<'a>,
        def_keyword: Token,
        operator: Option<Token>,
        lparen: Option<Token>,
        rparen: Option<Token>,
        equal: Option<Token>,
        end_keyword: Option<Token>,
    }

    Defined = 30 { lparen: Option<Token>, value: NodeRef<'a>, rparen: Option<Token>, keyword: Token }

    /// The `else` branch of `if`, `unless`, `case`, `begin` or a ternary's
    /// false branch (where `else_keyword` is the `:`).
    Else = 31 { else_keyword: Token, statements: OptionalNode<'a>, end_keyword: Option<Token> }

    /// `#{ ... }` inside an interpolating literal.
    EmbeddedStatements = 32 { opening: Token, statements: OptionalNode<'a>, closing: Token }

    /// `#@ivar`, `#@@cvar` or `#$gvar` inside an interpolating literal.
    EmbeddedVariable = 33 { operator: Token, variable: NodeRef<'a> }

    Ensure = 34 { ensure_keyword: Token, statements: OptionalNode<'a>, end_keyword: Token }

    False = 35 {}

    /// `in [*, x, *]`
    FindPattern = 36 {
        constant: OptionalNode<'a>,
        left: NodeRef<'a>,
        requireds: NodeList<'a>,
        right: NodeRef<'a>,
        opening: Option<Token>,
        closing: Option<Token>,
    }

    Float = 37 {}

    /// `for index in collection do ... end`
    For = 38 {
        index: NodeRef<'a>,
        collection: NodeRef<'a>,
        statements: OptionalNode<'a>,
        for_keyword: Token,
        in_keyword: Token,
        do_keyword: Option<Token>,
        end_keyword: Token,
    }

    /// `...` in call arguments.
    ForwardingArguments = 39 {}

    /// `...` in a parameter list.
    ForwardingParameter = 40 {}

    /// `super` without arguments or parentheses.
    ForwardingSuper = 41 { block: OptionalNode<'a> }

    GlobalVariableRead = 42 { name: Name<'a> }
    GlobalVariableTarget = 43 { name: Name<'a> }
    GlobalVariableWrite = 44 { name: Name<'a>, name_token: Token, value: NodeRef<'a>, operator: Token }

    Hash = 45 { opening: Token, elements: NodeList<'a>, closing: Token }

    /// `in {a: 1, **rest}` or `in Const(a:)`.
    HashPattern = 46 {
        constant: OptionalNode<'a>,
        assocs: NodeList<'a>,
        kwrest: OptionalNode<'a>,
        opening: Option<Token>,
        closing: Option<Token>,
    }

    /// `if`/`elsif` statements and the `if` modifier. Modifiers have no
    /// `end_keyword`; `elsif` branches hang off `consequent`.
    If = 47 {
        if_keyword: Token,
        predicate: NodeRef<'a>,
        statements: OptionalNode<'a>,
        consequent: OptionalNode<'a>,
        end_keyword: Option<Token>,
    }

    Imaginary = 48 { numeric: NodeRef<'a> }

    /// One `in` clause of a pattern-matching `case`.
    In = 49 { pattern: NodeRef<'a>, statements: OptionalNode<'a>, in_keyword: Token, then_keyword: Option<Token> }

    InstanceVariableRead = 50 { name: Name<'a> }
    InstanceVariableTarget = 51 { name: Name<'a> }
    InstanceVariableWrite = 52 { name: Name<'a>, name_token: Token, value: NodeRef<'a>, operator: Token }

    Integer = 53 {}

    InterpolatedRegularExpression = 54 { opening: Token, parts: NodeList<'a>, closing: Token, flags: RegexFlags }

    /// A string with interpolation, adjacent string literals (`"a" "b"`), a
    /// heredoc with interpolation, or an unterminated string.
    InterpolatedString = 55 { opening: Option<Token>, parts: NodeList<'a>, closing: Option<Token> }

    InterpolatedSymbol = 56 { opening: Option<Token>, parts: NodeList<'a>, closing: Option<Token> }

    InterpolatedXString = 57 { opening: Token, parts: NodeList<'a>, closing: Token }

    /// Bare keyword arguments, `foo(a: 1)`.
    KeywordHash = 58 { elements: NodeList<'a> }

    /// `key:` or `key: default` in a parameter list. `name` is the label token.
    KeywordParameter = 59 { name: Token, value: OptionalNode<'a> }

    KeywordRestParameter = 60 { operator: Token, name: Option<Token> }

    /// `->(a) { ... }` or `-> do ... end`.
    Lambda = 61 {
        locals: Locals<'a>,
        operator: Token,
        opening: Token,
        closing: Token,
        parameters: OptionalNode<'a>,
        body: OptionalNode<'a>,
    }

    /// A read of a local; `depth` counts enclosing block scopes crossed.
    LocalVariableRead = 62 { name: Name<'a>, depth: u32 }
    LocalVariableTarget = 63 { name: Name<'a>, depth: u32 }
    LocalVariableWrite = 64 { name: Name<'a>, depth: u32, name_token: Token, value: NodeRef<'a>, operator: Token }

    /// `value in pattern`
    MatchPredicate = 65 { value: NodeRef<'a>, pattern: NodeRef<'a>, operator: Token }

    /// `value => pattern`
    MatchRequired = 66 { value: NodeRef<'a>, pattern: NodeRef<'a>, operator: Token }

    /// Recovery placeholder for a required child that was not found.
    Missing = 67 {}

    Module = 68 {
        locals: Locals<'a>,
        module_keyword: Token,
        constant_path: NodeRef<'a>,
        body: OptionalNode<'a>,
        end_keyword: Token,
        name: Name<'a>,
    }

    /// A parenthesized group of targets, `(a, b)` in `(a, b), c = x`.
    MultiTarget = 69 { targets: NodeList<'a>, lparen: Option<Token>, rparen: Option<Token> }

    /// `a, b = value`
    MultiWrite = 70 {
        targets: NodeList<'a>,
        lparen: Option<Token>,
        rparen: Option<Token>,
        operator: Token,
        value: NodeRef<'a>,
    }

    Next = 71 { arguments: OptionalNode<'a>, keyword: Token }

    Nil = 72 {}

    /// `**nil` in a parameter list or hash pattern.
    NoKeywordsParameter = 73 { operator: Token, keyword: Token }

    /// `$1`, `$2`, ...
    NumberedReferenceRead = 74 { number: u32 }

    OptionalParameter = 75 { name: Name<'a>, name_token: Token, operator: Token, value: NodeRef<'a> }

    /// `left || right` or `left or right`.
    Or = 76 { left: NodeRef<'a>, right: NodeRef<'a>, operator: Token }

    Parameters = 77 {
        requireds: NodeList<'a>,
        optionals: NodeList<'a>,
        rest: OptionalNode<'a>,
        posts: NodeList<'a>,
        keywords: NodeList<'a>,
        keyword_rest: OptionalNode<'a>,
        block: OptionalNode<'a>,
    }

    Parentheses = 78 { body: OptionalNode<'a>, opening: Token, closing: Token }

    /// `^(expression)` in a pattern.
    PinnedExpression = 79 { expression: NodeRef<'a>, operator: Token, lparen: Token, rparen: Token }

    /// `^variable` in a pattern.
    PinnedVariable = 80 { variable: NodeRef<'a>, operator: Token }

    /// `END { ... }`
    PostExecution = 81 { statements: OptionalNode<'a>, keyword: Token, opening: Token, closing: Token }

    /// `BEGIN { ... }`
    PreExecution = 82 { statements: OptionalNode<'a>, keyword: Token, opening: Token, closing: Token }

    /// The root of every tree.
    Program = 83 { locals: Locals<'a>, statements: NodeRef<'a> }

    Range = 84 { left: OptionalNode<'a>, right: OptionalNode<'a>, operator: Token, flags: RangeFlags }

    Rational = 85 { numeric: NodeRef<'a> }

    Redo = 86 {}

    RegularExpression = 87 { opening: Token, content: Token, closing: Token, unescaped: Bytes<'a>, flags: RegexFlags }

    /// `(a, b)` destructuring in a parameter list.
    RequiredDestructuredParameter = 88 { parameters: NodeList<'a>, opening: Token, closing: Token }

    RequiredParameter = 89 { name: Name<'a> }

    /// One `rescue` clause; further clauses chain through `consequent`.
    Rescue = 90 {
        keyword: Token,
        exceptions: NodeList<'a>,
        operator: Option<Token>,
        reference: OptionalNode<'a>,
        statements: OptionalNode<'a>,
        consequent: OptionalNode<'a>,
    }

    /// `expression rescue fallback`
    RescueModifier = 91 { expression: NodeRef<'a>, keyword: Token, rescue_expression: NodeRef<'a> }

    RestParameter = 92 { operator: Token, name: Option<Token> }

    Retry = 93 {}

    Return = 94 { keyword: Token, arguments: OptionalNode<'a> }

    /// `self`
    SelfReference = 95 {}

    /// `class << expression`
    SingletonClass = 96 {
        locals: Locals<'a>,
        class_keyword: Token,
        operator: Token,
        expression: NodeRef<'a>,
        body: OptionalNode<'a>,
        end_keyword: Token,
    }

    /// `__ENCODING__`
    SourceEncoding = 97 {}

    /// `__FILE__`, holding the configured file path.
    SourceFile = 98 { filepath: Name<'a> }

    /// `__LINE__`
    SourceLine = 99 {}

    /// `*value` in arguments, array literals, targets or patterns.
    Splat = 100 { operator: Token, expression: OptionalNode<'a> }

    /// A sequence of statements.
    Statements = 101 { body: NodeList<'a> }

    /// A string without interpolation. `opening` is absent for the parts of
    /// an interpolated literal and for heredoc bodies.
    String = 102 {
        flags: StringFlags,
        opening: Option<Token>,
        content: Token,
        closing: Option<Token>,
        unescaped: Bytes<'a>,
    }

    /// `super` with arguments or parentheses.
    Super = 103 {
        keyword: Token,
        lparen: Option<Token>,
        arguments: OptionalNode<'a>,
        rparen: Option<Token>,
        block: OptionalNode<'a>,
    }

    Symbol = 104 { opening: Option<Token>, value: Option<Token>, closing: Option<Token>, unescaped: Bytes<'a> }

    /// `predicate ? if_true : if_false`
    Ternary = 105 {
        predicate: NodeRef<'a>,
        question_mark: Token,
        true_expression: NodeRef<'a>,
        colon: Token,
        false_expression: NodeRef<'a>,
    }

    True = 106 {}

    Undef = 107 { names: NodeList<'a>, keyword: Token }

    Unless = 108 {
        keyword: Token,
        predicate: NodeRef<'a>,
        statements: OptionalNode<'a>,
        consequent: OptionalNode<'a>,
        end_keyword: Option<Token>,
    }

    Until = 109 { keyword: Token, closing: Option<Token>, predicate: NodeRef<'a>, statements: OptionalNode<'a> }

    When = 110 { keyword: Token, conditions: NodeList<'a>, statements: OptionalNode<'a> }

    While = 111 { keyword: Token, closing: Option<Token>, predicate: NodeRef<'a>, statements: OptionalNode<'a> }

    XString = 112 { opening: Token, content: Token, closing: Token, unescaped: Bytes<'a> }

    Yield = 113 { keyword: Token, lparen: Option<Token>, arguments: OptionalNode<'a>, rparen: Option<Token> }

    /// `target op= value` for arithmetic and bitwise operators. `target` is a
    /// target node or an attribute/index call.
    OperatorWrite = 114 { target: NodeRef<'a>, operator: Token, value: NodeRef<'a> }

    /// `target &&= value`
    AndWrite = 115 { target: NodeRef<'a>, operator: Token, value: NodeRef<'a> }

    /// `target ||= value`
    OrWrite = 116 { target: NodeRef<'a>, operator: Token, value: NodeRef<'a> }
}

impl<'a> Node<'a> {
    /// Whether this node is a recovery placeholder.
    #[inline]
    pub fn is_missing(&self) -> bool {
        matches!(self, Node::Missing { .. })
    }

    /// Direct children, in field order.
    pub fn children(&self) -> Vec<&'a Node<'a>> {
        let mut collector = ChildCollector { children: Vec::new() };
        self.for_each_field(&mut collector);
        collector.children
    }

    /// The statements of a `Statements` node, or an empty slice for anything else.
    pub fn statements_body(&self) -> &'a [Node<'a>] {
        match self {
            Node::Statements { body, .. } => *body,
            _ => &[],
        }
    }
}

struct ChildCollector<'a> {
    children: Vec<&'a Node<'a>>,
}

impl<'a> FieldVisitor<'a> for ChildCollector<'a> {
    fn visit_node(&mut self, node: &'a Node<'a>) {
        self.children.push(node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenKind;

    #[test]
    fn test_kind_and_location() {
        let node = Node::Integer { location: Location::new(0, 2) };
        assert_eq!(node.kind(), NodeKind::Integer);
        assert_eq!(node.kind().name(), "Integer");
        assert_eq!(node.location(), Location::new(0, 2));
        assert!(!node.is_missing());
    }

    #[test]
    fn test_children_in_field_order() {
        let left = Node::Integer { location: Location::new(0, 1) };
        let right = Node::Integer { location: Location::new(4, 5) };
        let node = Node::And {
            location: Location::new(0, 5),
            left: &left,
            right: &right,
            operator: Token::new(TokenKind::AmpersandAmpersand, 1, 3),
        };
        let children = node.children();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].location(), Location::new(0, 1));
        assert_eq!(children[1].location(), Location::new(4, 5));
    }

    #[test]
    fn test_tags_are_stable() {
        assert_eq!(NodeKind::Alias.tag(), 1);
        assert_eq!(NodeKind::Missing.tag(), 67);
        assert_eq!(NodeKind::Program.tag(), 83);
    }
}
