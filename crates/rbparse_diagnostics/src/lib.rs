//! rbparse_diagnostics: Syntax error messages and error reporting infrastructure.
//!
//! Every message the lexer and parser can emit is declared once in the
//! `messages` module. Message text is part of the observable contract of
//! the parser, so the strings here must not be reworded.

use rbparse_core::text::Location;
use std::fmt;

/// Diagnostic category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCategory {
    Error,
    Warning,
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticCategory::Error => write!(f, "error"),
            DiagnosticCategory::Warning => write!(f, "warning"),
        }
    }
}

/// A diagnostic message template with a code and category.
#[derive(Debug, Clone)]
pub struct DiagnosticMessage {
    /// Stable numeric code for the message.
    pub code: u32,
    /// The category of this diagnostic.
    pub category: DiagnosticCategory,
    /// The message template string. May contain `{0}`, `{1}`, etc. placeholders.
    pub message: &'static str,
}

/// A realized diagnostic with a location and resolved message text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// The resolved message.
    pub message: String,
    /// Where in the source the fault was detected.
    pub location: Location,
    /// The diagnostic code.
    pub code: u32,
    /// The category.
    pub category: DiagnosticCategory,
}

impl Diagnostic {
    pub fn new(location: Location, message: &DiagnosticMessage, args: &[&str]) -> Self {
        Self {
            message: format_message(message.message, args),
            location,
            code: message.code,
            category: message.category,
        }
    }

    /// Whether this is an error diagnostic.
    pub fn is_error(&self) -> bool {
        self.category == DiagnosticCategory::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} RB{} {}: {}",
            self.category, self.code, self.location, self.message
        )
    }
}

/// Format a diagnostic message template by replacing `{0}`, `{1}`, etc. with arguments.
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{}}}", i), arg);
    }
    result
}

/// Diagnostics accumulated during lexing and parsing, in emission order.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticCollection {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollection {
    pub fn new() -> Self {
        Self {
            diagnostics: Vec::new(),
        }
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn extend(&mut self, other: DiagnosticCollection) {
        self.diagnostics.extend(other.diagnostics);
    }

    /// Drop everything recorded after the first `len` diagnostics.
    pub fn truncate(&mut self, len: usize) {
        self.diagnostics.truncate(len);
    }

    pub fn clear(&mut self) {
        self.diagnostics.clear();
    }
}

// ============================================================================
// Diagnostic Messages
// ============================================================================

pub mod messages {
    use super::*;

    macro_rules! diag {
        ($code:expr, Error, $msg:expr) => {
            DiagnosticMessage { code: $code, category: DiagnosticCategory::Error, message: $msg }
        };
        ($code:expr, Warning, $msg:expr) => {
            DiagnosticMessage { code: $code, category: DiagnosticCategory::Warning, message: $msg }
        };
    }

    // ========================================================================
    // Lexical errors (1000-1099)
    // ========================================================================
    pub const UNTERMINATED_EMBDOC: DiagnosticMessage = diag!(1001, Error, "Unterminated embdoc");
    pub const INVALID_NUMBER: DiagnosticMessage = diag!(1003, Error, "Invalid number.");
    pub const INVALID_CHARACTER: DiagnosticMessage = diag!(1004, Error, "Invalid character `{0}`.");
    pub const INVALID_ESCAPE: DiagnosticMessage = diag!(1005, Error, "Invalid escape sequence.");
    pub const INVALID_GLOBAL_VARIABLE: DiagnosticMessage = diag!(1006, Error, "Invalid global variable name.");
    pub const INVALID_INSTANCE_VARIABLE: DiagnosticMessage = diag!(1007, Error, "Invalid instance variable name.");
    pub const INVALID_CLASS_VARIABLE: DiagnosticMessage = diag!(1008, Error, "Invalid class variable name.");
    pub const INVALID_HEREDOC_IDENTIFIER: DiagnosticMessage = diag!(1009, Error, "Expected a heredoc identifier after `<<`.");

    // ========================================================================
    // Unterminated literals (1100-1199)
    // ========================================================================
    pub const UNTERMINATED_STRING: DiagnosticMessage = diag!(1101, Error, "Expected a closing delimiter for a string literal.");
    pub const UNTERMINATED_INTERPOLATED_STRING: DiagnosticMessage = diag!(1102, Error, "Expected a closing delimiter for an interpolated string.");
    pub const UNTERMINATED_XSTRING: DiagnosticMessage = diag!(1103, Error, "Expected a closing delimiter for an xstring.");
    pub const UNTERMINATED_SYMBOL: DiagnosticMessage = diag!(1104, Error, "Expected a closing delimiter for a dynamic symbol.");
    pub const UNTERMINATED_REGEXP: DiagnosticMessage = diag!(1105, Error, "Expected a closing delimiter for a regular expression.");
    pub const UNTERMINATED_LIST: DiagnosticMessage = diag!(1106, Error, "Expected a closing delimiter for a `{0}` list.");
    pub const UNTERMINATED_HEREDOC: DiagnosticMessage = diag!(1107, Error, "Expected a closing delimiter for heredoc `{0}`.");
    pub const UNTERMINATED_CHARACTER: DiagnosticMessage = diag!(1110, Error, "Expected a character after `?`.");

    // ========================================================================
    // Statement structure (2000-2099)
    // ========================================================================
    pub const CANNOT_PARSE_EXPRESSION: DiagnosticMessage = diag!(2001, Error, "Cannot parse the expression.");
    pub const EXPECTED_STATEMENT_SEPARATOR: DiagnosticMessage = diag!(2002, Error, "Expected a newline or semicolon after the statement.");
    pub const UNEXPECTED_TOKEN_IGNORED: DiagnosticMessage = diag!(2003, Error, "Unexpected `{0}`, ignoring it.");
    pub const EXPECTED_END: DiagnosticMessage = diag!(2004, Error, "Expected `end` to close `{0}` statement.");
    pub const EXPECTED_VALUE_AFTER_OPERATOR: DiagnosticMessage = diag!(2005, Error, "Expected a value after the operator.");
    pub const EXPECTED_PREDICATE: DiagnosticMessage = diag!(2006, Error, "Expected a predicate expression for the `{0}` statement.");
    pub const EXPECTED_TERNARY_COLON: DiagnosticMessage = diag!(2007, Error, "Expected ':' after true expression in ternary operator.");
    pub const EXPECTED_TERNARY_FALSE: DiagnosticMessage = diag!(2008, Error, "Expected a value after ':' in ternary operator.");
    pub const EXPECTED_TERNARY_TRUE: DiagnosticMessage = diag!(2009, Error, "Expected a value after '?' in ternary operator.");
    pub const EXPECTED_IDENTIFIER_OR_CONSTANT: DiagnosticMessage = diag!(2010, Error, "Expected identifier or constant after '::'");
    pub const EXPECTED_MESSAGE_NAME: DiagnosticMessage = diag!(2011, Error, "Expected a method name after `{0}`.");
    pub const EXPECTED_CLOSING_PARENTHESIS: DiagnosticMessage = diag!(2012, Error, "Expected a closing parenthesis.");
    pub const EXPECTED_CLOSING_BRACKET: DiagnosticMessage = diag!(2013, Error, "Expected a closing bracket `]`.");
    pub const EXPECTED_CLOSING_BRACE: DiagnosticMessage = diag!(2014, Error, "Expected a closing brace `}`.");
    pub const EXPECTED_ARGUMENT: DiagnosticMessage = diag!(2015, Error, "Expected an argument.");
    pub const EXPECTED_ELEMENT: DiagnosticMessage = diag!(2016, Error, "Expected an element for the array.");
    pub const EXPECTED_HASH_VALUE: DiagnosticMessage = diag!(2017, Error, "Expected a value in the hash literal.");
    pub const EXPECTED_HASH_KEY: DiagnosticMessage = diag!(2018, Error, "Expected a key in the hash literal.");
    pub const EXPECTED_HASH_ROCKET: DiagnosticMessage = diag!(2019, Error, "Expected a `=>` between the hash key and value.");
    pub const EXPECTED_SPLAT_VALUE: DiagnosticMessage = diag!(2020, Error, "Expected an expression after `*`.");
    pub const EXPECTED_DOUBLE_SPLAT_VALUE: DiagnosticMessage = diag!(2021, Error, "Expected an expression after `**`.");
    pub const EXPECTED_BLOCK_ARGUMENT_VALUE: DiagnosticMessage = diag!(2022, Error, "Expected an expression after `&`.");
    pub const EXPECTED_EMBEXPR_CLOSE: DiagnosticMessage = diag!(2023, Error, "Expected a closing delimiter for an embedded expression.");
    pub const EXPECTED_EMBEDDED_VARIABLE: DiagnosticMessage = diag!(2024, Error, "Expected a variable after `#`.");
    pub const EXPECTED_RANGE_END: DiagnosticMessage = diag!(2025, Error, "Expected a value after the range operator.");
    pub const EXPECTED_UNARY_OPERAND: DiagnosticMessage = diag!(2026, Error, "Expected an expression after the unary operator.");
    pub const EXPECTED_NOT_OPERAND: DiagnosticMessage = diag!(2027, Error, "Expected an expression after `not`.");
    pub const EXPECTED_DEFINED_OPERAND: DiagnosticMessage = diag!(2028, Error, "Expected an expression after `defined?`.");
    pub const EXPECTED_MODIFIER_PREDICATE: DiagnosticMessage = diag!(2029, Error, "Expected a predicate after `{0}`.");
    pub const EXPECTED_RESCUE_VALUE: DiagnosticMessage = diag!(2030, Error, "Expected a value after the `rescue` modifier.");
    pub const EXPECTED_ASSIGNMENT_VALUE: DiagnosticMessage = diag!(2031, Error, "Expected a value after `{0}`.");
    pub const EXPECTED_INDEX_CLOSE: DiagnosticMessage = diag!(2032, Error, "Expected a closing bracket `]` for the index.");
    pub const EXPECTED_ARGUMENTS_CLOSE: DiagnosticMessage = diag!(2033, Error, "Expected a `)` to close the arguments.");
    pub const EXPECTED_BLOCK_END: DiagnosticMessage = diag!(2034, Error, "Expected `end` to close the `do` block.");
    pub const EXPECTED_BLOCK_BRACE: DiagnosticMessage = diag!(2035, Error, "Expected a block closing `}`.");
    pub const EXPECTED_BLOCK_PARAMETERS_CLOSE: DiagnosticMessage = diag!(2036, Error, "Expected the block parameters to end with `|`.");
    pub const EXPECTED_BLOCK_LOCAL: DiagnosticMessage = diag!(2037, Error, "Expected a local variable name after `;`.");
    pub const EXPECTED_LAMBDA_BODY: DiagnosticMessage = diag!(2038, Error, "Expected a `do` keyword or a `{` to open the lambda block.");
    pub const EXPECTED_LAMBDA_BRACE: DiagnosticMessage = diag!(2039, Error, "Expected a lambda block closing `}`.");
    pub const EXPECTED_LAMBDA_END: DiagnosticMessage = diag!(2040, Error, "Expected `end` to close the lambda block.");
    pub const ASSIGNMENT_TO_INVALID_TARGET: DiagnosticMessage = diag!(2041, Error, "Unexpected write target.");
    pub const ASSIGNMENT_TO_READONLY: DiagnosticMessage = diag!(2042, Error, "Can't set variable {0}.");
    pub const EXPECTED_MULTI_TARGET: DiagnosticMessage = diag!(2043, Error, "Expected an assignment target after `,`.");
    pub const EXPECTED_MULTI_WRITE_OPERATOR: DiagnosticMessage = diag!(2044, Error, "Expected `=` after the multiple assignment targets.");
    pub const EXPECTED_MULTI_TARGET_CLOSE: DiagnosticMessage = diag!(2046, Error, "Expected `)` to close the grouped targets.");

    // ========================================================================
    // Keyword constructs (2100-2199)
    // ========================================================================
    pub const EXPECTED_BEGIN_UPCASE_BRACE: DiagnosticMessage = diag!(2101, Error, "Expected '{' after 'BEGIN'.");
    pub const EXPECTED_BEGIN_UPCASE_TERM: DiagnosticMessage = diag!(2102, Error, "Expected '}' after 'BEGIN' statements.");
    pub const EXPECTED_END_UPCASE_BRACE: DiagnosticMessage = diag!(2103, Error, "Expected '{' after 'END'.");
    pub const EXPECTED_END_UPCASE_TERM: DiagnosticMessage = diag!(2104, Error, "Expected '}' after 'END' statements.");
    pub const BEGIN_UPCASE_TOPLEVEL: DiagnosticMessage = diag!(2105, Error, "BEGIN is permitted only at toplevel");
    pub const EXPECTED_FOR_INDEX: DiagnosticMessage = diag!(2106, Error, "Expected index after for.");
    pub const EXPECTED_FOR_IN: DiagnosticMessage = diag!(2107, Error, "Expected keyword in.");
    pub const EXPECTED_FOR_COLLECTION: DiagnosticMessage = diag!(2108, Error, "Expected collection.");
    pub const EXPECTED_MODULE_NAME: DiagnosticMessage = diag!(2109, Error, "Expected to find a module name after `module`.");
    pub const EXPECTED_CLASS_NAME: DiagnosticMessage = diag!(2110, Error, "Expected to find a class name after `class`.");
    pub const EXPECTED_SUPERCLASS: DiagnosticMessage = diag!(2111, Error, "Expected to find a superclass after `<`.");
    pub const EXPECTED_SINGLETON_CLASS_EXPRESSION: DiagnosticMessage = diag!(2112, Error, "Expected an expression after `class <<`.");
    pub const EXPECTED_DEF_NAME: DiagnosticMessage = diag!(2113, Error, "Expected a method name after `def`.");
    pub const EXPECTED_DEF_PARAMETERS_CLOSE: DiagnosticMessage = diag!(2114, Error, "Expected `)` to close the parameter list.");
    pub const EXPECTED_DEF_BODY: DiagnosticMessage = diag!(2115, Error, "Expected a method body after `=`.");
    pub const EXPECTED_PARAMETER: DiagnosticMessage = diag!(2116, Error, "Expected a parameter.");
    pub const EXPECTED_PARAMETER_DEFAULT: DiagnosticMessage = diag!(2117, Error, "Expected a default value for the parameter.");
    pub const DUPLICATED_PARAMETER: DiagnosticMessage = diag!(2118, Error, "Duplicated parameter name.");
    pub const UNEXPECTED_PARAMETER_ORDER: DiagnosticMessage = diag!(2119, Error, "Unexpected parameter order.");
    pub const UNEXPECTED_MULTIPLE_REST: DiagnosticMessage = diag!(2120, Error, "Unexpected multiple `*` rest parameters.");
    pub const FORWARDING_NOT_LAST: DiagnosticMessage = diag!(2121, Error, "Unexpected parameter after `...`.");
    pub const FORWARDING_IN_BLOCK: DiagnosticMessage = diag!(2122, Error, "Unexpected `...` in block parameters.");
    pub const ARGUMENT_NO_FORWARDING: DiagnosticMessage = diag!(2123, Error, "unexpected ... when parent method is not forwarding.");
    pub const ARGUMENT_AFTER_FORWARDING: DiagnosticMessage = diag!(2124, Error, "Unexpected argument after `...`.");
    pub const ARGUMENT_AFTER_BLOCK: DiagnosticMessage = diag!(2125, Error, "Unexpected argument after a block argument.");
    pub const EXPECTED_CASE_CLAUSE: DiagnosticMessage = diag!(2126, Error, "Expected a `when` or `in` clause after `case`.");
    pub const EXPECTED_WHEN_CONDITION: DiagnosticMessage = diag!(2127, Error, "Expected a condition after `when`.");
    pub const EXPECTED_WHEN_DELIMITER: DiagnosticMessage = diag!(2128, Error, "Expected a `then` or newline after the `when` conditions.");
    pub const EXPECTED_IN_DELIMITER: DiagnosticMessage = diag!(2129, Error, "Expected a `then` or newline after the pattern.");
    pub const EXPECTED_RESCUE_REFERENCE: DiagnosticMessage = diag!(2130, Error, "Expected an exception variable after `=>`.");
    pub const EXPECTED_RESCUE_EXCEPTION: DiagnosticMessage = diag!(2131, Error, "Expected an exception class after `,`.");
    pub const EXPECTED_ALIAS_NAME: DiagnosticMessage = diag!(2132, Error, "Expected a method name or symbol for `alias`.");
    pub const EXPECTED_ALIAS_GLOBAL: DiagnosticMessage = diag!(2133, Error, "Expected a global variable to alias.");
    pub const EXPECTED_UNDEF_NAME: DiagnosticMessage = diag!(2134, Error, "Expected a method name or symbol for `undef`.");
    pub const EXPECTED_CONDITION_THEN: DiagnosticMessage = diag!(2135, Error, "Expected `then` or `;` or a newline after the `{0}` condition.");
    pub const EXPECTED_LOOP_DO: DiagnosticMessage = diag!(2136, Error, "Expected `do` or `;` or a newline after the `{0}` condition.");
    pub const EXPECTED_PARENTHESIZED_DEFINED: DiagnosticMessage = diag!(2137, Error, "Expected `)` after the `defined?` expression.");
    pub const INVALID_RETRY: DiagnosticMessage = diag!(2138, Error, "Invalid retry without rescue.");
    pub const INVALID_RETURN_IN_CLASS: DiagnosticMessage = diag!(2139, Error, "Invalid return in class/module body.");
    pub const MODULE_IN_METHOD: DiagnosticMessage = diag!(2140, Error, "Unexpected module definition in method body.");
    pub const CLASS_IN_METHOD: DiagnosticMessage = diag!(2141, Error, "Unexpected class definition in method body.");
    pub const DYNAMIC_CONSTANT_ASSIGNMENT: DiagnosticMessage = diag!(2142, Error, "Dynamic constant assignment.");
    pub const CLASS_NAME_NOT_CONSTANT: DiagnosticMessage = diag!(2143, Error, "class/module name must be CONSTANT");

    // ========================================================================
    // Pattern matching (2200-2299)
    // ========================================================================
    pub const EXPECTED_PATTERN: DiagnosticMessage = diag!(2201, Error, "Expected a pattern after `{0}`.");
    pub const EXPECTED_PATTERN_TERM: DiagnosticMessage = diag!(2202, Error, "Expected a pattern expression.");
    pub const EXPECTED_PATTERN_CAPTURE: DiagnosticMessage = diag!(2203, Error, "Expected an identifier after the `=>` operator.");
    pub const EXPECTED_PATTERN_BRACKET: DiagnosticMessage = diag!(2204, Error, "Expected a `]` to close the pattern expression.");
    pub const EXPECTED_PATTERN_PAREN: DiagnosticMessage = diag!(2205, Error, "Expected a `)` to close the pattern expression.");
    pub const EXPECTED_PATTERN_BRACE: DiagnosticMessage = diag!(2206, Error, "Expected a `}` to close the pattern expression.");
    pub const EXPECTED_PATTERN_KEY: DiagnosticMessage = diag!(2207, Error, "Expected a key in the hash pattern.");
    pub const EXPECTED_PIN_EXPRESSION: DiagnosticMessage = diag!(2208, Error, "Expected an expression after `^(`.");
    pub const EXPECTED_PIN_VARIABLE: DiagnosticMessage = diag!(2209, Error, "Expected a variable or an expression after `^`.");
    pub const EXPECTED_PATTERN_REST: DiagnosticMessage = diag!(2210, Error, "Unexpected multiple `*` rest patterns in an array pattern.");

    // ========================================================================
    // Warnings (3000-3099)
    // ========================================================================
    pub const AMBIGUOUS_FIRST_ARGUMENT_MINUS: DiagnosticMessage = diag!(3001, Warning, "Ambiguous first argument; put parentheses or a space even after `-` operator.");
    pub const AMBIGUOUS_SLASH: DiagnosticMessage = diag!(3002, Warning, "Ambiguous first argument; put parentheses or a space even after `/` operator.");
}
