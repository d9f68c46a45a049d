//! Control flow: conditionals, loops, `case`, `begin`/`rescue`, jumps and
//! `BEGIN`/`END` blocks.

use rbparse_ast::location::span;
use rbparse_ast::node::{Node, OptionalNode};
use rbparse_ast::token::TokenKind;
use rbparse_diagnostics::messages;
use rbparse_lexer::LexState;

use super::expression::starts_expression;
use super::{join, Parser};
use crate::precedence::BindingPower;

impl<'a> Parser<'a> {
    // ========================================================================
    // Bodies
    // ========================================================================

    /// Statements of a `def`, `class`, `module` or `do` body. A `rescue`,
    /// `else` or `ensure` clause wraps them in a keywordless `Begin`.
    pub(super) fn parse_body_with_rescue(&mut self) -> OptionalNode<'a> {
        let statements = self.parse_statements();
        if !self.at_any(&[TokenKind::KeywordRescue, TokenKind::KeywordElse, TokenKind::KeywordEnsure]) {
            return statements;
        }
        let (rescue_clause, else_clause, ensure_clause) = self.parse_rescue_chain();
        Some(self.alloc(Node::Begin {
            location: span(
                &[&statements, &rescue_clause, &else_clause, &ensure_clause],
                &[&ensure_clause, &else_clause, &rescue_clause, &statements],
            ),
            begin_keyword: None,
            statements,
            rescue_clause,
            else_clause,
            ensure_clause,
            end_keyword: None,
        }))
    }

    fn parse_rescue_chain(&mut self) -> (OptionalNode<'a>, OptionalNode<'a>, OptionalNode<'a>) {
        let rescue_clause = if self.at(TokenKind::KeywordRescue) {
            let clause = self.parse_rescue_clause();
            Some(self.alloc(clause))
        } else {
            None
        };
        let else_clause = if self.at(TokenKind::KeywordElse) {
            let clause = self.parse_else_clause();
            Some(self.alloc(clause))
        } else {
            None
        };
        let ensure_clause = if self.at(TokenKind::KeywordEnsure) {
            let ensure_keyword = self.bump();
            let statements = self.parse_statements();
            let end_keyword = if self.at(TokenKind::KeywordEnd) {
                self.current
            } else {
                self.missing_token()
            };
            Some(self.alloc(Node::Ensure {
                location: join(ensure_keyword.location, end_keyword.location),
                ensure_keyword,
                statements,
                end_keyword,
            }))
        } else {
            None
        };
        (rescue_clause, else_clause, ensure_clause)
    }

    /// `rescue A, B => e` and the clauses chained after it.
    fn parse_rescue_clause(&mut self) -> Node<'a> {
        let keyword = self.bump();

        let mut exceptions = Vec::new();
        while starts_expression(self.current.kind) {
            let exception = self.parse_expression(BindingPower::Defined, &messages::EXPECTED_RESCUE_EXCEPTION);
            exceptions.push(exception);
            if self.accept(TokenKind::Comma).is_none() {
                break;
            }
            if !starts_expression(self.current.kind) {
                self.error_at_current(&messages::EXPECTED_RESCUE_EXCEPTION, &[]);
                break;
            }
        }

        let (operator, reference) = match self.accept(TokenKind::EqualGreater) {
            Some(operator) => {
                let reference = if starts_expression(self.current.kind) {
                    let target = self.parse_expression(BindingPower::Index, &messages::EXPECTED_RESCUE_REFERENCE);
                    self.to_target(target)
                } else {
                    self.error_at_current(&messages::EXPECTED_RESCUE_REFERENCE, &[]);
                    self.missing_node()
                };
                (Some(operator), Some(self.alloc(reference)))
            }
            None => (None, None),
        };
        if self.accept(TokenKind::KeywordThen).is_none() {
            self.accept_separators();
        }

        let in_rescue = std::mem::replace(&mut self.in_rescue, true);
        let statements = self.parse_statements();
        self.in_rescue = in_rescue;

        let consequent = if self.at(TokenKind::KeywordRescue) {
            let clause = self.parse_rescue_clause();
            Some(self.alloc(clause))
        } else {
            None
        };
        let exceptions = self.alloc_nodes(exceptions);
        Node::Rescue {
            location: span(&[&keyword], &[&consequent, &statements, &reference, &exceptions, &keyword]),
            keyword,
            exceptions,
            operator,
            reference,
            statements,
            consequent,
        }
    }

    /// `else` up to, and including, a following `end`.
    fn parse_else_clause(&mut self) -> Node<'a> {
        let else_keyword = self.bump();
        let statements = self.parse_statements();
        let end_keyword = if self.at(TokenKind::KeywordEnd) {
            Some(self.current)
        } else {
            None
        };
        Node::Else {
            location: span(&[&else_keyword], &[&end_keyword, &statements, &else_keyword]),
            else_keyword,
            statements,
            end_keyword,
        }
    }

    // ========================================================================
    // Conditionals
    // ========================================================================

    /// `if` or `unless` with its `elsif` and `else` branches.
    pub(super) fn parse_conditional(&mut self, unless: bool) -> Node<'a> {
        let keyword = self.bump();
        let keyword_text = if unless { "unless" } else { "if" };
        let predicate = self.parse_predicate(keyword_text);
        let statements = self.parse_statements();
        let consequent = if unless {
            if self.at(TokenKind::KeywordElse) {
                let clause = self.parse_else_clause();
                Some(self.alloc(clause))
            } else {
                None
            }
        } else {
            self.parse_if_consequent()
        };
        let end_keyword = self.expect(TokenKind::KeywordEnd, &messages::EXPECTED_END, &[keyword_text]);
        let location = join(keyword.location, end_keyword.location);

        if unless {
            Node::Unless {
                location,
                keyword,
                predicate,
                statements,
                consequent,
                end_keyword: Some(end_keyword),
            }
        } else {
            Node::If {
                location,
                if_keyword: keyword,
                predicate,
                statements,
                consequent,
                end_keyword: Some(end_keyword),
            }
        }
    }

    fn parse_if_consequent(&mut self) -> OptionalNode<'a> {
        match self.current.kind {
            TokenKind::KeywordElsif => {
                let keyword = self.bump();
                let predicate = self.parse_predicate("elsif");
                let statements = self.parse_statements();
                let consequent = self.parse_if_consequent();
                Some(self.alloc(Node::If {
                    location: span(&[&keyword], &[&consequent, &statements, &predicate]),
                    if_keyword: keyword,
                    predicate,
                    statements,
                    consequent,
                    end_keyword: None,
                }))
            }
            TokenKind::KeywordElse => {
                let clause = self.parse_else_clause();
                Some(self.alloc(clause))
            }
            _ => None,
        }
    }

    /// A condition followed by `then` or a separator.
    fn parse_predicate(&mut self, keyword_text: &str) -> &'a Node<'a> {
        let predicate = self.parse_expression_with(BindingPower::Composition, &messages::EXPECTED_PREDICATE, &[keyword_text]);
        let separated = self.accept_separators();
        let then = self.accept(TokenKind::KeywordThen);
        if !separated && then.is_none() && !predicate.is_missing() {
            self.error_at_current(&messages::EXPECTED_CONDITION_THEN, &[keyword_text]);
        }
        self.alloc(predicate)
    }

    // ========================================================================
    // Loops
    // ========================================================================

    /// `while` and `until`.
    pub(super) fn parse_loop(&mut self) -> Node<'a> {
        let keyword = self.bump();
        let keyword_text = if keyword.kind == TokenKind::KeywordWhile { "while" } else { "until" };

        let accepts_do_block = std::mem::replace(&mut self.accepts_do_block, false);
        let predicate =
            self.parse_expression_with(BindingPower::Composition, &messages::EXPECTED_PREDICATE, &[keyword_text]);
        self.accepts_do_block = accepts_do_block;
        if self.accept(TokenKind::KeywordDo).is_none() && !self.accept_separators() && !predicate.is_missing() {
            self.error_at_current(&messages::EXPECTED_LOOP_DO, &[keyword_text]);
        }

        let statements = self.parse_statements();
        let closing = self.expect(TokenKind::KeywordEnd, &messages::EXPECTED_END, &[keyword_text]);
        let location = join(keyword.location, closing.location);
        let predicate = self.alloc(predicate);
        if keyword.kind == TokenKind::KeywordWhile {
            Node::While {
                location,
                keyword,
                closing: Some(closing),
                predicate,
                statements,
            }
        } else {
            Node::Until {
                location,
                keyword,
                closing: Some(closing),
                predicate,
                statements,
            }
        }
    }

    /// `for index in collection do ... end`
    pub(super) fn parse_for(&mut self) -> Node<'a> {
        let for_keyword = self.bump();

        let index = if starts_expression(self.current.kind) {
            let first = self.parse_expression(BindingPower::Index, &messages::EXPECTED_FOR_INDEX);
            let mut targets = self.parse_target_list(first);
            if targets.len() == 1 {
                targets.remove(0)
            } else {
                let location = join(targets[0].location(), targets[targets.len() - 1].location());
                Node::MultiTarget {
                    location,
                    targets: self.alloc_nodes(targets),
                    lparen: None,
                    rparen: None,
                }
            }
        } else {
            self.error_at_current(&messages::EXPECTED_FOR_INDEX, &[]);
            self.missing_node()
        };

        let in_keyword = self.expect(TokenKind::KeywordIn, &messages::EXPECTED_FOR_IN, &[]);
        let accepts_do_block = std::mem::replace(&mut self.accepts_do_block, false);
        let collection = self.parse_expression(BindingPower::Composition, &messages::EXPECTED_FOR_COLLECTION);
        self.accepts_do_block = accepts_do_block;

        let do_keyword = self.accept(TokenKind::KeywordDo);
        if do_keyword.is_none() && !self.accept_separators() && !collection.is_missing() {
            self.error_at_current(&messages::EXPECTED_LOOP_DO, &["for"]);
        }
        let statements = self.parse_statements();
        let end_keyword = self.expect(TokenKind::KeywordEnd, &messages::EXPECTED_END, &["for"]);

        Node::For {
            location: join(for_keyword.location, end_keyword.location),
            index: self.alloc(index),
            collection: self.alloc(collection),
            statements,
            for_keyword,
            in_keyword,
            do_keyword,
            end_keyword,
        }
    }

    // ========================================================================
    // case
    // ========================================================================

    /// `case` with `when` clauses, or with `in` clauses for pattern matching.
    pub(super) fn parse_case(&mut self) -> Node<'a> {
        let case_keyword = self.bump();
        let predicate = if starts_expression(self.current.kind) {
            let predicate = self.parse_expression(BindingPower::Defined, &messages::CANNOT_PARSE_EXPRESSION);
            Some(self.alloc(predicate))
        } else {
            None
        };
        self.accept_separators();

        let mut conditions = Vec::new();
        match self.current.kind {
            TokenKind::KeywordWhen => {
                while self.at(TokenKind::KeywordWhen) {
                    let clause = self.parse_when_clause();
                    conditions.push(clause);
                }
            }
            TokenKind::KeywordIn => {
                while self.at(TokenKind::KeywordIn) {
                    let clause = self.parse_in_clause();
                    conditions.push(clause);
                }
            }
            _ => self.error_at_current(&messages::EXPECTED_CASE_CLAUSE, &[]),
        }

        let consequent = if self.at(TokenKind::KeywordElse) {
            let clause = self.parse_else_clause();
            Some(self.alloc(clause))
        } else {
            None
        };
        let end_keyword = self.expect(TokenKind::KeywordEnd, &messages::EXPECTED_END, &["case"]);

        Node::Case {
            location: join(case_keyword.location, end_keyword.location),
            predicate,
            conditions: self.alloc_nodes(conditions),
            consequent,
            case_keyword,
            end_keyword,
        }
    }

    fn parse_when_clause(&mut self) -> Node<'a> {
        let keyword = self.bump();
        let mut conditions = Vec::new();
        loop {
            let condition = self.parse_expression(BindingPower::Defined, &messages::EXPECTED_WHEN_CONDITION);
            let missing = condition.is_missing();
            conditions.push(condition);
            if missing || self.accept(TokenKind::Comma).is_none() {
                break;
            }
        }
        let complete = conditions.last().map_or(false, |condition| !condition.is_missing());
        if self.accept(TokenKind::KeywordThen).is_none() && !self.accept_separators() && complete {
            self.error_at_current(&messages::EXPECTED_WHEN_DELIMITER, &[]);
        }
        let statements = self.parse_statements();
        let conditions = self.alloc_nodes(conditions);
        Node::When {
            location: span(&[&keyword], &[&statements, &conditions, &keyword]),
            keyword,
            conditions,
            statements,
        }
    }

    fn parse_in_clause(&mut self) -> Node<'a> {
        // Labels may open a bare hash pattern.
        self.lexer.set_state(LexState::BEG | LexState::LABEL);
        let in_keyword = self.bump();
        let mut pattern = self.parse_pattern_top("in");

        if self.at_any(&[TokenKind::KeywordIfModifier, TokenKind::KeywordUnlessModifier]) {
            pattern = self.parse_guard(pattern);
        }
        let then_keyword = self.accept(TokenKind::KeywordThen);
        if then_keyword.is_none() && !self.accept_separators() && !self.on_new_line() && !pattern.is_missing() {
            self.error_at_current(&messages::EXPECTED_IN_DELIMITER, &[]);
        }
        let statements = self.parse_statements();
        let pattern = self.alloc(pattern);
        Node::In {
            location: span(&[&in_keyword], &[&statements, &then_keyword, &pattern]),
            pattern,
            statements,
            in_keyword,
            then_keyword,
        }
    }

    /// `pattern if guard`, held as a conditional whose body is the pattern.
    fn parse_guard(&mut self, pattern: Node<'a>) -> Node<'a> {
        let keyword = self.bump();
        let keyword_text = self.name_at(keyword.location);
        let predicate =
            self.parse_expression_with(BindingPower::Composition, &messages::EXPECTED_MODIFIER_PREDICATE, &[keyword_text]);
        let location = join(pattern.location(), predicate.location());
        let statements = Some(self.single_statement(pattern));
        let predicate = self.alloc(predicate);
        if keyword.kind == TokenKind::KeywordIfModifier {
            Node::If {
                location,
                if_keyword: keyword,
                predicate,
                statements,
                consequent: None,
                end_keyword: None,
            }
        } else {
            Node::Unless {
                location,
                keyword,
                predicate,
                statements,
                consequent: None,
                end_keyword: None,
            }
        }
    }

    // ========================================================================
    // begin
    // ========================================================================

    pub(super) fn parse_begin(&mut self) -> Node<'a> {
        let begin_keyword = self.bump();
        let statements = self.parse_statements();
        let (rescue_clause, else_clause, ensure_clause) = self.parse_rescue_chain();
        let end_keyword = self.expect(TokenKind::KeywordEnd, &messages::EXPECTED_END, &["begin"]);
        Node::Begin {
            location: join(begin_keyword.location, end_keyword.location),
            begin_keyword: Some(begin_keyword),
            statements,
            rescue_clause,
            else_clause,
            ensure_clause,
            end_keyword: Some(end_keyword),
        }
    }

    // ========================================================================
    // Jumps and execution blocks
    // ========================================================================

    /// `return`, `break` and `next`, with optional arguments.
    pub(super) fn parse_jump(&mut self) -> Node<'a> {
        let keyword = self.bump();
        if keyword.kind == TokenKind::KeywordReturn && self.scopes.in_class_body() {
            self.error(keyword.location, &messages::INVALID_RETURN_IN_CLASS, &[]);
        }

        let arguments = if starts_expression(self.current.kind) {
            let list = self.parse_command_arguments();
            self.finish_argument_list(list).0
        } else {
            None
        };
        let location = span(&[&keyword], &[&arguments, &keyword]);
        match keyword.kind {
            TokenKind::KeywordReturn => Node::Return {
                location,
                keyword,
                arguments,
            },
            TokenKind::KeywordBreak => Node::Break {
                location,
                arguments,
                keyword,
            },
            _ => Node::Next {
                location,
                arguments,
                keyword,
            },
        }
    }

    /// `BEGIN { ... }` and `END { ... }`. A missing brace is stood in for
    /// and the body is still parsed.
    pub(super) fn parse_execution_block(&mut self) -> Node<'a> {
        let keyword = self.bump();
        let pre = keyword.kind == TokenKind::KeywordBeginUpcase;
        if pre && !self.scopes.is_top_level() {
            self.error(keyword.location, &messages::BEGIN_UPCASE_TOPLEVEL, &[]);
        }

        let (brace_message, term_message) = if pre {
            (&messages::EXPECTED_BEGIN_UPCASE_BRACE, &messages::EXPECTED_BEGIN_UPCASE_TERM)
        } else {
            (&messages::EXPECTED_END_UPCASE_BRACE, &messages::EXPECTED_END_UPCASE_TERM)
        };
        let opening = self.expect(TokenKind::BraceLeft, brace_message, &[]);
        let statements = self.parse_statements();
        let closing = self.expect(TokenKind::BraceRight, term_message, &[]);

        let location = join(keyword.location, closing.location);
        if pre {
            Node::PreExecution {
                location,
                statements,
                keyword,
                opening,
                closing,
            }
        } else {
            Node::PostExecution {
                location,
                statements,
                keyword,
                opening,
                closing,
            }
        }
    }
}

