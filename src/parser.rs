//! Recursive-descent parser: turns a token stream into a [`PatternAst`],
//! accumulating as many [`ParseError`]s as it can rather than stopping at
//! the first problem.

use std::collections::HashSet;

use crate::ast::{OptionNode, ParameterNode, PatternAst, SegmentNode};
use crate::error::{ParseError, ParseErrorKind, Span};
use crate::token::{Token, TokenKind};

pub struct ParseOutcome {
    pub ast: Option<PatternAst>,
    pub errors: Vec<ParseError>,
}

pub fn parse(tokens: Vec<Token>) -> ParseOutcome {
    let mut parser = Parser::new(tokens);
    parser.run();
    let errors = parser.errors;
    let ast = if errors.is_empty() {
        Some(PatternAst {
            segments: parser.segments,
        })
    } else {
        None
    };
    ParseOutcome { ast, errors }
}

/// Token kinds that plausibly begin a new segment; used both by the main
/// loop dispatch and by error recovery.
fn starts_segment(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Identifier
            | TokenKind::LeftBrace
            | TokenKind::LongDash
            | TokenKind::ShortDash
            | TokenKind::EndOfInput
    )
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    segments: Vec<SegmentNode>,
    errors: Vec<ParseError>,
    seen_catch_all_at: Option<usize>,
    catch_all_name: String,
    catch_all_error_reported: bool,
    long_names: HashSet<String>,
    short_names: HashSet<String>,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            segments: Vec::new(),
            errors: Vec::new(),
            seen_catch_all_at: None,
            catch_all_name: String::new(),
            catch_all_error_reported: false,
            long_names: HashSet::new(),
            short_names: HashSet::new(),
        }
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset)
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn error(&mut self, kind: ParseErrorKind, span: Span) {
        self.errors.push(ParseError::new(kind, span));
    }

    fn synchronize(&mut self) {
        while !starts_segment(self.peek().kind) {
            self.advance();
        }
    }

    fn run(&mut self) {
        loop {
            if self.seen_catch_all_at.is_some() && !self.catch_all_error_reported {
                if self.peek().kind != TokenKind::EndOfInput {
                    let pos = self.seen_catch_all_at.unwrap();
                    self.error(
                        ParseErrorKind::CatchAllNotLast(self.catch_all_name.clone()),
                        Span::point(pos),
                    );
                    self.catch_all_error_reported = true;
                }
            }

            match self.peek().kind {
                TokenKind::EndOfInput => break,
                TokenKind::Identifier => self.parse_literal(),
                TokenKind::LeftBrace => self.parse_top_level_parameter(),
                TokenKind::LongDash | TokenKind::ShortDash => self.parse_option(),
                TokenKind::EndOfOptions => {
                    let tok = self.advance();
                    self.error(ParseErrorKind::EndOfOptionsLiteral, span_of(&tok));
                    self.synchronize();
                }
                TokenKind::RightBrace => {
                    let tok = self.advance();
                    self.error(ParseErrorKind::UnmatchedBrace('}'), span_of(&tok));
                    self.synchronize();
                }
                TokenKind::Invalid => self.parse_invalid_at_top_level(),
                other => {
                    let tok = self.advance();
                    self.error(
                        ParseErrorKind::MissingRequiredToken(format!(
                            "a literal, parameter, or option (found {other:?})"
                        )),
                        span_of(&tok),
                    );
                    self.synchronize();
                }
            }
        }
    }

    fn parse_literal(&mut self) {
        let tok = self.advance();
        self.segments.push(SegmentNode::Literal {
            value: tok.lexeme,
            position: tok.position,
        });
    }

    /// `<name>` is a common typo for `{name}`; special-case it for a
    /// friendlier diagnostic before falling back to a generic report.
    fn parse_invalid_at_top_level(&mut self) {
        if self.peek().lexeme == "<" {
            if let (Some(name_tok), Some(close_tok)) =
                (self.peek_at(1), self.peek_at(2))
            {
                if name_tok.kind == TokenKind::Identifier && close_tok.lexeme == ">" {
                    let name = name_tok.lexeme.clone();
                    let start = self.peek().position;
                    let end = close_tok.position + close_tok.length;
                    self.advance();
                    self.advance();
                    self.advance();
                    self.error(
                        ParseErrorKind::InvalidParameterSyntax(name.clone()),
                        Span::new(start, end - start),
                    );
                    return;
                }
            }
        }

        let tok = self.advance();
        self.error(
            ParseErrorKind::InvalidIdentifier(tok.lexeme.clone()),
            span_of(&tok),
        );
        self.synchronize();
    }

    /// `"{" ["*"] Identifier ["?"] [":" type ["?"]] ["|" DescriptionText] "}"`
    fn parse_top_level_parameter(&mut self) {
        let brace = self.advance(); // consume '{'
        match self.parse_parameter_body(brace.position, true) {
            Some(param) => {
                if param.is_catch_all {
                    self.seen_catch_all_at = Some(param.position);
                    self.catch_all_name = param.name.clone();
                }
                self.segments.push(SegmentNode::Parameter(param));
            }
            None => self.synchronize(),
        }
    }

    /// Parses the interior of a parameter, assuming the opening `{` has
    /// already been consumed, and the closing `}` still needs to be. When
    /// `allow_catch_all` is false (option value parameters), a leading `*`
    /// is reported the same way an out-of-place catch-all would be.
    fn parse_parameter_body(
        &mut self,
        open_position: usize,
        allow_catch_all: bool,
    ) -> Option<ParameterNode> {
        let mut is_catch_all = false;
        if self.peek().kind == TokenKind::Asterisk {
            self.advance();
            is_catch_all = true;
        }

        if self.peek().kind != TokenKind::Identifier {
            self.error(
                ParseErrorKind::MissingRequiredToken("a parameter name".into()),
                Span::point(self.peek().position),
            );
            return None;
        }
        let name_tok = self.advance();

        if is_catch_all && !allow_catch_all {
            self.error(
                ParseErrorKind::CatchAllNotLast(name_tok.lexeme.clone()),
                Span::point(open_position),
            );
        }

        let mut is_optional = false;
        if self.peek().kind == TokenKind::QuestionMark {
            self.advance();
            is_optional = true;
        }

        let mut type_constraint = None;
        if self.peek().kind == TokenKind::Colon {
            self.advance();
            match self.peek().kind {
                TokenKind::Identifier => {
                    type_constraint = Some(self.advance().lexeme);
                }
                TokenKind::Invalid => {
                    let tok = self.advance();
                    self.error(
                        ParseErrorKind::InvalidTypeConstraint(tok.lexeme.clone()),
                        span_of(&tok),
                    );
                }
                _ => {
                    self.error(
                        ParseErrorKind::MissingRequiredToken(
                            "a type name after ':'".into(),
                        ),
                        Span::point(self.peek().position),
                    );
                }
            }
            if self.peek().kind == TokenKind::QuestionMark {
                self.advance();
                is_optional = true;
            }
        }

        let mut description = None;
        if self.peek().kind == TokenKind::Pipe {
            self.advance();
            if self.peek().kind == TokenKind::DescriptionText {
                description = Some(self.advance().lexeme);
            }
        }

        if self.peek().kind != TokenKind::RightBrace {
            self.error(
                ParseErrorKind::UnmatchedBrace('{'),
                Span::point(open_position),
            );
            return None;
        }
        self.advance(); // consume '}'

        Some(ParameterNode {
            name: name_tok.lexeme,
            type_constraint,
            description,
            is_catch_all,
            is_optional,
            position: open_position,
        })
    }

    /// `("--" Identifier | "-" Identifier) ("," ("-"|"--") Identifier)? [parameter] ["|" DescriptionText]`
    fn parse_option(&mut self) {
        let position = self.peek().position;
        let mut long_name = None;
        let mut short_name = None;

        self.consume_option_name(&mut long_name, &mut short_name);

        if self.peek().kind == TokenKind::Comma {
            self.advance();
            self.consume_option_name(&mut long_name, &mut short_name);
        }

        if let Some(name) = &long_name {
            if !self.long_names.insert(name.clone()) {
                self.error(
                    ParseErrorKind::DuplicateOptionAlias(format!("--{name}")),
                    Span::point(position),
                );
            }
        }
        if let Some(name) = &short_name {
            if !self.short_names.insert(name.clone()) {
                self.error(
                    ParseErrorKind::DuplicateOptionAlias(format!("-{name}")),
                    Span::point(position),
                );
            }
        }

        let mut value_param = None;
        if self.peek().kind == TokenKind::LeftBrace {
            let brace = self.advance();
            value_param = self.parse_parameter_body(brace.position, false);
        }

        let mut description = None;
        if self.peek().kind == TokenKind::Pipe {
            self.advance();
            if self.peek().kind == TokenKind::DescriptionText {
                description = Some(self.advance().lexeme);
            }
        }

        self.segments.push(SegmentNode::Option(OptionNode {
            long_name,
            short_name,
            description,
            value_param,
            is_repeated: false,
            position,
        }));
    }

    /// Consumes a `"--" Identifier` or `"-" Identifier` pair, filling in
    /// whichever of `long_name`/`short_name` it produces.
    fn consume_option_name(&mut self, long_name: &mut Option<String>, short_name: &mut Option<String>) {
        match self.peek().kind {
            TokenKind::LongDash => {
                self.advance();
                if self.peek().kind == TokenKind::Identifier {
                    *long_name = Some(self.advance().lexeme);
                } else if self.peek().kind == TokenKind::Invalid {
                    let tok = self.advance();
                    self.error(
                        ParseErrorKind::InvalidIdentifier(tok.lexeme.clone()),
                        span_of(&tok),
                    );
                }
            }
            TokenKind::ShortDash => {
                self.advance();
                if self.peek().kind == TokenKind::Identifier {
                    *short_name = Some(self.advance().lexeme);
                } else if self.peek().kind == TokenKind::Invalid {
                    let tok = self.advance();
                    self.error(
                        ParseErrorKind::InvalidIdentifier(tok.lexeme.clone()),
                        span_of(&tok),
                    );
                }
            }
            _ => {
                self.error(
                    ParseErrorKind::MissingRequiredToken("'--name' or '-n'".into()),
                    Span::point(self.peek().position),
                );
            }
        }
    }
}

fn span_of(token: &Token) -> Span {
    Span::new(token.position, token.length.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn parse_pattern(pattern: &str) -> ParseOutcome {
        parse(tokenize(pattern))
    }

    #[test]
    fn empty_pattern_parses_to_empty_ast() {
        let outcome = parse_pattern("");
        assert!(outcome.errors.is_empty());
        assert_eq!(outcome.ast.unwrap().segments.len(), 0);
    }

    #[test]
    fn literal_and_parameter() {
        let outcome = parse_pattern("deploy {env}");
        assert!(outcome.errors.is_empty(), "{:?}", outcome.errors);
        let ast = outcome.ast.unwrap();
        assert_eq!(ast.segments.len(), 2);
        match &ast.segments[1] {
            SegmentNode::Parameter(p) => assert_eq!(p.name, "env"),
            other => panic!("expected parameter, got {other:?}"),
        }
    }

    #[test]
    fn option_with_alias_and_typed_optional_value() {
        let outcome = parse_pattern("deploy {env} --force,-f --replicas {n:int?}");
        assert!(outcome.errors.is_empty(), "{:?}", outcome.errors);
        let ast = outcome.ast.unwrap();
        let force = ast
            .segments
            .iter()
            .find_map(|s| match s {
                SegmentNode::Option(o) if o.long_name.as_deref() == Some("force") => Some(o),
                _ => None,
            })
            .unwrap();
        assert_eq!(force.short_name.as_deref(), Some("f"));

        let replicas = ast
            .segments
            .iter()
            .find_map(|s| match s {
                SegmentNode::Option(o) if o.long_name.as_deref() == Some("replicas") => Some(o),
                _ => None,
            })
            .unwrap();
        let value = replicas.value_param.as_ref().unwrap();
        assert_eq!(value.name, "n");
        assert_eq!(value.type_constraint.as_deref(), Some("int"));
        assert!(value.is_optional);
    }

    #[test]
    fn catch_all_must_be_last() {
        let outcome = parse_pattern("exec {*args} extra");
        assert_eq!(outcome.errors.len(), 1);
        assert!(matches!(
            outcome.errors[0].kind,
            ParseErrorKind::CatchAllNotLast(_)
        ));
    }

    #[test]
    fn catch_all_alone_is_fine() {
        let outcome = parse_pattern("exec {*args}");
        assert!(outcome.errors.is_empty());
    }

    #[test]
    fn angle_bracket_parameter_syntax_suggests_braces() {
        let outcome = parse_pattern("deploy <env>");
        assert_eq!(outcome.errors.len(), 1);
        match &outcome.errors[0].kind {
            ParseErrorKind::InvalidParameterSyntax(name) => assert_eq!(name, "env"),
            other => panic!("expected InvalidParameterSyntax, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_option_alias_is_an_error() {
        let outcome = parse_pattern("run --force --force");
        assert_eq!(outcome.errors.len(), 1);
        assert!(matches!(
            outcome.errors[0].kind,
            ParseErrorKind::DuplicateOptionAlias(_)
        ));
    }

    #[test]
    fn unmatched_brace_is_reported() {
        let outcome = parse_pattern("deploy {env");
        assert_eq!(outcome.ast, None);
        assert!(outcome
            .errors
            .iter()
            .any(|e| matches!(e.kind, ParseErrorKind::UnmatchedBrace('{'))));
    }

    #[test]
    fn end_of_options_literal_is_rejected() {
        let outcome = parse_pattern("foo --");
        assert!(outcome
            .errors
            .iter()
            .any(|e| matches!(e.kind, ParseErrorKind::EndOfOptionsLiteral)));
    }

    #[test]
    fn option_value_param_cannot_be_catch_all() {
        let outcome = parse_pattern("run --tag {*x}");
        assert!(outcome
            .errors
            .iter()
            .any(|e| matches!(e.kind, ParseErrorKind::CatchAllNotLast(_))));
    }

    #[test]
    fn recovers_after_invalid_segment_to_report_multiple_errors() {
        let outcome = parse_pattern("foo--bar {env} -verbose");
        // foo--bar -> InvalidIdentifier, -verbose -> InvalidIdentifier, both
        // reported in one pass.
        assert_eq!(outcome.errors.len(), 2);
    }
}
