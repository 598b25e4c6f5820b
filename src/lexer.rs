//! Hand-written lexer for route patterns. Turns a pattern string such as
//! `"deploy {env} --force,-f --replicas {n:int?}"` into a flat [`Token`]
//! stream; never fails outright — ambiguous fragments come back as a single
//! [`TokenKind::Invalid`] token so the parser has one clean error site per
//! problem instead of a cascade of misleading punctuation tokens.

use crate::token::{Token, TokenKind};

struct Cursor {
    chars: Vec<char>,
    pos: usize,
    /// Number of unclosed `{` seen so far; used to decide how description
    /// text after `|` is terminated (see module docs on context sensitivity).
    brace_depth: usize,
}

impl Cursor {
    fn new(pattern: &str) -> Self {
        Self {
            chars: pattern.chars().collect(),
            pos: 0,
            brace_depth: 0,
        }
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.chars.get(self.pos).copied();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn slice(&self, start: usize, end: usize) -> String {
        self.chars[start..end].iter().collect()
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

fn is_top_level_boundary(c: char) -> bool {
    c.is_whitespace()
}

/// Tokenize a route pattern. Always terminates with a trailing
/// [`TokenKind::EndOfInput`] token.
pub fn tokenize(pattern: &str) -> Vec<Token> {
    let mut cursor = Cursor::new(pattern);
    let mut tokens = Vec::new();

    while !cursor.at_end() {
        let start = cursor.pos;
        let c = cursor.peek(0).unwrap();

        if c.is_whitespace() {
            cursor.advance();
            continue;
        }

        match c {
            '{' => {
                cursor.advance();
                cursor.brace_depth += 1;
                tokens.push(Token::new(TokenKind::LeftBrace, "{", start));
            }
            '}' => {
                cursor.advance();
                cursor.brace_depth = cursor.brace_depth.saturating_sub(1);
                tokens.push(Token::new(TokenKind::RightBrace, "}", start));
            }
            ':' => {
                cursor.advance();
                tokens.push(Token::new(TokenKind::Colon, ":", start));
            }
            '?' => {
                cursor.advance();
                tokens.push(Token::new(TokenKind::QuestionMark, "?", start));
            }
            '*' => {
                cursor.advance();
                tokens.push(Token::new(TokenKind::Asterisk, "*", start));
            }
            ',' => {
                cursor.advance();
                tokens.push(Token::new(TokenKind::Comma, ",", start));
            }
            '|' => {
                cursor.advance();
                tokens.push(Token::new(TokenKind::Pipe, "|", start));
                lex_description(&mut cursor, &mut tokens);
            }
            '-' => lex_dash(&mut cursor, &mut tokens, start),
            c if is_ident_start(c) => lex_identifier(&mut cursor, &mut tokens, start),
            _ => {
                cursor.advance();
                tokens.push(Token::new(TokenKind::Invalid, c.to_string(), start));
            }
        }
    }

    tokens.push(Token::new(TokenKind::EndOfInput, "", cursor.pos));
    tokens
}

/// Scan a `[A-Za-z_][A-Za-z0-9_-]*` run starting at `start` and classify it
/// as `Identifier` or `Invalid` per the internal/trailing-dash rules.
fn lex_identifier(cursor: &mut Cursor, tokens: &mut Vec<Token>, start: usize) {
    cursor.advance();
    while let Some(c) = cursor.peek(0) {
        if is_ident_continue(c) {
            cursor.advance();
        } else {
            break;
        }
    }
    let text = cursor.slice(start, cursor.pos);
    push_identifier_or_invalid(tokens, text, start);
}

fn push_identifier_or_invalid(tokens: &mut Vec<Token>, text: String, start: usize) {
    if text.contains("--") || text.ends_with('-') {
        tokens.push(Token::new(TokenKind::Invalid, text, start));
    } else {
        tokens.push(Token::new(TokenKind::Identifier, text, start));
    }
}

/// Handle a token that begins with `-`: `--ident` (LongDash + Identifier),
/// bare `--` (EndOfOptions), `-x` (ShortDash + single-letter Identifier), or
/// one of the ambiguous shapes that must come back as a single `Invalid`.
fn lex_dash(cursor: &mut Cursor, tokens: &mut Vec<Token>, start: usize) {
    cursor.advance(); // first '-'

    if cursor.peek(0) == Some('-') {
        cursor.advance(); // second '-'
        match cursor.peek(0) {
            Some(c) if is_ident_start(c) => {
                tokens.push(Token::new(TokenKind::LongDash, "--", start));
                let ident_start = cursor.pos;
                lex_identifier(cursor, tokens, ident_start);
            }
            None => {
                tokens.push(Token::new(TokenKind::EndOfOptions, "--", start));
            }
            Some(c) if is_top_level_boundary(c) => {
                tokens.push(Token::new(TokenKind::EndOfOptions, "--", start));
            }
            Some(_) => {
                // "--," "--:" etc: not an identifier-bearing long option and
                // not a clean end-of-options either; still unambiguous as
                // end-of-options since it isn't "-- followed by identifier".
                tokens.push(Token::new(TokenKind::EndOfOptions, "--", start));
            }
        }
        return;
    }

    // Single '-'. Measure the identifier-like run that follows.
    let run_start = cursor.pos;
    while let Some(c) = cursor.peek(0) {
        if is_ident_continue(c) {
            cursor.advance();
        } else {
            break;
        }
    }
    let run_len = cursor.pos - run_start;
    let single_letter = run_len == 1 && cursor.chars[run_start].is_ascii_alphabetic();

    if single_letter {
        tokens.push(Token::new(TokenKind::ShortDash, "-", start));
        let text = cursor.slice(run_start, cursor.pos);
        tokens.push(Token::new(TokenKind::Identifier, text, run_start));
    } else {
        // run_len == 0 (bare trailing '-'), a single non-letter (e.g. "-3"),
        // or run_len > 1 ("-foobar"): all ambiguous between "option + text"
        // and "malformed name".
        let text = cursor.slice(start, cursor.pos);
        tokens.push(Token::new(TokenKind::Invalid, text, start));
    }
}

/// Scan description text following a `|`. Inside an unclosed parameter
/// (`brace_depth > 0`) the text runs until an unescaped `{`/`}` or end of
/// input, so embedded spaces are preserved; at the top level it stops at the
/// next whitespace, matching the "only place spaces are meaningful" rule.
fn lex_description(cursor: &mut Cursor, tokens: &mut Vec<Token>) {
    let start = cursor.pos;
    let inside_parameter = cursor.brace_depth > 0;
    let mut text = String::new();

    while let Some(c) = cursor.peek(0) {
        if c == '\\' {
            if let Some(next) = cursor.peek(1) {
                if next == '{' || next == '}' {
                    cursor.advance();
                    cursor.advance();
                    text.push(next);
                    continue;
                }
            }
        }

        if inside_parameter {
            if c == '{' || c == '}' {
                break;
            }
        } else if is_top_level_boundary(c) || c == '{' || c == '}' {
            break;
        }

        text.push(c);
        cursor.advance();
    }

    if !text.is_empty() {
        tokens.push(Token::new(TokenKind::DescriptionText, text, start));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(pattern: &str) -> Vec<TokenKind> {
        tokenize(pattern).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn empty_pattern_is_just_eoi() {
        assert_eq!(kinds(""), vec![TokenKind::EndOfInput]);
    }

    #[test]
    fn plain_literal() {
        assert_eq!(
            kinds("deploy"),
            vec![TokenKind::Identifier, TokenKind::EndOfInput]
        );
    }

    #[test]
    fn parameter_with_type_and_optional() {
        let toks = kinds("{n:int?}");
        assert_eq!(
            toks,
            vec![
                TokenKind::LeftBrace,
                TokenKind::Identifier,
                TokenKind::Colon,
                TokenKind::Identifier,
                TokenKind::QuestionMark,
                TokenKind::RightBrace,
                TokenKind::EndOfInput,
            ]
        );
    }

    #[test]
    fn catch_all_parameter() {
        let toks = kinds("{*args}");
        assert_eq!(
            toks,
            vec![
                TokenKind::LeftBrace,
                TokenKind::Asterisk,
                TokenKind::Identifier,
                TokenKind::RightBrace,
                TokenKind::EndOfInput,
            ]
        );
    }

    #[test]
    fn long_option_with_short_alias() {
        let toks = kinds("--force,-f");
        assert_eq!(
            toks,
            vec![
                TokenKind::LongDash,
                TokenKind::Identifier,
                TokenKind::Comma,
                TokenKind::ShortDash,
                TokenKind::Identifier,
                TokenKind::EndOfInput,
            ]
        );
    }

    #[test]
    fn bare_end_of_options_is_rejected_shape() {
        // Lexically this is legal (EndOfOptions token); the parser is the
        // one that rejects "--" as a pattern literal.
        assert_eq!(
            kinds("--"),
            vec![TokenKind::EndOfOptions, TokenKind::EndOfInput]
        );
    }

    #[test]
    fn option_description_stops_at_whitespace() {
        let toks = tokenize("--force|force it more");
        assert_eq!(toks[2].kind, TokenKind::DescriptionText);
        assert_eq!(toks[2].lexeme, "force");
    }

    #[test]
    fn parameter_description_keeps_spaces() {
        let toks = tokenize("{env|the target environment}");
        let desc = toks.iter().find(|t| t.kind == TokenKind::DescriptionText);
        assert_eq!(desc.unwrap().lexeme, "the target environment");
    }

    #[test]
    fn internal_double_dash_is_invalid() {
        let toks = tokenize("foo--bar");
        assert_eq!(toks.len(), 2);
        assert_eq!(toks[0].kind, TokenKind::Invalid);
        assert_eq!(toks[0].lexeme, "foo--bar");
    }

    #[test]
    fn trailing_dash_is_invalid() {
        let toks = tokenize("foo-");
        assert_eq!(toks.len(), 2);
        assert_eq!(toks[0].kind, TokenKind::Invalid);
        assert_eq!(toks[0].lexeme, "foo-");
    }

    #[test]
    fn short_dash_with_long_name_is_invalid() {
        let toks = tokenize("-foobar");
        assert_eq!(toks.len(), 2);
        assert_eq!(toks[0].kind, TokenKind::Invalid);
        assert_eq!(toks[0].lexeme, "-foobar");
    }

    #[test]
    fn positions_are_character_offsets() {
        let toks = tokenize("a {b}");
        let left_brace = &toks[1];
        assert_eq!(left_brace.kind, TokenKind::LeftBrace);
        assert_eq!(left_brace.position, 2);
    }
}
