//! Completion engine: given a raw input buffer, produces a ranked,
//! de-duplicated list of candidate next tokens for a line editor.

pub mod tokenizer;

use std::collections::HashMap;

use crate::converters::ConverterRegistry;
use crate::endpoint::{Endpoint, EndpointTable};
use crate::matcher::Matcher;
use tokenizer::{tokenize, tokenize_all, ParsedInput};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CandidateKind {
    Command,
    Subcommand,
    Parameter,
    LongOption,
    ShortOption,
    EnumValue,
    Help,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionCandidate {
    pub value: String,
    pub kind: CandidateKind,
    pub description: Option<String>,
    pub requires_value: bool,
}

impl CompletionCandidate {
    fn new(value: impl Into<String>, kind: CandidateKind) -> Self {
        Self {
            value: value.into(),
            kind,
            description: None,
            requires_value: false,
        }
    }
}

struct RouteMatchState<'a> {
    viable: bool,
    literal_matched: bool,
    next_candidates: Vec<CompletionCandidate>,
    _endpoint: &'a Endpoint,
}

pub fn complete(
    buffer: &str,
    table: &EndpointTable,
    converters: &ConverterRegistry,
) -> Vec<CompletionCandidate> {
    complete_with(tokenize_all(buffer), table, converters)
}

/// Like [`complete`], but the cursor may sit before the end of `buffer`
/// (`cursor_index`, a byte offset) — used by line editors that allow
/// completing in the middle of a word.
pub fn complete_at(
    buffer: &str,
    cursor_index: usize,
    table: &EndpointTable,
    converters: &ConverterRegistry,
) -> Vec<CompletionCandidate> {
    complete_with(tokenize(buffer, cursor_index), table, converters)
}

fn complete_with(
    parsed: ParsedInput,
    table: &EndpointTable,
    converters: &ConverterRegistry,
) -> Vec<CompletionCandidate> {
    let raw_candidates = if parsed.completed_words.is_empty() && !parsed.has_trailing_space {
        empty_buffer_candidates(table)
    } else {
        candidates_from_states(&parsed, table, converters)
    };

    let filtered = filter_by_partial(raw_candidates, parsed.partial_word.as_deref());
    order_and_dedup(filtered)
}

fn empty_buffer_candidates(table: &EndpointTable) -> Vec<CompletionCandidate> {
    let mut out: Vec<CompletionCandidate> = table
        .distinct_first_literals()
        .into_iter()
        .map(|lit| CompletionCandidate::new(lit, CandidateKind::Command))
        .collect();

    for endpoint in table.candidates_for_first_word("") {
        if endpoint.compiled.segments.iter().any(|m| matches!(m, Matcher::Literal(_))) {
            continue;
        }
        out.extend(option_candidates(endpoint, &[]));
    }
    out
}

fn candidates_from_states(
    parsed: &ParsedInput,
    table: &EndpointTable,
    converters: &ConverterRegistry,
) -> Vec<CompletionCandidate> {
    let first_word = parsed
        .completed_words
        .first()
        .map(String::as_str)
        .unwrap_or("");
    let mut out = Vec::new();
    let mut any_literal_matched = false;

    for endpoint in table.candidates_for_first_word(first_word) {
        let state = soft_match(endpoint, &parsed.completed_words, converters);
        if !state.viable {
            continue;
        }
        any_literal_matched |= state.literal_matched;
        out.extend(state.next_candidates);
    }

    if any_literal_matched {
        out.push(CompletionCandidate::new("--help", CandidateKind::Help));
        out.push(CompletionCandidate::new("-h", CandidateKind::Help));
    }

    out
}

fn soft_match<'a>(
    endpoint: &'a Endpoint,
    completed_words: &[String],
    converters: &ConverterRegistry,
) -> RouteMatchState<'a> {
    let route = &endpoint.compiled;
    let mut consumed = vec![false; completed_words.len()];
    let mut seen_end_of_options = false;
    let mut used_options: Vec<&crate::matcher::OptionMatcher> = Vec::new();
    let mut literal_matched = false;
    let not_viable = || RouteMatchState {
        viable: false,
        literal_matched: false,
        next_candidates: Vec::new(),
        _endpoint: endpoint,
    };

    let mut i = 0;
    while i < completed_words.len() {
        if consumed[i] {
            i += 1;
            continue;
        }
        let arg = completed_words[i].as_str();
        if !seen_end_of_options && arg == "--" {
            seen_end_of_options = true;
            consumed[i] = true;
            i += 1;
            continue;
        }
        if !seen_end_of_options && arg.starts_with('-') && arg != "-" {
            match route.options().find(|o| o.matches_token(arg)) {
                Some(opt) => {
                    consumed[i] = true;
                    if opt.value_param.is_some() {
                        if let Some(idx) = (i + 1..consumed.len()).find(|&j| !consumed[j]) {
                            consumed[idx] = true;
                        }
                    }
                    used_options.push(opt);
                }
                None => return not_viable(),
            }
        }
        i += 1;
    }

    let remaining: Vec<usize> = (0..completed_words.len()).filter(|&idx| !consumed[idx]).collect();
    let mut walk = 0usize;
    let mut current_positional: Option<&Matcher> = None;
    let mut has_positional_segments = false;

    for segment in route.positional_segments() {
        has_positional_segments = true;
        if walk >= remaining.len() {
            current_positional = Some(segment);
            break;
        }
        match segment {
            Matcher::Literal(literal) => {
                let idx = remaining[walk];
                if completed_words[idx] == literal.value {
                    literal_matched = true;
                    walk += 1;
                } else {
                    return not_viable();
                }
            }
            Matcher::Parameter(p) if p.is_catch_all => {
                walk = remaining.len();
            }
            Matcher::Parameter(_) => {
                walk += 1;
            }
            Matcher::Option(_) => unreachable!("positional_segments excludes options"),
        }
    }

    if has_positional_segments && current_positional.is_none() && walk < remaining.len() {
        return not_viable();
    }

    let mut candidates = Vec::new();
    if let Some(segment) = current_positional {
        match segment {
            Matcher::Literal(literal) => {
                let kind = if literal_matched {
                    CandidateKind::Subcommand
                } else {
                    CandidateKind::Command
                };
                candidates.push(CompletionCandidate::new(literal.value.clone(), kind));
            }
            Matcher::Parameter(p) if !p.is_catch_all => {
                if let Some(type_name) = &p.type_constraint {
                    if let Some(converter) = converters.get(type_name) {
                        if let Some(values) = converter.enum_values() {
                            for v in values {
                                candidates.push(CompletionCandidate::new(v, CandidateKind::EnumValue));
                            }
                        }
                    }
                }
            }
            _ => {}
        }
    }

    candidates.extend(option_candidates(endpoint, &used_options));

    RouteMatchState {
        viable: true,
        literal_matched,
        next_candidates: candidates,
        _endpoint: endpoint,
    }
}

fn option_candidates(
    endpoint: &Endpoint,
    used: &[&crate::matcher::OptionMatcher],
) -> Vec<CompletionCandidate> {
    let mut out = Vec::new();
    for opt in endpoint.compiled.options() {
        if used.iter().any(|u| std::ptr::eq(*u, opt)) {
            continue;
        }
        if let Some(long) = &opt.long_name {
            let mut c = CompletionCandidate::new(format!("--{long}"), CandidateKind::LongOption);
            c.requires_value = opt.value_param.is_some();
            out.push(c);
        }
        if let Some(short) = &opt.short_name {
            let mut c = CompletionCandidate::new(format!("-{short}"), CandidateKind::ShortOption);
            c.requires_value = opt.value_param.is_some();
            out.push(c);
        }
    }
    out
}

fn filter_by_partial(
    candidates: Vec<CompletionCandidate>,
    partial: Option<&str>,
) -> Vec<CompletionCandidate> {
    match partial {
        None => candidates,
        Some(prefix) => {
            let prefix = prefix.to_ascii_lowercase();
            candidates
                .into_iter()
                .filter(|c| c.value.to_ascii_lowercase().starts_with(&prefix))
                .collect()
        }
    }
}

fn order_and_dedup(candidates: Vec<CompletionCandidate>) -> Vec<CompletionCandidate> {
    let mut by_key: HashMap<String, CompletionCandidate> = HashMap::new();
    for candidate in candidates {
        by_key.entry(candidate.value.to_ascii_lowercase()).or_insert(candidate);
    }
    let mut out: Vec<CompletionCandidate> = by_key.into_values().collect();
    out.sort_by(|a, b| a.kind.cmp(&b.kind).then_with(|| a.value.cmp(&b.value)));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::compile;
    use crate::endpoint::{Endpoint, HandlerOutcome, MessageType};
    use crate::lexer::tokenize as lex;
    use crate::parser::parse;
    use std::sync::Arc;

    fn register(table: &mut EndpointTable, pattern: &str) {
        let outcome = parse(lex(pattern));
        let compiled = compile(&outcome.ast.unwrap(), table.len() as u64, pattern);
        table.insert(Endpoint {
            pattern: pattern.to_string(),
            compiled: Arc::new(compiled),
            description: None,
            message_type: MessageType::Unspecified,
            handler: Arc::new(|_| HandlerOutcome::Ok),
        });
    }

    #[test]
    fn empty_buffer_lists_every_distinct_first_literal() {
        let mut table = EndpointTable::new();
        register(&mut table, "git status");
        register(&mut table, "git commit");
        register(&mut table, "greet {name}");
        let converters = ConverterRegistry::with_builtins();

        let candidates = complete("", &table, &converters);
        let values: Vec<&str> = candidates.iter().map(|c| c.value.as_str()).collect();
        assert!(values.contains(&"git"));
        assert!(values.contains(&"greet"));
    }

    #[test]
    fn trailing_space_suggests_options_not_the_literal_again() {
        let mut table = EndpointTable::new();
        register(&mut table, "backup {src} --compress");
        let converters = ConverterRegistry::with_builtins();

        let candidates = complete("backup ", &table, &converters);
        let values: Vec<&str> = candidates.iter().map(|c| c.value.as_str()).collect();
        assert!(values.contains(&"--compress"));
        assert!(!values.contains(&"backup"));
    }

    #[test]
    fn partial_word_filters_by_prefix() {
        let mut table = EndpointTable::new();
        register(&mut table, "backup {src} --compress");
        register(&mut table, "restore {dst}");
        let converters = ConverterRegistry::with_builtins();

        let candidates = complete("backup --com", &table, &converters);
        let values: Vec<&str> = candidates.iter().map(|c| c.value.as_str()).collect();
        assert!(values.contains(&"--compress"));
        assert!(!values.contains(&"restore"));
    }

    #[test]
    fn used_option_is_not_suggested_again() {
        let mut table = EndpointTable::new();
        register(&mut table, "backup {src} --compress --verbose");
        let converters = ConverterRegistry::with_builtins();

        let candidates = complete("backup x --compress ", &table, &converters);
        let values: Vec<&str> = candidates.iter().map(|c| c.value.as_str()).collect();
        assert!(!values.contains(&"--compress"));
        assert!(values.contains(&"--verbose"));
    }

    #[test]
    fn single_letter_prefix_matches_distinct_commands_without_duplicates() {
        let mut table = EndpointTable::new();
        register(&mut table, "git status");
        register(&mut table, "git commit");
        register(&mut table, "greet {name}");
        let converters = ConverterRegistry::with_builtins();

        let candidates = complete("g", &table, &converters);
        let mut values: Vec<&str> = candidates.iter().map(|c| c.value.as_str()).collect();
        values.sort();
        values.dedup();
        assert_eq!(values, vec!["git", "greet"]);
    }

    #[test]
    fn cursor_mid_word_completes_against_the_prefix_before_it() {
        let mut table = EndpointTable::new();
        register(&mut table, "backup {src} --compress");
        register(&mut table, "restore {dst}");
        let converters = ConverterRegistry::with_builtins();

        // Cursor sits after "back", with "up --compress" still to its right.
        let candidates = complete_at("backup --compress", 4, &table, &converters);
        let values: Vec<&str> = candidates.iter().map(|c| c.value.as_str()).collect();
        assert!(values.contains(&"backup"));
        assert!(!values.contains(&"restore"));
    }
}
