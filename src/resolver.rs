//! Matches an argument vector against an [`EndpointTable`] and binds the
//! winning endpoint's parameters. The hardest part of the pipeline: see
//! module-level tests for the non-obvious rules (option order independence,
//! negative-number disambiguation, `--` end-of-options, optional
//! parameter skipping).

use std::collections::HashMap;

use crate::converters::ConverterRegistry;
use crate::endpoint::{Endpoint, EndpointTable};
use crate::error::{ConversionError, NoMatchReason};
use crate::matcher::{Matcher, OptionMatcher, ParameterMatcher};
use crate::value::Value;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundParameters {
    values: HashMap<String, Value>,
    pub catch_all: Option<Vec<String>>,
}

impl BoundParameters {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[derive(Debug)]
pub enum ResolveOutcome {
    Matched {
        endpoint: Endpoint,
        bound: BoundParameters,
    },
    NoMatch {
        reason: NoMatchReason,
    },
}

/// Failure of a single endpoint's match attempt. `LiteralMismatch` and
/// `TrailingArguments` mean "this endpoint simply does not apply" and are
/// never surfaced to the caller; the rest rank by how informative they are
/// when picking the overall `NoMatchReason`.
#[derive(Debug, Clone)]
enum AttemptFailure {
    LiteralMismatch,
    TrailingArguments,
    MissingRequiredArgument(String),
    UnknownOption(String),
    OptionMissingValue(String),
    ConversionFailure {
        parameter: String,
        value: String,
        source: ConversionError,
    },
}

impl AttemptFailure {
    fn priority(&self) -> u8 {
        match self {
            AttemptFailure::ConversionFailure { .. } => 5,
            AttemptFailure::OptionMissingValue(_) => 4,
            AttemptFailure::UnknownOption(_) => 3,
            AttemptFailure::MissingRequiredArgument(_) => 2,
            AttemptFailure::TrailingArguments | AttemptFailure::LiteralMismatch => 0,
        }
    }

    fn into_reason(self) -> Option<NoMatchReason> {
        match self {
            AttemptFailure::MissingRequiredArgument(name) => {
                Some(NoMatchReason::MissingRequiredArgument(name))
            }
            AttemptFailure::UnknownOption(name) => Some(NoMatchReason::UnknownOption(name)),
            AttemptFailure::OptionMissingValue(name) => {
                Some(NoMatchReason::OptionMissingValue(name))
            }
            AttemptFailure::ConversionFailure {
                parameter,
                value,
                source,
            } => Some(NoMatchReason::ConversionFailure {
                parameter,
                value,
                source,
            }),
            AttemptFailure::LiteralMismatch | AttemptFailure::TrailingArguments => None,
        }
    }
}

pub fn resolve(
    args: &[String],
    table: &EndpointTable,
    converters: &ConverterRegistry,
) -> ResolveOutcome {
    let first_word = args.first().map(String::as_str).unwrap_or("");
    let candidates = table.candidates_for_first_word(first_word);

    let mut matches: Vec<(usize, &Endpoint, BoundParameters)> = Vec::new();
    let mut worst_failure: Option<AttemptFailure> = None;

    for (rank, endpoint) in candidates.into_iter().enumerate() {
        match try_match(endpoint, args, converters) {
            Ok(bound) => matches.push((rank, endpoint, bound)),
            Err(failure) => {
                let replace = match &worst_failure {
                    None => true,
                    Some(current) => failure.priority() > current.priority(),
                };
                if replace {
                    worst_failure = Some(failure);
                }
            }
        }
    }

    if matches.is_empty() {
        let reason = worst_failure
            .and_then(AttemptFailure::into_reason)
            .unwrap_or(NoMatchReason::UnknownCommand);
        return ResolveOutcome::NoMatch { reason };
    }

    matches.sort_by(|a, b| {
        let specificity_a = a.1.compiled.specificity;
        let specificity_b = b.1.compiled.specificity;
        specificity_b
            .cmp(&specificity_a)
            .then_with(|| b.1.compiled.segments.len().cmp(&a.1.compiled.segments.len()))
            .then_with(|| a.0.cmp(&b.0))
    });

    let (_, endpoint, bound) = matches.into_iter().next().unwrap();
    ResolveOutcome::Matched {
        endpoint: endpoint.clone(),
        bound,
    }
}

fn try_match(
    endpoint: &Endpoint,
    args: &[String],
    converters: &ConverterRegistry,
) -> Result<BoundParameters, AttemptFailure> {
    let route = &endpoint.compiled;
    let mut consumed = vec![false; args.len()];
    let mut seen_end_of_options = false;
    let mut bound = BoundParameters::default();
    let mut satisfied_options: Vec<&OptionMatcher> = Vec::new();

    // Pass 1: option harvest, position-independent.
    let mut i = 0;
    while i < args.len() {
        if consumed[i] {
            i += 1;
            continue;
        }
        let arg = args[i].as_str();

        if !seen_end_of_options && arg == "--" {
            seen_end_of_options = true;
            consumed[i] = true;
            i += 1;
            continue;
        }

        if !seen_end_of_options && arg.starts_with('-') && arg != "-" {
            if let Some(opt) = route.options().find(|o| o.matches_token(arg)) {
                consumed[i] = true;
                let key = opt.long_name.clone().or_else(|| opt.short_name.clone()).unwrap_or_default();
                if let Some(value_param) = &opt.value_param {
                    let value_idx = next_unconsumed(&consumed, i + 1);
                    let value_idx = match value_idx {
                        Some(idx)
                            if is_positional_eligible(&args[idx], route.options(), seen_end_of_options) =>
                        {
                            idx
                        }
                        _ => return Err(AttemptFailure::OptionMissingValue(opt.primary_form())),
                    };
                    consumed[value_idx] = true;
                    let raw = args[value_idx].clone();
                    let value = bind_value(value_param, &raw, converters)?;
                    bound.values.insert(key, value);
                } else {
                    bound.values.insert(key, Value::Bool(true));
                }
                satisfied_options.push(opt);
            }
        }
        i += 1;
    }

    // Pass 2: positional walk.
    let remaining: Vec<usize> = (0..args.len()).filter(|&idx| !consumed[idx]).collect();
    let mut walk = 0usize;
    let mut has_positional_segments = false;

    for segment in route.positional_segments() {
        has_positional_segments = true;
        match segment {
            Matcher::Literal(literal) => {
                let Some(&idx) = remaining.get(walk) else {
                    return Err(AttemptFailure::LiteralMismatch);
                };
                if args[idx] != literal.value {
                    return Err(AttemptFailure::LiteralMismatch);
                }
                walk += 1;
            }
            Matcher::Parameter(param) if param.is_catch_all => {
                let rest: Vec<String> = remaining[walk..].iter().map(|&idx| args[idx].clone()).collect();
                bound.catch_all = Some(rest);
                walk = remaining.len();
            }
            Matcher::Parameter(param) => {
                let candidate_idx = remaining.get(walk).copied();
                let eligible = candidate_idx.is_some_and(|idx| {
                    is_positional_eligible(&args[idx], route.options(), seen_end_of_options)
                });

                if eligible {
                    let idx = candidate_idx.unwrap();
                    let raw = args[idx].clone();
                    let value = bind_value(param, &raw, converters)?;
                    bound.values.insert(param.name.clone(), value);
                    walk += 1;
                } else if !param.is_optional {
                    return Err(AttemptFailure::MissingRequiredArgument(param.name.clone()));
                }
                // optional and not eligible: leave unbound.
            }
            Matcher::Option(_) => unreachable!("positional_segments excludes options"),
        }
    }

    // An endpoint with no positional segments at all (pattern "" or an
    // options-only pattern) is a default/fallback route: it has nothing to
    // bind leftover arguments to, so it tolerates them rather than
    // rejecting the dispatch outright.
    if has_positional_segments && walk < remaining.len() {
        let leftover = &args[remaining[walk]];
        if leftover.starts_with('-') && leftover != "-" && leftover != "--" {
            return Err(AttemptFailure::UnknownOption(leftover.clone()));
        }
        return Err(AttemptFailure::TrailingArguments);
    }

    for opt in route.options() {
        let required = opt
            .value_param
            .as_ref()
            .map(|p| !p.is_optional)
            .unwrap_or(false);
        if required && !satisfied_options.iter().any(|s| std::ptr::eq(*s, opt)) {
            return Err(AttemptFailure::MissingRequiredArgument(opt.primary_form()));
        }
    }

    Ok(bound)
}

fn next_unconsumed(consumed: &[bool], from: usize) -> Option<usize> {
    (from..consumed.len()).find(|&idx| !consumed[idx])
}

/// An argument starting with `-` is still eligible to bind as a value
/// (positional, or an option's value) — negative numbers, `-stdin` — as
/// long as it is not one of *this* endpoint's own options, or `--` has
/// already been consumed.
fn is_positional_eligible<'a>(
    arg: &str,
    mut options: impl Iterator<Item = &'a OptionMatcher>,
    seen_end_of_options: bool,
) -> bool {
    if seen_end_of_options || !arg.starts_with('-') || arg == "-" {
        return true;
    }
    !options.any(|o| o.matches_token(arg))
}

fn bind_value(
    param: &ParameterMatcher,
    raw: &str,
    converters: &ConverterRegistry,
) -> Result<Value, AttemptFailure> {
    match &param.type_constraint {
        Some(type_name) => converters
            .convert(type_name, raw)
            .map_err(|source| AttemptFailure::ConversionFailure {
                parameter: param.name.clone(),
                value: raw.to_string(),
                source,
            }),
        None => Ok(Value::Str(raw.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::compile;
    use crate::endpoint::{Endpoint, HandlerOutcome, MessageType};
    use crate::lexer::tokenize;
    use crate::parser::parse;
    use std::sync::Arc;

    fn register(table: &mut EndpointTable, pattern: &str) {
        let outcome = parse(tokenize(pattern));
        let compiled = compile(&outcome.ast.unwrap(), table.len() as u64, pattern);
        table.insert(Endpoint {
            pattern: pattern.to_string(),
            compiled: Arc::new(compiled),
            description: None,
            message_type: MessageType::Unspecified,
            handler: Arc::new(|_| HandlerOutcome::Ok),
        });
    }

    fn args(words: &[&str]) -> Vec<String> {
        words.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn matches_and_binds_options_in_any_order() {
        let mut table = EndpointTable::new();
        register(&mut table, "deploy {env} --force,-f --replicas {n:int?}");
        let converters = ConverterRegistry::with_builtins();

        let a = resolve(
            &args(&["deploy", "prod", "-f", "--replicas", "3"]),
            &table,
            &converters,
        );
        let b = resolve(
            &args(&["deploy", "prod", "--replicas", "3", "-f"]),
            &table,
            &converters,
        );

        for outcome in [a, b] {
            match outcome {
                ResolveOutcome::Matched { bound, .. } => {
                    assert_eq!(bound.get("env"), Some(&Value::Str("prod".into())));
                    assert_eq!(bound.get("force"), Some(&Value::Bool(true)));
                    assert_eq!(bound.get("replicas"), Some(&Value::Int(3)));
                }
                other => panic!("expected match, got {other:?}"),
            }
        }
    }

    #[test]
    fn negative_numbers_bind_as_positionals() {
        let mut table = EndpointTable::new();
        register(&mut table, "add {x:double} {y:double}");
        let converters = ConverterRegistry::with_builtins();

        match resolve(&args(&["add", "5", "-3"]), &table, &converters) {
            ResolveOutcome::Matched { bound, .. } => {
                assert_eq!(bound.get("x"), Some(&Value::Double(5.0)));
                assert_eq!(bound.get("y"), Some(&Value::Double(-3.0)));
            }
            other => panic!("expected match, got {other:?}"),
        }

        match resolve(&args(&["add", "-2", "-3"]), &table, &converters) {
            ResolveOutcome::Matched { bound, .. } => {
                assert_eq!(bound.get("x"), Some(&Value::Double(-2.0)));
                assert_eq!(bound.get("y"), Some(&Value::Double(-3.0)));
            }
            other => panic!("expected match, got {other:?}"),
        }
    }

    #[test]
    fn unrecognized_option_flag_is_unknown_option() {
        let mut table = EndpointTable::new();
        register(&mut table, "test --flag");
        let converters = ConverterRegistry::with_builtins();

        match resolve(&args(&["test", "--other"]), &table, &converters) {
            ResolveOutcome::NoMatch { reason } => {
                assert!(matches!(reason, NoMatchReason::UnknownOption(ref o) if o == "--other"));
            }
            other => panic!("expected no match, got {other:?}"),
        }
    }

    #[test]
    fn end_of_options_marker_disables_option_parsing() {
        let mut table = EndpointTable::new();
        register(&mut table, "exec {*args}");
        let converters = ConverterRegistry::with_builtins();

        match resolve(&args(&["exec", "--", "--flag", "x"]), &table, &converters) {
            ResolveOutcome::Matched { bound, .. } => {
                assert_eq!(
                    bound.catch_all,
                    Some(vec!["--flag".to_string(), "x".to_string()])
                );
            }
            other => panic!("expected match, got {other:?}"),
        }
    }

    #[test]
    fn more_specific_literal_route_wins_over_parameter_route() {
        let mut table = EndpointTable::new();
        register(&mut table, "git status");
        register(&mut table, "git {cmd}");
        let converters = ConverterRegistry::with_builtins();

        match resolve(&args(&["git", "status"]), &table, &converters) {
            ResolveOutcome::Matched { endpoint, .. } => {
                assert_eq!(endpoint.pattern, "git status");
            }
            other => panic!("expected match, got {other:?}"),
        }
        match resolve(&args(&["git", "push"]), &table, &converters) {
            ResolveOutcome::Matched { endpoint, .. } => {
                assert_eq!(endpoint.pattern, "git {cmd}");
            }
            other => panic!("expected match, got {other:?}"),
        }
    }

    #[test]
    fn default_route_is_fallback() {
        let mut table = EndpointTable::new();
        register(&mut table, "");
        register(&mut table, "hello");
        let converters = ConverterRegistry::with_builtins();

        assert!(matches!(
            resolve(&args(&[]), &table, &converters),
            ResolveOutcome::Matched { .. }
        ));
        match resolve(&args(&["hello"]), &table, &converters) {
            ResolveOutcome::Matched { endpoint, .. } => assert_eq!(endpoint.pattern, "hello"),
            other => panic!("expected match, got {other:?}"),
        }
        match resolve(&args(&["other"]), &table, &converters) {
            ResolveOutcome::Matched { endpoint, .. } => assert_eq!(endpoint.pattern, ""),
            other => panic!("expected match, got {other:?}"),
        }
    }

    #[test]
    fn optional_positional_is_left_unbound_when_skipped() {
        let mut table = EndpointTable::new();
        register(&mut table, "find {name?} --recursive");
        let converters = ConverterRegistry::with_builtins();

        match resolve(&args(&["find", "--recursive"]), &table, &converters) {
            ResolveOutcome::Matched { bound, .. } => {
                assert!(!bound.contains("name"));
                assert_eq!(bound.get("recursive"), Some(&Value::Bool(true)));
            }
            other => panic!("expected match, got {other:?}"),
        }
    }

    #[test]
    fn option_value_followed_by_another_option_is_missing_value() {
        let mut table = EndpointTable::new();
        register(&mut table, "config --key {k} --verbose");
        let converters = ConverterRegistry::with_builtins();

        match resolve(
            &args(&["config", "--key", "--verbose"]),
            &table,
            &converters,
        ) {
            ResolveOutcome::NoMatch { reason } => {
                assert!(matches!(reason, NoMatchReason::OptionMissingValue(_)));
            }
            other => panic!("expected no match, got {other:?}"),
        }
    }

    #[test]
    fn no_recognized_literal_and_no_default_route_is_unknown_command() {
        let mut table = EndpointTable::new();
        register(&mut table, "git status");
        let converters = ConverterRegistry::with_builtins();

        match resolve(&args(&["frobnicate"]), &table, &converters) {
            ResolveOutcome::NoMatch { reason } => {
                assert!(matches!(reason, NoMatchReason::UnknownCommand));
            }
            other => panic!("expected no match, got {other:?}"),
        }
    }

    #[test]
    fn greet_treats_dash_prefixed_positional_as_eligible_value() {
        let mut table = EndpointTable::new();
        register(&mut table, "greet {name}");
        let converters = ConverterRegistry::with_builtins();

        match resolve(&args(&["greet", "-alice"]), &table, &converters) {
            ResolveOutcome::Matched { bound, .. } => {
                assert_eq!(bound.get("name"), Some(&Value::Str("-alice".into())));
            }
            other => panic!("expected match, got {other:?}"),
        }
    }
}
