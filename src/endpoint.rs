//! The route table: an ordered list of registered [`Endpoint`]s plus an
//! auxiliary index by first literal segment, used to accelerate both
//! resolution and completion.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::matcher::Matcher;
use crate::resolver::BoundParameters;
use crate::route::CompiledRoute;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Unspecified,
    Query,
    IdempotentCommand,
    Command,
}

impl Default for MessageType {
    fn default() -> Self {
        MessageType::Unspecified
    }
}

#[derive(Debug, Clone)]
pub enum HandlerOutcome {
    Ok,
    Failed(String),
}

/// Handlers are opaque to the core: a name→value map goes in, and an
/// outcome comes back. The host decides how to shape the closure.
pub type HandlerRef = Arc<dyn Fn(&BoundParameters) -> HandlerOutcome + Send + Sync>;

#[derive(Clone)]
pub struct Endpoint {
    pub pattern: String,
    pub compiled: Arc<CompiledRoute>,
    pub description: Option<String>,
    pub message_type: MessageType,
    pub handler: HandlerRef,
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("pattern", &self.pattern)
            .field("description", &self.description)
            .field("message_type", &self.message_type)
            .finish()
    }
}

#[derive(Debug, Default)]
pub struct EndpointTable {
    endpoints: Vec<Endpoint>,
    /// First-literal index: `None` buckets default/options-only endpoints.
    by_first_literal: HashMap<Option<String>, Vec<usize>>,
}

impl EndpointTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, endpoint: Endpoint) -> usize {
        let key = first_literal(&endpoint.compiled.segments);
        let index = self.endpoints.len();
        self.by_first_literal.entry(key).or_default().push(index);
        self.endpoints.push(endpoint);
        index
    }

    pub fn endpoints(&self) -> impl Iterator<Item = &Endpoint> {
        self.endpoints.iter()
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// Endpoints whose first positional literal matches `word`, plus every
    /// default/options-only endpoint (always a resolution candidate).
    pub fn candidates_for_first_word(&self, word: &str) -> Vec<&Endpoint> {
        let mut out = Vec::new();
        if let Some(indices) = self.by_first_literal.get(&Some(word.to_string())) {
            out.extend(indices.iter().map(|&i| &self.endpoints[i]));
        }
        if let Some(indices) = self.by_first_literal.get(&None) {
            out.extend(indices.iter().map(|&i| &self.endpoints[i]));
        }
        out
    }

    pub fn distinct_first_literals(&self) -> Vec<&str> {
        let mut literals: Vec<&str> = self
            .by_first_literal
            .keys()
            .filter_map(|k| k.as_deref())
            .collect();
        literals.sort_unstable();
        literals.dedup();
        literals
    }
}

fn first_literal(segments: &[Matcher]) -> Option<String> {
    match segments.first() {
        Some(Matcher::Literal(l)) => Some(l.value.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::compile;
    use crate::lexer::tokenize;
    use crate::parser::parse;

    fn endpoint(pattern: &str, id: u64) -> Endpoint {
        let outcome = parse(tokenize(pattern));
        let compiled = compile(&outcome.ast.unwrap(), id, pattern);
        Endpoint {
            pattern: pattern.to_string(),
            compiled: Arc::new(compiled),
            description: None,
            message_type: MessageType::Unspecified,
            handler: Arc::new(|_| HandlerOutcome::Ok),
        }
    }

    #[test]
    fn indexes_by_first_literal_and_buckets_default_routes() {
        let mut table = EndpointTable::new();
        table.insert(endpoint("git status", 0));
        table.insert(endpoint("git {cmd}", 1));
        table.insert(endpoint("", 2));

        assert_eq!(table.candidates_for_first_word("git").len(), 3);
        assert_eq!(table.distinct_first_literals(), vec!["git"]);
    }
}
