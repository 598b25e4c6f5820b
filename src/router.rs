//! Public façade: register patterns, dispatch argument vectors, and drive
//! completion, all against one shared, immutable [`EndpointTable`].

use std::sync::Arc;

use tracing::instrument;

use crate::completion::{self, CompletionCandidate};
use crate::compiler::compile;
use crate::converters::ConverterRegistry;
use crate::endpoint::{Endpoint, EndpointTable, HandlerRef, MessageType};
use crate::error::ParseError;
use crate::lexer::tokenize;
use crate::parser::parse;
use crate::resolver::{self, ResolveOutcome};

/// Builds an `EndpointTable`. `Router::new` consumes a `RouterBuilder`
/// (or you can register directly against a freshly built `Router` before
/// sharing it — construction and dispatch are not required to be
/// temporally separated, but the table is never mutated once a `Router`
/// has been cloned across threads).
pub struct Router {
    table: Arc<EndpointTable>,
    converters: Arc<ConverterRegistry>,
}

impl Clone for Router {
    fn clone(&self) -> Self {
        Self {
            table: Arc::clone(&self.table),
            converters: Arc::clone(&self.converters),
        }
    }
}

pub struct RouterBuilder {
    table: EndpointTable,
    converters: ConverterRegistry,
    next_id: u64,
}

impl RouterBuilder {
    pub fn new() -> Self {
        Self {
            table: EndpointTable::new(),
            converters: ConverterRegistry::with_builtins(),
            next_id: 0,
        }
    }

    pub fn with_converters(mut self, converters: ConverterRegistry) -> Self {
        self.converters = converters;
        self
    }

    pub fn register(
        &mut self,
        pattern: &str,
        handler: HandlerRef,
    ) -> Result<(), Vec<ParseError>> {
        self.register_full(pattern, None, MessageType::Unspecified, handler)
    }

    pub fn register_full(
        &mut self,
        pattern: &str,
        description: Option<String>,
        message_type: MessageType,
        handler: HandlerRef,
    ) -> Result<(), Vec<ParseError>> {
        let outcome = parse(tokenize(pattern));
        let ast = match outcome.ast {
            Some(ast) => ast,
            None => return Err(outcome.errors),
        };

        let compiled = compile(&ast, self.next_id, pattern);
        self.next_id += 1;
        self.table.insert(Endpoint {
            pattern: pattern.to_string(),
            compiled: Arc::new(compiled),
            description,
            message_type,
            handler,
        });
        Ok(())
    }

    pub fn build(self) -> Router {
        Router {
            table: Arc::new(self.table),
            converters: Arc::new(self.converters),
        }
    }
}

impl Default for RouterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    #[instrument(skip(self))]
    pub fn dispatch(&self, args: &[String]) -> ResolveOutcome {
        resolver::resolve(args, &self.table, &self.converters)
    }

    #[instrument(skip(self))]
    pub fn complete(&self, buffer: &str) -> Vec<CompletionCandidate> {
        completion::complete(buffer, &self.table, &self.converters)
    }

    /// Like [`Router::complete`], but for a cursor sitting before the end of
    /// `buffer` (a byte offset) — mid-word completion.
    #[instrument(skip(self))]
    pub fn complete_at(&self, buffer: &str, cursor_index: usize) -> Vec<CompletionCandidate> {
        completion::complete_at(buffer, cursor_index, &self.table, &self.converters)
    }

    pub fn endpoints(&self) -> impl Iterator<Item = &Endpoint> {
        self.table.endpoints()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}
