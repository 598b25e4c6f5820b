//! Thin `reedline` adapter (feature `repl`): wires [`Router::complete`] into
//! a line editor's [`Completer`] trait and drives an interactive loop that
//! dispatches each accepted line against the same route table. Key
//! bindings, clipboard behavior, and syntax highlighting are left to
//! `reedline`'s defaults; this module only bridges the completion and
//! dispatch surfaces.

use reedline::{
    DefaultPrompt, DefaultPromptSegment, FileBackedHistory, Reedline, Signal, Suggestion,
};

use crate::config::RouterConfig;
use crate::resolver::ResolveOutcome;
use crate::router::Router;

pub struct ReplCompleter {
    router: Router,
}

impl ReplCompleter {
    pub fn new(router: Router) -> Self {
        Self { router }
    }
}

impl reedline::Completer for ReplCompleter {
    fn complete(&mut self, line: &str, pos: usize) -> Vec<Suggestion> {
        let pos = pos.min(line.len());
        self.router
            .complete_at(line, pos)
            .into_iter()
            .map(|candidate| Suggestion {
                value: candidate.value,
                description: candidate.description,
                style: None,
                extra: None,
                span: reedline::Span::new(start_of_last_word(&line[..pos]), pos),
                append_whitespace: !candidate.requires_value,
            })
            .collect()
    }
}

fn start_of_last_word(buffer: &str) -> usize {
    buffer
        .rfind(char::is_whitespace)
        .map(|idx| idx + 1)
        .unwrap_or(0)
}

/// Drives an interactive shell: each accepted line is split on whitespace
/// and dispatched against `router`; `Matched`/`NoMatch` are printed using
/// the error taxonomy's `Display` impls.
pub fn run_repl(router: Router, config: &RouterConfig) -> std::io::Result<()> {
    let history: Box<dyn reedline::History> = match &config.repl.history_path {
        Some(path) => Box::new(
            FileBackedHistory::with_file(config.repl.max_history_entries, path.clone())
                .unwrap_or_else(|_| FileBackedHistory::new(config.repl.max_history_entries).unwrap()),
        ),
        None => Box::new(FileBackedHistory::new(config.repl.max_history_entries).unwrap()),
    };

    let mut line_editor = Reedline::create()
        .with_history(history)
        .with_completer(Box::new(ReplCompleter::new(router.clone())));

    let prompt = DefaultPrompt::new(
        DefaultPromptSegment::Basic(config.repl.prompt.clone()),
        DefaultPromptSegment::Empty,
    );

    loop {
        match line_editor.read_line(&prompt)? {
            Signal::Success(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let args: Vec<String> = shell_split(trimmed);
                match router.dispatch(&args) {
                    ResolveOutcome::Matched { endpoint, bound } => {
                        println!("matched {} -> {:?}", endpoint.pattern, bound);
                    }
                    ResolveOutcome::NoMatch { reason } => {
                        println!("no match: {reason}");
                    }
                }
            }
            Signal::CtrlD | Signal::CtrlC => break,
        }
    }
    Ok(())
}

/// Whitespace split preserving quoted runs, matching the completion
/// tokenizer's behavior so typed input and tab-completion agree on what a
/// "word" is.
fn shell_split(line: &str) -> Vec<String> {
    crate::completion::tokenizer::tokenize_all(&format!("{line} ")).completed_words
}
