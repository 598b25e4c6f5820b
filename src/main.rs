use std::sync::Arc;

use clap::{Parser, Subcommand};

use routeforge::config::RouterConfig;
use routeforge::{HandlerOutcome, MessageType, ResolveOutcome, RouterBuilder};

#[derive(Parser)]
#[command(name = "routeforge", about = "Route pipeline demo: registration, dispatch, and completion")]
struct Cli {
    /// Path to a RouterConfig TOML file; defaults to the platform config dir.
    #[arg(long, global = true)]
    config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Dispatch one argument vector against the demo route table.
    Run {
        /// The full argument vector to dispatch, e.g. `deploy prod -f`.
        args: Vec<String>,
    },
    /// Start an interactive shell with tab completion over the demo routes.
    #[cfg(feature = "repl")]
    Repl,
    /// Print every registered pattern and its description.
    Routes,
}

fn main() {
    let cli = Cli::parse();
    let config = RouterConfig::load(cli.config.as_deref());
    routeforge::logging::init(&config.log_level);

    let router = match build_demo_router() {
        Ok(builder) => builder.build(),
        Err(errors) => {
            for error in errors {
                eprintln!("error: {error}");
            }
            std::process::exit(2);
        }
    };

    let exit_code = match cli.command {
        Commands::Run { args } => run(&router, args),
        #[cfg(feature = "repl")]
        Commands::Repl => {
            if let Err(err) = routeforge::repl::run_repl(router, &config) {
                eprintln!("error: {err}");
                2
            } else {
                0
            }
        }
        Commands::Routes => {
            for endpoint in router.endpoints() {
                match &endpoint.description {
                    Some(desc) => println!("{:<45} {desc}", endpoint.pattern),
                    None => println!("{}", endpoint.pattern),
                }
            }
            0
        }
    };

    std::process::exit(exit_code);
}

fn run(router: &routeforge::Router, args: Vec<String>) -> i32 {
    match router.dispatch(&args) {
        ResolveOutcome::Matched { endpoint, bound } => match (endpoint.handler.as_ref())(&bound) {
            HandlerOutcome::Ok => 0,
            HandlerOutcome::Failed(message) => {
                eprintln!("error: {message}");
                1
            }
        },
        ResolveOutcome::NoMatch { reason } => {
            eprintln!("no match: {reason}");
            2
        }
    }
}

/// A handful of illustrative routes exercising every segment kind the
/// grammar supports; a real host registers its own.
fn build_demo_router() -> Result<RouterBuilder, Vec<routeforge::ParseError>> {
    let mut builder = RouterBuilder::new();

    builder.register_full(
        "deploy {env} --force,-f --replicas {n:int?}",
        Some("deploy an environment, optionally scaling replicas".into()),
        MessageType::Command,
        Arc::new(|bound| {
            println!("deploying to {:?} (bound: {bound:?})", bound.get("env"));
            HandlerOutcome::Ok
        }),
    )?;

    builder.register_full(
        "git status",
        Some("show working tree status".into()),
        MessageType::Query,
        Arc::new(|_| {
            println!("nothing to commit, working tree clean");
            HandlerOutcome::Ok
        }),
    )?;

    builder.register_full(
        "git {cmd}",
        Some("run an arbitrary git subcommand".into()),
        MessageType::Command,
        Arc::new(|bound| {
            println!("running git {:?}", bound.get("cmd"));
            HandlerOutcome::Ok
        }),
    )?;

    builder.register_full(
        "exec {*args}",
        Some("run a command, forwarding all remaining arguments".into()),
        MessageType::Command,
        Arc::new(|bound| {
            println!("exec {:?}", bound.catch_all);
            HandlerOutcome::Ok
        }),
    )?;

    Ok(builder)
}
