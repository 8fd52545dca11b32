use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::alert::WebhookNotifier;
use crate::config::{StorePaths, default_data_dir};
use crate::context::{AppContext, now_unix};
use crate::domain::SessionKey;
use crate::logging::{LogTarget, init_logging};
use crate::refresh::{RefreshOutcome, refresh_now};
use crate::remote::SystemRunner;
use crate::slurm::{current_user, discover_nodes};
use crate::tmux::{ProbeConfig, SessionProber};
use crate::tui::run_tui;

#[derive(Debug, Parser)]
#[command(name = "slurmux", about = "Browse and manage tmux sessions on your Slurm nodes")]
struct Cli {
    #[arg(long, global = true, env = "SLURMUX_DIR")]
    data_dir: Option<PathBuf>,
    #[arg(long, global = true, env = "SLURMUX_CONFIG")]
    config: Option<PathBuf>,
    /// Slurm user whose jobs are listed (defaults to $USER).
    #[arg(long, global = true)]
    user: Option<String>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Tui,
    /// Allocated nodes and their remaining time.
    Nodes,
    /// Run one refresh and print every session row.
    Sessions,
    Notes {
        #[command(subcommand)]
        command: Option<NotesCommand>,
    },
    Watch {
        #[command(subcommand)]
        command: Option<WatchCommand>,
    },
    /// Create a detached tmux session on a node.
    New { node: String, name: String },
    /// Kill a tmux session given as node:session.
    Kill { key: SessionKey },
    /// Send a test message to the configured webhook.
    AlertTest,
}

#[derive(Debug, Subcommand)]
enum NotesCommand {
    List,
    Set {
        key: SessionKey,
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    Delete {
        key: SessionKey,
    },
}

#[derive(Debug, Subcommand)]
enum WatchCommand {
    List,
    Add {
        key: SessionKey,
        #[arg(long, default_value = "")]
        minutes: String,
    },
    Remove {
        key: SessionKey,
    },
}

pub fn run() -> i32 {
    match Cli::try_parse() {
        Ok(cli) => run_command(cli),
        Err(err) => {
            let code = err.exit_code();
            let _ = err.print();
            code
        }
    }
}

fn run_command(cli: Cli) -> i32 {
    let data_dir = cli.data_dir.unwrap_or_else(default_data_dir);
    let paths = StorePaths::in_dir(&data_dir).with_config(cli.config);
    let user = cli.user.or_else(current_user);
    let command = cli.command.unwrap_or(Commands::Tui);

    if matches!(command, Commands::Tui) {
        init_logging(LogTarget::File(&paths.log));
        let context = AppContext::load(paths);
        return match run_tui(context, user) {
            Ok(()) => 0,
            Err(err) => {
                eprintln!("{err}");
                1
            }
        };
    }

    init_logging(LogTarget::Stderr);
    let context = AppContext::load(paths);
    match command {
        Commands::Tui => 0,
        Commands::Nodes => run_nodes(&context, user.as_deref()),
        Commands::Sessions => run_sessions(&context, user.as_deref()),
        Commands::Notes { command } => run_notes(&context, command.unwrap_or(NotesCommand::List)),
        Commands::Watch { command } => run_watch(&context, command.unwrap_or(WatchCommand::List)),
        Commands::New { node, name } => run_new(&context, &node, &name),
        Commands::Kill { key } => run_kill(&context, &key),
        Commands::AlertTest => run_alert_test(&context),
    }
}

fn run_nodes(context: &AppContext, user: Option<&str>) -> i32 {
    let config = context.config();
    let runner = SystemRunner::new(config.command_timeout());
    let discovery = discover_nodes(&runner, user);
    for error in &discovery.errors {
        eprintln!("{error}");
    }
    for (node, time_left) in &discovery.nodes {
        println!("{node}\t{time_left}");
    }
    if discovery.nodes.is_empty() && !discovery.errors.is_empty() {
        1
    } else {
        0
    }
}

fn run_sessions(context: &AppContext, user: Option<&str>) -> i32 {
    let config = context.config();
    let runner = SystemRunner::new(config.command_timeout());
    let notifier = WebhookNotifier::new(config.webhook(), config.webhook_timeout());
    match refresh_now(context, &runner, &notifier, user) {
        Some(RefreshOutcome::Completed { .. }) => {}
        Some(RefreshOutcome::Crashed(message)) => {
            eprintln!("{message}");
            return 1;
        }
        None => {
            eprintln!("a refresh is already running");
            return 1;
        }
    }

    let workspace = context.lock();
    for error in &workspace.state.errors {
        eprintln!("{error}");
    }
    let now = now_unix();
    for item in &workspace.state.items {
        let key = item.key();
        let mut line = if item.is_placeholder() {
            key.to_string()
        } else if item.is_stale {
            format!("{key} offline")
        } else {
            format!("{key} windows={}", item.window_count)
        };
        if let Some(entry) = workspace.watches.entry(&key) {
            line.push_str(&format!(" watch={}", entry.state(now).as_str()));
        }
        if let Some(note) = workspace.notes.get(&key) {
            line.push_str(&format!(" note={note:?}"));
        }
        println!("{line}");
    }
    0
}

fn run_notes(context: &AppContext, command: NotesCommand) -> i32 {
    match command {
        NotesCommand::List => {
            let workspace = context.lock();
            for (key, text) in workspace.notes.as_map() {
                println!("{key}\t{text}");
            }
            0
        }
        NotesCommand::Set { key, text } => match context.set_note(key.clone(), &text.join(" ")) {
            Ok(()) => {
                println!("noted {key}");
                0
            }
            Err(err) => {
                eprintln!("failed to set note: {err}");
                1
            }
        },
        NotesCommand::Delete { key } => {
            if context.delete_note(&key) {
                println!("deleted note for {key}");
                0
            } else {
                eprintln!("no note for {key}");
                1
            }
        }
    }
}

fn run_watch(context: &AppContext, command: WatchCommand) -> i32 {
    match command {
        WatchCommand::List => {
            let workspace = context.lock();
            let now = now_unix();
            for (key, entry) in workspace.watches.entries() {
                println!(
                    "{key}\tthreshold={}s\tidle={}s\t{}",
                    entry.threshold_seconds,
                    entry.idle_secs(now),
                    entry.state(now).as_str()
                );
            }
            0
        }
        WatchCommand::Add { key, minutes } => match context.watch(key.clone(), &minutes) {
            Ok(threshold) => {
                println!("watching {key} (alert after {threshold}s idle)");
                0
            }
            Err(err) => {
                eprintln!("failed to watch {key}: {err}");
                1
            }
        },
        WatchCommand::Remove { key } => {
            if context.unwatch(&key) {
                println!("stopped watching {key}");
                0
            } else {
                eprintln!("{key} is not watched");
                1
            }
        }
    }
}

fn run_new(context: &AppContext, node: &str, name: &str) -> i32 {
    let config = context.config();
    let runner = SystemRunner::new(config.command_timeout());
    let prober = SessionProber::new(&runner, ProbeConfig::from(&config));
    match prober.create_session(node, name) {
        Ok(()) => {
            println!("created {node}:{name}");
            0
        }
        Err(err) => {
            eprintln!("{err}");
            1
        }
    }
}

fn run_kill(context: &AppContext, key: &SessionKey) -> i32 {
    let config = context.config();
    let runner = SystemRunner::new(config.command_timeout());
    let prober = SessionProber::new(&runner, ProbeConfig::from(&config));
    match prober.kill_session(&key.node, &key.session) {
        Ok(()) => {
            println!("killed {key}");
            0
        }
        Err(err) => {
            eprintln!("{err}");
            1
        }
    }
}

fn run_alert_test(context: &AppContext) -> i32 {
    let config = context.config();
    let notifier = WebhookNotifier::new(config.webhook(), config.webhook_timeout());
    if !notifier.is_configured() {
        eprintln!("no webhook_url configured in {:?}", context.paths().config);
        return 1;
    }
    match notifier.send_text("slurmux: test alert") {
        Ok(()) => {
            println!("test alert sent");
            0
        }
        Err(err) => {
            eprintln!("{err}");
            1
        }
    }
}
