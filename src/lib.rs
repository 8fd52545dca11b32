pub mod alert;
pub mod cli;
pub mod config;
pub mod context;
pub mod domain;
pub mod error;
pub mod logging;
pub mod reconcile;
pub mod refresh;
pub mod remote;
pub mod slurm;
pub mod store;
pub mod tmux;
pub mod tui;
pub mod watch;
