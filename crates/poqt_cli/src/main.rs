//! CLI entry point for poqt.

mod cli;
mod commands;
mod due;
mod output;

use clap::Parser;

use crate::cli::Cli;

/// `.env` in the working directory or any parent.
fn load_dotenv() {
    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        loop {
            let env_file = dir.join(".env");
            if env_file.exists() {
                let _ = dotenvy::from_path(&env_file);
                return;
            }
            match dir.parent() {
                Some(parent) => dir = parent,
                None => return,
            }
        }
    }
}

#[tokio::main]
async fn main() {
    load_dotenv();
    let cli = Cli::parse();
    output::init(cli.output);

    if let Err(e) = commands::handle(cli).await {
        output::error(&format!("{:#}", e));
        std::process::exit(1);
    }
}
