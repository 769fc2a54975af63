use std::io::Write as _;
use std::process::ExitCode;

use tokio::io::AsyncBufReadExt;

use tally_agent::conversation::{Conversation, Turn};
use tally_core::config::{AppConfig, LoadOptions};

use crate::bootstrap::{bootstrap_with_config, init_logging};
use crate::commands::CommandResult;

/// Run the interactive chat session. One user line per turn; the transcript
/// (bot replies and saved artifacts) is printed as it grows.
pub fn run() -> ExitCode {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            let result = CommandResult::failure(
                "chat",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
            println!("{}", result.output);
            return ExitCode::from(result.exit_code);
        }
    };
    init_logging(&config);

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            eprintln!("failed to initialize async runtime: {error}");
            return ExitCode::from(3);
        }
    };

    match runtime.block_on(run_session(config)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("chat session failed: {error}");
            ExitCode::from(1)
        }
    }
}

async fn run_session(config: AppConfig) -> anyhow::Result<()> {
    let app = bootstrap_with_config(config).await?;

    println!(
        "Tally billing assistant. Describe a sale (e.g. \"2 strips of Augmentin for Hrishita\") \
         or type `exit` to quit."
    );

    let mut conversation = Conversation::new();
    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();

    prompt()?;
    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        if input.is_empty() {
            prompt()?;
            continue;
        }
        if matches!(input, "exit" | "quit") {
            break;
        }

        let turn_start = conversation.turns.len();
        app.runtime.handle_turn(&mut conversation, input).await;

        // The first appended turn echoes the user's input; print the rest.
        for turn in &conversation.turns[turn_start + 1..] {
            match turn {
                Turn::Bot(text) => println!("tally> {text}"),
                Turn::Artifact(path) => println!("tally> [invoice saved: {}]", path.display()),
                Turn::User(_) => {}
            }
        }
        prompt()?;
    }

    println!("bye.");
    Ok(())
}

fn prompt() -> std::io::Result<()> {
    print!("you> ");
    std::io::stdout().flush()
}
