use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::ai::chat::{ChatBuilder, ChatError};
use crate::core::AppConfig;
use crate::openai::{AzureChatGateway, SharedGateway};

const RESET_COMMAND: &str = "/reset";

/// Shown while waiting on the completion service.
fn spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message("Generating response...");
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

pub async fn run(config: AppConfig) -> Result<()> {
    let mut rl = DefaultEditor::new()?;

    let gateway: SharedGateway = Arc::new(AzureChatGateway::new(&config));
    let mut session = ChatBuilder::new(gateway)
        .system_message(&config.system_message)
        .build();

    println!(
        "Chatting with {} using index {}. Type {} to start over, Ctrl-D to quit.",
        config.deployment_name, config.retrieval.index_name, RESET_COMMAND
    );

    loop {
        let readline = rl.readline(">>> ");
        match readline {
            Ok(line) => {
                if line.trim() == RESET_COMMAND {
                    session.reset();
                    println!("Conversation reset.");
                    continue;
                }
                // Blank lines are ignored
                if line.trim().is_empty() {
                    continue;
                }
                rl.add_history_entry(line.as_str())?;

                let spinner = spinner();
                let result = session.next_msg(&line).await;
                spinner.finish_and_clear();

                match result {
                    Ok(reply) => println!("{}\n", reply),
                    Err(ChatError::Validation(_)) => {}
                    Err(err @ ChatError::Gateway(_)) => eprintln!("Error: {}\n", err),
                }
            }
            Err(ReadlineError::Interrupted) => break,
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }

    Ok(())
}
