use std::sync::Arc;

use anyhow::Result;

use crate::ai::chat::ChatBuilder;
use crate::core::AppConfig;
use crate::openai::{AzureChatGateway, SharedGateway};

pub async fn run(config: AppConfig, question: &str) -> Result<()> {
    let gateway: SharedGateway = Arc::new(AzureChatGateway::new(&config));
    let mut session = ChatBuilder::new(gateway)
        .system_message(&config.system_message)
        .build();

    let reply = session.next_msg(question).await?;
    println!("{}", reply);

    Ok(())
}
