use std::{net::TcpListener, sync::Arc};

use anyhow::Context;
use env_logger::Env;
use prospect::{
    configuration::get_configuration,
    services::{Droid, LeadGenerator, OpenaiClient, SerperClient},
    startup::run,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let configuration = get_configuration().context("Failed to read configuration.")?;

    if configuration.api_keys.serper.is_empty() || configuration.api_keys.llm.is_empty() {
        log::warn!("Missing API keys, set APP_API_KEYS__SERPER and APP_API_KEYS__LLM");
    }

    let search_provider = SerperClient::new(
        configuration.api_keys.serper.clone(),
        configuration.search.endpoint.clone(),
    )
    .context("Failed to build search client.")?;
    let openai_client = OpenaiClient::new(configuration.api_keys.llm.clone(), &configuration.llm);
    let droid = Droid::new(configuration.browser.clone());

    // One client serves as judge, refiner and extractor.
    let openai_client = Arc::new(openai_client);
    let lead_generator = LeadGenerator::new(
        Box::new(search_provider),
        Box::new(openai_client.clone()),
        Box::new(openai_client.clone()),
        Box::new(droid),
        Box::new(openai_client),
        configuration.generation.clone(),
    );

    let address = format!(
        "{}:{}",
        configuration.application.host, configuration.application.port
    );
    let listener = TcpListener::bind(&address).with_context(|| format!("Failed to bind {}", address))?;
    log::info!("Listening on {}", address);

    run(listener, lead_generator)?.await?;
    Ok(())
}
