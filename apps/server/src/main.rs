use anyhow::Context;
use fhub::domain::config::ApiConfig;
use fhub::kernel::config::load_config;
use fhub_logger::Logger;
use fhub_server::Server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg: ApiConfig =
        load_config(Some("server")).context("Critical: Configuration is malformed")?;

    let _log = Logger::from_config(&cfg.logging)?;

    Server::builder().config(cfg).build().await?.run().await
}
