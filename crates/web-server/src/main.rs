// Entry point for running the JSON API on its own (`cargo run -p web-server`).
// The `courier-desk serve` subcommand starts the same server.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = configuration::load_config()?;
    let _log_guard = configuration::init_tracing(&settings.logging)?;
    web_server::run_server(settings).await
}
