use clap::Parser;
use node_sentinel::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    node_sentinel::init_tracing(&config);
    node_sentinel::run(config).await
}
