mod app;
mod catalog;
mod config;
mod form;
mod gallery;
mod intent;
mod models;
mod popup;

use std::path::Path;

use anyhow::Context;

use app::EcogalApp;
use config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("ecogal=info".parse().context("invalid log directive")?),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => Config::load(Path::new(&path))?,
        None => Config::default(),
    };

    EcogalApp::new(config).run().await
}
