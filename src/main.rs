use anyhow::Context;
use clap::Parser;
use eta_predictor::{
    config::{socket_addr, Cli, Command},
    metadata::FeatureMetadata,
    model,
    part_of_day::classify,
    server::{self, AppState},
    shell::Shell,
    Predictor,
};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Loads metadata and model, then warms the model up on the form defaults so
/// schema problems surface before any user input.
fn load_artifacts(cli: &Cli) -> anyhow::Result<(FeatureMetadata, Arc<dyn Predictor>)> {
    let meta = FeatureMetadata::load(&cli.meta_path)
        .with_context(|| format!("failed to load metadata {}", cli.meta_path.display()))?;
    let predictor = model::load(&cli.model_path, cli.torch_meta_path.as_deref())
        .with_context(|| format!("failed to load model {}", cli.model_path.display()))?;
    tracing::info!(
        model = predictor.name(),
        version = predictor.version().unwrap_or("-"),
        "loaded model from {}",
        cli.model_path.display()
    );

    let defaults = meta.defaults().context("metadata is missing a form field")?;
    let warm = eta_predictor::estimate(predictor.as_ref(), defaults).context("warmup prediction failed")?;
    tracing::info!("warmup ok: {:.1} minutes", warm.eta_minutes);

    Ok((meta, predictor))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Classify { hour } => println!("{}", classify(hour)),
        Command::Shell => {
            // synchronous form; no runtime needed
            let (meta, predictor) = load_artifacts(&cli)?;
            let stdin = std::io::stdin();
            let mut shell = Shell::new(&meta, stdin.lock(), std::io::stdout());
            shell.run(predictor.as_ref())?;
        }
        Command::Serve { bind, port } => {
            let (meta, predictor) = load_artifacts(&cli)?;
            let state = AppState {
                predictor,
                meta: Arc::new(meta),
            };
            tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .context("failed to build tokio runtime")?
                .block_on(server::serve(state, socket_addr(bind, port)))?;
        }
    }
    Ok(())
}
