use clap::Parser;
use log::{error, info, warn};
use pet_classifier::classifier::LabelAdapter;
use pet_classifier::config::Config;
use pet_classifier::interface::Interface;
use pet_classifier::onnx::TractImageClassifier;
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(version, about = "Serve a dog/cat image classifier through a web interface")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "Config.toml")]
    config: PathBuf,

    /// Override the address to bind.
    #[arg(long)]
    host: Option<String>,

    /// Override the port to bind.
    #[arg(long)]
    port: Option<u16>,
}

fn load_config(args: &Args) -> Result<Config, Box<dyn Error>> {
    let mut config = if args.config.exists() {
        Config::load(&args.config)?
    } else {
        warn!("No configuration at {}, using defaults", args.config.display());
        Config::default()
    };

    if let Some(host) = &args.host {
        config.server.host = host.clone();
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    Ok(config)
}

#[actix_web::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = load_config(&args).map_err(|e| {
        error!("{}", e);
        e
    })?;

    let classifier = TractImageClassifier::load(&config.model).map_err(|e| {
        error!("{}", e);
        e
    })?;
    let adapter = LabelAdapter::new(Arc::new(classifier), config.interface.categories.clone());
    if !adapter.is_aligned() {
        warn!(
            "Model outputs a different number of classes than categories {:?}; probabilities pair up by position",
            adapter.categories()
        );
    }
    info!("Categories: {:?}", adapter.categories());

    let interface = Interface::from_config(Arc::new(adapter), &config.interface, &config.server);
    interface.launch(&config.server).await?;
    Ok(())
}
