use anyhow::Context;
use clap::Parser;
use lumen::config;
use lumen::gui::app::{AppInit, AppModel};
use lumen::sys::runtime;
use relm4::prelude::*;

#[derive(Parser, Debug)]
#[command(name = "lumen", version, about, long_about = None)]
struct Cli {
    /// Photo to edit: an absolute path, a file:// URI or a library reference
    photo: Option<String>,

    /// Skip every entrance animation
    #[arg(long)]
    reduced_motion: bool,

    /// Write the default configuration file and print its path
    #[arg(long)]
    write_config: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    if cli.write_config {
        let path = config::write_default_config().context("failed to write default config")?;
        println!("{}", path.display());
        return Ok(());
    }

    let config = config::load_or_default();

    let (tx, rx) = async_channel::bounded(32);

    // Start Background Services
    runtime::start_background_services(tx);

    // gtk must not see our own arguments
    let app = RelmApp::new("org.lumen.lumen").with_args(Vec::new());

    app.run::<AppModel>(AppInit {
        config,
        photo: cli.photo,
        reduced_motion: cli.reduced_motion.then_some(true),
        events: rx,
    });
    Ok(())
}
