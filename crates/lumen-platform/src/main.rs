use clap::{Parser, Subcommand};
use lumen_platform::haptics::{self, HapticCommand, HapticKind, HapticSink};
use lumen_platform::photo::{self, PathResolver, PhotoRef};

#[derive(Parser, Debug)]
#[command(name = "lumen-platform", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Print the loadable file:// URI for a photo reference
    Resolve {
        /// A file:// URI, an absolute path or a library reference (library://, ph://, ...)
        reference: String,
    },
    /// Fire a single haptic pulse
    Haptic {
        /// light, medium, heavy, selection, success, warning or error
        kind: HapticKind,

        /// Vibration helper to run (defaults to logging the pulse)
        #[arg(short = 'c', long)]
        command: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Resolve { reference } => resolve(&reference),
        Commands::Haptic { kind, command } => {
            let command = command.map(HapticCommand::new);
            haptics::sink_for(command.as_ref()).pulse(kind)?;
            Ok(())
        }
    }
}

fn resolve(reference: &str) -> anyhow::Result<()> {
    let reference: PhotoRef = reference.parse()?;
    let uri = photo::default_resolver().resolve(&reference)?;
    println!("{}", uri);
    Ok(())
}
