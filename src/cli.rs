use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mediashelf")]
#[command(author, version, about = "Browse, convert and stream a local media folder over HTTP")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the sync worker and serve the folder
    Serve {
        /// Media folder to serve
        #[arg(required = true)]
        source: PathBuf,

        /// Mode key: mirror, direct, or copytotemp/nocopytotemp[_ffmpeglog][_meta]
        #[arg(long, default_value = "mirror")]
        mode: String,

        /// Show transcoder console output
        #[arg(long)]
        transcoder_log: bool,

        /// Extract cover previews and show audio tags in the player
        #[arg(long)]
        audio_meta: bool,

        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,
    },

    /// Probe a media file and display what the pipeline sees
    Probe {
        /// File to probe
        #[arg(required = true)]
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check that required external tools are available
    CheckTools,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
