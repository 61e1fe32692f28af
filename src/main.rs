mod cli;

use mediashelf::{
    cache::DerivativeCache,
    config::{self, ModePreset, RunConfig},
    conversion::{self, FfmpegConverter, FfprobeProber, MediaProber, ToolPaths},
    server::{self, AppContext},
    sync::SyncOrchestrator,
};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::{Path, PathBuf};
use std::sync::Arc;

struct ServeArgs {
    source: PathBuf,
    mode: String,
    transcoder_log: bool,
    audio_meta: bool,
    port: Option<u16>,
    host: Option<String>,
}

async fn serve(args: ServeArgs, config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    let preset: ModePreset = args
        .mode
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;

    // The only fatal condition: no usable server root.
    let source = args
        .source
        .canonicalize()
        .with_context(|| format!("Source folder does not exist: {:?}", args.source))?;
    if !source.is_dir() {
        anyhow::bail!("Source is not a folder: {:?}", source);
    }

    let host = args.host.unwrap_or(config.server.host.clone());
    let port = args.port.unwrap_or(config.server.port);
    if port == 0 {
        anyhow::bail!("Server port cannot be 0");
    }

    let run = RunConfig::from_preset(preset, args.transcoder_log, args.audio_meta, port, source);

    let data_dir = absolute(&config.storage.data_dir)?;
    let cache = DerivativeCache::new(&data_dir);

    let tools = ToolPaths::discover(&config.tools);
    tracing::debug!("Using ffmpeg {:?}, ffprobe {:?}", tools.ffmpeg, tools.ffprobe);
    let prober: Arc<dyn MediaProber> = Arc::new(FfprobeProber::new(tools.ffprobe.clone()));
    let converter = Arc::new(FfmpegConverter::new(
        tools.ffmpeg.clone(),
        prober.clone(),
        run.verbose_transcoder_log,
        data_dir.clone(),
    ));

    let ctx = AppContext::new(
        run.clone(),
        cache.clone(),
        absolute(&config.storage.assets_dir())?,
        prober,
    )
    .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;

    println!("Mode: {} ({})", run.mode, run.mode.description());
    println!(
        "Transcoder log: {}",
        if run.verbose_transcoder_log { "on" } else { "off" }
    );
    println!(
        "Audio metadata: {}",
        if run.show_audio_meta { "on" } else { "off" }
    );
    println!("Listening on: http://{}:{}", host, port);
    println!("Selected folder: {}", run.source_root.display());
    println!("Server root: {}", ctx.server_root().display());

    let orchestrator = Arc::new(SyncOrchestrator::new(&run, cache, converter));
    let _worker = orchestrator.spawn()?;

    server::start_server(ctx, &host, port).await
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    Ok(cwd.join(path))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "mediashelf=trace,tower_http=debug".to_string()
        } else {
            "mediashelf=info,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Serve {
            source,
            mode,
            transcoder_log,
            audio_meta,
            port,
            host,
        } => {
            let args = ServeArgs {
                source,
                mode,
                transcoder_log,
                audio_meta,
                port,
                host,
            };
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(serve(args, cli.config.as_deref()))
        }
        Commands::Probe { file, json } => probe_file(&file, json, cli.config.as_deref()),
        Commands::CheckTools => check_tools(cli.config.as_deref()),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("mediashelf {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn probe_file(file: &Path, json: bool, config_path: Option<&Path>) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {:?}", file);
    }

    let config = config::load_config_or_default(config_path)?;
    let tools = ToolPaths::discover(&config.tools);
    let prober = FfprobeProber::new(tools.ffprobe);

    let resolution = prober.resolution(file);
    let frame_rate = prober.frame_rate(file);
    let mut tags: Vec<(String, String)> = prober.audio_tags(file).into_iter().collect();
    tags.sort();

    if json {
        let report = serde_json::json!({
            "file": file,
            "resolution": resolution.map(|(w, h)| serde_json::json!({ "width": w, "height": h })),
            "frame_rate": frame_rate,
            "tags": tags
                .iter()
                .map(|(k, v)| (k.clone(), serde_json::Value::from(v.as_str())))
                .collect::<serde_json::Map<String, serde_json::Value>>(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("File: {}", file.display());
        match resolution {
            Some((w, h)) => println!("Resolution: {}x{}", w, h),
            None => println!("Resolution: unknown"),
        }
        match frame_rate {
            Some(fps) => println!("Frame rate: {:.3} fps", fps),
            None => println!("Frame rate: unknown"),
        }
        println!("\nTags: {}", tags.len());
        for (key, value) in &tags {
            println!("  {}: {}", key, value);
        }
    }

    Ok(())
}

fn check_tools(config_path: Option<&Path>) -> Result<()> {
    println!("Checking external tools...\n");

    let config = config::load_config_or_default(config_path)?;
    let tools = conversion::check_tools(&ToolPaths::discover(&config.tools));
    let mut all_ok = true;

    for tool in &tools {
        let status = if tool.available {
            "✓"
        } else {
            all_ok = false;
            "✗"
        };

        print!("{} {}", status, tool.name);

        if let Some(ref version) = tool.version {
            print!(" ({})", version);
        }

        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }

        println!();
    }

    println!();
    if all_ok {
        println!("All required tools are available!");
    } else {
        println!("Some tools are missing. Conversions will be skipped until they are installed.");
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            config
        }
        None => {
            println!("No config file specified, using defaults");
            config::Config::default()
        }
    };

    println!("  Server: {}:{}", config.server.host, config.server.port);
    println!("  Data dir: {}", config.storage.data_dir.display());
    println!("  Assets dir: {}", config.storage.assets_dir().display());
    if let Some(ref p) = config.tools.ffmpeg_path {
        println!("  ffmpeg: {}", p.display());
    }
    if let Some(ref p) = config.tools.ffprobe_path {
        println!("  ffprobe: {}", p.display());
    }

    Ok(())
}
