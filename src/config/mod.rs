mod run;
mod types;

pub use run::{LaunchMode, ModePreset, RunConfig};
pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;
    expand_paths(&mut config);

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = [
        "./mediashelf.toml",
        "~/.config/mediashelf/config.toml",
        "/etc/mediashelf/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    Ok(Config::default())
}

fn expand_paths(config: &mut Config) {
    let expand = |p: &Path| -> std::path::PathBuf {
        shellexpand::tilde(&p.to_string_lossy()).into_owned().into()
    };

    config.storage.data_dir = expand(&config.storage.data_dir);
    if let Some(ref dir) = config.storage.assets_dir {
        config.storage.assets_dir = Some(expand(dir));
    }
    if let Some(ref p) = config.tools.ffmpeg_path {
        config.tools.ffmpeg_path = Some(expand(p));
    }
    if let Some(ref p) = config.tools.ffprobe_path {
        config.tools.ffprobe_path = Some(expand(p));
    }
}

/// Validate configuration
fn validate_config(config: &Config) -> Result<()> {
    if config.server.port == 0 {
        anyhow::bail!("Server port cannot be 0");
    }

    if config.storage.data_dir.as_os_str().is_empty() {
        anyhow::bail!("Storage data_dir cannot be empty");
    }

    for path in [&config.tools.ffmpeg_path, &config.tools.ffprobe_path]
        .into_iter()
        .flatten()
    {
        if !path.exists() {
            tracing::warn!("Configured tool path does not exist: {:?}", path);
        }
    }

    Ok(())
}
