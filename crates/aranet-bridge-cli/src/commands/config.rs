//! Config command implementation.

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};

use crate::cli::{ConfigAction, OutputFormat};
use crate::config::Config;
use crate::format::FormatOptions;
use crate::util::write_output;

pub fn cmd_config(
    action: ConfigAction,
    config: &Config,
    format: OutputFormat,
    output: Option<&PathBuf>,
    quiet: bool,
    opts: &FormatOptions,
) -> Result<()> {
    let path = Config::path();
    match action {
        ConfigAction::Path => write_output(output, &format!("{}\n", path.display())),
        ConfigAction::Show => {
            let content = match format {
                OutputFormat::Json => opts.as_json(config)?,
                OutputFormat::Text => config.to_toml()?,
            };
            write_output(output, &content)
        }
        ConfigAction::Init { force } => {
            init_config(&path, force)?;
            if !quiet {
                eprintln!("Created {}", path.display());
            }
            Ok(())
        }
    }
}

/// Write a default config file, refusing to overwrite unless `force`.
fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }
    Config::default().save_to(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aranet-bridge").join("config.toml");

        init_config(&path, false).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("[tool]"));
        assert!(content.contains("program = \"aranetctl\""));
        assert!(content.contains("min_interval_secs = 10"));
        assert_eq!(Config::load_from(&path), Config::default());
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "device = \"office\"\n").unwrap();

        let err = init_config(&path, false).unwrap_err();
        assert!(err.to_string().contains("already exists"));
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "device = \"office\"\n"
        );

        init_config(&path, true).unwrap();
        assert_eq!(Config::load_from(&path).device, None);
    }
}
