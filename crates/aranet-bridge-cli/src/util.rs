//! Utility functions for CLI operations.

use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

/// Require at least one device, with a helpful error message.
pub fn require_devices(devices: Vec<String>) -> Result<Vec<String>> {
    if devices.is_empty() {
        bail!(
            "No device specified. Pass an address, use --device <ADDRESS>, set the \
             ARANET_DEVICE environment variable, or set `device` in the config file.\n\
             Run 'aranet-bridge scan' to find nearby devices."
        );
    }
    Ok(devices)
}

/// Write output to file or stdout
pub fn write_output(output: Option<&PathBuf>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write to {}", path.display()))?;
        }
        None => {
            print!("{}", content);
            io::stdout().flush()?;
        }
    }
    Ok(())
}

/// Open a stream for line-by-line output: the file (truncated) or stdout.
pub fn open_output(output: Option<&PathBuf>) -> Result<Box<dyn Write>> {
    match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(io::stdout())),
    }
}

/// Read a whole file, or stdin for `None` and `-`.
pub fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        _ => {
            let mut content = String::new();
            io::stdin()
                .read_to_string(&mut content)
                .context("Failed to read standard input")?;
            Ok(content)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_devices_with_some() {
        let result = require_devices(vec!["AA:BB:CC:DD:EE:FF".to_string()]).unwrap();
        assert_eq!(result, vec!["AA:BB:CC:DD:EE:FF"]);
    }

    #[test]
    fn test_require_devices_with_none() {
        let err = require_devices(vec![]).unwrap_err().to_string();
        assert!(err.contains("No device specified"));
        assert!(err.contains("ARANET_DEVICE"));
    }

    #[test]
    fn test_write_output_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        write_output(Some(&path), "hello\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello\n");
    }

    #[test]
    fn test_open_output_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("watch.log");
        {
            let mut out = open_output(Some(&path)).unwrap();
            out.write_all(b"one\n").unwrap();
            out.write_all(b"two\n").unwrap();
        }
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "one\ntwo\n");
    }

    #[test]
    fn test_read_input_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("capture.txt");
        std::fs::write(&path, "= D =\nName: Office\n").unwrap();
        assert_eq!(read_input(Some(&path)).unwrap(), "= D =\nName: Office\n");
    }

    #[test]
    fn test_read_input_missing_file() {
        let err = read_input(Some(Path::new("/nonexistent/capture.txt"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }
}
