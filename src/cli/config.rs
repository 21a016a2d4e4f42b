//! Config command handlers

use crate::cli::ConfigInitArgs;
use std::fs;

const EXAMPLE_CONFIG: &str = include_str!("../../retryscope.example.toml");

/// Handle `retryscope config init` command
pub fn handle_config_init(args: &ConfigInitArgs) -> Result<(), Box<dyn std::error::Error>> {
    if args.output.exists() && !args.force {
        return Err(format!(
            "File already exists: {}. Use --force to overwrite.",
            args.output.display()
        )
        .into());
    }

    fs::write(&args.output, EXAMPLE_CONFIG)?;

    println!("✓ Configuration file created: {}", args.output.display());
    println!("  Edit this file to customize your console instance.");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_init_creates_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let output_path = temp_dir.path().join("retryscope.toml");

        let args = ConfigInitArgs {
            output: output_path.clone(),
            force: false,
        };

        handle_config_init(&args).unwrap();

        assert!(output_path.exists());
        let content = std::fs::read_to_string(&output_path).unwrap();
        assert!(content.contains("[interceptor]"));
    }

    #[test]
    fn config_init_refuses_overwrite_without_force() {
        let temp_dir = tempfile::tempdir().unwrap();
        let output_path = temp_dir.path().join("retryscope.toml");
        std::fs::write(&output_path, "existing").unwrap();

        let args = ConfigInitArgs {
            output: output_path.clone(),
            force: false,
        };
        assert!(handle_config_init(&args).is_err());

        let args = ConfigInitArgs {
            output: output_path.clone(),
            force: true,
        };
        handle_config_init(&args).unwrap();
        assert!(std::fs::read_to_string(&output_path)
            .unwrap()
            .contains("[server]"));
    }

    #[test]
    fn example_config_parses() {
        let config: crate::config::ConsoleConfig = toml::from_str(EXAMPLE_CONFIG).unwrap();
        assert_eq!(config.server.port, 8700);
        assert_eq!(config.interceptor.max_retries, 3);
        config.validate().unwrap();
    }
}
