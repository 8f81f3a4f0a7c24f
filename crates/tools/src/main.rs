use std::fs;
use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use pathmap::{Configuration, generate_map};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Generate one path map and print it as JSON.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML file with map parameters; individual flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of columns
    #[arg(long)]
    columns: Option<u32>,

    /// Minimum number of nodes per column
    #[arg(long)]
    min_nodes: Option<u32>,

    /// Maximum number of nodes per column
    #[arg(long)]
    max_nodes: Option<u32>,

    /// Minimum number of connections per node
    #[arg(long)]
    min_connection: Option<u32>,

    /// Maximum number of connections per node
    #[arg(long)]
    max_connection: Option<u32>,

    /// Write the map to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Pretty-print the JSON document
    #[arg(long)]
    pretty: bool,
}

impl Args {
    /// Defaults, then the config file, then flags.
    fn resolve_configuration(&self) -> Result<Configuration> {
        let mut config = match &self.config {
            Some(path) => Configuration::from_toml_file(path)
                .with_context(|| format!("Failed to load config file: {}", path.display()))?,
            None => Configuration::default(),
        };

        let overrides = [
            (&mut config.columns, self.columns),
            (&mut config.min_nodes, self.min_nodes),
            (&mut config.max_nodes, self.max_nodes),
            (&mut config.min_connection, self.min_connection),
            (&mut config.max_connection, self.max_connection),
        ];
        for (field, value) in overrides {
            if let Some(value) = value {
                *field = value;
            }
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("pathmap=info".parse()?)
                .add_directive("pathmap_gen=info".parse()?),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let config = args.resolve_configuration()?;
    let map = generate_map(&config)?;
    info!(columns = map.columns.len(), nodes = map.node_count(), "map generated");

    let json = if args.pretty { map.to_json_pretty() } else { map.to_json() };
    let json = json.context("Failed to serialize map")?;

    match &args.output {
        Some(path) => {
            fs::write(path, json)
                .with_context(|| format!("Failed to write map file: {}", path.display()))?;
            info!(path = %path.display(), "map written");
        }
        None => println!("{json}"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    fn parse(parts: &[&str]) -> Args {
        Args::try_parse_from(parts).expect("arguments should parse")
    }

    #[test]
    fn defaults_apply_without_file_or_flags() {
        let config = parse(&["pathmap-gen"]).resolve_configuration().expect("defaults resolve");
        assert_eq!(config, Configuration::default());
    }

    #[test]
    fn flags_override_individual_values() {
        let args = parse(&["pathmap-gen", "--columns", "5", "--max-connection", "4"]);
        let config = args.resolve_configuration().expect("flags resolve");
        assert_eq!(config.columns, 5);
        assert_eq!(config.max_connection, 4);
        assert_eq!(config.min_nodes, Configuration::default().min_nodes);
    }

    #[test]
    fn flags_win_over_config_file() {
        let mut file = NamedTempFile::new().expect("temp file");
        writeln!(file, "columns = 9\nminNodes = 3\nmaxNodes = 4").expect("write config");
        let path = file.path().to_str().expect("utf-8 temp path").to_string();

        let args = parse(&["pathmap-gen", "--config", &path, "--columns", "2"]);
        let config = args.resolve_configuration().expect("file and flags resolve");
        assert_eq!(config.columns, 2);
        assert_eq!(config.min_nodes, 3);
        assert_eq!(config.max_nodes, 4);
    }

    #[test]
    fn unreadable_config_file_reports_its_path() {
        let args = parse(&["pathmap-gen", "--config", "/definitely/not/here.toml"]);
        let err = args.resolve_configuration().expect_err("missing file should fail");
        assert!(err.to_string().contains("/definitely/not/here.toml"), "{err}");
    }

    #[test]
    fn invalid_values_surface_the_violated_constraint() {
        let args = parse(&["pathmap-gen", "--min-nodes", "4", "--max-nodes", "2"]);
        let config = args.resolve_configuration().expect("values resolve before validation");
        let err = generate_map(&config).expect_err("inverted range should be rejected");
        assert!(err.to_string().contains("maximum number of nodes"), "{err}");
    }
}
