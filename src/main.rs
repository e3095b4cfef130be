mod cli;

use segcat::{
    config,
    report::{LocateReport, TimelineReport},
};
use segcat_common::time::parse_duration;
use segcat_media::Catalog;
use segcat_parser::{Parser as ScriptParser, SafeMode, Script};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::io::Read;
use std::path::Path;

/// Bytes read from a file when probing it.
const PROBE_BUFFER_SIZE: u64 = 4096;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "segcat=trace,segcat_media=trace,segcat_parser=debug,segcat_common=debug".to_string()
        } else {
            "segcat=info,segcat_media=warn,segcat_parser=warn".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Timeline { script, json, safe } => {
            timeline(&script, cli.config.as_deref(), safe, json)
        }
        Commands::Locate { script, time, json } => {
            locate(&script, &time, cli.config.as_deref(), json)
        }
        Commands::Probe { file } => probe_file(&file),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("segcat {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Parse a descriptor file and build its catalog.
fn load_script(
    path: &Path,
    config_path: Option<&Path>,
    safe: Option<SafeMode>,
) -> Result<(Script, Catalog)> {
    let config = config::load_config_or_default(config_path)?;

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read descriptor: {:?}", path))?;

    let mut parser_config = config
        .concat
        .parser_config(Some(&*path.to_string_lossy()));
    if let Some(mode) = safe {
        parser_config.safe = mode;
    }

    tracing::debug!("Parsing {:?} (safe mode: {})", path, parser_config.safe);
    let script = ScriptParser::new(parser_config)
        .parse(&content)
        .with_context(|| format!("Failed to parse descriptor: {:?}", path))?;

    let catalog = Catalog::builder()
        .script(&script)?
        .build()
        .with_context(|| format!("No segments in descriptor: {:?}", path))?;

    Ok((script, catalog))
}

fn timeline(path: &Path, config_path: Option<&Path>, safe: Option<SafeMode>, json: bool) -> Result<()> {
    let (script, catalog) = load_script(path, config_path, safe)?;
    let report = TimelineReport::new(&script, &catalog);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.render_text());
    }

    Ok(())
}

fn locate(path: &Path, time: &str, config_path: Option<&Path>, json: bool) -> Result<()> {
    let target = parse_duration(time).with_context(|| format!("Invalid time: '{}'", time))?;
    let (_, catalog) = load_script(path, config_path, None)?;

    if !catalog.is_seekable() {
        return Err(segcat_media::Error::NotSeekable)
            .with_context(|| format!("Some durations in {:?} are unknown", path));
    }

    let report = LocateReport::new(&catalog, target)
        .with_context(|| format!("No segment found for {}", time))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.render_text());
    }

    Ok(())
}

fn probe_file(file: &Path) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {:?}", file);
    }

    let mut buf = Vec::new();
    std::fs::File::open(file)
        .and_then(|f| f.take(PROBE_BUFFER_SIZE).read_to_end(&mut buf))
        .with_context(|| format!("Failed to read file: {:?}", file))?;

    let score = segcat_parser::probe(&buf);
    if score > 0 {
        println!("{}: concat descriptor (score {})", file.display(), score);
    } else {
        println!("{}: not a concat descriptor (score {})", file.display(), score);
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            print_concat_config(&config.concat);
        }
        None => {
            println!("No config file specified, using defaults");
            let config = config::Config::default();
            println!("Default config:");
            print_concat_config(&config.concat);
        }
    }

    Ok(())
}

fn print_concat_config(concat: &config::ConcatConfig) {
    println!("  Safe mode: {}", concat.safe);
    match concat.timeout_ms {
        Some(ms) => println!("  Open timeout: {} ms", ms),
        None => println!("  Open timeout: none"),
    }
}
