//! Content-addressed rename-table generator.
//!
//! `mapgate gen-srg` rewrites the obfuscated → intermediate mapping table into
//! the three derived tables, skipping the work when every output still
//! matches the fingerprint recorded beside it.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use mapgate::core::descriptor::WorkItem;
use mapgate::exit_codes;
use mapgate::gen_srg::GenSrg;
use mapgate::io::config::{DEFAULT_CONFIG_FILE, MapgateConfig, init_config, load_config};
use mapgate::io::gate::{CacheGate, CacheOptions, GateDecision};
use mapgate::io::hash::hash_path_all;
use mapgate::logging;
use mapgate::run::{RunOutcome, run_cached};

#[derive(Parser)]
#[command(
    name = "mapgate",
    version,
    about = "Content-addressed rename-table generator"
)]
struct Cli {
    /// Project root; the default config is `<root>/mapgate.toml`.
    #[arg(long, default_value = ".")]
    root: PathBuf,
    /// Config file. Relative paths inside it resolve against its directory.
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a default `mapgate.toml` if missing.
    Init {
        /// Overwrite an existing config.
        #[arg(short, long)]
        force: bool,
    },
    /// Generate the derived mapping tables unless they are up to date.
    GenSrg {
        /// Always run and do not record fingerprints.
        #[arg(long)]
        no_cache: bool,
    },
    /// Report whether gen-srg would run (exit 2 when stale).
    Status {
        #[arg(long)]
        json: bool,
    },
    /// Print the hash tokens of a file or directory.
    Hash { path: PathBuf },
}

fn main() {
    logging::init();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::INVALID);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    match cli.command {
        Command::Init { force } => cmd_init(&config_path(&cli.root, cli.config.as_deref()), force),
        Command::GenSrg { no_cache } => {
            let project = Project::load(&cli.root, cli.config.as_deref())?;
            cmd_gen_srg(&project, no_cache)
        }
        Command::Status { json } => {
            let project = Project::load(&cli.root, cli.config.as_deref())?;
            cmd_status(&project, json)
        }
        Command::Hash { path } => cmd_hash(&path),
    }
}

fn config_path(root: &Path, config: Option<&Path>) -> PathBuf {
    match config {
        Some(path) => path.to_path_buf(),
        None => root.join(DEFAULT_CONFIG_FILE),
    }
}

/// Loaded config plus the directory its relative paths resolve against.
struct Project {
    config: MapgateConfig,
    base: PathBuf,
}

impl Project {
    fn load(root: &Path, config: Option<&Path>) -> Result<Self> {
        let config_path = config_path(root, config);
        let config = load_config(&config_path)
            .with_context(|| format!("load config {}", config_path.display()))?;
        let base = match config_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Ok(Self { config, base })
    }

    fn gen_srg(&self) -> GenSrg {
        GenSrg::from_config(&self.config.gen_srg, &self.base)
    }

    fn cache_options(&self, no_cache: bool) -> CacheOptions {
        CacheOptions {
            enabled: self.config.cache.enabled && !no_cache,
        }
    }
}

fn cmd_init(path: &Path, force: bool) -> Result<i32> {
    if init_config(path, force).with_context(|| format!("init {}", path.display()))? {
        println!("wrote {}", path.display());
    } else {
        println!("{} exists; pass --force to overwrite", path.display());
    }
    Ok(exit_codes::OK)
}

fn cmd_gen_srg(project: &Project, no_cache: bool) -> Result<i32> {
    let item = project.gen_srg();
    let gate = CacheGate::new();
    match run_cached(&item, &gate, &project.cache_options(no_cache))? {
        RunOutcome::UpToDate => println!("{}: up-to-date", item.name()),
        RunOutcome::Ran {
            decision, output, ..
        } => println!(
            "{}: ran ({decision}); {} classes, {} fields ({} renamed), {} methods ({} renamed)",
            item.name(),
            output.classes,
            output.fields,
            output.renamed_fields,
            output.methods,
            output.renamed_methods,
        ),
    }
    Ok(exit_codes::OK)
}

#[derive(Serialize)]
struct StatusReport<'a> {
    item: &'a str,
    should_run: bool,
    #[serde(flatten)]
    decision: &'a GateDecision,
}

fn cmd_status(project: &Project, json: bool) -> Result<i32> {
    let item = project.gen_srg();
    let gate = CacheGate::new();
    let decision = gate.decide(&item, &project.cache_options(false));
    if json {
        let report = StatusReport {
            item: item.name(),
            should_run: decision.should_run(),
            decision: &decision,
        };
        let payload = serde_json::to_string_pretty(&report).context("serialize status json")?;
        println!("{payload}");
    } else {
        println!("{}: {decision}", item.name());
    }
    Ok(if decision.should_run() {
        exit_codes::STALE
    } else {
        exit_codes::OK
    })
}

fn cmd_hash(path: &Path) -> Result<i32> {
    let tokens = hash_path_all(path).with_context(|| format!("hash {}", path.display()))?;
    for token in tokens {
        println!("{token}");
    }
    Ok(exit_codes::OK)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_init_force() {
        let cli = Cli::parse_from(["mapgate", "init", "--force"]);
        assert!(matches!(cli.command, Command::Init { force: true }));
    }

    #[test]
    fn parse_gen_srg_defaults() {
        let cli = Cli::parse_from(["mapgate", "gen-srg"]);
        assert_eq!(cli.root, PathBuf::from("."));
        assert!(cli.config.is_none());
        assert!(matches!(cli.command, Command::GenSrg { no_cache: false }));
    }

    #[test]
    fn parse_gen_srg_no_cache_with_root() {
        let cli = Cli::parse_from(["mapgate", "--root", "proj", "gen-srg", "--no-cache"]);
        assert_eq!(cli.root, PathBuf::from("proj"));
        assert!(matches!(cli.command, Command::GenSrg { no_cache: true }));
    }

    #[test]
    fn parse_status_json() {
        let cli = Cli::parse_from(["mapgate", "status", "--json"]);
        assert!(matches!(cli.command, Command::Status { json: true }));
    }

    #[test]
    fn parse_hash_path() {
        let cli = Cli::parse_from(["mapgate", "hash", "conf/joined.srg"]);
        match cli.command {
            Command::Hash { path } => assert_eq!(path, PathBuf::from("conf/joined.srg")),
            _ => panic!("expected hash command"),
        }
    }

    #[test]
    fn project_resolves_against_config_directory() {
        let temp = tempfile::tempdir().expect("tempdir");
        let config = temp.path().join("cfg").join(DEFAULT_CONFIG_FILE);
        let project = Project::load(Path::new("."), Some(&config)).expect("load");
        assert_eq!(
            project.gen_srg().in_srg,
            temp.path().join("cfg").join("conf/joined.srg")
        );
    }

    #[test]
    fn no_cache_flag_overrides_config() {
        let project = Project {
            config: MapgateConfig::default(),
            base: PathBuf::from("."),
        };
        assert!(project.cache_options(false).enabled);
        assert!(!project.cache_options(true).enabled);
    }

    #[test]
    fn status_json_flattens_decision_tag() {
        let decision = GateDecision::UpToDate;
        let report = StatusReport {
            item: "gen-srg",
            should_run: false,
            decision: &decision,
        };
        let value = serde_json::to_value(&report).expect("json");
        assert_eq!(value["item"], "gen-srg");
        assert_eq!(value["decision"], "up_to_date");
        assert_eq!(value["should_run"], false);
    }
}
