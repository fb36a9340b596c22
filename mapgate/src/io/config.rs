//! Configuration stored in `mapgate.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_FILE: &str = "mapgate.toml";

/// Top-level configuration (TOML).
///
/// Edited by humans; missing fields fall back to the defaults below.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MapgateConfig {
    pub cache: CacheConfig,
    pub gen_srg: GenSrgConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CacheConfig {
    /// Turn off to always run work items and never write fingerprints.
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Paths for rename-table generation. Relative paths are resolved against
/// the directory holding the config file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GenSrgConfig {
    /// Obfuscated → intermediate mapping table.
    pub in_srg: PathBuf,
    pub fields_csv: PathBuf,
    pub methods_csv: PathBuf,
    pub notch_to_mcp: PathBuf,
    pub mcp_to_srg: PathBuf,
    pub mcp_to_notch: PathBuf,
}

impl Default for GenSrgConfig {
    fn default() -> Self {
        Self {
            in_srg: PathBuf::from("conf/joined.srg"),
            fields_csv: PathBuf::from("conf/fields.csv"),
            methods_csv: PathBuf::from("conf/methods.csv"),
            notch_to_mcp: PathBuf::from("build/srgs/notch-mcp.srg"),
            mcp_to_srg: PathBuf::from("build/srgs/mcp-srg.srg"),
            mcp_to_notch: PathBuf::from("build/srgs/mcp-notch.srg"),
        }
    }
}

impl GenSrgConfig {
    fn named_paths(&self) -> [(&'static str, &Path); 6] {
        [
            ("in_srg", self.in_srg.as_path()),
            ("fields_csv", self.fields_csv.as_path()),
            ("methods_csv", self.methods_csv.as_path()),
            ("notch_to_mcp", self.notch_to_mcp.as_path()),
            ("mcp_to_srg", self.mcp_to_srg.as_path()),
            ("mcp_to_notch", self.mcp_to_notch.as_path()),
        ]
    }

    /// Resolve relative paths against `base`.
    pub fn resolve(&self, base: &Path) -> GenSrgConfig {
        let join = |path: &Path| {
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                base.join(path)
            }
        };
        GenSrgConfig {
            in_srg: join(&self.in_srg),
            fields_csv: join(&self.fields_csv),
            methods_csv: join(&self.methods_csv),
            notch_to_mcp: join(&self.notch_to_mcp),
            mcp_to_srg: join(&self.mcp_to_srg),
            mcp_to_notch: join(&self.mcp_to_notch),
        }
    }
}

impl MapgateConfig {
    pub fn validate(&self) -> Result<()> {
        for (name, path) in self.gen_srg.named_paths() {
            if path.as_os_str().is_empty() {
                return Err(anyhow!("gen_srg.{name} must be a non-empty path"));
            }
        }
        let outputs = [
            &self.gen_srg.notch_to_mcp,
            &self.gen_srg.mcp_to_srg,
            &self.gen_srg.mcp_to_notch,
        ];
        if outputs[0] == outputs[1] || outputs[0] == outputs[2] || outputs[1] == outputs[2] {
            return Err(anyhow!("gen_srg output paths must be distinct"));
        }
        if outputs.contains(&&self.gen_srg.in_srg) {
            return Err(anyhow!("gen_srg.in_srg must not also be an output"));
        }
        Ok(())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `MapgateConfig::default()`.
pub fn load_config(path: &Path) -> Result<MapgateConfig> {
    if !path.exists() {
        let cfg = MapgateConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: MapgateConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Write the default config to `path`.
///
/// An existing file is left alone unless `force` is set. Returns whether the
/// file was written.
pub fn init_config(path: &Path, force: bool) -> Result<bool> {
    if path.exists() && !force {
        return Ok(false);
    }
    write_config(path, &MapgateConfig::default())?;
    Ok(true)
}

pub fn write_config(path: &Path, cfg: &MapgateConfig) -> Result<()> {
    cfg.validate()?;
    let rendered = toml::to_string_pretty(cfg).context("render mapgate config")?;
    replace_file(path, format!("{rendered}\n").as_bytes())
}

/// Replace `path` via a sibling `.partial` file and a rename.
fn replace_file(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(dir) = path.parent()
        && !dir.as_os_str().is_empty()
    {
        fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    }
    let mut staged = path.as_os_str().to_owned();
    staged.push(".partial");
    let staged = PathBuf::from(staged);
    fs::write(&staged, bytes).with_context(|| format!("stage {}", staged.display()))?;
    fs::rename(&staged, path).with_context(|| format!("install {}", path.display()))
}
