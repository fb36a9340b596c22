//! The rename-table generation work item.
//!
//! Reads the obfuscated → intermediate table plus the field and method
//! dictionaries and writes the three derived tables. All three outputs are
//! cached; the table and both dictionaries are tracked inputs.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::descriptor::{Descriptor, TrackedInput, WorkItem};
use crate::core::srg::{RenameDictionary, Renames};
use crate::error::MapError;
use crate::io::config::GenSrgConfig;
use crate::io::dictionary::load_dictionary;
use crate::io::transform::{TablePaths, TransformStats, transform_files};
use crate::run::Execute;

/// Rename dictionary sources, shared by every work item that renames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameSources {
    pub fields_csv: PathBuf,
    pub methods_csv: PathBuf,
}

impl RenameSources {
    /// Tracked inputs contributed by the dictionaries.
    pub fn descriptor() -> Descriptor<Self> {
        Descriptor::new()
            .input(TrackedInput::file("fields_csv", |s: &RenameSources| {
                Some(s.fields_csv.clone())
            }))
            .input(TrackedInput::file("methods_csv", |s: &RenameSources| {
                Some(s.methods_csv.clone())
            }))
    }

    /// Load `(fields, methods)`.
    pub fn load(&self) -> Result<(RenameDictionary, RenameDictionary), MapError> {
        Ok((
            load_dictionary(&self.fields_csv)?,
            load_dictionary(&self.methods_csv)?,
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenSrg {
    pub in_srg: PathBuf,
    pub dictionaries: RenameSources,
    pub notch_to_mcp: PathBuf,
    pub mcp_to_srg: PathBuf,
    pub mcp_to_notch: PathBuf,
}

impl GenSrg {
    /// Build from config, resolving relative paths against `base`.
    pub fn from_config(cfg: &GenSrgConfig, base: &Path) -> Self {
        let cfg = cfg.resolve(base);
        Self {
            in_srg: cfg.in_srg,
            dictionaries: RenameSources {
                fields_csv: cfg.fields_csv,
                methods_csv: cfg.methods_csv,
            },
            notch_to_mcp: cfg.notch_to_mcp,
            mcp_to_srg: cfg.mcp_to_srg,
            mcp_to_notch: cfg.mcp_to_notch,
        }
    }

    pub fn table_paths(&self) -> TablePaths {
        TablePaths {
            input: self.in_srg.clone(),
            obf_to_final: self.notch_to_mcp.clone(),
            final_to_intermediate: self.mcp_to_srg.clone(),
            final_to_obf: self.mcp_to_notch.clone(),
        }
    }
}

fn dictionaries_of(item: &GenSrg) -> &RenameSources {
    &item.dictionaries
}

impl WorkItem for GenSrg {
    fn name(&self) -> &str {
        "gen-srg"
    }

    fn descriptor() -> Descriptor<Self> {
        Descriptor::new()
            .cached_output("notch_to_mcp", |g: &GenSrg| g.notch_to_mcp.clone())
            .cached_output("mcp_to_srg", |g: &GenSrg| g.mcp_to_srg.clone())
            .cached_output("mcp_to_notch", |g: &GenSrg| g.mcp_to_notch.clone())
            .input(TrackedInput::file("in_srg", |g: &GenSrg| {
                Some(g.in_srg.clone())
            }))
            .embed(RenameSources::descriptor(), dictionaries_of)
    }
}

impl Execute for GenSrg {
    type Output = TransformStats;

    fn execute(&self) -> Result<TransformStats> {
        let (fields, methods) = self.dictionaries.load().context("load rename dictionaries")?;
        let renames = Renames {
            fields: &fields,
            methods: &methods,
        };
        let stats = transform_files(&self.table_paths(), renames)
            .with_context(|| format!("transform {}", self.in_srg.display()))?;
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::descriptor::AttributeRole;

    #[test]
    fn descriptor_declares_outputs_then_inputs_with_embedded_dictionaries() {
        let attributes = GenSrg::descriptor().attributes();
        assert_eq!(
            attributes,
            vec![
                ("notch_to_mcp", AttributeRole::CachedOutput),
                ("mcp_to_srg", AttributeRole::CachedOutput),
                ("mcp_to_notch", AttributeRole::CachedOutput),
                ("in_srg", AttributeRole::TrackedInput),
                ("fields_csv", AttributeRole::TrackedInput),
                ("methods_csv", AttributeRole::TrackedInput),
            ]
        );
    }

    #[test]
    fn from_config_resolves_against_base() {
        let item = GenSrg::from_config(&GenSrgConfig::default(), Path::new("/proj"));
        assert_eq!(item.in_srg, PathBuf::from("/proj/conf/joined.srg"));
        assert_eq!(
            item.dictionaries.methods_csv,
            PathBuf::from("/proj/conf/methods.csv")
        );
        assert_eq!(
            item.table_paths().final_to_obf,
            PathBuf::from("/proj/build/srgs/mcp-notch.srg")
        );
    }
}
