//! bnd-embed: managed declaration graph → C and Java/JNA bindings.
//!
//! Reads the declaration graph of one or more managed assemblies (serialized
//! as TOML by a reflection provider) and emits a C ABI surface
//! (`<unit>.h` + `<unit>.c`) plus a Java surface calling it through JNA.
//!
//! # Quick start
//!
//! Generate and write every file described by a config:
//!
//! ```no_run
//! use std::path::Path;
//!
//! // Reads config TOML, loads declarations, writes the generated tree.
//! bnd_embed::run(Path::new("bnd-embed.toml"), None, &[]).unwrap();
//! ```
//!
//! Or get the files in memory without touching the disk:
//!
//! ```no_run
//! use std::path::Path;
//!
//! let files = bnd_embed::generate(Path::new("bnd-embed.toml")).unwrap();
//! for f in &files {
//!     println!("{}", f.path.display());
//! }
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rayon::prelude::*;
use tracing::{info, warn};

pub mod config;
pub mod emit;
pub mod error;
pub mod ident;
pub mod marshal;
pub mod model;
pub mod printer;
pub mod support;
pub mod writer;

#[cfg(test)]
mod test_support;

pub use config::Target;
pub use emit::GeneratedFile;

use error::GenError;
use model::{DeclIndex, TranslationUnit};

/// Generation outcome of one translation unit.
#[derive(Debug)]
pub struct UnitOutput {
    /// Assembly file name of the unit.
    pub unit: String,
    /// Every file of the unit, or the error that aborted it.
    pub files: std::result::Result<Vec<GeneratedFile>, GenError>,
}

/// Run the full pipeline: load config, load declarations, emit every target,
/// and write the output tree.
///
/// `output` optionally overrides the output directory from the config.
/// `targets` restricts generation to the given surfaces; empty means the
/// targets listed in the config.
///
/// Units are independent: a unit that fails writes nothing, the others are
/// still written, and the returned error lists every failed unit.
///
/// Returns the output directory.
pub fn run(config_path: &Path, output: Option<&Path>, targets: &[Target]) -> Result<PathBuf> {
    let cfg = config::load_config(config_path)
        .with_context(|| format!("loading config from {}", config_path.display()))?;

    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
    let output_dir = match output {
        Some(p) => p.to_path_buf(),
        None => base_dir.join(&cfg.output.dir),
    };

    let outputs = generate_units(&cfg, base_dir, targets)?;

    let mut failed = Vec::new();
    for out in &outputs {
        match &out.files {
            Ok(files) => {
                write_files(&output_dir, files)?;
                info!(unit = %out.unit, files = files.len(), "wrote unit");
            }
            Err(e) => {
                warn!(unit = %out.unit, error = %e, "unit failed, nothing written");
                failed.push(format!("{}: {e}", out.unit));
            }
        }
    }

    if cfg.options.generate_support_files && failed.len() < outputs.len() {
        let support = support::support_files(effective_targets(&cfg, targets));
        write_files(&output_dir, &support)?;
        info!(files = support.len(), "wrote support files");
    }

    if !failed.is_empty() {
        anyhow::bail!(
            "{} of {} unit(s) failed:\n  {}",
            failed.len(),
            outputs.len(),
            failed.join("\n  ")
        );
    }

    info!(path = %output_dir.display(), "generation complete");
    Ok(output_dir)
}

/// Load a `bnd-embed.toml` config and return every generated file without
/// writing to disk. Fails if any unit fails.
pub fn generate(config_path: &Path) -> Result<Vec<GeneratedFile>> {
    let cfg = config::load_config(config_path)
        .with_context(|| format!("loading config from {}", config_path.display()))?;

    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));

    generate_from_config(&cfg, base_dir)
}

/// Generate every file from an already-loaded [`config::Config`].
///
/// `base_dir` is the directory relative to which declaration paths in the
/// config are resolved (typically the parent directory of the TOML file).
pub fn generate_from_config(cfg: &config::Config, base_dir: &Path) -> Result<Vec<GeneratedFile>> {
    let outputs = generate_units(cfg, base_dir, &[])?;

    let mut files = Vec::new();
    let mut failed = Vec::new();
    for out in outputs {
        match out.files {
            Ok(unit_files) => files.extend(unit_files),
            Err(e) => failed.push(format!("{}: {e}", out.unit)),
        }
    }
    if !failed.is_empty() {
        anyhow::bail!("generation failed:\n  {}", failed.join("\n  "));
    }
    if cfg.options.generate_support_files {
        files.extend(support::support_files(&cfg.options.targets));
    }
    Ok(files)
}

fn effective_targets<'t>(cfg: &'t config::Config, targets: &'t [Target]) -> &'t [Target] {
    if targets.is_empty() {
        &cfg.options.targets
    } else {
        targets
    }
}

/// Load every unit and generate each one in parallel, keeping failures per
/// unit. Only configuration and declaration loading errors are fatal here.
pub fn generate_units(
    cfg: &config::Config,
    base_dir: &Path,
    targets: &[Target],
) -> Result<Vec<UnitOutput>> {
    let targets = effective_targets(cfg, targets);
    info!(
        units = cfg.unit.len(),
        targets = ?targets,
        "loaded configuration"
    );

    let units = cfg
        .unit
        .iter()
        .map(|u| config::load_unit(u, base_dir, &cfg.include_paths))
        .collect::<Result<Vec<TranslationUnit>>>()?;

    // The index spans every unit so cross-assembly references resolve.
    let index = DeclIndex::build(&units);
    info!(types = index.len(), "indexed declarations");

    let mut outputs: Vec<UnitOutput> = units
        .par_iter()
        .map(|unit| UnitOutput {
            unit: unit.file_name.clone(),
            files: generate_unit(unit, &index, &cfg.options, targets),
        })
        .collect();

    reject_cross_unit_collisions(&mut outputs);
    Ok(outputs)
}

fn generate_unit(
    unit: &TranslationUnit,
    index: &DeclIndex,
    options: &config::Options,
    targets: &[Target],
) -> std::result::Result<Vec<GeneratedFile>, GenError> {
    let mut files = Vec::new();
    for &target in targets {
        files.extend(emit::emit_unit(unit, index, options, target)?);
    }
    info!(unit = %unit.file_name, files = files.len(), "generated unit");
    Ok(files)
}

/// Output paths must be unique across the whole run. The later unit (in
/// config order) loses a contested path.
fn reject_cross_unit_collisions(outputs: &mut [UnitOutput]) {
    let mut owners: HashMap<PathBuf, usize> = HashMap::new();
    for (i, out) in outputs.iter_mut().enumerate() {
        let Ok(files) = &out.files else { continue };
        let clash = files
            .iter()
            .find(|f| owners.get(&f.path).is_some_and(|&owner| owner != i))
            .map(|f| f.path.clone());
        match clash {
            Some(path) => {
                out.files = Err(GenError::PathCollision {
                    path: path.display().to_string(),
                });
            }
            None => {
                for f in files {
                    owners.insert(f.path.clone(), i);
                }
            }
        }
    }
}

fn write_files(dir: &Path, files: &[GeneratedFile]) -> Result<()> {
    for file in files {
        let path = dir.join(&file.path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating directory {}", parent.display()))?;
        }
        std::fs::write(&path, &file.contents)
            .with_context(|| format!("writing output to {}", path.display()))?;
    }
    Ok(())
}
