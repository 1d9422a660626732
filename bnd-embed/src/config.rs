//! Configuration types for `bnd-embed.toml`.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use crate::model::{Decl, TranslationUnit};

/// Root configuration.
#[derive(Debug, Deserialize)]
pub struct Config {
    pub output: OutputConfig,
    /// Additional directories to search when resolving declaration files.
    /// Each entry is tried in order after `base_dir` (the TOML file's parent
    /// directory).
    #[serde(default)]
    pub include_paths: Vec<PathBuf>,
    #[serde(default)]
    pub options: Options,
    #[serde(default)]
    pub unit: Vec<UnitConfig>,
}

/// Output settings.
#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    /// Directory that receives the generated tree.
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("generated")
}

/// A binding surface to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    /// C header + implementation.
    C,
    /// Java sources calling the C surface through JNA.
    Java,
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::C => f.write_str("C"),
            Target::Java => f.write_str("Java"),
        }
    }
}

/// How C type names are spelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingStyle {
    /// `Namespace_Class`.
    #[default]
    Qualified,
    /// `Class`; the namespace survives only in function symbols.
    Flat,
}

/// Generator options shared by all units.
#[derive(Debug, Clone, Deserialize)]
pub struct Options {
    #[serde(default = "default_targets")]
    pub targets: Vec<Target>,
    /// Support files are generated next to the output, so includes use the
    /// quoted form. Otherwise they come from the system include path.
    #[serde(default = "default_true")]
    pub generate_support_files: bool,
    /// Prefix for header prototypes (e.g. `MANAGED_API`).
    #[serde(default)]
    pub export_macro: Option<String>,
    #[serde(default)]
    pub naming: NamingStyle,
}

fn default_targets() -> Vec<Target> {
    vec![Target::C, Target::Java]
}

fn default_true() -> bool {
    true
}

impl Default for Options {
    fn default() -> Self {
        Self {
            targets: default_targets(),
            generate_support_files: true,
            export_macro: None,
            naming: NamingStyle::default(),
        }
    }
}

/// A single translation unit (one managed assembly).
#[derive(Debug, Deserialize)]
pub struct UnitConfig {
    /// Assembly file name (e.g. `managed.dll`).
    pub file_name: String,
    /// Declaration graph file produced by the reflection provider.
    pub declarations: PathBuf,
    /// Native library name loaded by the Java surface. Defaults to the
    /// assembly base name.
    #[serde(default)]
    pub library: Option<String>,
}

/// Contents of a declaration graph file.
#[derive(Debug, Deserialize)]
pub struct DeclarationFile {
    #[serde(default)]
    pub declarations: Vec<Decl>,
}

/// Resolve a path by searching `base_dir` first, then each `include_paths`
/// entry. Absolute paths are returned as-is. If the file is not found
/// anywhere, falls back to `base_dir.join(path)` so that the caller reports
/// the path the user most likely meant.
pub fn resolve_path(path: &Path, base_dir: &Path, include_paths: &[PathBuf]) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    let candidate = base_dir.join(path);
    if candidate.exists() {
        return candidate;
    }
    for inc in include_paths {
        let candidate = base_dir.join(inc).join(path);
        if candidate.exists() {
            return candidate;
        }
    }
    base_dir.join(path)
}

/// Load and parse a `bnd-embed.toml` configuration file.
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let config: Config = toml::from_str(&content)
        .map_err(|e| anyhow::anyhow!("failed to parse config file {}: {}", path.display(), e))?;
    Ok(config)
}

/// Load the declaration graph of one unit.
pub fn load_unit(
    unit: &UnitConfig,
    base_dir: &Path,
    include_paths: &[PathBuf],
) -> anyhow::Result<TranslationUnit> {
    let path = resolve_path(&unit.declarations, base_dir, include_paths);
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("reading declarations from {}", path.display()))?;
    let file: DeclarationFile = toml::from_str(&content)
        .with_context(|| format!("parsing declarations in {}", path.display()))?;

    let mut tu = TranslationUnit {
        file_name: unit.file_name.clone(),
        library: String::new(),
        declarations: file.declarations,
    };
    tu.library = unit
        .library
        .clone()
        .unwrap_or_else(|| tu.base_name().to_string());
    Ok(tu)
}
