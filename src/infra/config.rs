use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::error::AdaptError;

/// Config file names probed next to an input when `-c` is not given
pub const DEFAULT_CONFIG_FILES: [&str; 5] =
    ["goadapt.yaml", "goadapt.yml", "goadapt.json", "goadapt.toml", ".goadapt.yaml"];

/// Effective generator configuration (external file merged with directives)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config
{
    /// Output package name; defaults to the input file's package clause
    pub package_name: Option<String>,

    /// Extra ignore globs for directory discovery
    pub ignore: Vec<String>,

    /// Global rules for type declarations
    pub types: Vec<RuleEntry>,

    /// Global rules for free functions
    pub functions: Vec<RuleEntry>,

    /// Global rules for package variables
    pub variables: Vec<RuleEntry>,

    /// Global rules for constants
    pub constants: Vec<RuleEntry>,

    /// Source packages to adapt, in processing order
    pub packages: Vec<PackageConfig>,
}

/// One source package entry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageConfig
{
    /// Go import path of the package
    pub import: String,

    /// Preferred local alias
    pub alias: Option<String>,

    /// Explicit source directory (skips import path resolution)
    pub dir: Option<PathBuf>,

    pub types: Vec<RuleEntry>,
    pub functions: Vec<RuleEntry>,
    pub variables: Vec<RuleEntry>,
    pub constants: Vec<RuleEntry>,
}

/// A rule holder: matched name plus the transformations it carries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleEntry
{
    /// Exact identifier or `*`
    pub name: String,

    pub disabled: bool,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
    pub explicit: Vec<ExplicitEntry>,
    pub regex: Vec<RegexEntry>,

    /// Per-field rules (type entries only)
    pub fields: Vec<RuleEntry>,

    /// Per-method rules (type entries only)
    pub methods: Vec<RuleEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplicitEntry
{
    /// Source name; empty means the holder's own name
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegexEntry
{
    pub pattern: String,
    pub replace: String,
}

impl Default for RuleEntry
{
    fn default() -> Self
    {
        Self {
            name: "*".to_string(),
            disabled: false,
            prefix: None,
            suffix: None,
            explicit: Vec::new(),
            regex: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }
}

impl RuleEntry
{
    /// Wildcard holder with a single prefix
    pub fn prefix(value: &str) -> Self
    {
        Self { prefix: Some(value.to_string()), ..Self::default() }
    }

    /// Wildcard holder with a single suffix
    pub fn suffix(value: &str) -> Self
    {
        Self { suffix: Some(value.to_string()), ..Self::default() }
    }

    /// Holder carrying one explicit rename
    pub fn explicit(
        from: &str,
        to: &str,
    ) -> Self
    {
        Self {
            explicit: vec![ExplicitEntry { from: from.to_string(), to: to.to_string() }],
            ..Self::default()
        }
    }

    /// Wildcard holder with one regex substitution
    pub fn regex(
        pattern: &str,
        replace: &str,
    ) -> Self
    {
        Self {
            regex: vec![RegexEntry { pattern: pattern.to_string(), replace: replace.to_string() }],
            ..Self::default()
        }
    }

    /// Restrict this holder to one symbol name
    pub fn named(
        mut self,
        name: &str,
    ) -> Self
    {
        self.name = name.to_string();
        self
    }
}

impl Config
{
    /// Find an existing package entry or append a new one
    pub fn package_mut(
        &mut self,
        import: &str,
    ) -> &mut PackageConfig
    {
        let idx = match self
            .packages
            .iter()
            .position(|p| p.import == import)
        {
            Some(i) => i,
            None =>
            {
                self.packages
                    .push(PackageConfig { import: import.to_string(), ..PackageConfig::default() });
                self.packages
                    .len()
                    - 1
            }
        };

        &mut self.packages[idx]
    }

    /// Reject configurations that cannot produce a meaningful run
    pub fn validate(&self) -> Result<()>
    {
        if self
            .packages
            .is_empty()
        {
            return Err(AdaptError::config("no packages configured").into());
        }

        for (i, p) in self
            .packages
            .iter()
            .enumerate()
        {
            if p.import
                .trim()
                .is_empty()
            {
                return Err(AdaptError::config(format!("package #{} has an empty import path", i + 1))
                    .into());
            }
        }

        Ok(())
    }
}

/// Load configuration: an explicit file (required) or the first default file
/// found in `search_dir`, followed by `GOADAPT__*` environment overrides.
pub fn load_config(
    explicit: Option<&Path>,
    search_dir: &Path,
) -> Result<Config>
{
    let mut builder = config::Config::builder();

    match explicit
    {
        Some(path) =>
        {
            if !path.is_file()
            {
                return Err(AdaptError::config(format!(
                    "config file {} does not exist",
                    path.display()
                ))
                .into());
            }
            debug!("using config file {}", path.display());
            builder = builder.add_source(config::File::from(path).required(true));
        }
        None =>
        {
            // Load from config files in priority order
            for name in &DEFAULT_CONFIG_FILES
            {
                let candidate = search_dir.join(name);
                if candidate.is_file()
                {
                    debug!("using config file {}", candidate.display());
                    builder = builder.add_source(config::File::from(candidate));
                    break;
                }
            }
        }
    }

    // Add environment variables with GOADAPT prefix
    builder = builder.add_source(
        config::Environment::with_prefix("GOADAPT")
            .prefix_separator("__")
            .separator("__"),
    );

    let cfg = builder
        .build()
        .map_err(|e| AdaptError::config(format!("failed to load configuration: {e}")))?;
    let parsed: Config = cfg
        .try_deserialize()
        .map_err(|e| AdaptError::config(format!("failed to parse configuration: {e}")))?;

    Ok(parsed)
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn yaml_config_round_trips_into_rule_entries() -> Result<()>
    {
        let dir = tempfile::TempDir::new()?;
        let path = dir
            .path()
            .join("goadapt.yaml");
        std::fs::write(
            &path,
            r#"
package_name: adapters
types:
  - name: "*"
    prefix: T
packages:
  - import: example.com/demo/alpha
    alias: alpha
    constants:
      - name: MaxRetries
        explicit:
          - to: AlphaMaxRetries
    types:
      - name: Worker
        methods:
          - name: Run
            explicit:
              - from: Run
                to: Execute
"#,
        )?;

        let cfg = load_config(Some(&path), dir.path())?;
        assert_eq!(cfg.package_name.as_deref(), Some("adapters"));
        assert_eq!(cfg.types[0].prefix.as_deref(), Some("T"));
        assert_eq!(cfg.packages.len(), 1);

        let pkg = &cfg.packages[0];
        assert_eq!(pkg.alias.as_deref(), Some("alpha"));
        assert_eq!(pkg.constants[0].name, "MaxRetries");
        assert!(pkg.constants[0].explicit[0].from.is_empty());
        assert_eq!(pkg.types[0].methods[0].explicit[0].to, "Execute");
        Ok(())
    }

    #[test]
    fn default_file_is_discovered_in_search_dir() -> Result<()>
    {
        let dir = tempfile::TempDir::new()?;
        std::fs::write(
            dir.path()
                .join("goadapt.json"),
            r#"{"packages":[{"import":"example.com/x"}]}"#,
        )?;

        let cfg = load_config(None, dir.path())?;
        assert_eq!(cfg.packages[0].import, "example.com/x");
        assert_eq!(cfg.packages[0].types.len(), 0);
        Ok(())
    }

    #[test]
    fn missing_explicit_file_is_a_configuration_error()
    {
        let dir = tempfile::TempDir::new().unwrap();
        let err = load_config(Some(&dir.path().join("nope.yaml")), dir.path()).unwrap_err();
        assert!(matches!(err.downcast_ref::<AdaptError>(), Some(AdaptError::Configuration(_))));
    }

    #[test]
    fn validate_requires_packages()
    {
        assert!(Config::default().validate().is_err());

        let mut cfg = Config::default();
        cfg.package_mut("example.com/a");
        cfg.package_mut("example.com/a");
        assert_eq!(cfg.packages.len(), 1);
        assert!(cfg.validate().is_ok());
    }
}
