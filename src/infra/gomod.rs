//! Import path → package directory resolution.
//!
//! Lookup order: explicit directory, the main module, `replace` directives,
//! `vendor/`, the module cache (`$GOMODCACHE`, `$GOPATH/pkg/mod`,
//! `~/go/pkg/mod`), then `$GOROOT/src` for the standard library.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// A `replace old [v] => new [v]` directive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replace {
    pub from: String,
    pub to: String,
    pub version: Option<String>,
}

/// The parts of a `go.mod` file the locator needs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoModule {
    pub root: PathBuf,
    pub path: String,
    pub requires: Vec<(String, String)>,
    pub replaces: Vec<Replace>,
}

impl GoModule {
    /// Parse `go.mod` text rooted at `root`
    pub fn parse(root: &Path, text: &str) -> Self {
        let mut module = GoModule {
            root: root.to_path_buf(),
            ..GoModule::default()
        };
        let mut block: Option<String> = None;

        for raw in text.lines() {
            let line = raw.split("//").next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }

            if let Some(kind) = &block {
                if line == ")" {
                    block = None;
                    continue;
                }
                let kind = kind.clone();
                module.directive(&kind, line);
                continue;
            }

            let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
            let rest = rest.trim();
            if rest == "(" {
                block = Some(verb.to_string());
                continue;
            }
            module.directive(verb, rest);
        }

        module
    }

    fn directive(&mut self, verb: &str, args: &str) {
        match verb {
            "module" => self.path = unquote(args),
            "require" => {
                let mut parts = args.split_whitespace();
                if let (Some(p), Some(v)) = (parts.next(), parts.next()) {
                    self.requires.push((unquote(p), v.to_string()));
                }
            }
            "replace" => {
                let Some((lhs, rhs)) = args.split_once("=>") else {
                    return;
                };
                let from = lhs.split_whitespace().next().map(unquote).unwrap_or_default();
                let mut rhs = rhs.split_whitespace();
                let to = rhs.next().map(unquote).unwrap_or_default();
                let version = rhs.next().map(|v| v.to_string());
                self.replaces.push(Replace { from, to, version });
            }
            _ => trace!(verb, "ignoring go.mod directive"),
        }
    }

    /// Find and parse the nearest `go.mod` at or above `start`
    pub fn find(start: &Path) -> Result<Option<Self>> {
        let mut dir = Some(start);
        while let Some(d) = dir {
            let candidate = d.join("go.mod");
            if candidate.is_file() {
                let text = std::fs::read_to_string(&candidate)
                    .with_context(|| format!("Failed to read {}", candidate.display()))?;
                debug!("found {}", candidate.display());
                return Ok(Some(Self::parse(d, &text)));
            }
            dir = d.parent();
        }
        Ok(None)
    }
}

fn unquote(s: &str) -> String {
    s.trim().trim_matches('"').to_string()
}

/// Remainder of `path` below module path `prefix`, if it is inside it
fn strip_module<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    if path == prefix {
        return Some("");
    }
    path.strip_prefix(prefix)?.strip_prefix('/')
}

/// Module cache escaping: upper-case letters become `!` + lower-case
pub fn escape_module_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for c in path.chars() {
        if c.is_ascii_uppercase() {
            out.push('!');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Resolves import paths to package directories
#[derive(Debug, Clone, Default)]
pub struct PackageLocator {
    module: Option<GoModule>,
    mod_cache: Option<PathBuf>,
    goroot: Option<PathBuf>,
    base_dir: PathBuf,
}

impl PackageLocator {
    /// Build a locator for inputs living in `base_dir`
    pub fn discover(base_dir: &Path) -> Result<Self> {
        // Relative paths stop the upward go.mod search early
        let base_dir = dunce::canonicalize(base_dir).unwrap_or_else(|_| base_dir.to_path_buf());
        let module = GoModule::find(&base_dir)?;

        let mod_cache = std::env::var_os("GOMODCACHE")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .or_else(|| {
                std::env::var_os("GOPATH")
                    .filter(|v| !v.is_empty())
                    .and_then(|p| std::env::split_paths(&p).next())
                    .map(|p| p.join("pkg").join("mod"))
            })
            .or_else(|| {
                std::env::var_os("HOME").map(|h| PathBuf::from(h).join("go").join("pkg").join("mod"))
            });

        let goroot = std::env::var_os("GOROOT")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        Ok(Self {
            module,
            mod_cache,
            goroot,
            base_dir,
        })
    }

    /// Locator rooted at `module` only (no cache, no GOROOT)
    pub fn with_module(module: GoModule) -> Self {
        Self {
            base_dir: module.root.clone(),
            module: Some(module),
            mod_cache: None,
            goroot: None,
        }
    }

    /// Directory holding `import_path`, trying each source in order
    pub fn locate(&self, import_path: &str, explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(dir) = explicit {
            let dir = if dir.is_absolute() {
                dir.to_path_buf()
            } else {
                self.base_dir.join(dir)
            };
            return dir.is_dir().then_some(dir);
        }

        self.candidates(import_path).into_iter().find(|c| {
            trace!(candidate = %c.display(), "probing package directory");
            c.is_dir()
        })
    }

    fn candidates(&self, import_path: &str) -> Vec<PathBuf> {
        let mut out = Vec::new();

        if let Some(m) = &self.module {
            if let Some(rest) = strip_module(import_path, &m.path) {
                out.push(m.root.join(rest));
            }

            // Longest matching replace wins
            let mut replaces: Vec<&Replace> = m
                .replaces
                .iter()
                .filter(|r| strip_module(import_path, &r.from).is_some())
                .collect();
            replaces.sort_by_key(|r| std::cmp::Reverse(r.from.len()));
            for r in replaces {
                let rest = strip_module(import_path, &r.from).unwrap_or_default();
                if r.to.starts_with("./") || r.to.starts_with("../") || Path::new(&r.to).is_absolute()
                {
                    out.push(m.root.join(&r.to).join(rest));
                } else if let (Some(cache), Some(v)) = (&self.mod_cache, &r.version) {
                    out.push(
                        cache
                            .join(format!("{}@{}", escape_module_path(&r.to), v))
                            .join(rest),
                    );
                }
            }

            out.push(m.root.join("vendor").join(import_path));

            if let Some(cache) = &self.mod_cache {
                let mut requires: Vec<&(String, String)> = m
                    .requires
                    .iter()
                    .filter(|(p, _)| strip_module(import_path, p).is_some())
                    .collect();
                requires.sort_by_key(|(p, _)| std::cmp::Reverse(p.len()));
                for (p, v) in requires {
                    let rest = strip_module(import_path, p).unwrap_or_default();
                    out.push(
                        cache
                            .join(format!("{}@{}", escape_module_path(p), v))
                            .join(rest),
                    );
                }
            }
        }

        // Standard library paths have no dot in their first element
        let first = import_path.split('/').next().unwrap_or_default();
        if !first.contains('.')
            && let Some(root) = &self.goroot
        {
            out.push(root.join("src").join(import_path));
        }

        out
    }
}
