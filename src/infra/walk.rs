//! Filepath: src/infra/walk.rs
//! Gitignore-aware discovery of adapter input files.
//! - Respects .gitignore, .git/info/exclude, and global gitignore
//! - Extra ignore globs (early prune + late filter)
//! - Restricted to the `go` file type
//! - Deterministic ordering for stable output and tests
//!
//! Backed by ripgrep's `ignore` crate and `globset`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::{DirEntry, WalkBuilder, types::TypesBuilder};
use memchr::memmem;
use tracing::{debug, trace};

use crate::{core::error::AdaptError, infra::io::read_file_smart};

/// Comment prefix marking a Go file as an adapter input
pub const DIRECTIVE_MARKER: &str = "//go:adapter:";

/// Suffix of generated files; never treated as input
pub const GENERATED_SUFFIX: &str = ".adapter.go";

/// Gitignore-aware walker over Go sources with extra ignore globs.
/// Extra globs are applied in two places:
///   1) Early: prune directories during traversal (filter_entry).
///   2) Late: filter out files that still slipped through.
pub struct FileWalker
{
    /// Compiled set of additional ignore patterns
    ignore_patterns: GlobSet,

    /// Include hidden (dot) files; default false
    include_hidden: bool,
}

impl FileWalker
{
    /// Build a walker with additional ignore patterns (e.g., "vendor/**",
    /// "testdata/**"). Patterns match on paths relative to the walk root.
    pub fn new(additional_ignores: &[String]) -> Result<Self>
    {
        let mut builder = GlobSetBuilder::new();

        for pattern in additional_ignores
        {
            builder.add(
                Glob::new(pattern)
                    .map_err(|e| AdaptError::config(format!("invalid ignore glob `{pattern}`: {e}")))?,
            );
        }

        Ok(Self {
            ignore_patterns: builder.build()?,
            include_hidden: false,
        })
    }

    /// Include or exclude hidden files (dotfiles).
    pub fn with_include_hidden(
        mut self,
        include_hidden: bool,
    ) -> Self
    {
        self.include_hidden = include_hidden;
        self
    }

    /// Internal: construct a configured WalkBuilder for `root`.
    fn build_walk(
        &self,
        root: &Path,
    ) -> Result<WalkBuilder>
    {
        let mut b = WalkBuilder::new(root);

        // WalkBuilder::hidden(true) skips dotfiles
        b.hidden(!self.include_hidden);

        b.git_ignore(true);
        b.git_global(true);
        b.git_exclude(true);

        // Early directory pruning on the path relative to the root
        let extra = self
            .ignore_patterns
            .clone();
        let base = root.to_path_buf();
        b.filter_entry(move |ent: &DirEntry| {
            let is_dir = ent
                .file_type()
                .is_some_and(|ft| ft.is_dir());
            if !is_dir
            {
                return true;
            }

            let rel = ent
                .path()
                .strip_prefix(&base)
                .unwrap_or(ent.path());
            !(extra.is_match(rel) || extra.is_match(rel.join("_")))
        });

        let mut tb = TypesBuilder::new();
        tb.add_defaults();
        tb.select("go");
        b.types(tb.build()?);

        Ok(b)
    }

    /// Go files under `root`, respecting ignore rules and extra globs.
    /// Returns a **sorted** list for determinism.
    pub fn walk_files<P: AsRef<Path>>(
        &self,
        root: P,
    ) -> Result<Vec<PathBuf>>
    {
        let root_path = root.as_ref();
        let walker = self
            .build_walk(root_path)?
            .build();

        let mut out: Vec<PathBuf> = walker
            .filter_map(|res| res.ok())
            .filter(|entry| {
                entry
                    .file_type()
                    .is_some_and(|ft| ft.is_file())
            })
            .map(|entry| entry.into_path())
            .filter(|abs| {
                let rel = abs
                    .strip_prefix(root_path)
                    .unwrap_or(abs);
                !self
                    .ignore_patterns
                    .is_match(rel)
            })
            .collect();

        out.sort();
        Ok(out)
    }

    /// Adapter inputs under `root`: Go sources carrying at least one
    /// directive, excluding generated outputs and test files.
    pub fn discover_inputs<P: AsRef<Path>>(
        &self,
        root: P,
    ) -> Result<Vec<PathBuf>>
    {
        let mut inputs = Vec::new();

        for path in self.walk_files(root)?
        {
            if !is_candidate(&path)
            {
                trace!(path = %path.display(), "not an input candidate");
                continue;
            }

            if has_directive(&path)?
            {
                inputs.push(path);
            }
        }

        debug!("discovered {} adapter inputs", inputs.len());
        Ok(inputs)
    }
}

/// Generated outputs and `_test.go` files never count as inputs
pub fn is_candidate(path: &Path) -> bool
{
    let Some(name) = path
        .file_name()
        .and_then(|n| n.to_str())
    else
    {
        return false;
    };

    name.ends_with(".go") && !name.ends_with(GENERATED_SUFFIX) && !name.ends_with("_test.go")
}

/// Whether the file contains the directive marker anywhere
pub fn has_directive(path: &Path) -> Result<bool>
{
    let content =
        read_file_smart(path).with_context(|| format!("Failed to scan {}", path.display()))?;
    let haystack: &str = content.as_ref();

    Ok(memmem::find(haystack.as_bytes(), DIRECTIVE_MARKER.as_bytes()).is_some())
}
