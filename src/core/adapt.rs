//! `goadapt` command: input discovery, output derivation, rendering and
//! the final (atomic) writes or dry-run preview.

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::cli::{AppContext, Cli};
use crate::core::{error::AdaptError, pipeline::generate_file};
use crate::infra::{
    config::load_config,
    io::write_atomic,
    walk::{FileWalker, GENERATED_SUFFIX},
};

/// One input and where its adapter goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub input: PathBuf,
    pub output: PathBuf,
}

pub fn run(cli: &Cli, ctx: &AppContext) -> Result<()> {
    let inputs = discover(&cli.inputs, cli.config.as_deref())?;
    let jobs = plan(&inputs, cli.output.as_deref())?;

    let progress = if ctx.quiet || jobs.len() < 2 {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(jobs.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        pb
    };

    // Render everything before touching the disk
    let mut rendered = Vec::with_capacity(jobs.len());
    for job in &jobs {
        progress.set_message(format!("{}", job.input.display()));
        let unit = generate_file(&job.input, cli.config.as_deref())
            .with_context(|| format!("Failed to generate adapter for {}", job.input.display()))?;
        rendered.push((job, unit.render()));
        progress.inc(1);
    }
    progress.finish_and_clear();

    if ctx.dry_run {
        for (job, content) in &rendered {
            print!("{}", preview(&job.output, content)?);
        }
        if !ctx.quiet {
            let msg = format!("DRY RUN: {} file(s) not written", rendered.len());
            if ctx.no_color {
                println!("{msg}");
            } else {
                println!("{}", msg.yellow());
            }
        }
        return Ok(());
    }

    for (job, content) in &rendered {
        write_atomic(&job.output, content)?;
        info!(input = %job.input.display(), output = %job.output.display(), "wrote adapter");
        if !ctx.quiet {
            let check = if ctx.no_color {
                "✓".to_string()
            } else {
                "✓".green().to_string()
            };
            println!("{check} Wrote {}", job.output.display());
        }
    }

    Ok(())
}

/// Expand CLI inputs: files are taken as given, directories are walked for
/// files carrying adapter directives.
pub fn discover(inputs: &[PathBuf], config_file: Option<&Path>) -> Result<Vec<PathBuf>> {
    if inputs.is_empty() {
        return Err(AdaptError::Discovery("no inputs given".into()).into());
    }

    let mut out: Vec<PathBuf> = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let ignore = load_config(config_file, input)?.ignore;
            let found = FileWalker::new(&ignore)?.discover_inputs(input)?;
            debug!(dir = %input.display(), found = found.len(), "scanned directory");
            out.extend(found);
        } else if input.is_file() {
            out.push(input.clone());
        } else {
            return Err(
                AdaptError::Discovery(format!("input {} does not exist", input.display())).into(),
            );
        }
    }

    // Keep first occurrence order
    let mut seen = std::collections::BTreeSet::new();
    out.retain(|p| seen.insert(dunce::canonicalize(p).unwrap_or_else(|_| p.clone())));

    if out.is_empty() {
        return Err(AdaptError::Discovery("no files with //go:adapter: directives found".into()).into());
    }
    Ok(out)
}

/// `api.go` → `api.adapter.go` next to the input
pub fn default_output(input: &Path) -> PathBuf {
    input.with_file_name(adapter_file_name(input))
}

fn adapter_file_name(input: &Path) -> String {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "adapter".to_string());
    format!("{stem}{GENERATED_SUFFIX}")
}

/// Pair every input with its output path
pub fn plan(inputs: &[PathBuf], output: Option<&Path>) -> Result<Vec<Job>> {
    let jobs: Vec<Job> = match (inputs, output) {
        ([input], Some(out)) if !out.is_dir() => vec![Job {
            input: input.clone(),
            output: out.to_path_buf(),
        }],
        (_, Some(out)) => {
            if !out.is_dir() {
                return Err(AdaptError::Discovery(format!(
                    "with several inputs, output {} must be an existing directory",
                    out.display()
                ))
                .into());
            }
            inputs
                .iter()
                .map(|i| Job {
                    input: i.clone(),
                    output: out.join(adapter_file_name(i)),
                })
                .collect()
        }
        (_, None) => inputs
            .iter()
            .map(|i| Job {
                input: i.clone(),
                output: default_output(i),
            })
            .collect(),
    };

    let mut targets: BTreeMap<&Path, &Path> = BTreeMap::new();
    for job in &jobs {
        if let Some(other) = targets.insert(&job.output, &job.input) {
            return Err(AdaptError::Discovery(format!(
                "{} and {} both map to {}",
                other.display(),
                job.input.display(),
                job.output.display()
            ))
            .into());
        }
    }

    Ok(jobs)
}

/// Unified diff against the current output, or the full content when the
/// output does not exist yet
fn preview(output: &Path, content: &str) -> Result<String> {
    let current = if output.is_file() {
        std::fs::read_to_string(output)
            .with_context(|| format!("Failed to read {}", output.display()))?
    } else {
        String::new()
    };

    if current == content {
        return Ok(format!("{}: unchanged\n", output.display()));
    }

    let name = output.display().to_string();
    let diff = similar::TextDiff::from_lines(current.as_str(), content)
        .unified_diff()
        .header(&format!("{name} (current)"), &format!("{name} (generated)"))
        .to_string();
    Ok(diff)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_output_replaces_extension() {
        assert_eq!(
            default_output(Path::new("adapters/api.go")),
            PathBuf::from("adapters/api.adapter.go")
        );
    }

    #[test]
    fn single_input_with_file_output() -> Result<()> {
        let jobs = plan(&[PathBuf::from("a.go")], Some(Path::new("gen/out.go")))?;
        assert_eq!(jobs[0].output, PathBuf::from("gen/out.go"));
        Ok(())
    }

    #[test]
    fn several_inputs_need_a_directory() -> Result<()> {
        let tmp = tempfile::TempDir::new()?;
        let inputs = vec![PathBuf::from("x/a.go"), PathBuf::from("y/b.go")];

        let jobs = plan(&inputs, Some(tmp.path()))?;
        assert_eq!(jobs[1].output, tmp.path().join("b.adapter.go"));

        let err = plan(&inputs, Some(&tmp.path().join("missing.go"))).unwrap_err();
        assert!(matches!(err.downcast_ref::<AdaptError>(), Some(AdaptError::Discovery(_))));
        Ok(())
    }

    #[test]
    fn colliding_outputs_are_rejected() -> Result<()> {
        let tmp = tempfile::TempDir::new()?;
        let inputs = vec![PathBuf::from("x/api.go"), PathBuf::from("y/api.go")];
        assert!(plan(&inputs, Some(tmp.path())).is_err());
        // Without -o each output stays next to its input
        assert_eq!(plan(&inputs, None)?.len(), 2);
        Ok(())
    }

    #[test]
    fn discover_rejects_missing_and_empty() -> Result<()> {
        assert!(discover(&[], None).is_err());
        assert!(discover(&[PathBuf::from("/definitely/not/here.go")], None).is_err());

        let tmp = tempfile::TempDir::new()?;
        std::fs::write(tmp.path().join("plain.go"), "package x\n")?;
        let err = discover(&[tmp.path().to_path_buf()], None).unwrap_err();
        assert!(matches!(err.downcast_ref::<AdaptError>(), Some(AdaptError::Discovery(_))));
        Ok(())
    }

    #[test]
    fn preview_shows_unified_diff() -> Result<()> {
        let tmp = tempfile::TempDir::new()?;
        let out = tmp.path().join("api.adapter.go");

        let fresh = preview(&out, "package a\n")?;
        assert!(fresh.contains("+package a"));

        std::fs::write(&out, "package a\n")?;
        assert!(preview(&out, "package a\n")?.contains("unchanged"));

        let changed = preview(&out, "package b\n")?;
        assert!(changed.contains("-package a"));
        assert!(changed.contains("+package b"));
        Ok(())
    }
}
