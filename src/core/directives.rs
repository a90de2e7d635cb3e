//! `//go:adapter:` comment directives embedded in an input file.
//!
//! Directives layer on top of the external configuration: packages are
//! added (or reopened), rule entries appended, the output package name
//! replaced.

use anyhow::Result;
use tracing::debug;

use crate::{
    core::{error::AdaptError, rules::Category},
    infra::{
        config::{Config, RuleEntry},
        walk::DIRECTIVE_MARKER,
    },
};

/// A parsed directive line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive
{
    /// `package <import-path> [alias]`
    Package
    {
        import: String,
        alias: Option<String>,
    },
    /// `default`: back to global scope
    Default,
    /// `output <name>`
    Output(String),
    /// `<category>:<op> <args>`
    Rule
    {
        category: Category,
        entry: RuleEntry,
    },
}

/// Parse every directive of `source`, in order, with its 1-based line
pub fn parse_directives(source: &str) -> Result<Vec<(usize, Directive)>>
{
    let mut out = Vec::new();

    for (idx, raw) in source
        .lines()
        .enumerate()
    {
        let Some(body) = raw
            .trim_start()
            .strip_prefix(DIRECTIVE_MARKER)
        else
        {
            continue;
        };

        let line = idx + 1;
        let directive = parse_one(body.trim()).map_err(|reason| {
            AdaptError::config(format!("line {line}: {reason}: `{}`", raw.trim()))
        })?;
        out.push((line, directive));
    }

    Ok(out)
}

fn parse_one(body: &str) -> std::result::Result<Directive, String>
{
    let mut words = body.split_whitespace();
    let head = words
        .next()
        .ok_or("empty directive")?;
    let args: Vec<&str> = words.collect();

    match head
    {
        "package" => match args.as_slice()
        {
            [import] => Ok(Directive::Package { import: import.to_string(), alias: None }),
            [import, alias] =>
            {
                Ok(Directive::Package { import: import.to_string(), alias: Some(alias.to_string()) })
            }
            _ => Err("expected `package <import-path> [alias]`".into()),
        },
        "default" if args.is_empty() => Ok(Directive::Default),
        "output" => match args.as_slice()
        {
            [name] => Ok(Directive::Output(name.to_string())),
            _ => Err("expected `output <package-name>`".into()),
        },
        _ =>
        {
            let (cat, op) = head
                .split_once(':')
                .ok_or("unknown directive")?;
            let category = Category::parse(cat).ok_or_else(|| format!("unknown category `{cat}`"))?;
            let entry = match (op, args.as_slice())
            {
                ("prefix", [v]) => RuleEntry::prefix(v),
                ("suffix", [v]) => RuleEntry::suffix(v),
                ("explicit", [from, to]) => RuleEntry::explicit(from, to),
                ("regex", [pattern, replace]) => RuleEntry::regex(pattern, replace),
                ("prefix" | "suffix", _) => return Err(format!("`{op}` takes exactly one value")),
                ("explicit", _) => return Err("`explicit` takes `<from> <to>`".into()),
                ("regex", _) => return Err("`regex` takes `<pattern> <replacement>`".into()),
                _ => return Err(format!("unknown rule kind `{op}`")),
            };
            Ok(Directive::Rule { category, entry })
        }
    }
}

/// Merge the directives of `source` into `config`
pub fn apply_directives(
    config: &mut Config,
    source: &str,
) -> Result<usize>
{
    let directives = parse_directives(source)?;
    let mut scope: Option<String> = None;

    for (line, directive) in &directives
    {
        match directive
        {
            Directive::Package { import, alias } =>
            {
                let pkg = config.package_mut(import);
                if alias.is_some()
                {
                    pkg.alias = alias.clone();
                }
                scope = Some(import.clone());
            }
            Directive::Default => scope = None,
            Directive::Output(name) => config.package_name = Some(name.clone()),
            Directive::Rule { category, entry } =>
            {
                let lists = match &scope
                {
                    Some(import) =>
                    {
                        let pkg = config.package_mut(import);
                        match category
                        {
                            Category::Type => &mut pkg.types,
                            Category::Func => &mut pkg.functions,
                            Category::Var => &mut pkg.variables,
                            Category::Const => &mut pkg.constants,
                        }
                    }
                    None => match category
                    {
                        Category::Type => &mut config.types,
                        Category::Func => &mut config.functions,
                        Category::Var => &mut config.variables,
                        Category::Const => &mut config.constants,
                    },
                };
                lists.push(entry.clone());
            }
        }
        debug!(line, ?directive, "applied directive");
    }

    Ok(directives.len())
}

#[cfg(test)]
mod tests
{
    use super::*;

    const SOURCE: &str = r#"package adapters

//go:adapter:output api
//go:adapter:type:prefix T
//go:adapter:package example.com/demo/alpha al
//go:adapter:const:explicit MaxRetries AlphaMax
//go:adapter:func:regex ^New Make
//go:adapter:default
//go:adapter:var:suffix V
	//go:adapter:package example.com/demo/beta
"#;

    #[test]
    fn parses_every_directive_with_its_line()
    {
        let parsed = parse_directives(SOURCE).unwrap();
        assert_eq!(parsed.len(), 8);
        assert_eq!(parsed[0], (3, Directive::Output("api".into())));
        assert_eq!(
            parsed[2].1,
            Directive::Package { import: "example.com/demo/alpha".into(), alias: Some("al".into()) }
        );
        assert_eq!(parsed[7].0, 10);
    }

    #[test]
    fn merges_into_scoped_rule_lists()
    {
        let mut cfg = Config::default();
        let n = apply_directives(&mut cfg, SOURCE).unwrap();
        assert_eq!(n, 8);

        assert_eq!(cfg.package_name.as_deref(), Some("api"));
        assert_eq!(cfg.types.len(), 1);
        assert_eq!(cfg.variables.len(), 1);
        assert_eq!(cfg.packages.len(), 2);

        let alpha = &cfg.packages[0];
        assert_eq!(alpha.alias.as_deref(), Some("al"));
        assert_eq!(alpha.constants[0].explicit[0].from, "MaxRetries");
        assert_eq!(alpha.functions[0].regex[0].replace, "Make");
        assert!(cfg.packages[1].types.is_empty());
    }

    #[test]
    fn reopening_a_configured_package_keeps_its_entry()
    {
        let mut cfg = Config::default();
        cfg.package_mut("example.com/demo/alpha")
            .alias = Some("a".into());

        apply_directives(&mut cfg, "//go:adapter:package example.com/demo/alpha\n//go:adapter:type:suffix X\n")
            .unwrap();
        assert_eq!(cfg.packages.len(), 1);
        assert_eq!(cfg.packages[0].alias.as_deref(), Some("a"));
        assert_eq!(cfg.packages[0].types.len(), 1);
    }

    #[test]
    fn unknown_directives_are_configuration_errors()
    {
        for bad in [
            "//go:adapter:bogus",
            "//go:adapter:type:rename X",
            "//go:adapter:struct:prefix X",
            "//go:adapter:func:explicit OnlyOne",
            "//go:adapter:package",
        ]
        {
            let err = parse_directives(bad).unwrap_err();
            assert!(
                matches!(err.downcast_ref::<AdaptError>(), Some(AdaptError::Configuration(msg)) if msg.contains("line 1")),
                "{bad}: {err}"
            );
        }
    }
}
