//! Generation pipeline for one input: rules → aliases → load → collect →
//! rewrite → qualify → build.

use std::{collections::BTreeSet, path::Path};

use anyhow::{Context, Result};
use tracing::{debug, info, instrument, warn};

use crate::{
    core::{
        alias::AliasManager,
        builder::{DeclarationBuilder, OutputUnit},
        collect::{Collector, Declaration, FuncSymbol, Symbol, ValueSymbol, load_packages},
        directives::apply_directives,
        error::AdaptError,
        qualify::{DefinedTypes, TypeQualifier},
        rewrite::{NameRegistry, Rewriter},
        rules::RuleTable,
    },
    infra::{
        config::{Config, load_config},
        gomod::PackageLocator,
        io::read_file_smart,
    },
    parsers::go_parser::GoParser,
};

/// Names every output file scope already binds
const RESERVED_NAMES: [&str; 1] = ["init"];

/// Per-run registries, passed by `&mut` through the stages
#[derive(Debug)]
pub struct RunContext
{
    pub rules: RuleTable,
    pub aliases: AliasManager,
    pub defined: DefinedTypes,
    /// Loaded packages and imports referenced by kept signatures
    pub observed_imports: BTreeSet<String>,
    /// Imports the rendered output actually references
    pub used_imports: BTreeSet<String>,
    pub rewriter: Rewriter,
    pub names: NameRegistry,
}

impl RunContext
{
    pub fn new(rules: RuleTable) -> Self
    {
        Self {
            rules,
            aliases: AliasManager::new(),
            defined: DefinedTypes::new(),
            observed_imports: BTreeSet::new(),
            used_imports: BTreeSet::new(),
            rewriter: Rewriter::new(),
            names: NameRegistry::new(),
        }
    }
}

/// Render the adapter for one input file. `config_file` is the `-c` path;
/// without it the default config files next to the input are probed.
#[instrument(skip_all, fields(input = %input.display()))]
pub fn generate_file(
    input: &Path,
    config_file: Option<&Path>,
) -> Result<OutputUnit>
{
    let base = input
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));

    let content = read_file_smart(input).with_context(|| format!("Failed to read input {}", input.display()))?;
    let source: &str = content.as_ref();

    let mut config = load_config(config_file, base)?;
    let applied = apply_directives(&mut config, source)
        .with_context(|| format!("Invalid directive in {}", input.display()))?;
    debug!(applied, "merged directives");

    let package = match config
        .package_name
        .clone()
        .filter(|n| !n.is_empty())
    {
        Some(name) => name,
        None => GoParser::new()?
            .parse_source(source, input)?
            .package,
    };
    if package.is_empty()
    {
        return Err(AdaptError::config(format!(
            "cannot determine the output package for {}; add a package clause or `//go:adapter:output <name>`",
            input.display()
        ))
        .into());
    }

    let locator = PackageLocator::discover(base)?;
    generate(&config, &package, &locator)
}

/// Run every stage over an effective configuration
#[instrument(skip_all, fields(package = %package))]
pub fn generate(
    config: &Config,
    package: &str,
    locator: &PackageLocator,
) -> Result<OutputUnit>
{
    config.validate()?;

    let rules = RuleTable::compile(config)?;
    let mut ctx = RunContext::new(rules);

    // Configured packages claim their aliases first, in configuration order
    for p in &config.packages
    {
        ctx.aliases
            .assign(&p.import, p.alias.as_deref().unwrap_or(""));
    }

    let loaded = load_packages(&config.packages, locator)?;
    let symbols = Collector::new(&mut ctx.aliases, &mut ctx.observed_imports).collect(&loaded);
    info!(symbols = symbols.len(), packages = loaded.len(), "collected");

    let named = assign_names(&mut ctx, symbols);
    let unit = build(&mut ctx, package, &named);

    if unit.is_empty()
    {
        warn!(package, "no exported symbols to adapt");
    }
    Ok(unit)
}

/// Rewrite names and claim them in one namespace. Packages go by sorted
/// alias, symbols by source order; the first claimant keeps its name.
fn assign_names(
    ctx: &mut RunContext,
    mut symbols: Vec<Symbol>,
) -> Vec<(Symbol, String)>
{
    for name in RESERVED_NAMES
    {
        ctx.names
            .reserve(name);
    }
    for p in ctx
        .aliases
        .packages()
    {
        ctx.names
            .reserve(&p.alias);
    }

    let aliases = &ctx.aliases;
    symbols.sort_by(|a, b| {
        let alias_a = aliases
            .alias_of(&a.package)
            .unwrap_or_default();
        let alias_b = aliases
            .alias_of(&b.package)
            .unwrap_or_default();
        alias_a
            .cmp(alias_b)
            .then(a.id.cmp(&b.id))
    });

    let mut out = Vec::with_capacity(symbols.len());
    for symbol in symbols
    {
        let (rewritten, _) = ctx
            .rewriter
            .rewrite(&symbol, &ctx.rules);
        let local = ctx
            .names
            .claim(&rewritten);

        // Types and constants can be referenced from other signatures
        if matches!(symbol.decl, Declaration::Type(_) | Declaration::Value(ValueSymbol { constant: true }))
        {
            ctx.defined
                .register(&symbol.package, &symbol.name, &local);
        }
        out.push((symbol, local));
    }
    out
}

/// Qualify signatures and emit declarations
fn build(
    ctx: &mut RunContext,
    package: &str,
    named: &[(Symbol, String)],
) -> OutputUnit
{
    let mut builder = DeclarationBuilder::new(package);
    let mut q = TypeQualifier::new(&ctx.defined, &ctx.aliases, &mut ctx.used_imports);

    for (symbol, local) in named
    {
        let alias = ctx
            .aliases
            .alias_of(&symbol.package)
            .unwrap_or(symbol.package.as_str());

        // Every delegation references its own package
        q.mark_used(&symbol.package);

        match &symbol.decl
        {
            Declaration::Value(v) => builder.add_value(v.constant, local, alias, &symbol.name),
            Declaration::Type(t) =>
            {
                let type_params = q.qualify_type_params(&t.type_params);
                builder.add_type(local, alias, &symbol.name, &type_params);
            }
            Declaration::Func(f) =>
            {
                let qualified = FuncSymbol {
                    type_params: q.qualify_type_params(&f.type_params),
                    params: f
                        .params
                        .iter()
                        .map(|p| q.qualify_field(p))
                        .collect(),
                    args: f
                        .args
                        .clone(),
                    variadic: f.variadic,
                    results: f
                        .results
                        .iter()
                        .map(|r| q.qualify(r))
                        .collect(),
                };
                builder.add_func(local, alias, &symbol.name, &qualified);
            }
        }
    }

    let imports = ctx
        .aliases
        .packages()
        .into_iter()
        .filter(|p| {
            ctx.observed_imports
                .contains(&p.import_path)
                && ctx
                    .used_imports
                    .contains(&p.import_path)
        })
        .collect();
    builder.finish(imports)
}
