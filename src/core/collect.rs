//! Symbol collector: loads configured packages and synthesizes one
//! delegating declaration per exported symbol.
//!
//! Loading (disk I/O + parsing) runs in parallel; collection walks the
//! loaded packages in configuration order, files by path and declarations
//! by source offset, so symbol order never depends on thread scheduling.

use std::{
    collections::{BTreeMap, BTreeSet},
    path::{Path, PathBuf},
};

use anyhow::Result;
use indexmap::IndexMap;
use rayon::prelude::*;
use tracing::{debug, instrument, warn};

use crate::{
    core::{
        alias::AliasManager,
        error::AdaptError,
        gotype::{Field, TypeExpr, TypeParam, TypeScope},
        rules::Category,
    },
    infra::{config::PackageConfig, gomod::PackageLocator, io::read_file_smart, utils::GoIdent},
    parsers::go_parser::{GoDecl, GoParser, GoSourceFile, ParamDecl},
};

/// Stable identity of a collected symbol within one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SymbolId
{
    /// Index of the owning package in configuration order
    pub package: usize,
    /// Source-order position inside that package
    pub ordinal: usize,
}

/// `type X[...] = alias.X[...]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSymbol
{
    pub type_params: Vec<TypeParam>,
}

/// Forwarding wrapper around a free function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncSymbol
{
    pub type_params: Vec<TypeParam>,
    /// Declared parameters, every one named
    pub params: Vec<Field>,
    /// Call arguments in order; a variadic tail carries `...`
    pub args: Vec<String>,
    pub variadic: bool,
    pub results: Vec<TypeExpr>,
}

/// `Name = alias.Name` in a const or var group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueSymbol
{
    pub constant: bool,
}

/// Synthesized delegating declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration
{
    Type(TypeSymbol),
    Func(FuncSymbol),
    Value(ValueSymbol),
}

impl Declaration
{
    pub fn category(&self) -> Category
    {
        match self
        {
            Declaration::Type(_) => Category::Type,
            Declaration::Func(_) => Category::Func,
            Declaration::Value(v) if v.constant => Category::Const,
            Declaration::Value(_) => Category::Var,
        }
    }
}

/// An exported symbol of a source package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol
{
    pub id: SymbolId,
    /// Name as declared in the source package
    pub name: String,
    /// Owning import path
    pub package: String,
    pub decl: Declaration,
}

impl Symbol
{
    pub fn category(&self) -> Category
    {
        self.decl
            .category()
    }
}

/// Parsed sources of one configured package
#[derive(Debug, Clone)]
pub struct LoadedPackage
{
    pub import_path: String,
    pub dir: PathBuf,
    /// Package clause shared by the kept files
    pub name: String,
    /// Sorted by path
    pub files: Vec<GoSourceFile>,
}

/// Load every configured package in parallel; results keep configuration
/// order and the first failure fails the whole load.
#[instrument(skip_all, fields(packages = packages.len()))]
pub fn load_packages(
    packages: &[PackageConfig],
    locator: &PackageLocator,
) -> Result<Vec<LoadedPackage>>
{
    let results: Vec<Result<LoadedPackage>> = packages
        .par_iter()
        .map(|p| load_package(p, locator))
        .collect();

    // Propagate the first error in configuration order
    results
        .into_iter()
        .collect()
}

/// Locate, read and parse one package
pub fn load_package(
    cfg: &PackageConfig,
    locator: &PackageLocator,
) -> Result<LoadedPackage>
{
    let import = cfg
        .import
        .as_str();

    let dir = locator
        .locate(import, cfg.dir.as_deref())
        .ok_or_else(|| AdaptError::load(import, "package directory not found"))?;
    debug!(import, dir = %dir.display(), "located package");

    let sources = go_sources(&dir).map_err(|e| AdaptError::load(import, e.to_string()))?;
    if sources.is_empty()
    {
        return Err(AdaptError::load(import, format!("no Go files in {}", dir.display())).into());
    }

    // One parser per task; parsers are cheap next to the I/O
    let parser = GoParser::new()?;
    let mut parsed = Vec::with_capacity(sources.len());
    for path in &sources
    {
        let content = read_file_smart(path)
            .map_err(|e| AdaptError::load(import, format!("{}: {e:#}", path.display())))?;
        parsed.push(parser.parse_source(content.as_ref(), path)?);
    }

    let name = dominant_package(&parsed)
        .ok_or_else(|| AdaptError::load(import, "no package clause found"))?;

    // Drop files of other packages (external tests, `main` helpers)
    let files: Vec<GoSourceFile> = parsed
        .into_iter()
        .filter(|f| {
            let keep = f.package == name;
            if !keep
            {
                debug!(file = %f.path.display(), package = %f.package, "skipping file of another package");
            }
            keep
        })
        .collect();

    Ok(LoadedPackage { import_path: import.to_string(), dir, name, files })
}

/// Regular `.go` files of `dir` (non-recursive), tests excluded, sorted
fn go_sources(dir: &Path) -> std::io::Result<Vec<PathBuf>>
{
    let mut out = Vec::new();
    for entry in std::fs::read_dir(dir)?
    {
        let path = entry?.path();
        let Some(name) = path
            .file_name()
            .and_then(|n| n.to_str())
        else
        {
            continue;
        };

        if path.is_file() && name.ends_with(".go") && !name.ends_with("_test.go")
        {
            out.push(path);
        }
    }
    out.sort();
    Ok(out)
}

/// Most common package clause; ties go to the first file
fn dominant_package(files: &[GoSourceFile]) -> Option<String>
{
    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    for f in files
        .iter()
        .filter(|f| !f.package.is_empty())
    {
        *counts
            .entry(f.package.as_str())
            .or_default() += 1;
    }

    let mut best: Option<(&str, usize)> = None;
    for (name, count) in counts
    {
        if best.is_none_or(|(_, c)| count > c)
        {
            best = Some((name, count));
        }
    }
    best.map(|(n, _)| n.to_string())
}

/// Walks loaded packages and synthesizes symbols
pub struct Collector<'a>
{
    aliases: &'a mut AliasManager,
    /// Loaded packages and imports referenced by kept signatures
    observed: &'a mut BTreeSet<String>,
}

/// What names mean inside one source file
struct FileScope<'s>
{
    own_path: &'s str,
    /// Top-level names declared anywhere in the package
    declared: &'s BTreeSet<String>,
    /// File-local import names → import path
    imports: BTreeMap<String, String>,
    /// Paths imported with `.`
    dot_imports: Vec<String>,
}

/// Per-declaration resolution context
struct Scope<'s>
{
    file: &'s FileScope<'s>,
    type_params: BTreeSet<String>,
}

/// What resolving one declaration ran into
#[derive(Default)]
struct Refs
{
    unexported: Option<String>,
    /// Bare name that several dot imports could provide
    ambiguous: Option<String>,
    /// Import path → qualifier used in source
    imports: IndexMap<String, String>,
}

impl<'a> Collector<'a>
{
    pub fn new(
        aliases: &'a mut AliasManager,
        observed: &'a mut BTreeSet<String>,
    ) -> Self
    {
        Self { aliases, observed }
    }

    /// Symbols of every package, packages in the given order
    #[instrument(skip_all)]
    pub fn collect(
        &mut self,
        packages: &[LoadedPackage],
    ) -> Vec<Symbol>
    {
        let mut out = Vec::new();

        for (idx, pkg) in packages
            .iter()
            .enumerate()
        {
            let alias = self
                .aliases
                .assign(&pkg.import_path, "");
            self.observed
                .insert(pkg.import_path.clone());
            let before = out.len();
            let mut ordinal = 0usize;

            let declared: BTreeSet<String> = pkg
                .files
                .iter()
                .flat_map(|f| &f.decls)
                .map(|d| d.name().to_string())
                .collect();

            for file in &pkg.files
            {
                let scope = file_scope(file, &pkg.import_path, &declared);

                for decl in &file.decls
                {
                    // Exported names only
                    if !GoIdent::is_exported(decl.name())
                    {
                        continue;
                    }

                    let id = SymbolId { package: idx, ordinal };
                    if let Some(symbol) = self.symbol(id, decl, &alias, &scope)
                    {
                        out.push(symbol);
                        ordinal += 1;
                    }
                }
            }

            debug!(package = %pkg.import_path, symbols = out.len() - before, "collected symbols");
        }

        out
    }

    fn symbol(
        &mut self,
        id: SymbolId,
        decl: &GoDecl,
        alias: &str,
        file: &FileScope,
    ) -> Option<Symbol>
    {
        let own_path = file.own_path;
        let mut refs = Refs::default();

        let built = match decl
        {
            GoDecl::Value { constant, .. } => Declaration::Value(ValueSymbol { constant: *constant }),
            GoDecl::Type { type_params, .. } =>
            {
                let scope = Scope { file, type_params: param_names(type_params) };
                let type_params = resolve_type_params(type_params, &scope, &mut refs);
                Declaration::Type(TypeSymbol { type_params })
            }
            GoDecl::Func { type_params, params, results, .. } =>
            {
                let opaque = params
                    .iter()
                    .map(|p| &p.ty)
                    .chain(results)
                    .find_map(TypeExpr::opaque_array_len);
                if let Some(expr) = opaque
                {
                    warn!(symbol = decl.name(), package = own_path, len = expr, "skipping: array length expression");
                    return None;
                }

                let scope = Scope { file, type_params: param_names(type_params) };
                let resolved_tp = resolve_type_params(type_params, &scope, &mut refs);

                let names = forward_names(params, type_params, alias);
                let mut fields = Vec::with_capacity(params.len());
                let mut args = Vec::with_capacity(params.len());
                for (p, name) in params
                    .iter()
                    .zip(names)
                {
                    args.push(if p.variadic { format!("{name}...") } else { name.clone() });
                    fields.push(Field {
                        name: Some(name),
                        ty: resolve(&p.ty, &scope, &mut refs),
                        variadic: p.variadic,
                    });
                }

                let results = results
                    .iter()
                    .map(|r| resolve(r, &scope, &mut refs))
                    .collect();

                let variadic = params
                    .last()
                    .is_some_and(|p| p.variadic);

                Declaration::Func(FuncSymbol {
                    type_params: resolved_tp,
                    params: fields,
                    args,
                    variadic,
                    results,
                })
            }
        };

        if let Some(hidden) = &refs.unexported
        {
            debug!(symbol = decl.name(), package = own_path, hidden = %hidden, "skipping: references unexported name");
            return None;
        }
        if let Some(name) = &refs.ambiguous
        {
            warn!(symbol = decl.name(), package = own_path, name = %name, "skipping: name could come from several dot imports");
            return None;
        }

        // Imports of kept signatures get aliases, preferring the source qualifier
        for (path, qualifier) in &refs.imports
        {
            self.aliases
                .assign(path, qualifier);
            self.observed
                .insert(path.clone());
        }

        Some(Symbol { id, name: decl.name().to_string(), package: own_path.to_string(), decl: built })
    }
}

/// Import names of one file; `_` imports bind nothing
fn file_scope<'s>(
    file: &GoSourceFile,
    own_path: &'s str,
    declared: &'s BTreeSet<String>,
) -> FileScope<'s>
{
    let mut imports = BTreeMap::new();
    let mut dot_imports = Vec::new();
    for spec in &file.imports
    {
        match spec.name.as_deref()
        {
            Some("_") => {}
            Some(".") => dot_imports.push(spec.path.clone()),
            _ =>
            {
                for name in spec.implied_names()
                {
                    imports
                        .entry(name)
                        .or_insert_with(|| spec.path.clone());
                }
            }
        }
    }
    FileScope { own_path, declared, imports, dot_imports }
}

fn param_names(type_params: &[TypeParam]) -> BTreeSet<String>
{
    type_params
        .iter()
        .flat_map(|tp| {
            tp.names
                .iter()
                .cloned()
        })
        .collect()
}

fn resolve_type_params(
    type_params: &[TypeParam],
    scope: &Scope,
    refs: &mut Refs,
) -> Vec<TypeParam>
{
    type_params
        .iter()
        .map(|tp| TypeParam { names: tp.names.clone(), constraint: resolve(&tp.constraint, scope, refs) })
        .collect()
}

/// Point every named reference, constant array lengths included, at its
/// import path. Builtins and type parameters stay bare. A bare name the
/// package does not declare comes from the file's dot import; unexported
/// and ambiguous names are recorded in `refs`.
fn resolve(
    ty: &TypeExpr,
    scope: &Scope,
    refs: &mut Refs,
) -> TypeExpr
{
    let file = scope.file;
    ty.map_named(&mut |s, name, args| {
        let resolved = match s
        {
            TypeScope::Bare if GoIdent::is_builtin_type(name) || scope.type_params.contains(name) =>
            {
                TypeScope::Bare
            }
            TypeScope::Bare if !file.declared.contains(name) && !file.dot_imports.is_empty() =>
            {
                match file.dot_imports.as_slice()
                {
                    [path] =>
                    {
                        refs.imports
                            .entry(path.clone())
                            .or_default();
                        TypeScope::Package(path.clone())
                    }
                    _ =>
                    {
                        if refs.ambiguous.is_none()
                        {
                            refs.ambiguous = Some(name.to_string());
                        }
                        TypeScope::Bare
                    }
                }
            }
            TypeScope::Bare =>
            {
                if !GoIdent::is_exported(name) && refs.unexported.is_none()
                {
                    refs.unexported = Some(name.to_string());
                }
                TypeScope::Package(file.own_path.to_string())
            }
            TypeScope::Qualifier(q) => match file.imports.get(q)
            {
                Some(path) =>
                {
                    refs.imports
                        .entry(path.clone())
                        .or_insert_with(|| q.clone());
                    TypeScope::Package(path.clone())
                }
                None =>
                {
                    warn!(qualifier = %q, name, "unresolved import qualifier; keeping it verbatim");
                    s.clone()
                }
            },
            TypeScope::Package(_) => s.clone(),
        };

        TypeExpr::Named { scope: resolved, name: name.to_string(), args }
    })
}

/// Final parameter names for a forwarding wrapper. Unnamed parameters,
/// `_`, and names equal to the forwarding alias take the next free
/// `p0, p1, ...` candidate, skipping every name already in use.
pub fn forward_names(
    params: &[ParamDecl],
    type_params: &[TypeParam],
    alias: &str,
) -> Vec<String>
{
    let mut used: BTreeSet<String> = params
        .iter()
        .filter_map(|p| p.name.clone())
        .chain(param_names(type_params))
        .collect();
    used.insert(alias.to_string());

    let mut next = 0usize;
    let mut out = Vec::with_capacity(params.len());

    for p in params
    {
        match p.name.as_deref()
        {
            Some(name) if name != "_" && name != alias => out.push(name.to_string()),
            _ =>
            {
                let fresh = loop
                {
                    let candidate = format!("p{next}");
                    next += 1;
                    if !used.contains(&candidate)
                    {
                        break candidate;
                    }
                };
                used.insert(fresh.clone());
                out.push(fresh);
            }
        }
    }

    out
}

#[cfg(test)]
mod tests
{
    use super::*;

    fn loaded(
        import: &str,
        sources: &[(&str, &str)],
    ) -> LoadedPackage
    {
        let parser = GoParser::new().unwrap();
        let files = sources
            .iter()
            .map(|(path, src)| {
                parser
                    .parse_source(src, Path::new(path))
                    .unwrap()
            })
            .collect();
        LoadedPackage { import_path: import.to_string(), dir: PathBuf::new(), name: "x".into(), files }
    }

    fn collect(packages: &[LoadedPackage]) -> (Vec<Symbol>, AliasManager, BTreeSet<String>)
    {
        let mut aliases = AliasManager::new();
        let mut observed = BTreeSet::new();
        let symbols = Collector::new(&mut aliases, &mut observed).collect(packages);
        (symbols, aliases, observed)
    }

    fn func<'s>(
        symbols: &'s [Symbol],
        name: &str,
    ) -> &'s FuncSymbol
    {
        match &symbols
            .iter()
            .find(|s| s.name == name)
            .expect("symbol not collected")
            .decl
        {
            Declaration::Func(f) => f,
            other => panic!("unexpected {other:?}"),
        }
    }

    fn unnamed(ty: &str) -> ParamDecl
    {
        ParamDecl { name: None, ty: TypeExpr::bare(ty), variadic: false }
    }

    fn named(
        name: &str,
        ty: &str,
    ) -> ParamDecl
    {
        ParamDecl { name: Some(name.into()), ty: TypeExpr::bare(ty), variadic: false }
    }

    #[test]
    fn unnamed_param_skips_taken_candidate()
    {
        let names = forward_names(&[unnamed("int"), named("p0", "string")], &[], "alpha");
        assert_eq!(names, vec!["p1", "p0"]);
    }

    #[test]
    fn blank_and_alias_named_params_are_renamed()
    {
        assert_eq!(forward_names(&[named("_", "bool")], &[], "alpha"), vec!["p0"]);
        assert_eq!(
            forward_names(&[named("alpha", "int"), named("b", "int")], &[], "alpha"),
            vec!["p0", "b"]
        );

        // Type parameter names are taken too
        let tp = vec![TypeParam { names: vec!["p0".into()], constraint: TypeExpr::bare("any") }];
        assert_eq!(forward_names(&[unnamed("p0")], &tp, "alpha"), vec!["p1"]);
    }

    #[test]
    fn collects_exported_symbols_in_source_order()
    {
        let pkg = loaded(
            "example.com/demo/alpha",
            &[(
                "a.go",
                r#"package alpha

const MaxRetries = 3
var hidden = 1
type Worker struct{}
type worker struct{}
func New(name string) *Worker { return nil }
func (w *Worker) Run() {}
func helper() {}
"#,
            )],
        );

        let (symbols, aliases, _) = collect(&[pkg]);
        let names: Vec<_> = symbols
            .iter()
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(names, vec!["MaxRetries", "Worker", "New"]);
        assert_eq!(symbols[0].category(), Category::Const);
        assert_eq!(symbols[2].id, SymbolId { package: 0, ordinal: 2 });
        assert_eq!(aliases.alias_of("example.com/demo/alpha"), Some("alpha"));

        let new = func(&symbols, "New");
        assert_eq!(
            new.results[0],
            TypeExpr::Pointer(Box::new(TypeExpr::Named {
                scope: TypeScope::Package("example.com/demo/alpha".into()),
                name: "Worker".into(),
                args: vec![],
            }))
        );
    }

    #[test]
    fn variadic_and_generic_functions()
    {
        let pkg = loaded(
            "example.com/demo/alpha",
            &[(
                "a.go",
                r#"package alpha

func Join(sep string, parts ...string) string { return "" }
func Map[K comparable, V any](in map[K]V) []V { return nil }
"#,
            )],
        );

        let (symbols, _, _) = collect(&[pkg]);

        let join = func(&symbols, "Join");
        assert!(join.variadic);
        assert_eq!(join.args, vec!["sep", "parts..."]);

        let map = func(&symbols, "Map");
        assert_eq!(map.type_params.len(), 2);
        // Type parameters are never qualified
        assert_eq!(map.params[0].ty.to_string(), "map[K]V");
    }

    #[test]
    fn functions_touching_unexported_types_are_skipped()
    {
        let pkg = loaded(
            "example.com/demo/alpha",
            &[(
                "a.go",
                r#"package alpha

type config struct{}
func Load(c *config) error { return nil }
func Wrap(items []List[config]) {}
func Keep(n int) error { return nil }
"#,
            )],
        );

        let (symbols, _, _) = collect(&[pkg]);
        let names: Vec<_> = symbols
            .iter()
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(names, vec!["Keep"]);
    }

    #[test]
    fn qualified_references_resolve_through_imports()
    {
        let pkg = loaded(
            "example.com/demo/alpha",
            &[(
                "a.go",
                r#"package alpha

import (
    "io"
    yaml "gopkg.in/yaml.v3"
    "example.com/demo/go-beta"
)

func Read(r io.Reader, n *yaml.Node, b beta.Thing, u unknown.Thing) {}
func Unused(x int) {}
"#,
            )],
        );

        let (symbols, aliases, observed) = collect(&[pkg]);
        let read = func(&symbols, "Read");
        assert!(matches!(
            &read.params[0].ty,
            TypeExpr::Named { scope: TypeScope::Package(p), .. } if p == "io"
        ));
        assert!(matches!(
            &read.params[3].ty,
            TypeExpr::Named { scope: TypeScope::Qualifier(q), .. } if q == "unknown"
        ));

        assert_eq!(
            observed,
            ["example.com/demo/alpha", "example.com/demo/go-beta", "gopkg.in/yaml.v3", "io"]
                .into_iter()
                .map(String::from)
                .collect()
        );
        assert_eq!(aliases.alias_of("gopkg.in/yaml.v3"), Some("yaml"));
        assert_eq!(aliases.alias_of("example.com/demo/go-beta"), Some("beta"));
    }

    #[test]
    fn constant_array_lengths_resolve_to_the_owning_package()
    {
        let pkg = loaded(
            "example.com/demo/alpha",
            &[(
                "a.go",
                r#"package alpha

import "crypto/sha256"

const Size = 4
const size = 8

func Hash(b [Size]byte) {}
func Sum(b [size]byte) {}
func Digest(d [sha256.Size]byte) {}
func Double(b [2 * Size]byte) {}
func Fixed(b [16]byte) {}
"#,
            )],
        );

        let (symbols, aliases, _) = collect(&[pkg]);
        let names: Vec<_> = symbols
            .iter()
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(names, vec!["Size", "Hash", "Digest", "Fixed"]);

        let hash = func(&symbols, "Hash");
        assert_eq!(hash.params[0].ty.to_string(), "[\"example.com/demo/alpha\".Size]byte");
        let digest = func(&symbols, "Digest");
        assert_eq!(digest.params[0].ty.to_string(), "[\"crypto/sha256\".Size]byte");
        assert_eq!(aliases.alias_of("crypto/sha256"), Some("sha256"));
    }

    #[test]
    fn bare_names_resolve_through_a_dot_import()
    {
        let pkg = loaded(
            "example.com/demo/alpha",
            &[
                (
                    "a.go",
                    r#"package alpha

import . "io"

type Buffer struct{}

func Read(r Reader, b *Buffer) {}
"#,
                ),
                (
                    "b.go",
                    r#"package alpha

import (
    . "io"
    . "strings"
)

func Both(b Builder) {}
func Own(b Buffer) {}
"#,
                ),
            ],
        );

        let (symbols, aliases, _) = collect(&[pkg]);
        let read = func(&symbols, "Read");
        assert_eq!(read.params[0].ty.to_string(), "\"io\".Reader");
        assert_eq!(read.params[1].ty.to_string(), "*\"example.com/demo/alpha\".Buffer");
        assert_eq!(aliases.alias_of("io"), Some("io"));

        // Two dot imports leave `Builder` ambiguous
        assert!(!symbols.iter().any(|s| s.name == "Both"));
        assert_eq!(func(&symbols, "Own").params[0].ty.to_string(), "\"example.com/demo/alpha\".Buffer");
    }

    #[test]
    fn load_package_skips_tests_and_foreign_packages() -> Result<()>
    {
        let tmp = tempfile::TempDir::new()?;
        let dir = tmp.path();
        std::fs::write(dir.join("a.go"), "package alpha\n\nconst A = 1\n")?;
        std::fs::write(dir.join("b.go"), "package alpha\n\nconst B = 2\n")?;
        std::fs::write(dir.join("gen.go"), "package main\n\nconst G = 3\n")?;
        std::fs::write(dir.join("a_test.go"), "package alpha\n\nconst T = 4\n")?;

        let cfg = PackageConfig {
            import: "example.com/alpha".into(),
            dir: Some(dir.to_path_buf()),
            ..PackageConfig::default()
        };
        let pkg = load_package(&cfg, &PackageLocator::default())?;
        assert_eq!(pkg.name, "alpha");
        assert_eq!(pkg.files.len(), 2);
        Ok(())
    }

    #[test]
    fn missing_package_is_a_load_error()
    {
        let cfg = PackageConfig { import: "example.com/nowhere".into(), ..PackageConfig::default() };
        let err = load_packages(&[cfg], &PackageLocator::default()).unwrap_err();
        assert!(matches!(err.downcast_ref::<AdaptError>(), Some(AdaptError::Load { .. })));
    }
}
