//! Filepath: src/parsers/go_parser.rs

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::warn;
use tree_sitter::{Language, Node, Parser, Query, QueryCursor, StreamingIterator};

use crate::core::gotype::{ArrayLen, ChanDir, Field, FuncType, TypeExpr, TypeParam, TypeScope};
use crate::infra::utils::TsNodeUtils;

/// Node kinds that can carry a declared name (`_` lexes either way)
const NAME_KINDS: &[&str] = &["identifier", "blank_identifier"];

/// One `import` line of a source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpec {
    /// Explicit import name (`foo "x/y"`), including `_` and `.`
    pub name: Option<String>,
    pub path: String,
}

impl ImportSpec {
    /// Names a file may use to refer to this import. An explicit name wins;
    /// otherwise guess the package name from the path the way Go tooling
    /// does (`go-yaml` → `yaml`, `yaml.v3` → `yaml`, `x/v2` → `x`).
    pub fn implied_names(&self) -> Vec<String> {
        if let Some(name) = &self.name {
            return vec![name.clone()];
        }

        let mut segments = self.path.rsplit('/');
        let mut last = segments.next().unwrap_or(&self.path);
        if is_major_version(last)
            && let Some(prev) = segments.next()
        {
            last = prev;
        }

        let mut out = vec![last.to_string()];
        let mut push = |s: &str| {
            if !s.is_empty() && !out.iter().any(|o| o == s) {
                out.push(s.to_string());
            }
        };

        let trimmed = last.split('.').next().unwrap_or(last);
        push(trimmed);
        push(trimmed.trim_start_matches("go-"));
        push(trimmed.trim_end_matches("-go"));
        push(&trimmed.replace('-', "_"));
        push(&trimmed.replace('-', ""));
        out
    }
}

fn is_major_version(seg: &str) -> bool {
    seg.len() > 1
        && seg.starts_with('v')
        && seg[1..].chars().all(|c| c.is_ascii_digit())
}

/// A parameter as declared (one entry per name)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamDecl {
    pub name: Option<String>,
    pub ty: TypeExpr,
    pub variadic: bool,
}

/// Top-level declarations the generator cares about
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GoDecl {
    Type {
        name: String,
        type_params: Vec<TypeParam>,
    },
    Func {
        name: String,
        type_params: Vec<TypeParam>,
        params: Vec<ParamDecl>,
        results: Vec<TypeExpr>,
    },
    Value {
        name: String,
        constant: bool,
    },
}

impl GoDecl {
    pub fn name(&self) -> &str {
        match self {
            GoDecl::Type { name, .. } | GoDecl::Func { name, .. } | GoDecl::Value { name, .. } => {
                name
            }
        }
    }
}

/// Declarations of one parsed `.go` file
#[derive(Debug, Clone)]
pub struct GoSourceFile {
    pub path: PathBuf,
    pub package: String,
    pub imports: Vec<ImportSpec>,
    /// Source order
    pub decls: Vec<GoDecl>,
}

pub struct GoParser {
    language: Language,
    // Top-level declaration nodes only; shapes are read by hand afterwards.
    decls_query: Query,
}

impl GoParser {
    pub fn new() -> Result<Self> {
        let language = tree_sitter_go::LANGUAGE.into();

        let decls_query_src = r#"
            (source_file (package_clause) @package)
            (source_file (import_declaration) @import)
            (source_file (function_declaration) @function)
            (source_file (type_declaration) @type)
            (source_file (const_declaration) @const)
            (source_file (var_declaration) @var)
        "#;

        let decls_query =
            Query::new(&language, decls_query_src).context("create Go declarations query")?;
        Ok(Self {
            language,
            decls_query,
        })
    }

    /// Parse one file's contents
    pub fn parse_source(&self, content: &str, file_path: &Path) -> Result<GoSourceFile> {
        let mut parser = Parser::new();
        parser.set_language(&self.language)?;

        let tree = parser
            .parse(content, None)
            .ok_or_else(|| anyhow::anyhow!("Failed to parse Go source {}", file_path.display()))?;
        let bytes = content.as_bytes();
        let root = tree.root_node();

        if root.has_error() {
            warn!("syntax errors in {}; continuing with what parsed", file_path.display());
        }

        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&self.decls_query, root, bytes);
        let cap_names: Vec<&str> = self.decls_query.capture_names().to_vec();

        let mut package = String::new();
        let mut imports = Vec::new();
        let mut found: Vec<(usize, Vec<GoDecl>)> = Vec::new();

        while let Some(m) = matches.next() {
            for cap in m.captures {
                let node = cap.node;
                match cap_names[cap.index as usize] {
                    "package" => package = package_name(node, bytes),
                    "import" => collect_imports(node, bytes, &mut imports),
                    "function" => {
                        if let Some(decl) = function_decl(node, bytes) {
                            found.push((node.start_byte(), vec![decl]));
                        }
                    }
                    "type" => found.push((node.start_byte(), type_decls(node, bytes))),
                    "const" => found.push((node.start_byte(), value_decls(node, bytes, true))),
                    "var" => found.push((node.start_byte(), value_decls(node, bytes, false))),
                    _ => {}
                }
            }
        }

        found.sort_by_key(|(start, _)| *start);

        Ok(GoSourceFile {
            path: file_path.to_path_buf(),
            package,
            imports,
            decls: found.into_iter().flat_map(|(_, d)| d).collect(),
        })
    }
}

fn package_name(node: Node, bytes: &[u8]) -> String {
    TsNodeUtils::named_children(node)
        .into_iter()
        .find(|c| c.kind() == "package_identifier")
        .map(|c| TsNodeUtils::text(c, bytes).to_string())
        .unwrap_or_default()
}

fn collect_imports(node: Node, bytes: &[u8], out: &mut Vec<ImportSpec>) {
    for child in TsNodeUtils::named_children(node) {
        match child.kind() {
            "import_spec" => {
                let Some(path) = TsNodeUtils::field_text(child, "path", bytes) else {
                    continue;
                };
                let name = TsNodeUtils::field_text(child, "name", bytes).map(|s| s.to_string());
                out.push(ImportSpec {
                    name,
                    path: unquote(path),
                });
            }
            "import_spec_list" => collect_imports(child, bytes, out),
            _ => {}
        }
    }
}

fn unquote(lit: &str) -> String {
    lit.trim()
        .trim_matches('"')
        .trim_matches('`')
        .to_string()
}

fn function_decl(node: Node, bytes: &[u8]) -> Option<GoDecl> {
    let name = TsNodeUtils::field_text(node, "name", bytes)?.to_string();
    let type_params = node
        .child_by_field_name("type_parameters")
        .map(|n| type_params(n, bytes))
        .unwrap_or_default();
    let params = node
        .child_by_field_name("parameters")
        .map(|n| parameter_list(n, bytes))
        .unwrap_or_default();
    let results = node
        .child_by_field_name("result")
        .map(|n| result_types(n, bytes))
        .unwrap_or_default();

    Some(GoDecl::Func {
        name,
        type_params,
        params,
        results,
    })
}

fn type_decls(node: Node, bytes: &[u8]) -> Vec<GoDecl> {
    let mut out = Vec::new();
    for spec in TsNodeUtils::named_children(node) {
        if !matches!(spec.kind(), "type_spec" | "type_alias") {
            continue;
        }
        let Some(name) = TsNodeUtils::field_text(spec, "name", bytes) else {
            continue;
        };
        let type_params = spec
            .child_by_field_name("type_parameters")
            .map(|n| type_params(n, bytes))
            .unwrap_or_default();
        out.push(GoDecl::Type {
            name: name.to_string(),
            type_params,
        });
    }
    out
}

fn value_decls(node: Node, bytes: &[u8], constant: bool) -> Vec<GoDecl> {
    let spec_kind = if constant { "const_spec" } else { "var_spec" };
    let mut out = Vec::new();
    collect_value_specs(node, bytes, spec_kind, constant, &mut out);
    out
}

fn collect_value_specs(
    node: Node,
    bytes: &[u8],
    spec_kind: &str,
    constant: bool,
    out: &mut Vec<GoDecl>,
) {
    for child in TsNodeUtils::named_children(node) {
        if child.kind() == spec_kind {
            for name in TsNodeUtils::field_texts(child, "name", NAME_KINDS, bytes) {
                out.push(GoDecl::Value { name, constant });
            }
        } else if child.kind().ends_with("_spec_list") {
            // Newer grammars wrap grouped specs in a list node
            collect_value_specs(child, bytes, spec_kind, constant, out);
        }
    }
}

fn type_params(node: Node, bytes: &[u8]) -> Vec<TypeParam> {
    TsNodeUtils::named_children(node)
        .into_iter()
        .filter(|c| matches!(c.kind(), "type_parameter_declaration" | "parameter_declaration"))
        .map(|decl| {
            let names = TsNodeUtils::field_texts(decl, "name", NAME_KINDS, bytes);
            let constraint = decl
                .child_by_field_name("type")
                .map(|t| type_expr(t, bytes))
                .unwrap_or_else(|| TypeExpr::bare("any"));
            TypeParam { names, constraint }
        })
        .collect()
}

fn parameter_list(node: Node, bytes: &[u8]) -> Vec<ParamDecl> {
    let mut out = Vec::new();
    for decl in TsNodeUtils::named_children(node) {
        let variadic = match decl.kind() {
            "parameter_declaration" => false,
            "variadic_parameter_declaration" => true,
            _ => continue,
        };
        let ty = decl
            .child_by_field_name("type")
            .map(|t| type_expr(t, bytes))
            .unwrap_or_else(|| TypeExpr::Raw(String::new()));
        let names = TsNodeUtils::field_texts(decl, "name", NAME_KINDS, bytes);

        if names.is_empty() {
            out.push(ParamDecl {
                name: None,
                ty,
                variadic,
            });
        } else {
            for name in names {
                out.push(ParamDecl {
                    name: Some(name),
                    ty: ty.clone(),
                    variadic,
                });
            }
        }
    }
    out
}

fn result_types(node: Node, bytes: &[u8]) -> Vec<TypeExpr> {
    if node.kind() == "parameter_list" {
        parameter_list(node, bytes)
            .into_iter()
            .map(|p| p.ty)
            .collect()
    } else {
        vec![type_expr(node, bytes)]
    }
}

fn fields_of(node: Node, bytes: &[u8]) -> Vec<Field> {
    parameter_list(node, bytes)
        .into_iter()
        .map(|p| Field {
            name: p.name,
            ty: p.ty,
            variadic: p.variadic,
        })
        .collect()
}

fn first_named(node: Node) -> Option<Node> {
    TsNodeUtils::named_children(node).into_iter().next()
}

fn boxed_child(node: Node, field: &str, bytes: &[u8]) -> Box<TypeExpr> {
    let child = node
        .child_by_field_name(field)
        .or_else(|| first_named(node));
    Box::new(match child {
        Some(c) => type_expr(c, bytes),
        None => TypeExpr::Raw(String::new()),
    })
}

/// Classify an array length expression
fn array_len(node: Node, bytes: &[u8]) -> ArrayLen {
    let text = TsNodeUtils::text(node, bytes).to_string();
    match node.kind() {
        "identifier" => ArrayLen::Const {
            scope: TypeScope::Bare,
            name: text,
        },
        "selector_expression" => {
            let operand = node
                .child_by_field_name("operand")
                .filter(|o| o.kind() == "identifier");
            match (operand, TsNodeUtils::field_text(node, "field", bytes)) {
                (Some(q), Some(name)) => ArrayLen::Const {
                    scope: TypeScope::Qualifier(TsNodeUtils::text(q, bytes).to_string()),
                    name: name.to_string(),
                },
                _ => ArrayLen::Expr(text),
            }
        }
        _ if mentions_identifier(node) => ArrayLen::Expr(text),
        _ => ArrayLen::Literal(text),
    }
}

fn mentions_identifier(node: Node) -> bool {
    node.kind() == "identifier"
        || TsNodeUtils::named_children(node)
            .into_iter()
            .any(mentions_identifier)
}

/// Read a type node into an owned expression
pub fn type_expr(node: Node, bytes: &[u8]) -> TypeExpr {
    let text = || TsNodeUtils::text(node, bytes).to_string();

    match node.kind() {
        "type_identifier" | "identifier" => TypeExpr::bare(&text()),
        "qualified_type" => {
            let q = TsNodeUtils::field_text(node, "package", bytes).unwrap_or_default();
            let name = TsNodeUtils::field_text(node, "name", bytes).unwrap_or_default();
            TypeExpr::Named {
                scope: TypeScope::Qualifier(q.to_string()),
                name: name.to_string(),
                args: Vec::new(),
            }
        }
        "generic_type" => {
            let base = node
                .child_by_field_name("type")
                .map(|t| type_expr(t, bytes))
                .unwrap_or_else(|| TypeExpr::Raw(text()));
            let args: Vec<TypeExpr> = node
                .child_by_field_name("type_arguments")
                .map(|a| {
                    TsNodeUtils::named_children(a)
                        .into_iter()
                        .map(|t| type_expr(t, bytes))
                        .collect()
                })
                .unwrap_or_default();
            match base {
                TypeExpr::Named { scope, name, .. } => TypeExpr::Named { scope, name, args },
                _ => TypeExpr::Raw(text()),
            }
        }
        "pointer_type" => TypeExpr::Pointer(boxed_child(node, "type", bytes)),
        "slice_type" => TypeExpr::Slice(boxed_child(node, "element", bytes)),
        "array_type" => TypeExpr::Array {
            len: match node.child_by_field_name("length") {
                Some(len) => array_len(len, bytes),
                None => ArrayLen::Literal(String::new()),
            },
            elem: boxed_child(node, "element", bytes),
        },
        "implicit_length_array_type" => TypeExpr::Array {
            len: ArrayLen::Literal("...".to_string()),
            elem: boxed_child(node, "element", bytes),
        },
        "map_type" => TypeExpr::Map {
            key: boxed_child(node, "key", bytes),
            value: boxed_child(node, "value", bytes),
        },
        "channel_type" => {
            let t = text();
            let dir = if t.starts_with("<-") {
                ChanDir::Recv
            } else if t["chan".len().min(t.len())..].trim_start().starts_with("<-") {
                ChanDir::Send
            } else {
                ChanDir::Both
            };
            TypeExpr::Chan {
                dir,
                elem: boxed_child(node, "value", bytes),
            }
        }
        "function_type" => {
            let params = node
                .child_by_field_name("parameters")
                .map(|p| fields_of(p, bytes))
                .unwrap_or_default();
            let results = match node.child_by_field_name("result") {
                Some(r) if r.kind() == "parameter_list" => fields_of(r, bytes),
                Some(r) => vec![Field {
                    name: None,
                    ty: type_expr(r, bytes),
                    variadic: false,
                }],
                None => Vec::new(),
            };
            TypeExpr::Func(Box::new(FuncType { params, results }))
        }
        "struct_type" => TypeExpr::Struct(text()),
        "interface_type" => TypeExpr::Interface(text()),
        "parenthesized_type" => match first_named(node) {
            Some(inner) => type_expr(inner, bytes),
            None => TypeExpr::Raw(text()),
        },
        "negated_type" => TypeExpr::Approx(boxed_child(node, "type", bytes)),
        "type_elem" | "type_constraint" => {
            let mut items: Vec<TypeExpr> = TsNodeUtils::named_children(node)
                .into_iter()
                .map(|t| type_expr(t, bytes))
                .collect();
            match items.len() {
                0 => TypeExpr::Raw(text()),
                1 => items.remove(0),
                _ => TypeExpr::Union(items),
            }
        }
        _ => TypeExpr::Raw(text()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> GoSourceFile {
        GoParser::new()
            .unwrap()
            .parse_source(src, Path::new("demo.go"))
            .unwrap()
    }

    fn func<'a>(file: &'a GoSourceFile, name: &str) -> &'a GoDecl {
        file.decls
            .iter()
            .find(|d| matches!(d, GoDecl::Func { .. }) && d.name() == name)
            .expect("function not found")
    }

    #[test]
    fn package_and_imports() {
        let file = parse(
            r#"package alpha

import "fmt"

import (
    yaml "gopkg.in/yaml.v3"
    _ "embed"
    "example.com/demo/go-beta"
)
"#,
        );
        assert_eq!(file.package, "alpha");
        assert_eq!(file.imports.len(), 4);
        assert_eq!(file.imports[0].path, "fmt");
        assert_eq!(file.imports[1].name.as_deref(), Some("yaml"));
        assert_eq!(file.imports[1].path, "gopkg.in/yaml.v3");
        assert_eq!(file.imports[2].name.as_deref(), Some("_"));
    }

    #[test]
    fn implied_import_names() {
        let spec = |p: &str| ImportSpec {
            name: None,
            path: p.to_string(),
        };
        assert!(spec("gopkg.in/yaml.v3").implied_names().contains(&"yaml".to_string()));
        assert!(spec("example.com/go-beta").implied_names().contains(&"beta".to_string()));
        assert!(spec("example.com/mod/v2").implied_names().contains(&"mod".to_string()));
        assert_eq!(spec("fmt").implied_names(), vec!["fmt".to_string()]);
    }

    #[test]
    fn declarations_in_source_order() {
        let file = parse(
            r#"package alpha

const MaxRetries = 3

const (
    A = iota
    B
    c
)

var Default, Other = 1, 2

type Worker struct{ Name string }

type ID = string

type List[T any] []T

func New(name string) *Worker { return nil }

func (w *Worker) Run() {}
"#,
        );

        let names: Vec<&str> = file.decls.iter().map(|d| d.name()).collect();
        assert_eq!(
            names,
            vec![
                "MaxRetries",
                "A",
                "B",
                "c",
                "Default",
                "Other",
                "Worker",
                "ID",
                "List",
                "New"
            ]
        );
        assert!(matches!(
            &file.decls[0],
            GoDecl::Value { constant: true, .. }
        ));
        assert!(matches!(
            &file.decls[4],
            GoDecl::Value { constant: false, .. }
        ));

        match &file.decls[8] {
            GoDecl::Type { type_params, .. } => {
                assert_eq!(type_params.len(), 1);
                assert_eq!(type_params[0].names, vec!["T".to_string()]);
                assert_eq!(type_params[0].constraint.to_string(), "any");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn parameters_unnamed_blank_and_variadic() {
        let file = parse(
            r#"package alpha

func Unnamed(int, string) {}
func Mixed(_ bool, a, b int) error { return nil }
func Join(sep string, parts ...string) (string, error) { return "", nil }
"#,
        );

        match func(&file, "Unnamed") {
            GoDecl::Func { params, .. } => {
                assert_eq!(params.len(), 2);
                assert!(params.iter().all(|p| p.name.is_none()));
                assert_eq!(params[1].ty.to_string(), "string");
            }
            _ => unreachable!(),
        }

        match func(&file, "Mixed") {
            GoDecl::Func {
                params, results, ..
            } => {
                let names: Vec<_> = params.iter().map(|p| p.name.clone().unwrap()).collect();
                assert_eq!(names, vec!["_", "a", "b"]);
                assert_eq!(results.len(), 1);
                assert_eq!(results[0].to_string(), "error");
            }
            _ => unreachable!(),
        }

        match func(&file, "Join") {
            GoDecl::Func {
                params, results, ..
            } => {
                assert!(!params[0].variadic);
                assert!(params[1].variadic);
                assert_eq!(params[1].ty.to_string(), "string");
                assert_eq!(results.len(), 2);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn composite_and_generic_types() {
        let file = parse(
            r#"package alpha

import "io"

func Complex(m map[string][]*io.Reader, ch <-chan int, out chan<- Item, f func(int) (bool, error), arr [4]byte) {}
func Map[K comparable, V ~int | ~string](in map[K]V, p Pair[K, V]) []V { return nil }
func Anon(s struct{ A int }, i interface{ M() }) {}
func Lengths(a [4]byte, b [Size]byte, c [sha256.Size]byte, d [2 * Size]byte, e [1 << 4]byte) {}
"#,
        );

        match func(&file, "Complex") {
            GoDecl::Func { params, .. } => {
                let rendered: Vec<String> = params.iter().map(|p| p.ty.to_string()).collect();
                assert_eq!(
                    rendered,
                    vec![
                        "map[string][]*io.Reader",
                        "<-chan int",
                        "chan<- Item",
                        "func(int) (bool, error)",
                        "[4]byte"
                    ]
                );
            }
            _ => unreachable!(),
        }

        match func(&file, "Lengths") {
            GoDecl::Func { params, .. } => {
                let lens: Vec<&ArrayLen> = params
                    .iter()
                    .filter_map(|p| match &p.ty {
                        TypeExpr::Array { len, .. } => Some(len),
                        _ => None,
                    })
                    .collect();
                assert_eq!(
                    lens,
                    vec![
                        &ArrayLen::Literal("4".into()),
                        &ArrayLen::Const {
                            scope: TypeScope::Bare,
                            name: "Size".into()
                        },
                        &ArrayLen::Const {
                            scope: TypeScope::Qualifier("sha256".into()),
                            name: "Size".into()
                        },
                        &ArrayLen::Expr("2 * Size".into()),
                        &ArrayLen::Literal("1 << 4".into()),
                    ]
                );
                assert_eq!(params[2].ty.to_string(), "[sha256.Size]byte");
            }
            _ => unreachable!(),
        }

        match func(&file, "Map") {
            GoDecl::Func {
                type_params,
                params,
                ..
            } => {
                assert_eq!(type_params.len(), 2);
                assert_eq!(type_params[1].constraint.to_string(), "~int | ~string");
                assert_eq!(params[1].ty.to_string(), "Pair[K, V]");
            }
            _ => unreachable!(),
        }

        match func(&file, "Anon") {
            GoDecl::Func { params, .. } => {
                assert!(matches!(params[0].ty, TypeExpr::Struct(_)));
                assert!(matches!(params[1].ty, TypeExpr::Interface(_)));
            }
            _ => unreachable!(),
        }
    }
}
