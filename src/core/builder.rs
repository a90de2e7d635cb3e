//! Declaration builder: assembles the output unit and serializes it.

use std::fmt::Write as _;

use itertools::Itertools;

use crate::core::{
    alias::PackageRef,
    collect::FuncSymbol,
    gotype::{Field, TypeParam, render_results, render_type_args, render_type_params},
};

/// First line of every generated file
pub const HEADER: &str = "// Code generated by goadapt. DO NOT EDIT.";

/// One generated Go file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputUnit
{
    pub package: String,
    /// Sorted by import path
    pub imports: Vec<PackageRef>,
    pub consts: Vec<String>,
    pub vars: Vec<String>,
    pub types: Vec<String>,
    pub funcs: Vec<String>,
}

impl OutputUnit
{
    /// No declarations at all
    pub fn is_empty(&self) -> bool
    {
        self.consts
            .is_empty()
            && self
                .vars
                .is_empty()
            && self
                .types
                .is_empty()
            && self
                .funcs
                .is_empty()
    }

    /// Serialize to Go source
    pub fn render(&self) -> String
    {
        let mut out = String::new();
        out.push_str(HEADER);
        out.push_str("\n\n");
        let _ = writeln!(out, "package {}", self.package);

        if !self
            .imports
            .is_empty()
        {
            out.push_str("\nimport (\n");
            for import in &self.imports
            {
                let _ = writeln!(out, "\t{} {}", import.alias, go_quote(&import.import_path));
            }
            out.push_str(")\n");
        }

        for (keyword, group) in [("const", &self.consts), ("var", &self.vars), ("type", &self.types)]
        {
            if group.is_empty()
            {
                continue;
            }
            let _ = writeln!(out, "\n{keyword} (");
            for line in group
            {
                let _ = writeln!(out, "\t{line}");
            }
            out.push_str(")\n");
        }

        for func in &self.funcs
        {
            out.push('\n');
            out.push_str(func);
        }

        out
    }
}

/// Collects declarations in emission order
#[derive(Debug, Default)]
pub struct DeclarationBuilder
{
    unit: OutputUnit,
}

impl DeclarationBuilder
{
    pub fn new(package: &str) -> Self
    {
        Self { unit: OutputUnit { package: package.to_string(), ..OutputUnit::default() } }
    }

    /// `Local = alias.Original` in the const or var group
    pub fn add_value(
        &mut self,
        constant: bool,
        local: &str,
        alias: &str,
        original: &str,
    )
    {
        let line = format!("{local} = {alias}.{original}");
        if constant
        {
            self.unit
                .consts
                .push(line);
        }
        else
        {
            self.unit
                .vars
                .push(line);
        }
    }

    /// `Local[T C] = alias.Original[T]`; parameters must be qualified
    pub fn add_type(
        &mut self,
        local: &str,
        alias: &str,
        original: &str,
        type_params: &[TypeParam],
    )
    {
        self.unit
            .types
            .push(format!(
                "{local}{} = {alias}.{original}{}",
                render_type_params(type_params),
                render_type_args(type_params)
            ));
    }

    /// Forwarding wrapper; `func` must already be qualified
    pub fn add_func(
        &mut self,
        local: &str,
        alias: &str,
        original: &str,
        func: &FuncSymbol,
    )
    {
        let params = func
            .params
            .iter()
            .map(|p| {
                let dots = if p.variadic { "..." } else { "" };
                match &p.name
                {
                    Some(name) => format!("{name} {dots}{}", p.ty),
                    None => format!("{dots}{}", p.ty),
                }
            })
            .join(", ");

        let results: Vec<Field> = func
            .results
            .iter()
            .map(|ty| Field { name: None, ty: ty.clone(), variadic: false })
            .collect();

        let call = format!(
            "{alias}.{original}{}({})",
            render_type_args(&func.type_params),
            func.args
                .join(", ")
        );
        let body = if results.is_empty() { call } else { format!("return {call}") };

        self.unit
            .funcs
            .push(format!(
                "func {local}{}({params}){} {{\n\t{body}\n}}\n",
                render_type_params(&func.type_params),
                render_results(&results)
            ));
    }

    /// Finish with the import block (used imports only, sorted by path)
    pub fn finish(
        mut self,
        mut imports: Vec<PackageRef>,
    ) -> OutputUnit
    {
        imports.sort_by(|a, b| {
            a.import_path
                .cmp(&b.import_path)
        });
        self.unit
            .imports = imports;
        self.unit
    }
}

/// Go interpreted string literal; printable text is kept as is
fn go_quote(s: &str) -> String
{
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars()
    {
        match c
        {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() =>
            {
                let _ = write!(out, "\\u{:04x}", u32::from(c));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::core::gotype::TypeExpr;

    fn field(
        name: &str,
        ty: &str,
        variadic: bool,
    ) -> Field
    {
        Field { name: Some(name.into()), ty: TypeExpr::bare(ty), variadic }
    }

    #[test]
    fn renders_groups_in_order_and_skips_empty_ones()
    {
        let mut b = DeclarationBuilder::new("adapters");
        b.add_value(false, "Default", "alpha", "Default");
        b.add_value(true, "MaxRetries", "alpha", "MaxRetries");
        b.add_value(true, "MaxRetries1", "beta", "MaxRetries");

        let unit = b.finish(vec![
            PackageRef { import_path: "example.com/demo/beta".into(), alias: "beta".into() },
            PackageRef { import_path: "example.com/demo/alpha".into(), alias: "alpha".into() },
        ]);

        let expected = "\
// Code generated by goadapt. DO NOT EDIT.

package adapters

import (
\talpha \"example.com/demo/alpha\"
\tbeta \"example.com/demo/beta\"
)

const (
\tMaxRetries = alpha.MaxRetries
\tMaxRetries1 = beta.MaxRetries
)

var (
\tDefault = alpha.Default
)
";
        assert_eq!(unit.render(), expected);
        assert!(!unit.is_empty());
    }

    #[test]
    fn import_paths_are_quoted_as_go_strings()
    {
        assert_eq!(go_quote("example.com/demo/alpha"), "\"example.com/demo/alpha\"");
        // Printable non-ASCII and combining marks stay literal
        assert_eq!(go_quote("example.com/ünï/e\u{301}"), "\"example.com/ünï/e\u{301}\"");
        assert_eq!(go_quote("a\"b\\c\u{7f}\u{1}"), "\"a\\\"b\\\\c\\u007f\\u0001\"");

        let unit = DeclarationBuilder::new("adapters").finish(vec![PackageRef {
            import_path: "example.com/ünï".into(),
            alias: "uni".into(),
        }]);
        assert!(unit.render().contains("\tuni \"example.com/ünï\"\n"));
    }

    #[test]
    fn generic_type_alias_keeps_arity()
    {
        let mut b = DeclarationBuilder::new("adapters");
        let params = vec![
            TypeParam { names: vec!["K".into()], constraint: TypeExpr::bare("comparable") },
            TypeParam { names: vec!["V".into()], constraint: TypeExpr::bare("any") },
        ];
        b.add_type("PairX", "alpha", "Pair", &params);
        let unit = b.finish(vec![]);
        assert_eq!(unit.types, vec!["PairX[K comparable, V any] = alpha.Pair[K, V]"]);
    }

    #[test]
    fn forwarding_functions()
    {
        let mut b = DeclarationBuilder::new("adapters");

        b.add_func(
            "Join",
            "alpha",
            "Join",
            &FuncSymbol {
                type_params: vec![],
                params: vec![field("sep", "string", false), field("parts", "string", true)],
                args: vec!["sep".into(), "parts...".into()],
                variadic: true,
                results: vec![TypeExpr::bare("string"), TypeExpr::bare("error")],
            },
        );

        b.add_func(
            "Clear",
            "alpha",
            "Clear",
            &FuncSymbol {
                type_params: vec![TypeParam { names: vec!["T".into()], constraint: TypeExpr::bare("any") }],
                params: vec![field("p0", "T", false)],
                args: vec!["p0".into()],
                variadic: false,
                results: vec![],
            },
        );

        let unit = b.finish(vec![]);
        assert_eq!(
            unit.funcs[0],
            "func Join(sep string, parts ...string) (string, error) {\n\treturn alpha.Join(sep, parts...)\n}\n"
        );
        assert_eq!(unit.funcs[1], "func Clear[T any](p0 T) {\n\talpha.Clear[T](p0)\n}\n");
    }
}
