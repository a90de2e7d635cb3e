//! Owned Go type expressions and the declaration shapes read from source.
//!
//! Trees are immutable: every rewrite goes through [`TypeExpr::map_named`],
//! which rebuilds the tree bottom-up so a sub-expression shared by several
//! declarations is never edited in place.

use std::fmt;

use itertools::Itertools;

/// Where an unqualified or qualified name points
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeScope
{
    /// Written without qualifier (builtin, type parameter, or same package)
    Bare,
    /// Written as `q.Name`; `q` is the file-local import name
    Qualifier(String),
    /// Resolved to an import path
    Package(String),
}

/// Length of an array type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ArrayLen
{
    /// Literal or identifier-free constant expression, kept verbatim
    Literal(String),
    /// A named constant, optionally package-qualified
    Const
    {
        scope: TypeScope,
        name: String,
    },
    /// Expression mixing identifiers with operators; not rewritten
    Expr(String),
}

/// Channel direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChanDir
{
    Both,
    Send,
    Recv,
}

/// One parameter or result of a function type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Field
{
    pub name: Option<String>,
    pub ty: TypeExpr,
    pub variadic: bool,
}

/// Signature of a function type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FuncType
{
    pub params: Vec<Field>,
    pub results: Vec<Field>,
}

/// A Go type expression
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeExpr
{
    Named
    {
        scope: TypeScope,
        name: String,
        args: Vec<TypeExpr>,
    },
    Pointer(Box<TypeExpr>),
    Slice(Box<TypeExpr>),
    Array
    {
        len: ArrayLen,
        elem: Box<TypeExpr>,
    },
    Map
    {
        key: Box<TypeExpr>,
        value: Box<TypeExpr>,
    },
    Chan
    {
        dir: ChanDir,
        elem: Box<TypeExpr>,
    },
    Func(Box<FuncType>),
    /// `struct { ... }` kept verbatim
    Struct(String),
    /// `interface { ... }` kept verbatim
    Interface(String),
    /// Constraint union `A | B`
    Union(Vec<TypeExpr>),
    /// Constraint approximation `~T`
    Approx(Box<TypeExpr>),
    /// Anything the reader did not model
    Raw(String),
}

/// Type parameter group `K, V comparable`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeParam
{
    pub names: Vec<String>,
    pub constraint: TypeExpr,
}

impl TypeExpr
{
    /// Unqualified named type without arguments
    pub fn bare(name: &str) -> Self
    {
        TypeExpr::Named { scope: TypeScope::Bare, name: name.to_string(), args: Vec::new() }
    }

    /// Rebuild the tree, replacing every named reference with `f`'s result.
    /// `f` receives the reference with its arguments already rebuilt.
    /// Struct and interface bodies are copied untouched.
    pub fn map_named<F>(
        &self,
        f: &mut F,
    ) -> TypeExpr
    where
        F: FnMut(&TypeScope, &str, Vec<TypeExpr>) -> TypeExpr,
    {
        match self
        {
            TypeExpr::Named { scope, name, args } =>
            {
                let args = args
                    .iter()
                    .map(|a| a.map_named(f))
                    .collect();
                f(scope, name, args)
            }
            TypeExpr::Pointer(inner) => TypeExpr::Pointer(Box::new(inner.map_named(f))),
            TypeExpr::Slice(inner) => TypeExpr::Slice(Box::new(inner.map_named(f))),
            TypeExpr::Array { len, elem } =>
            {
                TypeExpr::Array { len: len.map_named(f), elem: Box::new(elem.map_named(f)) }
            }
            TypeExpr::Map { key, value } => TypeExpr::Map {
                key: Box::new(key.map_named(f)),
                value: Box::new(value.map_named(f)),
            },
            TypeExpr::Chan { dir, elem } => TypeExpr::Chan { dir: *dir, elem: Box::new(elem.map_named(f)) },
            TypeExpr::Func(sig) => TypeExpr::Func(Box::new(sig.map_named(f))),
            TypeExpr::Union(items) => TypeExpr::Union(
                items
                    .iter()
                    .map(|t| t.map_named(f))
                    .collect(),
            ),
            TypeExpr::Approx(inner) => TypeExpr::Approx(Box::new(inner.map_named(f))),
            TypeExpr::Struct(_) | TypeExpr::Interface(_) | TypeExpr::Raw(_) => self.clone(),
        }
    }

    /// First array length that [`map_named`](Self::map_named) cannot rewrite
    pub fn opaque_array_len(&self) -> Option<&str>
    {
        match self
        {
            TypeExpr::Array { len: ArrayLen::Expr(expr), .. } => Some(expr.as_str()),
            TypeExpr::Named { args, .. } => args
                .iter()
                .find_map(TypeExpr::opaque_array_len),
            TypeExpr::Pointer(inner) | TypeExpr::Slice(inner) | TypeExpr::Approx(inner) =>
            {
                inner.opaque_array_len()
            }
            TypeExpr::Array { elem, .. } | TypeExpr::Chan { elem, .. } => elem.opaque_array_len(),
            TypeExpr::Map { key, value } => key
                .opaque_array_len()
                .or_else(|| value.opaque_array_len()),
            TypeExpr::Func(sig) => sig
                .params
                .iter()
                .chain(&sig.results)
                .find_map(|field| {
                    field
                        .ty
                        .opaque_array_len()
                }),
            TypeExpr::Union(items) => items
                .iter()
                .find_map(TypeExpr::opaque_array_len),
            TypeExpr::Struct(_) | TypeExpr::Interface(_) | TypeExpr::Raw(_) => None,
        }
    }
}

impl ArrayLen
{
    /// Constant lengths go through `f` like a type reference without arguments.
    /// A result that is not a plain named reference leaves the length as it was.
    fn map_named<F>(
        &self,
        f: &mut F,
    ) -> ArrayLen
    where
        F: FnMut(&TypeScope, &str, Vec<TypeExpr>) -> TypeExpr,
    {
        let ArrayLen::Const { scope, name } = self
        else
        {
            return self.clone();
        };

        match f(scope, name, Vec::new())
        {
            TypeExpr::Named { scope, name, args } if args.is_empty() => ArrayLen::Const { scope, name },
            _ => self.clone(),
        }
    }
}

impl FuncType
{
    pub fn map_named<F>(
        &self,
        f: &mut F,
    ) -> FuncType
    where
        F: FnMut(&TypeScope, &str, Vec<TypeExpr>) -> TypeExpr,
    {
        let mut map_fields = |fields: &[Field]| -> Vec<Field> {
            fields
                .iter()
                .map(|fd| Field { name: fd.name.clone(), ty: fd.ty.map_named(f), variadic: fd.variadic })
                .collect()
        };

        let params = map_fields(&self.params);
        let results = map_fields(&self.results);
        FuncType { params, results }
    }
}

/// Render `[K, V comparable, T any]`; empty for non-generic declarations
pub fn render_type_params(params: &[TypeParam]) -> String
{
    if params.is_empty()
    {
        return String::new();
    }

    let body = params
        .iter()
        .map(|p| format!("{} {}", p.names.join(", "), p.constraint))
        .join(", ");
    format!("[{body}]")
}

/// Render `[K, V, T]` instantiation arguments for the same parameters
pub fn render_type_args(params: &[TypeParam]) -> String
{
    if params.is_empty()
    {
        return String::new();
    }

    let names = params
        .iter()
        .flat_map(|p| p.names.iter())
        .join(", ");
    format!("[{names}]")
}

/// Render a result list: nothing, ` T`, or ` (A, B)`
pub fn render_results(results: &[Field]) -> String
{
    match results
    {
        [] => String::new(),
        [single] if single.name.is_none() => format!(" {}", single.ty),
        many => format!(" ({})", many.iter().map(render_field).join(", ")),
    }
}

fn render_field(field: &Field) -> String
{
    let dots = if field.variadic { "..." } else { "" };
    match &field.name
    {
        Some(name) => format!("{name} {dots}{}", field.ty),
        None => format!("{dots}{}", field.ty),
    }
}

fn write_scoped(
    f: &mut fmt::Formatter<'_>,
    scope: &TypeScope,
    name: &str,
) -> fmt::Result
{
    match scope
    {
        TypeScope::Bare => write!(f, "{name}"),
        TypeScope::Qualifier(q) => write!(f, "{q}.{name}"),
        // Unreachable after qualification; keep the path readable
        TypeScope::Package(path) => write!(f, "{path:?}.{name}"),
    }
}

impl fmt::Display for ArrayLen
{
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result
    {
        match self
        {
            ArrayLen::Literal(text) | ArrayLen::Expr(text) => write!(f, "{text}"),
            ArrayLen::Const { scope, name } => write_scoped(f, scope, name),
        }
    }
}

impl fmt::Display for TypeExpr
{
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result
    {
        match self
        {
            TypeExpr::Named { scope, name, args } =>
            {
                write_scoped(f, scope, name)?;
                if !args.is_empty()
                {
                    write!(f, "[{}]", args.iter().join(", "))?;
                }
                Ok(())
            }
            TypeExpr::Pointer(inner) => write!(f, "*{inner}"),
            TypeExpr::Slice(inner) => write!(f, "[]{inner}"),
            TypeExpr::Array { len, elem } => write!(f, "[{len}]{elem}"),
            TypeExpr::Map { key, value } => write!(f, "map[{key}]{value}"),
            TypeExpr::Chan { dir, elem } => match dir
            {
                ChanDir::Both => write!(f, "chan {elem}"),
                ChanDir::Send => write!(f, "chan<- {elem}"),
                ChanDir::Recv => write!(f, "<-chan {elem}"),
            },
            TypeExpr::Func(sig) =>
            {
                write!(
                    f,
                    "func({}){}",
                    sig.params
                        .iter()
                        .map(render_field)
                        .join(", "),
                    render_results(&sig.results)
                )
            }
            TypeExpr::Struct(body) | TypeExpr::Interface(body) | TypeExpr::Raw(body) =>
            {
                write!(f, "{body}")
            }
            TypeExpr::Union(items) => write!(f, "{}", items.iter().join(" | ")),
            TypeExpr::Approx(inner) => write!(f, "~{inner}"),
        }
    }
}
