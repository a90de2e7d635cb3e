//! Type qualifier: rewrites resolved type references for use inside the
//! generated package.

use std::collections::{BTreeMap, BTreeSet};

use tracing::trace;

use crate::core::{
    alias::AliasManager,
    gotype::{Field, TypeExpr, TypeParam, TypeScope},
};

/// Types and constants re-declared in the output:
/// (import path, original name) → local name
#[derive(Debug, Default)]
pub struct DefinedTypes
{
    local: BTreeMap<(String, String), String>,
}

impl DefinedTypes
{
    pub fn new() -> Self
    {
        Self::default()
    }

    pub fn register(
        &mut self,
        import_path: &str,
        original: &str,
        local: &str,
    )
    {
        self.local
            .insert((import_path.to_string(), original.to_string()), local.to_string());
    }

    /// Local name of a re-declared type or constant
    pub fn local_name(
        &self,
        import_path: &str,
        original: &str,
    ) -> Option<&str>
    {
        self.local
            .get(&(import_path.to_string(), original.to_string()))
            .map(String::as_str)
    }
}

/// Qualifies resolved references, recording which imports get used
pub struct TypeQualifier<'a>
{
    defined: &'a DefinedTypes,
    aliases: &'a AliasManager,
    used: &'a mut BTreeSet<String>,
}

impl<'a> TypeQualifier<'a>
{
    pub fn new(
        defined: &'a DefinedTypes,
        aliases: &'a AliasManager,
        used: &'a mut BTreeSet<String>,
    ) -> Self
    {
        Self { defined, aliases, used }
    }

    /// New tree with every package reference made local or alias-qualified.
    /// Bare names (builtins, type parameters) and unresolved qualifiers are
    /// left as written.
    pub fn qualify(
        &mut self,
        ty: &TypeExpr,
    ) -> TypeExpr
    {
        let defined = self.defined;
        let aliases = self.aliases;
        let used = &mut *self.used;

        ty.map_named(&mut |scope, name, args| {
            let scope = match scope
            {
                TypeScope::Package(path) => match defined.local_name(path, name)
                {
                    Some(local) =>
                    {
                        trace!(path = %path, name, local, "using re-declared type");
                        return TypeExpr::Named { scope: TypeScope::Bare, name: local.to_string(), args };
                    }
                    None =>
                    {
                        used.insert(path.clone());
                        let alias = aliases
                            .alias_of(path)
                            .map(str::to_string)
                            .unwrap_or_else(|| path.clone());
                        TypeScope::Qualifier(alias)
                    }
                },
                other => other.clone(),
            };
            TypeExpr::Named { scope, name: name.to_string(), args }
        })
    }

    pub fn qualify_field(
        &mut self,
        field: &Field,
    ) -> Field
    {
        Field { name: field.name.clone(), ty: self.qualify(&field.ty), variadic: field.variadic }
    }

    pub fn qualify_type_params(
        &mut self,
        params: &[TypeParam],
    ) -> Vec<TypeParam>
    {
        params
            .iter()
            .map(|tp| TypeParam { names: tp.names.clone(), constraint: self.qualify(&tp.constraint) })
            .collect()
    }

    /// Record an import referenced outside any type expression
    pub fn mark_used(
        &mut self,
        import_path: &str,
    )
    {
        self.used
            .insert(import_path.to_string());
    }
}
