//! Identifier rewriter: applies the rule table to symbol names, then claims
//! final names in the single package-scope namespace of the output.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, warn};

use crate::{
    core::{
        collect::{Symbol, SymbolId},
        rules::{MemberKind, RuleKind, RuleTable, ScopedRule},
    },
    infra::utils::GoIdent,
};

/// Rule application with a per-symbol memo
#[derive(Debug, Default)]
pub struct Rewriter
{
    markers: BTreeMap<SymbolId, String>,
}

impl Rewriter
{
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Rewritten name of `symbol` and whether it differs from the original.
    /// A symbol seen before returns its first result.
    pub fn rewrite(
        &mut self,
        symbol: &Symbol,
        table: &RuleTable,
    ) -> (String, bool)
    {
        if let Some(done) = self
            .markers
            .get(&symbol.id)
        {
            return (done.clone(), *done != symbol.name);
        }

        let rules = table.resolve(symbol.category(), &symbol.package, &symbol.name);
        let name = checked(&symbol.name, apply(&symbol.name, &rules));

        self.markers
            .insert(symbol.id, name.clone());
        let changed = name != symbol.name;
        if changed
        {
            debug!(from = %symbol.name, to = %name, category = %symbol.category(), "renamed");
        }
        (name, changed)
    }

    /// Rewritten name of `owner.member` under member rules
    pub fn rewrite_member(
        &self,
        table: &RuleTable,
        kind: MemberKind,
        package: &str,
        owner: &str,
        member: &str,
    ) -> (String, bool)
    {
        let rules = table.resolve_member(kind, package, owner, member);
        let name = checked(member, apply(member, &rules));
        let changed = name != member;
        (name, changed)
    }

    /// Number of symbols rewritten so far
    pub fn len(&self) -> usize
    {
        self.markers
            .len()
    }

    pub fn is_empty(&self) -> bool
    {
        self.markers
            .is_empty()
    }
}

/// Apply ordered rules to `name`. The first explicit rule naming `name` is
/// terminal; otherwise prefix, suffix and regex rules accumulate in order.
pub fn apply(
    name: &str,
    rules: &[&ScopedRule],
) -> String
{
    // Explicit match wins outright
    for r in rules
    {
        if let RuleKind::Explicit { from, to } = &r
            .rule
            .kind
            && from == name
        {
            return to.clone();
        }
    }

    let mut out = name.to_string();
    for r in rules
    {
        out = match &r
            .rule
            .kind
        {
            RuleKind::Prefix(p) => format!("{p}{out}"),
            RuleKind::Suffix(s) => format!("{out}{s}"),
            RuleKind::Regex { pattern, replacement } => pattern
                .replace_all(&out, replacement.as_str())
                .into_owned(),
            RuleKind::Explicit { .. } => out,
        };
    }
    out
}

/// Keep the original when a rewrite is not a usable Go identifier
fn checked(
    original: &str,
    rewritten: String,
) -> String
{
    if rewritten == original || (GoIdent::is_valid(&rewritten) && rewritten != "_")
    {
        return rewritten;
    }

    warn!(original, rewritten = %rewritten, "rewritten name is not a valid identifier; keeping original");
    original.to_string()
}

/// Claimed names of the output's package scope
#[derive(Debug, Default)]
pub struct NameRegistry
{
    claimed: BTreeSet<String>,
}

impl NameRegistry
{
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Mark a name as unavailable without claiming it for a symbol
    pub fn reserve(
        &mut self,
        name: &str,
    )
    {
        self.claimed
            .insert(name.to_string());
    }

    /// Claim `desired`, or the first `desired1`, `desired2`, ... still free
    pub fn claim(
        &mut self,
        desired: &str,
    ) -> String
    {
        if self
            .claimed
            .insert(desired.to_string())
        {
            return desired.to_string();
        }

        let mut n = 1usize;
        loop
        {
            let candidate = format!("{desired}{n}");
            if self
                .claimed
                .insert(candidate.clone())
            {
                warn!(name = desired, resolved = %candidate, "name collision; appended numeric suffix");
                return candidate;
            }
            n += 1;
        }
    }

    pub fn contains(
        &self,
        name: &str,
    ) -> bool
    {
        self.claimed
            .contains(name)
    }
}
