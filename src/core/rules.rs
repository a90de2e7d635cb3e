//! Rule compiler: expands the hierarchical rule configuration into one
//! normalized table keyed by (category, owning package, name).
//!
//! Priority follows nesting depth (global 0, package 1, member 2). Buckets are
//! kept sorted so a lookup is a merge of at most two pre-ordered lists.

use std::{
    cmp::Ordering,
    collections::{BTreeMap, BTreeSet},
    fmt,
    sync::Arc,
};

use anyhow::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, instrument, warn};

use crate::{
    core::error::AdaptError,
    infra::config::{Config, RuleEntry},
};

/// Name used by wildcard holders
pub const WILDCARD: &str = "*";

/// Symbol categories a rule can target
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category
{
    Type,
    Func,
    Var,
    Const,
}

impl Category
{
    pub const ALL: [Category; 4] = [Category::Type, Category::Func, Category::Var, Category::Const];

    /// Parse the short directive spelling
    pub fn parse(s: &str) -> Option<Self>
    {
        match s
        {
            "type" => Some(Self::Type),
            "func" => Some(Self::Func),
            "var" => Some(Self::Var),
            "const" => Some(Self::Const),
            _ => None,
        }
    }
}

impl fmt::Display for Category
{
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result
    {
        match self
        {
            Category::Type => write!(f, "type"),
            Category::Func => write!(f, "func"),
            Category::Var => write!(f, "var"),
            Category::Const => write!(f, "const"),
        }
    }
}

/// Member kinds addressable through nested type rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind
{
    Field,
    Method,
}

impl MemberKind
{
    /// Table category member rules are filed under
    pub fn category(self) -> Category
    {
        match self
        {
            MemberKind::Field => Category::Var,
            MemberKind::Method => Category::Func,
        }
    }
}

/// The transformation a rule performs
#[derive(Debug, Clone)]
pub enum RuleKind
{
    Prefix(String),
    Suffix(String),
    Explicit
    {
        from: String,
        to: String,
    },
    Regex
    {
        pattern: Regex,
        replacement: String,
    },
}

/// A compiled, immutable rename rule
#[derive(Debug, Clone)]
pub struct RenameRule
{
    pub category: Category,
    pub kind: RuleKind,
}

/// Precedence by configuration nesting depth
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Priority
{
    Global = 0,
    Package = 1,
    Member = 2,
}

/// A rule with its scope annotations
#[derive(Debug, Clone)]
pub struct ScopedRule
{
    pub rule: Arc<RenameRule>,
    pub priority: Priority,
    /// Owning import path; empty for global rules
    pub package: String,
    pub wildcard: bool,
    /// Declaration order, the final tie-breaker
    pub seq: usize,
}

impl ScopedRule
{
    /// Bucket order: priority desc, explicit-name before wildcard,
    /// package-scoped before global, then declaration order.
    fn precedence(
        &self,
        other: &Self,
    ) -> Ordering
    {
        other
            .priority
            .cmp(&self.priority)
            .then(
                self.wildcard
                    .cmp(&other.wildcard),
            )
            .then(
                self.package
                    .is_empty()
                    .cmp(
                        &other
                            .package
                            .is_empty(),
                    ),
            )
            .then(
                self.seq
                    .cmp(&other.seq),
            )
    }
}

/// Lookup key of a bucket
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct RuleKey
{
    category: Category,
    package: String,
    name: String,
}

type Bucket = SmallVec<[ScopedRule; 4]>;

/// Normalized rule table; read-only once built
#[derive(Debug, Default)]
pub struct RuleTable
{
    buckets: BTreeMap<RuleKey, Bucket>,
    /// (package, category) pairs owning package-level rules
    scoped: BTreeSet<(String, Category)>,
}

impl RuleTable
{
    /// Compile the configuration into a table
    #[instrument(skip_all)]
    pub fn compile(config: &Config) -> Result<Self>
    {
        let mut compiler = Compiler::default();

        for (category, entries) in category_lists(
            &config.types,
            &config.functions,
            &config.variables,
            &config.constants,
        )
        {
            for entry in entries
            {
                compiler.holder(category, "", Priority::Global, entry, None)?;
            }
        }

        for pkg in &config.packages
        {
            for (category, entries) in
                category_lists(&pkg.types, &pkg.functions, &pkg.variables, &pkg.constants)
            {
                for entry in entries
                {
                    compiler.holder(category, &pkg.import, Priority::Package, entry, None)?;
                }
            }
        }

        let table = compiler.finish();
        debug!("compiled {} rule buckets", table.buckets.len());
        Ok(table)
    }

    /// Ordered rules applicable to `name` of `category` in `package`.
    /// A package owning any rule for the category never falls back to
    /// global rules.
    pub fn resolve(
        &self,
        category: Category,
        package: &str,
        name: &str,
    ) -> Vec<&ScopedRule>
    {
        let scope = if !package.is_empty() && self.has_package_rules(package, category)
        {
            package
        }
        else
        {
            ""
        };

        self.merged(category, scope, name, WILDCARD)
    }

    /// Ordered member rules for `owner.member`
    pub fn resolve_member(
        &self,
        kind: MemberKind,
        package: &str,
        owner: &str,
        member: &str,
    ) -> Vec<&ScopedRule>
    {
        self.merged(
            kind.category(),
            package,
            &member_key(owner, member),
            &member_key(owner, WILDCARD),
        )
    }

    /// Whether `package` registered package-level rules for `category`
    pub fn has_package_rules(
        &self,
        package: &str,
        category: Category,
    ) -> bool
    {
        self.scoped
            .contains(&(package.to_string(), category))
    }

    /// Number of compiled rules
    pub fn len(&self) -> usize
    {
        self.buckets
            .values()
            .map(|b| b.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool
    {
        self.buckets
            .is_empty()
    }

    fn bucket(
        &self,
        category: Category,
        package: &str,
        name: &str,
    ) -> &[ScopedRule]
    {
        let key = RuleKey { category, package: package.to_string(), name: name.to_string() };
        self.buckets
            .get(&key)
            .map(|b| b.as_slice())
            .unwrap_or(&[])
    }

    fn merged(
        &self,
        category: Category,
        package: &str,
        exact: &str,
        wildcard: &str,
    ) -> Vec<&ScopedRule>
    {
        let mut out: Vec<&ScopedRule> = self
            .bucket(category, package, exact)
            .iter()
            .collect();

        if exact != wildcard
        {
            out.extend(self.bucket(category, package, wildcard));
        }

        out.sort_by(|a, b| a.precedence(b));
        out
    }
}

fn member_key(
    owner: &str,
    member: &str,
) -> String
{
    format!("{owner}.{member}")
}

fn category_lists<'a>(
    types: &'a [RuleEntry],
    functions: &'a [RuleEntry],
    variables: &'a [RuleEntry],
    constants: &'a [RuleEntry],
) -> [(Category, &'a [RuleEntry]); 4]
{
    [
        (Category::Type, types),
        (Category::Func, functions),
        (Category::Var, variables),
        (Category::Const, constants),
    ]
}

/// Accumulates scoped rules while walking the configuration
#[derive(Default)]
struct Compiler
{
    buckets: BTreeMap<RuleKey, Bucket>,
    scoped: BTreeSet<(String, Category)>,
    seq: usize,
}

impl Compiler
{
    /// Expand one holder (and its members) into scoped rules
    fn holder(
        &mut self,
        category: Category,
        package: &str,
        priority: Priority,
        entry: &RuleEntry,
        owner: Option<&str>,
    ) -> Result<()>
    {
        if entry.disabled
        {
            debug!(%category, name = %entry.name, "skipping disabled rule holder");
            return Ok(());
        }

        let name = if entry
            .name
            .trim()
            .is_empty()
        {
            WILDCARD
        }
        else
        {
            entry
                .name
                .trim()
        };
        let wildcard = name == WILDCARD;

        let mut rules: Vec<RenameRule> = Vec::new();

        for ex in &entry.explicit
        {
            let from = if ex
                .from
                .is_empty()
            {
                if wildcard
                {
                    return Err(AdaptError::config(format!(
                        "explicit {category} rule on a wildcard holder needs a `from` name"
                    ))
                    .into());
                }
                name.to_string()
            }
            else
            {
                ex.from
                    .clone()
            };

            if ex
                .to
                .trim()
                .is_empty()
            {
                return Err(AdaptError::config(format!(
                    "explicit {category} rule for `{from}` has an empty target"
                ))
                .into());
            }

            rules.push(RenameRule {
                category,
                kind: RuleKind::Explicit { from, to: ex.to.trim().to_string() },
            });
        }

        if let Some(p) = entry
            .prefix
            .as_deref()
            .filter(|p| !p.is_empty())
        {
            rules.push(RenameRule { category, kind: RuleKind::Prefix(p.to_string()) });
        }

        if let Some(s) = entry
            .suffix
            .as_deref()
            .filter(|s| !s.is_empty())
        {
            rules.push(RenameRule { category, kind: RuleKind::Suffix(s.to_string()) });
        }

        for rx in &entry.regex
        {
            match Regex::new(&rx.pattern)
            {
                Ok(pattern) => rules.push(RenameRule {
                    category,
                    kind: RuleKind::Regex { pattern, replacement: rx.replace.clone() },
                }),
                // Isolated to a single symbol: drop the rule, keep compiling
                Err(e) if !wildcard =>
                {
                    warn!(%category, name, pattern = %rx.pattern, "dropping invalid regex rule: {e}");
                }
                Err(e) =>
                {
                    return Err(AdaptError::config(format!(
                        "invalid regex `{}` in wildcard {category} rule: {e}",
                        rx.pattern
                    ))
                    .into());
                }
            }
        }

        let key_name = match owner
        {
            Some(o) => member_key(o, name),
            None => name.to_string(),
        };

        for rule in rules
        {
            self.push(category, package, &key_name, priority, wildcard, rule);
        }

        // Nested members only hang off type holders
        if owner.is_none() && category == Category::Type
        {
            for (kind, members) in
                [(MemberKind::Field, &entry.fields), (MemberKind::Method, &entry.methods)]
            {
                for m in members
                {
                    self.holder(kind.category(), package, Priority::Member, m, Some(name))?;
                }
            }
        }

        Ok(())
    }

    fn push(
        &mut self,
        category: Category,
        package: &str,
        name: &str,
        priority: Priority,
        wildcard: bool,
        rule: RenameRule,
    )
    {
        if priority == Priority::Package
        {
            self.scoped
                .insert((package.to_string(), category));
        }

        let scoped = ScopedRule {
            rule: Arc::new(rule),
            priority,
            package: package.to_string(),
            wildcard,
            seq: self.seq,
        };
        self.seq += 1;

        self.buckets
            .entry(RuleKey { category, package: package.to_string(), name: name.to_string() })
            .or_default()
            .push(scoped);
    }

    fn finish(mut self) -> RuleTable
    {
        for bucket in self
            .buckets
            .values_mut()
        {
            bucket.sort_by(|a, b| a.precedence(b));
        }

        RuleTable { buckets: self.buckets, scoped: self.scoped }
    }
}
