//! Import alias assignment: one unique, valid Go identifier per import path.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::infra::utils::GoIdent;

/// Alias used when a path segment has nothing identifier-like in it
pub const FALLBACK_ALIAS: &str = "pkg";

/// Suffix appended to aliases that collide with reserved words
pub const RESERVED_SUFFIX: &str = "Pkg";

/// Identifiers an import name may not bind at file scope
const UNBINDABLE: [&str; 2] = ["init", "_"];

/// An imported package with its assigned alias
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct PackageRef
{
    pub import_path: String,
    pub alias: String,
}

/// Injective, idempotent import path → alias mapping for one run
#[derive(Debug, Default)]
pub struct AliasManager
{
    by_path: BTreeMap<String, String>,
    by_alias: BTreeMap<String, String>,
}

impl AliasManager
{
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Assign (or return the existing) alias for `path`
    pub fn assign(
        &mut self,
        path: &str,
        preferred: &str,
    ) -> String
    {
        if let Some(existing) = self
            .by_path
            .get(path)
        {
            return existing.clone();
        }

        if !preferred.is_empty()
        {
            if GoIdent::is_valid(preferred) && !UNBINDABLE.contains(&preferred)
            {
                match self
                    .by_alias
                    .get(preferred)
                {
                    None => return self.bind(path, preferred.to_string()),
                    Some(owner) if owner == path => return preferred.to_string(),
                    Some(_) => debug!(path, preferred, "preferred alias taken, deriving one"),
                }
            }
            else
            {
                warn!(path, preferred, "ignoring invalid preferred alias");
            }
        }

        let base = sanitize(last_segment(path));
        let mut candidate = base.clone();
        let mut n = 1usize;

        while self
            .by_alias
            .contains_key(&candidate)
        {
            candidate = format!("{base}{n}");
            n += 1;
        }

        self.bind(path, candidate)
    }

    /// Alias previously assigned to `path`
    pub fn alias_of(
        &self,
        path: &str,
    ) -> Option<&str>
    {
        self.by_path
            .get(path)
            .map(String::as_str)
    }

    /// All assignments sorted by import path
    pub fn packages(&self) -> Vec<PackageRef>
    {
        self.by_path
            .iter()
            .map(|(p, a)| PackageRef { import_path: p.clone(), alias: a.clone() })
            .collect()
    }

    fn bind(
        &mut self,
        path: &str,
        alias: String,
    ) -> String
    {
        debug!(path, %alias, "assigned import alias");
        self.by_path
            .insert(path.to_string(), alias.clone());
        self.by_alias
            .insert(alias.clone(), path.to_string());
        alias
    }
}

fn last_segment(path: &str) -> &str
{
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(path)
}

/// Turn an arbitrary path segment into a usable Go identifier
pub fn sanitize(segment: &str) -> String
{
    if !segment
        .chars()
        .any(|c| c != '_' && GoIdent::is_ident_char(c))
    {
        return FALLBACK_ALIAS.to_string();
    }

    // Fold hyphenated parts into camel case
    let mut folded = String::with_capacity(segment.len());
    for (i, part) in segment
        .split('-')
        .filter(|p| !p.is_empty())
        .enumerate()
    {
        if i == 0
        {
            folded.push_str(part);
            continue;
        }

        let mut chars = part.chars();
        if let Some(first) = chars.next()
        {
            folded.extend(first.to_uppercase());
            folded.push_str(chars.as_str());
        }
    }

    let filtered: String = folded
        .chars()
        .filter(|c| GoIdent::is_ident_char(*c))
        .collect();

    let mut chars = filtered.chars();
    let mut out = match chars.next()
    {
        Some(c) if c.is_alphabetic() =>
        {
            let mut s: String = c
                .to_lowercase()
                .collect();
            s.push_str(chars.as_str());
            s
        }
        Some('_') => filtered.clone(),
        Some(_) => format!("p{filtered}"),
        None => FALLBACK_ALIAS.to_string(),
    };

    if GoIdent::is_reserved(&out) || UNBINDABLE.contains(&out.as_str())
    {
        out.push_str(RESERVED_SUFFIX);
    }

    out
}

#[cfg(test)]
mod tests
{
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn sanitize_cases()
    {
        assert_eq!(sanitize("123package"), "p123package");
        assert_eq!(sanitize(""), "pkg");
        assert_eq!(sanitize("range"), "rangePkg");
        assert_eq!(sanitize("-_"), "pkg");
        assert_eq!(sanitize("my-pkg"), "myPkg");
        assert_eq!(sanitize("go-yaml-v2"), "goYamlV2");
        assert_eq!(sanitize("yaml.v3"), "yamlv3");
        assert_eq!(sanitize("HTTPUtil"), "hTTPUtil");
        assert_eq!(sanitize("string"), "stringPkg");
        assert_eq!(sanitize("init"), "initPkg");
    }

    #[test]
    fn assign_is_idempotent()
    {
        let mut m = AliasManager::new();
        let a = m.assign("a/b/my-pkg", "");
        let b = m.assign("a/b/my-pkg", "");
        assert_eq!(a, "myPkg");
        assert_eq!(a, b);
    }

    #[test]
    fn colliding_base_gets_numeric_suffix()
    {
        let mut m = AliasManager::new();
        assert_eq!(m.assign("example.com/one/log", ""), "log");
        assert_eq!(m.assign("example.com/two/log", ""), "log1");
        assert_eq!(m.assign("example.com/three/log", ""), "log2");
        assert_eq!(m.alias_of("example.com/two/log"), Some("log1"));
    }

    #[test]
    fn preferred_alias_is_taken_verbatim_when_free()
    {
        let mut m = AliasManager::new();
        assert_eq!(m.assign("example.com/x/alpha", "al"), "al");
        // Same path, same preference
        assert_eq!(m.assign("example.com/x/alpha", "al"), "al");
        // Another path asking for the taken alias falls back to derivation
        assert_eq!(m.assign("example.com/y/al", "al"), "al1");
        // Invalid preference falls back to derivation
        assert_eq!(m.assign("example.com/z/zed", "9bad"), "zed");
        assert_eq!(m.alias_of("example.com/z/zed"), Some("zed"));
    }

    #[test]
    fn init_and_blank_never_become_aliases()
    {
        let mut m = AliasManager::new();
        assert_eq!(m.assign("example.com/demo/init", ""), "initPkg");
        assert_eq!(m.assign("example.com/demo/other", "init"), "other");
        assert_eq!(m.assign("example.com/demo/blank", "_"), "blank");
    }

    #[test]
    fn packages_are_listed_by_path()
    {
        let mut m = AliasManager::new();
        m.assign("example.com/b", "");
        m.assign("example.com/a", "");
        let paths: Vec<_> = m
            .packages()
            .into_iter()
            .map(|p| p.import_path)
            .collect();
        assert_eq!(paths, vec!["example.com/a", "example.com/b"]);
    }

    proptest! {
        #[test]
        fn sanitize_always_yields_identifier(seg in "[ -~]{0,12}") {
            let s = sanitize(&seg);
            prop_assert!(GoIdent::is_valid(&s));
            prop_assert!(!GoIdent::is_reserved(&s));
            prop_assert!(!UNBINDABLE.contains(&s.as_str()));
        }

        #[test]
        fn assignment_is_injective(paths in proptest::collection::vec("[a-z]{1,3}/[a-z-]{0,4}", 1..12)) {
            let mut m = AliasManager::new();
            let mut seen = std::collections::BTreeMap::new();
            for p in &paths {
                let a = m.assign(p, "");
                if let Some(prev) = seen.insert(a.clone(), p.clone()) {
                    prop_assert_eq!(&prev, p);
                }
                prop_assert_eq!(m.assign(p, ""), a);
            }
        }
    }
}
