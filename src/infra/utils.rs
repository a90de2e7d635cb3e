//! Filepath: src/infra/utils.rs
//! Utility helpers organized by small, focused structs.
//! All functions are associated fns to keep call sites
//! ergonomic, testable, and discoverable.

// Tree-sitter types for node helpers
use tree_sitter::Node;

/// Go keywords
const KEYWORDS: [&str; 25] = [
    "break",
    "case",
    "chan",
    "const",
    "continue",
    "default",
    "defer",
    "else",
    "fallthrough",
    "for",
    "func",
    "go",
    "goto",
    "if",
    "import",
    "interface",
    "map",
    "package",
    "range",
    "return",
    "select",
    "struct",
    "switch",
    "type",
    "var",
];

/// Predeclared types of the universe block
const BUILTIN_TYPES: [&str; 22] = [
    "any",
    "bool",
    "byte",
    "comparable",
    "complex64",
    "complex128",
    "error",
    "float32",
    "float64",
    "int",
    "int8",
    "int16",
    "int32",
    "int64",
    "rune",
    "string",
    "uint",
    "uint8",
    "uint16",
    "uint32",
    "uint64",
    "uintptr",
];

/// Predeclared constants, zero value and functions
const BUILTIN_VALUES: [&str; 22] = [
    "true", "false", "iota", "nil", "append", "cap", "clear", "close", "complex", "copy", "delete",
    "imag", "len", "make", "max", "min", "new", "panic", "print", "println", "real", "recover",
];

/// Go identifier helpers
pub struct GoIdent;

impl GoIdent
{
    /// Characters allowed after the first position
    pub fn is_ident_char(c: char) -> bool
    {
        c.is_alphabetic() || c.is_ascii_digit() || c == '_'
    }

    /// Syntactically valid identifier (keywords excluded)
    pub fn is_valid(s: &str) -> bool
    {
        let mut chars = s.chars();

        // First char must be a letter or underscore
        let Some(first) = chars.next()
        else
        {
            return false;
        };
        if !(first.is_alphabetic() || first == '_')
        {
            return false;
        }

        chars.all(Self::is_ident_char) && !KEYWORDS.contains(&s)
    }

    /// Keyword or predeclared identifier
    pub fn is_reserved(s: &str) -> bool
    {
        KEYWORDS.contains(&s) || BUILTIN_TYPES.contains(&s) || BUILTIN_VALUES.contains(&s)
    }

    /// Exported per Go's visibility rule: leading upper-case letter
    pub fn is_exported(s: &str) -> bool
    {
        s.chars()
            .next()
            .is_some_and(char::is_uppercase)
    }

    /// Predeclared type name (never qualified)
    pub fn is_builtin_type(s: &str) -> bool
    {
        BUILTIN_TYPES.contains(&s)
    }
}

/// Common Tree-sitter node helpers
pub struct TsNodeUtils;

impl TsNodeUtils
{
    /// Node text, empty on invalid UTF-8 boundaries
    pub fn text<'a>(
        node: Node,
        bytes: &'a [u8],
    ) -> &'a str
    {
        node.utf8_text(bytes)
            .unwrap_or_default()
    }

    /// Extract text of a child field if present
    pub fn field_text<'a>(
        node: Node,
        field: &str,
        bytes: &'a [u8],
    ) -> Option<&'a str>
    {
        // Locate the child by field name
        let child = node.child_by_field_name(field)?;

        // Convert to utf8 text
        child
            .utf8_text(bytes)
            .ok()
    }

    /// Named children, skipping comments
    pub fn named_children<'a>(node: Node<'a>) -> Vec<Node<'a>>
    {
        let mut cursor = node.walk();
        let out = node
            .named_children(&mut cursor)
            .filter(|c| c.kind() != "comment")
            .collect();
        out
    }

    /// Texts of every child carrying `field`, restricted to `kinds`
    pub fn field_texts(
        node: Node,
        field: &str,
        kinds: &[&str],
        bytes: &[u8],
    ) -> Vec<String>
    {
        let mut cursor = node.walk();
        let out = node
            .children_by_field_name(field, &mut cursor)
            .filter(|c| kinds.contains(&c.kind()))
            .map(|c| {
                Self::text(c, bytes)
                    .to_string()
            })
            .collect();
        out
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn identifier_validity()
    {
        assert!(GoIdent::is_valid("Worker"));
        assert!(GoIdent::is_valid("_x1"));
        assert!(GoIdent::is_valid("ñandú"));
        assert!(!GoIdent::is_valid(""));
        assert!(!GoIdent::is_valid("1abc"));
        assert!(!GoIdent::is_valid("a-b"));
        assert!(!GoIdent::is_valid("func"));
    }

    #[test]
    fn reserved_and_exported()
    {
        assert!(GoIdent::is_reserved("range"));
        assert!(GoIdent::is_reserved("string"));
        assert!(GoIdent::is_reserved("len"));
        assert!(!GoIdent::is_reserved("worker"));

        assert!(GoIdent::is_exported("Worker"));
        assert!(!GoIdent::is_exported("worker"));
        assert!(!GoIdent::is_exported("_Worker"));

        assert!(GoIdent::is_builtin_type("error"));
        assert!(!GoIdent::is_builtin_type("Error"));
    }
}
