//! **goadapt** - Config-driven generator of delegating Go adapter files
//!
//! Re-exports selected symbols of Go packages under rule-derived names:
//! type aliases, forwarding `const`/`var` bindings and forwarding functions.
//! Go sources are read with tree-sitter; packages load in parallel.

/// Command-line interface with clap integration
pub mod cli;

/// Core generation pipeline
pub mod core {
    /// Command runner: discovery, output paths, dry-run preview, writes
    pub mod adapt;
    pub use adapt::run;

    /// Import alias assignment and sanitizing
    pub mod alias;
    pub use alias::{AliasManager, PackageRef};

    /// Output unit assembly and serialization
    pub mod builder;
    pub use builder::{DeclarationBuilder, OutputUnit};

    /// Package loading and delegating declaration synthesis
    pub mod collect;
    pub use collect::{Collector, Declaration, Symbol, SymbolId};

    /// `//go:adapter:` directives merged over the external config
    pub mod directives;

    /// Domain error taxonomy
    pub mod error;
    pub use error::AdaptError;

    /// Owned Go type expressions
    pub mod gotype;
    pub use gotype::TypeExpr;

    /// Per-input stage driver and run context
    pub mod pipeline;
    pub use pipeline::{RunContext, generate, generate_file};

    /// Cross-package type reference qualification
    pub mod qualify;
    pub use qualify::{DefinedTypes, TypeQualifier};

    /// Rule application and name disambiguation
    pub mod rewrite;
    pub use rewrite::{NameRegistry, Rewriter};

    /// Rule compiler and normalized lookup table
    pub mod rules;
    pub use rules::{Category, RuleTable};
}

/// Language processing - tree-sitter based Go reader
pub mod parsers {
    /// Go declarations, imports and type expressions
    pub mod go_parser;
    pub use go_parser::{GoDecl, GoParser, GoSourceFile};
}

/// Infrastructure - Configuration, module resolution, I/O, and utilities
pub mod infra {
    /// Layered configuration (file + environment)
    pub mod config;
    pub use config::{Config, load_config};

    /// go.mod parsing and import path resolution
    pub mod gomod;
    pub use gomod::{GoModule, PackageLocator};

    /// Memory-mapped reads for large files, atomic writes
    pub mod io;
    pub use io::{FileContent, read_file_smart, write_atomic};

    /// Gitignore-aware discovery of adapter inputs
    pub mod walk;
    pub use walk::FileWalker;

    /// Go identifier rules and tree-sitter node helpers
    pub mod utils;
}

pub use cli::{AppContext, Cli};
pub use infra::{Config, FileWalker, load_config};
