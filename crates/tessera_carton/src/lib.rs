//! Carton - The artist's toolbox for Tessera.
//!
//! This crate provides the foundational data structures shared by every stage of the
//! Tessera component checker, much like a carton (artist's portfolio case) holds all
//! the essential tools and materials an artist needs for their work.
//!
//! # Modules
//!
//! - **source**: file identities, byte-offset sites and line/column lookup
//! - **diagnostic**: the diagnostic record, severities and the code catalogue
//! - **suggest**: closest-name suggestions for "did you mean" messages
//!
//! # Example
//!
//! ```
//! use tessera_carton::{Diagnostic, DiagnosticCode, FileId, Site};
//!
//! let site = Site::new(FileId(0), 10, 20);
//! let diag = Diagnostic::error(DiagnosticCode::UnknownMethod, "unknown method", site);
//! assert!(diag.is_error());
//! assert_eq!(diag.code.name(), "unknown-method");
//! ```

pub mod diagnostic;
pub mod source;
pub mod suggest;

pub use diagnostic::{Diagnostic, DiagnosticCode, RelatedInfo, Severity};
pub use source::{FileId, LineIndex, Site, SourceFile, SourceFiles};
pub use suggest::closest_match;

// Re-export compact_str::CompactString for convenience
pub use compact_str::CompactString;

// Re-export smallvec for stack-optimized collections
pub use smallvec::{smallvec, SmallVec};

// Re-export rustc-hash for fast hash maps/sets
pub use rustc_hash::{FxBuildHasher, FxHashMap, FxHashSet};

// Re-export phf for compile-time perfect hash functions
pub use phf::{phf_map, phf_set, Map as PhfMap, Set as PhfSet};

/// Insertion-ordered map with the fast Fx hasher.
pub type FxIndexMap<K, V> = indexmap::IndexMap<K, V, FxBuildHasher>;

/// Insertion-ordered set with the fast Fx hasher.
pub type FxIndexSet<T> = indexmap::IndexSet<T, FxBuildHasher>;
