//! Suffix array-based full-text search with formal verification.
//!
//! This crate provides a search index using suffix arrays for O(log n) prefix matching.
//! The implementation is formally specified in Lean 4 and verified via property testing.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌─────────────┐
//! │   types.rs  │────▶│  index.rs    │────▶│  search.rs  │
//! │  (SearchDoc,│     │ (build_index,│     │  (search)   │
//! │ SuffixEntry)│     │  suffix_at)  │     │             │
//! └─────────────┘     └──────────────┘     └─────────────┘
//!        │                   │                    │
//!        ▼                   ▼                    ▼
//! ┌─────────────────────────────────────────────────────┐
//! │                    verified.rs                       │
//! │  (ValidatedSuffixEntry, SortedSuffixArray,          │
//! │   WellFormedIndex - type-level invariants)          │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Lean Correspondence
//!
//! Each module corresponds to Lean specifications:
//!
//! | Rust Module     | Lean File                    | Key Properties           |
//! |-----------------|------------------------------|--------------------------|
//! | `types`         | `Types.lean`                 | Type definitions         |
//! | `index`         | `SuffixArray.lean`           | Sorted, Complete, LCP    |
//! | `search`        | `BinarySearch.lean`          | Search correctness       |
//! | `scoring`       | `Scoring.lean`               | Field hierarchy          |
//! | `levenshtein`   | `Levenshtein.lean`           | Edit distance bounds     |
//! | `verified`      | All                          | Type-level invariants    |
//!
//! # Usage
//!
//! ```ignore
//! use search::{build_index, search, SearchDoc, FieldBoundary};
//!
//! let docs = vec![SearchDoc { ... }];
//! let texts = vec!["document text".to_string()];
//! let index = build_index(docs, texts, vec![]);
//!
//! let results = search(&index, "query");
//! ```

// Module declarations
pub mod binary;
pub mod contracts;
pub mod docs_compression;
pub mod fst_index;
mod hybrid;
mod index;
mod inverted;
mod levenshtein;
pub mod levenshtein_dfa;
mod sais;
mod scoring;
mod search;
mod types;
mod union;
mod utils;
pub mod verified;

#[cfg(feature = "wasm")]
mod wasm;

// Re-exports for public API
pub use hybrid::{
    build_hybrid_index, build_hybrid_index_parallel, search_exact, search_expanded, search_fuzzy,
    search_hybrid,
};
pub use index::{build_index, is_suffix_array_sorted, suffix_at};
pub use inverted::{
    build_inverted_index, build_inverted_index_parallel, build_unified_index, select_index_mode,
    IndexThresholds,
};
pub use levenshtein::levenshtein_within;
pub use scoring::{field_type_score, get_field_type};
pub use search::{search, search_unified};
pub use types::{
    find_section_at_offset, validate_sections, FieldBoundary, FieldType, HybridIndex, IndexMode,
    InvertedIndex, Posting, PostingList, SearchDoc, SearchIndex, SearchResult, SearchSource,
    Section, SuffixEntry, UnifiedIndex, UnionIndex, VocabSuffixEntry,
};
pub use union::{
    build_union_index, build_union_index_parallel, search_union, search_union_grouped,
    UnionIndexInput,
};
pub use utils::normalize;
pub use fst_index::{build_fst_index, FstIndex};
pub use levenshtein_dfa::{ParametricDFA, QueryMatcher, MAX_K, NUM_CHAR_CLASSES};
pub use verified::{
    InvariantError, SortedSuffixArray, ValidatedInvertedIndex, ValidatedPosting,
    ValidatedPostingList, ValidatedSuffixEntry, VerificationReport, WellFormedIndex,
};

// Internal re-exports for tests
#[cfg(test)]
pub(crate) use utils::common_prefix_len;
