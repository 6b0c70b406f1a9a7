//! Vocabulary index with precomputed Levenshtein automata.
//!
//! This module provides zero-CPU fuzzy search using:
//! 1. **Sorted vocabulary**: Simple Vec<String> (~150 terms for typical blog)
//! 2. **Precomputed Levenshtein tables**: Universal automata for k=2 (Schulz-Mihov 2002)
//!
//! # Why not FST?
//!
//! FST (Finite State Transducer) is powerful for huge vocabularies (>10k terms) where
//! automaton intersection provides sub-linear fuzzy search. But for ~150 terms:
//! - Linear scan with precomputed Levenshtein DFA is faster than FST setup overhead
//! - Vec<String> is simpler, debuggable, and has zero dependencies
//! - Memory difference is negligible (2KB vs 500 bytes)
//!
//! # Performance
//!
//! | Operation | Complexity |
//! |-----------|------------|
//! | Exact lookup | O(1) via inverted index HashMap |
//! | Prefix search | O(log k) via suffix array binary search |
//! | Fuzzy search | O(vocabulary) with ~8ns/term Levenshtein DFA |

use crate::inverted::build_inverted_index_parallel;
use crate::sais::build_vocab_suffix_array_sais;
use crate::types::{FieldBoundary, InvertedIndex, SearchDoc, VocabSuffixEntry};

/// Index with vocabulary for efficient search.
///
/// Contains:
/// - Sorted vocabulary (simple Vec<String>)
/// - Vocabulary suffix array (for prefix search)
/// - Inverted index (for exact lookup)
#[derive(Debug, Clone)]
pub struct FstIndex {
    /// Document metadata
    pub docs: Vec<SearchDoc>,
    /// Document texts (for snippet extraction)
    pub texts: Vec<String>,
    /// Field boundaries for scoring
    pub field_boundaries: Vec<FieldBoundary>,
    /// Inverted index: term → posting list
    pub inverted_index: InvertedIndex,
    /// Sorted vocabulary terms
    pub vocabulary: Vec<String>,
    /// Suffix array over vocabulary
    pub vocab_suffix_array: Vec<VocabSuffixEntry>,
}

/// Build vocabulary index with parallel construction.
///
/// ```text
/// 1. Build inverted index (parallel map-reduce)
/// 2. Extract and sort vocabulary
/// 3. Build vocabulary suffix array (SA-IS)
/// ```
pub fn build_fst_index(
    docs: Vec<SearchDoc>,
    texts: Vec<String>,
    field_boundaries: Vec<FieldBoundary>,
) -> FstIndex {
    // Step 1: Build inverted index in parallel
    let inverted_index = build_inverted_index_parallel(&texts, &field_boundaries);

    // Step 2: Extract vocabulary (sorted for binary search and suffix array)
    let mut vocabulary: Vec<String> = inverted_index.terms.keys().cloned().collect();
    vocabulary.sort();

    // Step 3: Build vocabulary suffix array
    let vocab_suffix_array = build_vocab_suffix_array_sais(&vocabulary);

    FstIndex {
        docs,
        texts,
        field_boundaries,
        inverted_index,
        vocabulary,
        vocab_suffix_array,
    }
}
