// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Hybrid index search: best of both worlds.
//!
//! The inverted index gives O(1) exact word lookup. The suffix array gives
//! O(log k) prefix search. Combining them: try exact first, fall back to
//! prefix if no match. Users get instant results for exact matches, and
//! still find "typescript" when searching "script".
//!
//! # Complexity
//!
//! | Operation | Time | Space |
//! |-----------|------|-------|
//! | Exact word | O(1) | - |
//! | Prefix search | O(log k + p) | - |
//! | Multi-word AND | O(min posting list) | - |
//!
//! Where:
//! - k = vocabulary size (unique terms)
//! - p = number of prefix-matching terms

use crate::fuzzy::levenshtein_within;
use crate::types::{HybridIndex, PostingList, ScoredDoc, SearchDoc};
use super::utils::{merge_score_sets, parse_query};
use std::collections::HashMap;

/// Search the hybrid index.
///
/// Strategy:
/// 1. Try exact word lookup first (O(1))
/// 2. If no exact match, use prefix search via vocabulary suffix array (O(log k))
/// 3. For multi-word queries, intersect posting lists
pub fn search_hybrid(index: &HybridIndex, query: &str) -> Vec<SearchDoc> {
    let parts = parse_query(query);
    if parts.is_empty() {
        return Vec::new();
    }

    // Collect scores for each search term
    let score_sets: Vec<Vec<(usize, f64)>> = parts
        .iter()
        .map(|term| score_term(index, term))
        .filter(|v| !v.is_empty())
        .collect();

    if score_sets.is_empty() {
        return Vec::new();
    }

    // Use shared aggregation logic
    aggregate_and_sort(index, score_sets)
}

// =============================================================================
// STREAMING SEARCH API
// =============================================================================
//
// These functions support progressive/streaming search with three phases:
// 1. search_exact() - O(1) inverted index lookup (returns first results fast)
// 2. search_expanded() - O(log k) suffix array search (prefix/substring matches)
// 3. search_fuzzy() - O(vocab) Levenshtein search (typo tolerance)
//
// ## Why Streaming?
//
// For search-as-you-type UX, returning fast partial results matters more than
// completeness. Streaming search returns exact matches in <1ms, then progressively
// adds expanded and fuzzy matches. The UI can display results as they arrive.
//
// ## Invariants (from StreamingSearch.lean):
//
// - `exact_subset_full`: exact results ⊆ full results
// - `expanded_disjoint_exact`: expanded ∩ exact = ∅ (no duplicates)
// - `union_superset_full`: full results ⊆ (exact ∪ expanded ∪ fuzzy)
//
// ## IMPORTANT: Streaming vs Full Search Asymmetry
//
// Streaming search may return MORE results than `search_hybrid()` because:
// - `search_hybrid()` uses early termination: once exact matches are found,
//   it skips prefix/fuzzy search (the `score_term()` function returns after
//   the first successful tier).
// - Streaming explicitly runs all phases, accumulating results from each.
//
// Example: Query "script" with docs ["script file", "typescript", "javascript"]
// - `search_hybrid()` finds exact match "script" → returns 1 result
// - Streaming: exact="script file", expanded="typescript"+"javascript" → 3 results
//
// This is intentional: streaming prioritizes completeness, while full search
// prioritizes speed by stopping early.

/// Search using only the inverted index (O(1) per term).
///
/// Returns results from exact word matches only. This is the fast path
/// that provides first results immediately.
///
/// # Lean Specification
///
/// ```lean
/// def exactLookup (invertedIndex : List (String × List Nat)) (term : String) : List Nat :=
///   match invertedIndex.find? (fun (t, _) => t == term) with
///   | some (_, docIds) => docIds
///   | none => []
/// ```
pub fn search_exact(index: &HybridIndex, query: &str) -> Vec<SearchDoc> {
    let parts = parse_query(query);
    if parts.is_empty() {
        return Vec::new();
    }

    // Collect scores for each search term using ONLY inverted index
    let score_sets: Vec<Vec<(usize, f64)>> = parts
        .iter()
        .map(|term| score_term_exact(index, term))
        .filter(|v| !v.is_empty())
        .collect();

    if score_sets.is_empty() {
        return Vec::new();
    }

    // Aggregate scores (AND semantics)
    aggregate_and_sort(index, score_sets)
}

/// Search using only the suffix array, excluding already-found IDs (O(log k)).
///
/// Returns additional results not found by exact search.
/// The `exclude_ids` parameter contains doc IDs already returned by search_exact().
///
/// # Lean Specification
///
/// ```lean
/// def expandedWithExclusion (vocabulary : List String) (suffixArray : List Nat)
///     (term : String) (excludeIds : List Nat) : List Nat :=
///   (expandedLookup vocabulary suffixArray term).filter (fun id => id ∉ excludeIds)
/// ```
pub fn search_expanded(index: &HybridIndex, query: &str, exclude_ids: &[usize]) -> Vec<SearchDoc> {
    let parts = parse_query(query);
    if parts.is_empty() {
        return Vec::new();
    }

    let exclude_set: std::collections::HashSet<usize> = exclude_ids.iter().copied().collect();

    // Collect scores for each search term using ONLY suffix array
    let score_sets: Vec<Vec<(usize, f64)>> = parts
        .iter()
        .map(|term| {
            score_term_expanded(index, term)
                .into_iter()
                .filter(|(doc_id, _)| !exclude_set.contains(doc_id))
                .collect()
        })
        .filter(|v: &Vec<(usize, f64)>| !v.is_empty())
        .collect();

    if score_sets.is_empty() {
        return Vec::new();
    }

    // Aggregate scores (AND semantics)
    aggregate_and_sort(index, score_sets)
}

/// Search using Levenshtein distance for typo tolerance (O(vocab)).
///
/// This is the third phase of streaming search, designed to run in a Web Worker.
/// Returns fuzzy matches not found by exact or expanded search.
///
/// # Arguments
/// * `index` - The hybrid index
/// * `query` - The search query
/// * `exclude_ids` - Doc IDs already returned by search_exact() and search_expanded()
///
/// # Performance
/// O(vocabulary × max_distance²) for edit distance computation.
/// Safe to run in a separate worker thread.
pub fn search_fuzzy(index: &HybridIndex, query: &str, exclude_ids: &[usize]) -> Vec<SearchDoc> {
    let parts = parse_query(query);
    if parts.is_empty() {
        return Vec::new();
    }

    let exclude_set: std::collections::HashSet<usize> = exclude_ids.iter().copied().collect();

    // Collect scores for each search term using Levenshtein distance
    let score_sets: Vec<Vec<(usize, f64)>> = parts
        .iter()
        .map(|term| {
            score_term_fuzzy(index, term)
                .into_iter()
                .filter(|(doc_id, _)| !exclude_set.contains(doc_id))
                .collect()
        })
        .filter(|v: &Vec<(usize, f64)>| !v.is_empty())
        .collect();

    if score_sets.is_empty() {
        return Vec::new();
    }

    // Aggregate scores (AND semantics)
    aggregate_and_sort(index, score_sets)
}

/// Score a term using Levenshtein distance (O(vocab) fuzzy search).
fn score_term_fuzzy(index: &HybridIndex, term: &str) -> Vec<(usize, f64)> {
    // Use edit distance 1 for short terms, 2 for longer terms
    let max_dist = if term.len() > 5 { 2 } else { 1 };
    let matching_terms = find_fuzzy_matches(&index.vocabulary, term, max_dist);

    if matching_terms.is_empty() {
        return Vec::new();
    }

    collect_scores_for_terms(index, &matching_terms)
}

/// Score a term using only the inverted index (O(1) exact lookup).
///
/// OPTIMIZATION: Posting lists are sorted by score DESC at index time,
/// so this returns results already in score order.
fn score_term_exact(index: &HybridIndex, term: &str) -> Vec<(usize, f64)> {
    if let Some(posting_list) = index.inverted_index.terms.get(term) {
        return score_posting_list(posting_list);
    }
    Vec::new()
}

/// Score a term using only the suffix array (O(log k) prefix/substring search).
fn score_term_expanded(index: &HybridIndex, term: &str) -> Vec<(usize, f64)> {
    let matching_terms = find_substring_matches(index, term);
    if matching_terms.is_empty() {
        return Vec::new();
    }

    // Union posting lists for all matching terms
    let mut all_scores: Vec<(usize, f64)> = Vec::new();
    for matched_term in matching_terms {
        if let Some(posting_list) = index.inverted_index.terms.get(&matched_term) {
            all_scores.extend(score_posting_list(posting_list));
        }
    }

    // Deduplicate by taking max score per doc
    let mut doc_max: HashMap<usize, f64> = HashMap::new();
    for (doc_id, score) in all_scores {
        doc_max
            .entry(doc_id)
            .and_modify(|s| *s = s.max(score))
            .or_insert(score);
    }

    doc_max.into_iter().collect()
}

/// Default result limit for search operations.
/// Results beyond this limit are still returned but with degraded sorting performance.
const DEFAULT_RESULT_LIMIT: usize = 100;

/// Aggregate score sets with AND semantics and sort by score.
///
/// Uses `merge_score_sets()` for the core aggregation, then converts to sorted results.
///
/// # Performance
///
/// OPTIMIZATION: Uses heap-based top-K selection for large result sets (>100 docs).
/// For small result sets, uses standard sort which is faster due to cache locality.
fn aggregate_and_sort(index: &HybridIndex, score_sets: Vec<Vec<(usize, f64)>>) -> Vec<SearchDoc> {
    let doc_scores = merge_score_sets(&score_sets);

    // Convert to scored docs
    // Note: Direct indexing (O(1)) - docs[doc_id].id == doc_id is an invariant.
    let results: Vec<ScoredDoc> = doc_scores
        .into_iter()
        .filter_map(|(doc_id, score)| {
            index.docs.get(doc_id).map(|doc| ScoredDoc {
                doc: doc.clone(),
                score,
            })
        })
        .collect();

    // OPTIMIZATION: For large result sets, use heap-based top-K selection
    // For small sets, standard sort is faster due to cache locality
    if results.len() > DEFAULT_RESULT_LIMIT * 2 {
        // Use min-heap to efficiently get top-K results
        top_k_by_score(results, DEFAULT_RESULT_LIMIT)
    } else {
        // Standard sort for small result sets
        // Sort by: score (desc) → title (asc) → doc_id (asc) for full determinism
        let mut sorted = results;
        sorted.sort_by(|a, b| {
            match b.score.partial_cmp(&a.score) {
                Some(std::cmp::Ordering::Equal) | None => {
                    match a.doc.title.cmp(&b.doc.title) {
                        std::cmp::Ordering::Equal => a.doc.id.cmp(&b.doc.id),
                        other => other,
                    }
                }
                Some(ord) => ord,
            }
        });
        sorted.into_iter().map(|sd| sd.doc).collect()
    }
}

/// Extract top-K results by score using a min-heap.
///
/// Time complexity: O(n log k) for heap operations + O(k log k) for final sort.
/// Total: O(n log k + k log k), which beats O(n log n) when k << n.
fn top_k_by_score(results: Vec<ScoredDoc>, k: usize) -> Vec<SearchDoc> {
    use std::cmp::Ordering;
    use std::collections::BinaryHeap;

    // Wrapper for min-heap (BinaryHeap is max-heap by default)
    // We keep (score, doc) pairs to preserve scores for final sort
    struct MinScored(ScoredDoc);

    impl PartialEq for MinScored {
        fn eq(&self, other: &Self) -> bool {
            self.0.score == other.0.score
        }
    }

    impl Eq for MinScored {}

    impl Ord for MinScored {
        fn cmp(&self, other: &Self) -> Ordering {
            // Reversed comparison for min-heap behavior (smallest score = highest priority to remove)
            // Sort by: score (desc) → title (asc) → doc_id (asc) for full determinism
            match other.0.score.partial_cmp(&self.0.score) {
                Some(Ordering::Equal) | None => {
                    match self.0.doc.title.cmp(&other.0.doc.title) {
                        Ordering::Equal => self.0.doc.id.cmp(&other.0.doc.id),
                        other_ord => other_ord,
                    }
                }
                Some(ord) => ord,
            }
        }
    }

    impl PartialOrd for MinScored {
        fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
            Some(self.cmp(other))
        }
    }

    // Build min-heap of top-K results
    let mut heap: BinaryHeap<MinScored> = BinaryHeap::with_capacity(k + 1);

    for scored in results {
        heap.push(MinScored(scored));
        if heap.len() > k {
            heap.pop(); // Remove smallest (min-heap)
        }
    }

    // Extract scored docs and sort by: score (desc) → title (asc) → doc_id (asc)
    let mut top_results: Vec<ScoredDoc> = heap.into_iter().map(|ms| ms.0).collect();
    top_results.sort_by(|a, b| {
        match b.score.partial_cmp(&a.score) {
            Some(Ordering::Equal) | None => {
                match a.doc.title.cmp(&b.doc.title) {
                    Ordering::Equal => a.doc.id.cmp(&b.doc.id),
                    other => other,
                }
            }
            Some(ord) => ord,
        }
    });

    top_results.into_iter().map(|sd| sd.doc).collect()
}

/// Score a single search term.
///
/// Three-tier search strategy:
/// 1. Exact lookup in inverted index (O(1))
/// 2. Prefix/substring search via vocabulary suffix array (O(log k))
/// 3. Fuzzy search via Levenshtein distance over vocabulary (O(vocab))
///
/// OPTIMIZATION: Posting lists are sorted by score DESC at index time,
/// so exact match returns results already in score order.
fn score_term(index: &HybridIndex, term: &str) -> Vec<(usize, f64)> {
    // Tier 1: Try exact match first (O(1))
    if let Some(posting_list) = index.inverted_index.terms.get(term) {
        return score_posting_list(posting_list);
    }

    // Tier 2: Try substring match via vocabulary suffix array (O(log k))
    let matching_terms = find_substring_matches(index, term);
    if !matching_terms.is_empty() {
        return collect_scores_for_terms(index, &matching_terms);
    }

    // Tier 3: Try fuzzy match via Levenshtein distance (O(vocab))
    // Use edit distance 1 for short terms, 2 for longer terms
    let max_dist = if term.len() > 5 { 2 } else { 1 };
    let fuzzy_terms = find_fuzzy_matches(&index.vocabulary, term, max_dist);
    if !fuzzy_terms.is_empty() {
        return collect_scores_for_terms(index, &fuzzy_terms);
    }

    Vec::new()
}

/// Collect and deduplicate scores for a set of matching terms.
fn collect_scores_for_terms(index: &HybridIndex, terms: &[String]) -> Vec<(usize, f64)> {
    let mut all_scores: Vec<(usize, f64)> = Vec::new();
    for matched_term in terms {
        if let Some(posting_list) = index.inverted_index.terms.get(matched_term) {
            all_scores.extend(score_posting_list(posting_list));
        }
    }

    // Deduplicate by taking max score per doc
    let mut doc_max: HashMap<usize, f64> = HashMap::new();
    for (doc_id, score) in all_scores {
        doc_max
            .entry(doc_id)
            .and_modify(|s| *s = s.max(score))
            .or_insert(score);
    }

    doc_max.into_iter().collect()
}

/// Score a posting list, returning (doc_id, score) pairs.
///
/// OPTIMIZATION: Scores are precomputed at index time, so this just reads them.
/// Posting list is already sorted by score DESC, so we can early-exit for top-k.
fn score_posting_list(posting_list: &PostingList) -> Vec<(usize, f64)> {
    posting_list
        .postings
        .iter()
        .map(|posting| (posting.doc_id, posting.score))
        .collect()
}

/// Find all vocabulary terms containing a substring using binary search.
///
/// Returns the list of terms that contain the query as a substring.
/// This enables "script" to match "typescript", "javascript", "scripting", etc.
fn find_substring_matches(index: &HybridIndex, query: &str) -> Vec<String> {
    let vocab = &index.vocabulary;
    let suffix_array = &index.vocab_suffix_array;

    if suffix_array.is_empty() {
        return Vec::new();
    }

    // Binary search to find first suffix >= query
    let mut lo = 0;
    let mut hi = suffix_array.len();

    while lo < hi {
        let mid = (lo + hi) / 2;
        let entry = &suffix_array[mid];
        let suffix = &vocab[entry.term_idx][entry.offset..];

        if suffix < query {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }

    // Collect all terms whose suffixes start with query (any offset)
    // This finds "typescript" when searching for "script" because
    // the suffix array contains an entry for the "script" suffix
    let mut matching_terms: Vec<String> = Vec::new();
    let mut seen: std::collections::HashSet<usize> = std::collections::HashSet::new();

    for i in lo..suffix_array.len() {
        let entry = &suffix_array[i];
        let suffix = &vocab[entry.term_idx][entry.offset..];

        if !suffix.starts_with(query) {
            break;
        }

        // Include the term if we haven't seen it yet (any offset is valid)
        if !seen.contains(&entry.term_idx) {
            seen.insert(entry.term_idx);
            matching_terms.push(vocab[entry.term_idx].clone());
        }
    }

    matching_terms
}

/// Find vocabulary terms within edit distance k using Levenshtein distance.
///
/// Iterates over the vocabulary and computes edit distance for each term.
/// Uses early termination to skip terms that are too different in length.
///
/// # Arguments
/// * `vocabulary` - The sorted vocabulary terms
/// * `query` - The search query
/// * `max_distance` - Maximum edit distance (1 for short terms, 2 for longer terms)
///
/// # Returns
/// List of vocabulary terms within the specified edit distance.
///
/// # Complexity
/// O(vocabulary × query_len × max_term_len) but with heavy pruning via length check.
fn find_fuzzy_matches(vocabulary: &[String], query: &str, max_distance: u32) -> Vec<String> {
    let query_len = query.chars().count();

    vocabulary
        .iter()
        .filter(|term| {
            let term_len = term.chars().count();
            // Early termination: length difference bounds edit distance
            let len_diff = query_len.abs_diff(term_len);
            if len_diff > max_distance as usize {
                return false;
            }
            // Compute actual edit distance with early termination
            levenshtein_within(query, term, max_distance as usize)
        })
        .cloned()
        .collect()
}
