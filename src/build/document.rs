// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Document input format for the build pipeline.
//!
//! Each document is a JSON file with normalized searchable text and field
//! boundaries that tell us what's a title, what's a heading, and what's content.
//! The `field_boundaries` array is the key innovation: it lets us score matches
//! differently based on where they appear without duplicating text.

use crate::FieldBoundary;
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: usize,
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    pub href: String,
    #[serde(rename = "type")]
    pub doc_type: String,
    pub category: Option<String>,
    /// Author name (for multi-author blogs)
    #[serde(default)]
    pub author: Option<String>,
    /// Tags/labels for categorization
    #[serde(default)]
    pub tags: Vec<String>,
    pub text: String,
    pub field_boundaries: Vec<FieldBoundary>,
}
