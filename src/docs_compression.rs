//! Document compression benchmarking
//!
//! Compares different approaches for embedding docs in .sieve binary:
//! 1. JSON (current baseline)
//! 2. Custom binary format (length-prefixed strings, 1-bit type)

use serde::{Deserialize, Serialize};

/// Document metadata for search results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doc {
    pub id: u32,
    pub title: String,
    pub excerpt: String,
    pub href: String,
    #[serde(rename = "type")]
    pub doc_type: String,
    /// Category for client-side filtering (optional)
    #[serde(default)]
    pub category: Option<String>,
}

/// Type flag as single byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DocType {
    Page = 0,
    Post = 1,
}

impl DocType {
    fn from_str(s: &str) -> Self {
        match s {
            "page" => DocType::Page,
            _ => DocType::Post,
        }
    }
}

/// Write a length-prefixed string using varint encoding
fn write_varint_string(buf: &mut Vec<u8>, s: &str) {
    let bytes = s.as_bytes();
    write_varint(buf, bytes.len() as u32);
    buf.extend_from_slice(bytes);
}

/// Write a varint (LEB128 encoding)
fn write_varint(buf: &mut Vec<u8>, mut value: u32) {
    loop {
        let mut byte = (value & 0x7F) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        buf.push(byte);
        if value == 0 {
            break;
        }
    }
}

/// Read a varint from a slice, returning (value, bytes_read)
fn read_varint(data: &[u8]) -> (u32, usize) {
    let mut result = 0u32;
    let mut shift = 0;
    let mut i = 0;
    loop {
        let byte = data[i];
        result |= ((byte & 0x7F) as u32) << shift;
        i += 1;
        if byte & 0x80 == 0 {
            break;
        }
        shift += 7;
    }
    (result, i)
}

/// Read a length-prefixed string from a slice
fn read_varint_string(data: &[u8]) -> (String, usize) {
    let (len, varint_size) = read_varint(data);
    let s = String::from_utf8_lossy(&data[varint_size..varint_size + len as usize]).to_string();
    (s, varint_size + len as usize)
}

/// Encode docs to custom binary format
///
/// Format per doc:
/// - type: 1 byte (0=page, 1=post)
/// - title: varint_len + utf8
/// - excerpt: varint_len + utf8
/// - href: varint_len + utf8
/// - category: varint_len + utf8 (empty string if None)
///
/// Note: id is omitted since it's always sequential (0, 1, 2...)
pub fn encode_docs_binary(docs: &[Doc]) -> Vec<u8> {
    let mut buf = Vec::new();

    // Header: doc count
    write_varint(&mut buf, docs.len() as u32);

    for doc in docs {
        // Type flag (1 byte)
        buf.push(DocType::from_str(&doc.doc_type) as u8);

        // Length-prefixed strings
        write_varint_string(&mut buf, &doc.title);
        write_varint_string(&mut buf, &doc.excerpt);
        write_varint_string(&mut buf, &doc.href);
        // Category (empty string if None)
        write_varint_string(&mut buf, doc.category.as_deref().unwrap_or(""));
    }

    buf
}

/// Decode docs from custom binary format
pub fn decode_docs_binary(data: &[u8]) -> Vec<Doc> {
    let mut offset = 0;

    // Header: doc count
    let (doc_count, size) = read_varint(&data[offset..]);
    offset += size;

    let mut docs = Vec::with_capacity(doc_count as usize);

    for id in 0..doc_count {
        // Type flag
        let doc_type = if data[offset] == 0 { "page" } else { "post" };
        offset += 1;

        // Strings
        let (title, size) = read_varint_string(&data[offset..]);
        offset += size;

        let (excerpt, size) = read_varint_string(&data[offset..]);
        offset += size;

        let (href, size) = read_varint_string(&data[offset..]);
        offset += size;

        let (category_str, size) = read_varint_string(&data[offset..]);
        offset += size;
        let category = if category_str.is_empty() {
            None
        } else {
            Some(category_str)
        };

        docs.push(Doc {
            id,
            title,
            excerpt,
            href,
            doc_type: doc_type.to_string(),
            category,
        });
    }

    docs
}
