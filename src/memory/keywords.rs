//! Keyword extraction for memory relevance scoring
//!
//! Deliberately cheap: lowercase, strip punctuation, drop stopwords and short
//! tokens. Relevance between a context and a memory is Jaccard overlap of
//! these keyword sets.

const STOPWORDS: &[&str] = &[
    "the", "a", "an", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had",
    "do", "does", "did", "will", "would", "could", "should", "may", "might", "shall", "can", "to",
    "of", "in", "for", "on", "with", "at", "by", "from", "as", "into", "about", "like", "through",
    "after", "over", "between", "out", "against", "during", "before", "above", "below", "and",
    "but", "or", "not", "no", "so", "if", "than", "too", "very", "just", "that", "this", "it",
    "i", "we", "you", "they", "he", "she", "my", "your", "his", "her", "our", "their",
];

/// Maximum keywords kept per memory entry
pub const KEYWORD_CAP: usize = 10;

/// Extract scoring keywords from free text.
///
/// Tokens are lowercased with non-alphanumeric characters stripped; tokens of
/// length <= 2 and stopwords are dropped; at most [`KEYWORD_CAP`] survive.
pub fn extract_keywords(text: &str) -> Vec<String> {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();

    let mut keywords = Vec::new();
    for token in cleaned.split_whitespace() {
        if token.len() <= 2 || STOPWORDS.contains(&token) {
            continue;
        }
        keywords.push(token.to_string());
        if keywords.len() >= KEYWORD_CAP {
            break;
        }
    }
    keywords
}

/// Jaccard similarity of two keyword lists (0.0 when the union is empty)
pub fn keyword_overlap(a: &[String], b: &[String]) -> f64 {
    use std::collections::HashSet;

    let set_a: HashSet<&str> = a.iter().map(String::as_str).collect();
    let set_b: HashSet<&str> = b.iter().map(String::as_str).collect();

    let union = set_a.union(&set_b).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = set_a.intersection(&set_b).count();
    intersection as f64 / union as f64
}
