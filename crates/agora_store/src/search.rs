//! Search-token derivation for upserts. Tokens land in the
//! `entity_to_search_terms` junction table and are matched as substrings by
//! list queries, so both paths normalize text the same way.

use unicode_normalization::UnicodeNormalization;

/// Trim, NFC-normalize, and lowercase one token or needle.
pub(crate) fn normalize(value: &str) -> String {
    value.trim().nfc().collect::<String>().to_lowercase()
}

/// Accumulates the token set stored for one entity: caller-provided terms
/// plus tokens derived from identity, display names, and tags.
#[derive(Debug, Default)]
pub(crate) struct SearchTerms {
    tokens: Vec<String>,
}

impl SearchTerms {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, token: &str) {
        let token = normalize(token);
        if !token.is_empty() {
            self.tokens.push(token);
        }
    }

    /// Whitespace-splits free text and keeps words longer than one character.
    pub(crate) fn push_words(&mut self, text: &str) {
        for word in text.split_whitespace() {
            let word = normalize(word);
            if word.chars().count() > 1 {
                self.tokens.push(word);
            }
        }
    }

    /// The `tag:<value>` form that makes tags searchable without colliding
    /// with free text.
    pub(crate) fn push_tag(&mut self, tag: &str) {
        let tag = normalize(tag);
        if !tag.is_empty() {
            self.tokens.push(format!("tag:{tag}"));
        }
    }

    pub(crate) fn extend_raw(&mut self, terms: &[String]) {
        for term in terms {
            self.push(term);
        }
    }

    /// Deduplicated tokens, first occurrence order preserved.
    pub(crate) fn into_vec(self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        let mut out = Vec::with_capacity(self.tokens.len());
        for token in self.tokens {
            if seen.insert(token.clone()) {
                out.push(token);
            }
        }
        out
    }
}
