//! Fuzzy full-text matching and relevance scoring.
//!
//! The rules here are the single definition of what a feed search matches
//! and how it scores. The in-memory store evaluates them directly; the
//! PostgreSQL store expresses the same rules in SQL
//! (`levenshtein_less_equal` over `regexp_split_to_table` words).

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum edit distance for a fuzzy term match.
pub const DEFAULT_MAX_EDITS: u32 = 2;

/// Number of leading characters that must match exactly.
pub const DEFAULT_PREFIX_LENGTH: usize = 1;

/// Score weight for matches in a video title.
pub const WEIGHT_TITLE: f64 = 2.0;

/// Score weight for matches in a video description.
pub const WEIGHT_DESCRIPTION: f64 = 1.0;

/// Tolerance settings for fuzzy term matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FuzzyOptions {
    pub max_edits: u32,
    pub prefix_length: usize,
}

impl Default for FuzzyOptions {
    fn default() -> Self {
        Self {
            max_edits: DEFAULT_MAX_EDITS,
            prefix_length: DEFAULT_PREFIX_LENGTH,
        }
    }
}

// ---------------------------------------------------------------------------
// Tokenization
// ---------------------------------------------------------------------------

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Split text into lower-cased words on anything that is not alphanumeric
/// or `_`. Empty fragments are dropped.
pub fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !is_word_char(c))
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
}

/// Turn user search input into distinct, lower-cased terms (input order
/// preserved). Returns an empty vec for blank or punctuation-only input.
pub fn search_terms(query: &str) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();
    for term in tokenize(query) {
        if !terms.contains(&term) {
            terms.push(term);
        }
    }
    terms
}

// ---------------------------------------------------------------------------
// Edit distance
// ---------------------------------------------------------------------------

/// Levenshtein distance between `a` and `b`, or `None` once it is known to
/// exceed `max`.
pub fn bounded_levenshtein(a: &str, b: &str, max: u32) -> Option<u32> {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let max = max as usize;

    if a.len().abs_diff(b.len()) > max {
        return None;
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        let mut row_min = curr[0];
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
            row_min = row_min.min(curr[j + 1]);
        }
        if row_min > max {
            return None;
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    let distance = prev[b.len()];
    (distance <= max).then_some(distance as u32)
}

/// Edit distance between a search term and a word if it is a fuzzy match:
/// the first `prefix_length` characters are identical and the distance is
/// within `max_edits`.
pub fn fuzzy_distance(term: &str, word: &str, options: FuzzyOptions) -> Option<u32> {
    let prefix = options.prefix_length;
    if !term.chars().take(prefix).eq(word.chars().take(prefix)) {
        return None;
    }
    bounded_levenshtein(term, word, options.max_edits)
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

/// Score contributed by one matched word.
pub fn match_score(weight: f64, distance: u32) -> f64 {
    weight / f64::from(1 + distance)
}

/// Relevance of a document made of weighted text fields.
///
/// Each term contributes the best [`match_score`] over every word of every
/// field; the document score is the sum across terms. Returns `None` when
/// no term matches anything, meaning the document is not a search hit.
pub fn relevance_score(terms: &[String], fields: &[(&str, f64)], options: FuzzyOptions) -> Option<f64> {
    let mut total: Option<f64> = None;

    for term in terms {
        let best = fields
            .iter()
            .flat_map(|(text, weight)| {
                tokenize(text).filter_map(move |word| {
                    fuzzy_distance(term, &word, options).map(|d| match_score(*weight, d))
                })
            })
            .fold(None, |acc: Option<f64>, s| Some(acc.map_or(s, |a| a.max(s))));

        if let Some(best) = best {
            total = Some(total.unwrap_or(0.0) + best);
        }
    }

    total
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
