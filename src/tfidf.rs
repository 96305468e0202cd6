//! Character n-gram TF-IDF vector space.
//!
//! Tokenization lowercases the text, then takes character n-grams of
//! length 2 and 3 over it as a `char` sequence. This is deliberately
//! word-boundary-free: it behaves the same for space-delimited and
//! non-space-delimited scripts, and is safe for multi-byte text. Case
//! folding applies to both fit and transform, so queries match
//! case-insensitively.
//!
//! Weighting matches the conventional smoothed scheme:
//! `idf(t) = ln((1 + n_docs) / (1 + df(t))) + 1`, vectors are `tf * idf`
//! and L2-normalized at build time, so cosine similarity reduces to a dot
//! product in [0, 1].
//!
//! The space is fitted once per rebuild over the dataset's `search_text`
//! rows. Queries are *transformed* into the fitted space — unseen n-grams
//! are dropped, idf weights are reused, the vocabulary is never refit — so
//! query vectors stay comparable to the cached row vectors.

use std::collections::HashMap;

const NGRAM_MIN: usize = 2;
const NGRAM_MAX: usize = 3;

/// A sparse, L2-normalized vector. Term ids are sorted ascending.
#[derive(Debug, Clone, Default)]
pub struct SparseVec {
    terms: Vec<(u32, f64)>,
}

impl SparseVec {
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Build from raw term weights and normalize to unit length.
    fn normalized(mut terms: Vec<(u32, f64)>) -> SparseVec {
        terms.sort_unstable_by_key(|&(id, _)| id);
        let norm = terms.iter().map(|&(_, w)| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, w) in &mut terms {
                *w /= norm;
            }
        }
        SparseVec { terms }
    }
}

/// Cosine similarity between two L2-normalized sparse vectors.
///
/// Returns 0.0 when either vector is empty; the result is clamped to [0, 1]
/// to absorb floating-point drift on near-identical texts.
pub fn cosine(a: &SparseVec, b: &SparseVec) -> f64 {
    if a.terms.is_empty() || b.terms.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let (mut i, mut j) = (0usize, 0usize);
    while i < a.terms.len() && j < b.terms.len() {
        let (ta, wa) = a.terms[i];
        let (tb, wb) = b.terms[j];
        match ta.cmp(&tb) {
            std::cmp::Ordering::Equal => {
                dot += wa * wb;
                i += 1;
                j += 1;
            }
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
        }
    }

    dot.clamp(0.0, 1.0)
}

/// A fitted TF-IDF vector space plus one weighted vector per fitted row,
/// in row order.
#[derive(Debug)]
pub struct TfidfIndex {
    vocab: HashMap<String, u32>,
    idf: Vec<f64>,
    vectors: Vec<SparseVec>,
}

impl TfidfIndex {
    /// Fit the vector space over all row texts and vectorize each row.
    ///
    /// The vocabulary is assigned in sorted term order so a rebuild over the
    /// same data produces an identical index.
    pub fn fit(texts: &[String]) -> TfidfIndex {
        let n_docs = texts.len();

        // Per-document term counts and document frequencies.
        let mut doc_counts: Vec<HashMap<String, u32>> = Vec::with_capacity(n_docs);
        let mut df: HashMap<String, u32> = HashMap::new();
        for text in texts {
            let counts = ngram_counts(text);
            for term in counts.keys() {
                *df.entry(term.clone()).or_insert(0) += 1;
            }
            doc_counts.push(counts);
        }

        let mut terms: Vec<&String> = df.keys().collect();
        terms.sort_unstable();

        let mut vocab: HashMap<String, u32> = HashMap::with_capacity(terms.len());
        let mut idf: Vec<f64> = Vec::with_capacity(terms.len());
        for (id, term) in terms.into_iter().enumerate() {
            let freq = df[term] as f64;
            vocab.insert(term.clone(), id as u32);
            idf.push(((1.0 + n_docs as f64) / (1.0 + freq)).ln() + 1.0);
        }

        let vectors = doc_counts
            .into_iter()
            .map(|counts| {
                let weights: Vec<(u32, f64)> = counts
                    .into_iter()
                    .map(|(term, tf)| {
                        let id = vocab[&term];
                        (id, tf as f64 * idf[id as usize])
                    })
                    .collect();
                SparseVec::normalized(weights)
            })
            .collect();

        TfidfIndex { vocab, idf, vectors }
    }

    /// Project a query into the fitted space without refitting.
    pub fn transform(&self, text: &str) -> SparseVec {
        let weights: Vec<(u32, f64)> = ngram_counts(text)
            .into_iter()
            .filter_map(|(term, tf)| {
                self.vocab
                    .get(&term)
                    .map(|&id| (id, tf as f64 * self.idf[id as usize]))
            })
            .collect();
        SparseVec::normalized(weights)
    }

    /// Number of fitted row vectors. Always equals the row count of the
    /// dataset the index was built from.
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn vector(&self, row: usize) -> &SparseVec {
        &self.vectors[row]
    }
}

/// Count character n-grams of length 2 and 3 over the lowercased text.
/// Texts shorter than two chars produce no terms.
fn ngram_counts(text: &str) -> HashMap<String, u32> {
    let chars: Vec<char> = text.to_lowercase().chars().collect();
    let mut counts = HashMap::new();
    for n in NGRAM_MIN..=NGRAM_MAX {
        if chars.len() < n {
            break;
        }
        for window in chars.windows(n) {
            let gram: String = window.iter().collect();
            *counts.entry(gram).or_insert(0) += 1;
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn ngrams_cover_lengths_two_and_three() {
        let counts = ngram_counts("abcd");
        // bigrams: ab bc cd, trigrams: abc bcd
        assert_eq!(counts.len(), 5);
        assert_eq!(counts["ab"], 1);
        assert_eq!(counts["abc"], 1);
    }

    #[test]
    fn ngrams_handle_multibyte_text() {
        let counts = ngram_counts("ログイン");
        assert_eq!(counts["ログ"], 1);
        assert_eq!(counts["グイン"], 1);
    }

    #[test]
    fn short_text_yields_no_terms() {
        assert!(ngram_counts("a").is_empty());
        assert!(ngram_counts("").is_empty());
    }

    #[test]
    fn self_similarity_is_maximal() {
        let docs = texts(&[
            "login fails cannot sign in",
            "billing issue invoice wrong",
            "export report to spreadsheet",
        ]);
        let index = TfidfIndex::fit(&docs);

        for (i, doc) in docs.iter().enumerate() {
            let query = index.transform(doc);
            let own = cosine(&query, index.vector(i));
            assert!((own - 1.0).abs() < 1e-9, "self similarity was {}", own);
            for j in 0..docs.len() {
                if j != i {
                    let other = cosine(&query, index.vector(j));
                    assert!(own > other, "row {} scored {} vs own {}", j, other, own);
                }
            }
        }
    }

    #[test]
    fn scores_stay_in_unit_interval() {
        let docs = texts(&["aaa aaa aaa", "aab aab", "zzz"]);
        let index = TfidfIndex::fit(&docs);
        let query = index.transform("aaa aab zzz");
        for i in 0..index.len() {
            let s = cosine(&query, index.vector(i));
            assert!((0.0..=1.0).contains(&s), "score out of range: {}", s);
        }
    }

    #[test]
    fn matching_is_case_insensitive() {
        let docs = texts(&["login fails cannot sign in", "billing issue invoice wrong"]);
        let index = TfidfIndex::fit(&docs);

        let upper = index.transform("LOGIN");
        assert!(cosine(&upper, index.vector(0)) > 0.0);

        // Folding happens on both sides, so case never changes a score.
        let lower = index.transform("login");
        for i in 0..docs.len() {
            let a = cosine(&upper, index.vector(i));
            let b = cosine(&lower, index.vector(i));
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn unseen_query_terms_are_dropped() {
        let docs = texts(&["alpha beta", "gamma delta"]);
        let index = TfidfIndex::fit(&docs);
        let query = index.transform("qqqq");
        assert!(query.is_empty());
        assert_eq!(cosine(&query, index.vector(0)), 0.0);
    }

    #[test]
    fn refit_is_deterministic() {
        let docs = texts(&["one two three", "four five six", "one six"]);
        let a = TfidfIndex::fit(&docs);
        let b = TfidfIndex::fit(&docs);
        let q = "one five";
        for i in 0..docs.len() {
            let sa = cosine(&a.transform(q), a.vector(i));
            let sb = cosine(&b.transform(q), b.vector(i));
            assert!((sa - sb).abs() < 1e-12);
        }
    }

    #[test]
    fn index_row_count_matches_input() {
        let docs = texts(&["a b c", "", "d e f"]);
        let index = TfidfIndex::fit(&docs);
        assert_eq!(index.len(), 3);
        // The empty row gets an empty vector, not a missing one.
        assert!(index.vector(1).is_empty());
    }
}
