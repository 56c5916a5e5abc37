use crate::normalize::normalize;

/// A search result row: the label shown by the site and the detail-page URL it links to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub label: String,
    pub reference: String,
}

impl Candidate {
    pub fn new(label: impl Into<String>, reference: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            reference: reference.into(),
        }
    }
}

/// Outcome of resolving a query against an ordered candidate list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution {
    /// The best-scoring candidate cleared the threshold.
    Accepted { index: usize, score: f64 },
    /// Nothing cleared the threshold; the site's first result is used.
    Fallback { best_index: usize, best_score: f64 },
}

impl Resolution {
    /// Index of the candidate to use.
    pub fn index(&self) -> usize {
        match self {
            Self::Accepted { index, .. } => *index,
            Self::Fallback { .. } => 0,
        }
    }

    /// Highest similarity seen, whether or not it was accepted.
    pub fn score(&self) -> f64 {
        match self {
            Self::Accepted { score, .. } => *score,
            Self::Fallback { best_score, .. } => *best_score,
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}

/// Edit similarity between two already-normalized strings, 0-100.
pub fn similarity(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(a, b) * 100.0
}

/// Index and score of the label most similar to `query`.
///
/// Ties keep the earliest label. Returns `None` for an empty list.
pub fn best_match<'a, I>(query: &str, labels: I) -> Option<(usize, f64)>
where
    I: IntoIterator<Item = &'a str>,
{
    let query = normalize(query);
    let mut best: Option<(usize, f64)> = None;
    for (index, label) in labels.into_iter().enumerate() {
        let score = similarity(&query, &normalize(label));
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((index, score)),
        }
    }
    best
}

/// Pick a candidate for `query`.
///
/// The best match is used when its score is strictly above `threshold`;
/// otherwise the first candidate in site order wins, since the search
/// endpoint already ranks by its own relevance.
pub fn resolve(query: &str, candidates: &[Candidate], threshold: f64) -> Option<Resolution> {
    let (index, score) = best_match(query, candidates.iter().map(|c| c.label.as_str()))?;
    let resolution = if score > threshold {
        Resolution::Accepted { index, score }
    } else {
        Resolution::Fallback {
            best_index: index,
            best_score: score,
        }
    };
    tracing::debug!(
        query,
        index,
        score,
        accepted = resolution.is_accepted(),
        "Resolved search candidates"
    );
    Some(resolution)
}
