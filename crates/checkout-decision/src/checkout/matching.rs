use std::collections::{BTreeMap, BTreeSet};

/// Lower-cases, turns punctuation into spaces and collapses whitespace.
pub fn normalize_merchant_name(value: &str) -> String {
    let cleaned: String = value
        .replace(['\u{feff}', '\u{200b}'], "")
        .chars()
        .map(|ch| if ch.is_alphanumeric() { ch } else { ' ' })
        .collect();
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.to_lowercase()
}

/// Similarity in `[0, 1]` between two already-normalized names: the larger of token Jaccard
/// overlap and Levenshtein similarity over characters.
pub fn name_similarity(left: &str, right: &str) -> f64 {
    if left.is_empty() || right.is_empty() {
        return 0.0;
    }
    if left == right {
        return 1.0;
    }
    token_jaccard(left, right).max(edit_similarity(left, right))
}

fn token_jaccard(left: &str, right: &str) -> f64 {
    let left: BTreeSet<&str> = left.split(' ').collect();
    let right: BTreeSet<&str> = right.split(' ').collect();
    let union = left.union(&right).count();
    if union == 0 {
        return 0.0;
    }
    left.intersection(&right).count() as f64 / union as f64
}

fn edit_similarity(left: &str, right: &str) -> f64 {
    let left: Vec<char> = left.chars().collect();
    let right: Vec<char> = right.chars().collect();
    let longest = left.len().max(right.len());
    if longest == 0 {
        return 1.0;
    }
    1.0 - levenshtein(&left, &right) as f64 / longest as f64
}

fn levenshtein(left: &[char], right: &[char]) -> usize {
    let mut previous: Vec<usize> = (0..=right.len()).collect();
    let mut current = vec![0; right.len() + 1];
    for (i, a) in left.iter().enumerate() {
        current[0] = i + 1;
        for (j, b) in right.iter().enumerate() {
            let substitution = previous[j] + usize::from(a != b);
            current[j + 1] = substitution.min(previous[j + 1] + 1).min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[right.len()]
}

/// Entry selected by [`best_match`] together with its similarity score.
#[derive(Debug, Clone, PartialEq)]
pub struct NameMatch<'a, T> {
    pub key: &'a str,
    pub entry: &'a T,
    pub similarity: f64,
}

/// Highest-similarity entry at or above `threshold`. `entries` is keyed by normalized name;
/// equal similarities resolve to the lexicographically first key.
pub fn best_match<'a, T>(
    name: &str,
    entries: &'a BTreeMap<String, T>,
    threshold: f64,
) -> Option<NameMatch<'a, T>> {
    let normalized = normalize_merchant_name(name);
    if normalized.is_empty() {
        return None;
    }

    let mut best: Option<NameMatch<'a, T>> = None;
    for (key, entry) in entries {
        let similarity = name_similarity(&normalized, key);
        if similarity < threshold {
            continue;
        }
        if best
            .as_ref()
            .map_or(true, |current| similarity > current.similarity)
        {
            best = Some(NameMatch {
                key,
                entry,
                similarity,
            });
        }
    }
    best
}
