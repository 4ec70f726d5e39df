//! Approximate string matching
//!
//! Levenshtein edit distance over characters, plus a "closest candidate"
//! lookup that compares case-insensitively with surrounding whitespace
//! trimmed and inner whitespace runs collapsed.

/// Levenshtein distance between two strings, counted in characters
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != cb);
            current[j + 1] = substitution.min(previous[j + 1] + 1).min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[b.len()]
}

fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Find the candidate closest to `query` within `threshold` edits.
///
/// Returns the first candidate (in iteration order) with the lowest
/// distance, together with that distance.
pub fn closest_match<'a, I>(query: &str, candidates: I, threshold: usize) -> Option<(&'a str, usize)>
where
    I: IntoIterator<Item = &'a str>,
{
    let query = normalize(query);
    let query_len = query.chars().count();
    let mut best: Option<(&'a str, usize)> = None;

    for candidate in candidates {
        let normalized = normalize(candidate);
        // Length difference is a lower bound on the distance
        if normalized.chars().count().abs_diff(query_len) > threshold {
            continue;
        }
        let distance = edit_distance(&query, &normalized);
        if distance <= threshold && best.map_or(true, |(_, d)| distance < d) {
            best = Some((candidate, distance));
            if distance == 0 {
                break;
            }
        }
    }

    best
}
