//! Bounded edit-distance and Jaro similarity over short ASCII strings.
//!
//! The matcher cascade only ever needs to know whether two strings are
//! within a small fixed distance, so everything here is bounded and
//! early-exits: `is_distance_one` is the classic single-pass two-pointer
//! check, and `within_distance_two`/`within_distance_four` run a
//! Levenshtein DP that bails out as soon as a whole row exceeds the limit.
//!
//! The `space_sensitive` flag on the bounded checks controls whether
//! spaces participate in the comparison: peerage-title and name-permutation
//! matching ignores them, office-alias matching does not.

/// True when `a` and `b` differ by exactly one substitution, insertion,
/// or deletion. Equal strings are *not* distance one.
pub fn is_distance_one(a: &str, b: &str) -> bool {
    let a = a.as_bytes();
    let b = b.as_bytes();

    if a.is_empty() && b.is_empty() {
        return false;
    }
    if a.len().abs_diff(b.len()) > 1 {
        return false;
    }

    let mut i = 0;
    let mut j = 0;
    let mut edits = 0;
    while i < a.len() && j < b.len() {
        if a[i] == b[j] {
            i += 1;
            j += 1;
        } else {
            if edits > 0 {
                return false;
            }
            if a.len() == b.len() {
                // substitution
                i += 1;
                j += 1;
            } else if a.len() > b.len() {
                // deletion from a
                i += 1;
            } else {
                // insertion into a
                j += 1;
            }
            edits += 1;
        }
    }

    // Trailing excess character on either side counts as one more edit.
    if i < a.len() || j < b.len() {
        edits += 1;
    }

    edits == 1
}

/// Levenshtein distance between `a` and `b` is at most 2.
///
/// With `space_sensitive = false`, spaces are removed from both strings
/// before comparison.
pub fn within_distance_two(a: &str, b: &str, space_sensitive: bool) -> bool {
    within_distance(a, b, 2, space_sensitive)
}

/// Levenshtein distance between `a` and `b` is at most 4.
pub fn within_distance_four(a: &str, b: &str, space_sensitive: bool) -> bool {
    within_distance(a, b, 4, space_sensitive)
}

fn within_distance(a: &str, b: &str, limit: usize, space_sensitive: bool) -> bool {
    if space_sensitive {
        bounded_levenshtein(a.as_bytes(), b.as_bytes(), limit)
    } else {
        let a: Vec<u8> = a.bytes().filter(|&c| c != b' ').collect();
        let b: Vec<u8> = b.bytes().filter(|&c| c != b' ').collect();
        bounded_levenshtein(&a, &b, limit)
    }
}

/// Single-row Levenshtein DP with an early exit once every cell in the
/// current row exceeds `limit`.
fn bounded_levenshtein(a: &[u8], b: &[u8], limit: usize) -> bool {
    if a.len().abs_diff(b.len()) > limit {
        return false;
    }
    // Keep the shorter string as the row to bound memory.
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };

    let mut prev: Vec<usize> = (0..=short.len()).collect();
    let mut curr: Vec<usize> = vec![0; short.len() + 1];

    for (i, &lc) in long.iter().enumerate() {
        curr[0] = i + 1;
        let mut row_min = curr[0];
        for (j, &sc) in short.iter().enumerate() {
            let cost = usize::from(lc != sc);
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
            row_min = row_min.min(curr[j + 1]);
        }
        if row_min > limit {
            return false;
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[short.len()] <= limit
}

/// Standard Jaro similarity in `[0, 1]`.
///
/// Returns 0 when either string is empty or nothing matches; returns 1
/// only for equal strings.
pub fn jaro(a: &str, b: &str) -> f64 {
    let a = a.as_bytes();
    let b = b.as_bytes();

    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a == b {
        return 1.0;
    }

    let window = (a.len().max(b.len()) / 2).saturating_sub(1);

    let mut a_matched = vec![false; a.len()];
    let mut b_matched = vec![false; b.len()];
    let mut matches = 0usize;

    for (i, &ac) in a.iter().enumerate() {
        let lo = i.saturating_sub(window);
        let hi = (i + window + 1).min(b.len());
        for j in lo..hi {
            if !b_matched[j] && b[j] == ac {
                a_matched[i] = true;
                b_matched[j] = true;
                matches += 1;
                break;
            }
        }
    }

    if matches == 0 {
        return 0.0;
    }

    // Count transpositions between the matched subsequences.
    let mut transpositions = 0usize;
    let mut j = 0usize;
    for (i, &ac) in a.iter().enumerate() {
        if !a_matched[i] {
            continue;
        }
        while !b_matched[j] {
            j += 1;
        }
        if ac != b[j] {
            transpositions += 1;
        }
        j += 1;
    }

    let m = matches as f64;
    let t = (transpositions / 2) as f64;
    (m / a.len() as f64 + m / b.len() as f64 + (m - t) / m) / 3.0
}
