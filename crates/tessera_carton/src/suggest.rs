//! Closest-name suggestions.

/// Find the candidate closest to `name` by edit distance.
///
/// Candidates further away than a third of the name's length (at least two edits)
/// are not suggested. Ties resolve to the first candidate seen.
pub fn closest_match<'c, I>(name: &str, candidates: I) -> Option<&'c str>
where
    I: IntoIterator<Item = &'c str>,
{
    let limit = (name.chars().count() / 3).max(2);
    let lowered = name.to_ascii_lowercase();
    let mut best: Option<(usize, &'c str)> = None;

    for candidate in candidates {
        if candidate == name {
            continue;
        }
        let distance = edit_distance(&lowered, &candidate.to_ascii_lowercase());
        if distance > limit {
            continue;
        }
        if best.map_or(true, |(d, _)| distance < d) {
            best = Some((distance, candidate));
        }
    }

    best.map(|(_, c)| c)
}

fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut cur = vec![0; b.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        cur[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != *cb);
            cur[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(cur[j] + 1);
        }
        std::mem::swap(&mut prev, &mut cur);
    }

    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_distance() {
        assert_eq!(edit_distance("kitten", "sitting"), 3);
        assert_eq!(edit_distance("", "abc"), 3);
        assert_eq!(edit_distance("same", "same"), 0);
    }

    #[test]
    fn test_closest_match() {
        let known = ["setState", "forceUpdate", "getValue", "setValue"];
        assert_eq!(closest_match("getValeu", known), Some("getValue"));
        assert_eq!(closest_match("setstate", known), Some("setState"));
        assert_eq!(closest_match("completelyDifferent", known), None);
    }

    #[test]
    fn test_first_candidate_wins_ties() {
        assert_eq!(closest_match("fob", ["foa", "foc"]), Some("foa"));
    }
}
