use std::collections::BTreeSet;

/// Upper bound available to the selection parser.
///
/// Synthesis knows the slide count up front; directory-driven merging does
/// not, so out-of-range members there simply match no file instead of being
/// rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Known(usize),
    Unknown,
}

/// A parsed slide selection.
///
/// `All` is an explicit sentinel for "no filtering"; call sites must match on
/// it rather than treat an empty set as special.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    All,
    Indices(BTreeSet<usize>),
}

impl Selection {
    pub fn contains(&self, index: usize) -> bool {
        match self {
            Selection::All => true,
            Selection::Indices(set) => set.contains(&index),
        }
    }

    /// Concrete ascending indices within `1..=total`.
    pub fn resolve(&self, total: usize) -> Vec<usize> {
        match self {
            Selection::All => (1..=total).collect(),
            Selection::Indices(set) => set.iter().copied().filter(|&i| i <= total).collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ParsedSelection {
    pub selection: Selection,
    /// Tokens (or expanded range members) that were malformed or out of
    /// range. Warnings, never fatal.
    pub rejected: Vec<String>,
    /// True when every token was rejected under a known bound and the parser
    /// fell back to selecting everything.
    pub fell_back_to_all: bool,
}

/// Parse a selection string like `"1,3-5,7"` into a set of 1-based indices.
///
/// Tokens are comma-separated integers or `A-B` ranges (order-independent),
/// whitespace-tolerant. Malformed tokens are collected and skipped. Members
/// below 1 are always rejected; members above a known bound are rejected too,
/// while under an unknown bound they are kept and simply match nothing later.
/// An empty or missing string selects everything. If every token was rejected
/// under a known bound the parser also selects everything rather than
/// silently processing nothing.
pub fn parse_selection(selection: Option<&str>, bound: Bound) -> ParsedSelection {
    let raw = selection.map(str::trim).unwrap_or("");
    if raw.is_empty() {
        return ParsedSelection {
            selection: Selection::All,
            rejected: Vec::new(),
            fell_back_to_all: false,
        };
    }

    let mut accepted = BTreeSet::new();
    let mut rejected = Vec::new();
    let in_bounds = |index: usize, rejected: &mut Vec<String>| -> bool {
        let ok = index >= 1
            && match bound {
                Bound::Known(total) => index <= total,
                Bound::Unknown => true,
            };
        if !ok {
            rejected.push(index.to_string());
        }
        ok
    };

    for token in raw.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        if let Some((start_s, end_s)) = token.split_once('-') {
            match (start_s.trim().parse::<usize>(), end_s.trim().parse::<usize>()) {
                (Ok(a), Ok(b)) => {
                    let (start, end) = if a > b { (b, a) } else { (a, b) };
                    for index in start..=end {
                        if in_bounds(index, &mut rejected) {
                            accepted.insert(index);
                        }
                    }
                }
                _ => rejected.push(token.to_string()),
            }
        } else {
            match token.parse::<usize>() {
                Ok(index) => {
                    if in_bounds(index, &mut rejected) {
                        accepted.insert(index);
                    }
                }
                Err(_) => rejected.push(token.to_string()),
            }
        }
    }

    if accepted.is_empty() {
        // Never let a fully rejected selection silently skip everything.
        let fell_back = matches!(bound, Bound::Known(_));
        return ParsedSelection {
            selection: Selection::All,
            rejected,
            fell_back_to_all: fell_back,
        };
    }

    ParsedSelection {
        selection: Selection::Indices(accepted),
        rejected,
        fell_back_to_all: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indices(parsed: &ParsedSelection) -> Vec<usize> {
        match &parsed.selection {
            Selection::All => panic!("expected explicit indices, got All"),
            Selection::Indices(set) => set.iter().copied().collect(),
        }
    }

    #[test]
    fn test_singles_and_ranges() {
        let parsed = parse_selection(Some("1,3-5,7"), Bound::Known(10));
        assert_eq!(indices(&parsed), vec![1, 3, 4, 5, 7]);
        assert!(parsed.rejected.is_empty());
        assert!(!parsed.fell_back_to_all);
    }

    #[test]
    fn test_reversed_range_is_swapped() {
        let parsed = parse_selection(Some("5-3"), Bound::Known(10));
        assert_eq!(indices(&parsed), vec![3, 4, 5]);
    }

    #[test]
    fn test_whitespace_tolerance() {
        let parsed = parse_selection(Some(" 2 , 4 - 6 "), Bound::Known(10));
        assert_eq!(indices(&parsed), vec![2, 4, 5, 6]);
    }

    #[test]
    fn test_out_of_range_rejected_then_fallback() {
        let parsed = parse_selection(Some("0,11"), Bound::Known(10));
        assert_eq!(parsed.selection, Selection::All);
        assert!(parsed.fell_back_to_all);
        assert_eq!(parsed.rejected, vec!["0".to_string(), "11".to_string()]);
    }

    #[test]
    fn test_malformed_range_rejected() {
        let parsed = parse_selection(Some("2-4-6"), Bound::Known(10));
        assert_eq!(parsed.selection, Selection::All);
        assert!(parsed.fell_back_to_all);
        assert_eq!(parsed.rejected, vec!["2-4-6".to_string()]);
    }

    #[test]
    fn test_malformed_token_does_not_abort_rest() {
        let parsed = parse_selection(Some("1,abc,3"), Bound::Known(10));
        assert_eq!(indices(&parsed), vec![1, 3]);
        assert_eq!(parsed.rejected, vec!["abc".to_string()]);
        assert!(!parsed.fell_back_to_all);
    }

    #[test]
    fn test_empty_string_selects_all() {
        let parsed = parse_selection(None, Bound::Known(4));
        assert_eq!(parsed.selection, Selection::All);
        assert!(!parsed.fell_back_to_all);

        let parsed = parse_selection(Some("  "), Bound::Unknown);
        assert_eq!(parsed.selection, Selection::All);
    }

    #[test]
    fn test_unknown_bound_keeps_large_members() {
        let parsed = parse_selection(Some("2,100"), Bound::Unknown);
        assert_eq!(indices(&parsed), vec![2, 100]);
        assert!(parsed.rejected.is_empty());
    }

    #[test]
    fn test_unknown_bound_still_rejects_zero() {
        let parsed = parse_selection(Some("0,2"), Bound::Unknown);
        assert_eq!(indices(&parsed), vec![2]);
        assert_eq!(parsed.rejected, vec!["0".to_string()]);
    }

    #[test]
    fn test_resolve_clamps_to_total() {
        let parsed = parse_selection(Some("2,9"), Bound::Unknown);
        assert_eq!(parsed.selection.resolve(5), vec![2]);
        assert_eq!(Selection::All.resolve(3), vec![1, 2, 3]);
    }

    #[test]
    fn test_contains() {
        assert!(Selection::All.contains(42));
        let parsed = parse_selection(Some("1,3"), Bound::Unknown);
        assert!(parsed.selection.contains(3));
        assert!(!parsed.selection.contains(2));
    }
}
