//! Ordered fallback chains.
//!
//! Both the merge procedure (stream copy, then re-encode) and duration
//! measurement (metadata reader, then probe queries) try a sequence of
//! strategies and take the first usable result.

/// One named attempt. `Err` carries the diagnostic for that attempt.
pub(crate) type Strategy<'a, T> = (
    &'static str,
    Box<dyn FnMut() -> std::result::Result<T, String> + 'a>,
);

pub(crate) struct ChainOutcome<T> {
    /// First usable value and the name of the strategy that produced it.
    pub value: Option<(T, &'static str)>,
    /// Diagnostics from every attempt that ran and failed.
    pub failures: Vec<(&'static str, String)>,
}

/// Run strategies in order, stopping at the first success. Strategies after
/// the first success never run.
pub(crate) fn run_chain<T>(strategies: Vec<Strategy<'_, T>>) -> ChainOutcome<T> {
    let mut failures = Vec::new();

    for (name, mut attempt) in strategies {
        match attempt() {
            Ok(value) => {
                return ChainOutcome {
                    value: Some((value, name)),
                    failures,
                }
            }
            Err(diagnostic) => failures.push((name, diagnostic)),
        }
    }

    ChainOutcome {
        value: None,
        failures,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_success_wins() {
        let strategies: Vec<Strategy<u32>> = vec![
            ("first", Box::new(|| Err("nope".to_string()))),
            ("second", Box::new(|| Ok(7))),
            ("third", Box::new(|| panic!("must not run"))),
        ];
        let outcome = run_chain(strategies);
        assert_eq!(outcome.value, Some((7, "second")));
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].0, "first");
    }

    #[test]
    fn test_all_failures_collected() {
        let strategies: Vec<Strategy<u32>> = vec![
            ("a", Box::new(|| Err("one".to_string()))),
            ("b", Box::new(|| Err("two".to_string()))),
        ];
        let outcome = run_chain(strategies);
        assert!(outcome.value.is_none());
        assert_eq!(
            outcome.failures,
            vec![("a", "one".to_string()), ("b", "two".to_string())]
        );
    }

    #[test]
    fn test_empty_chain() {
        let outcome = run_chain::<u32>(Vec::new());
        assert!(outcome.value.is_none());
        assert!(outcome.failures.is_empty());
    }
}
