//! MHTML parsing: MIME envelope walk, script discovery in the HTML body, and file naming.

pub mod mime;
pub mod naming;
pub mod script;

/// Drop the failed outcomes of a best-effort pass, logging each one.
///
/// Both the envelope walk and the external fetch loop produce one outcome
/// per unit of work; only the successes reach the resource list.
pub fn keep_successes<T, E: std::fmt::Display>(
    outcomes: Vec<std::result::Result<T, E>>,
    phase: &str,
) -> Vec<T> {
    outcomes
        .into_iter()
        .filter_map(|outcome| match outcome {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::warn!(phase, error = %e, "Skipping unit");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keep_successes_preserves_order() {
        let outcomes: Vec<Result<u32, String>> =
            vec![Ok(1), Err("bad".into()), Ok(3), Err("worse".into()), Ok(5)];
        assert_eq!(keep_successes(outcomes, "test"), vec![1, 3, 5]);
    }

    #[test]
    fn test_keep_successes_all_failed() {
        let outcomes: Vec<Result<u32, String>> = vec![Err("a".into()), Err("b".into())];
        assert!(keep_successes(outcomes, "test").is_empty());
    }
}
