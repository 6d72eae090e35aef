//! Transitive dependency closure over descriptor files

use std::collections::{BTreeSet, HashSet, VecDeque};

/// Names of every file reachable from a root file's direct dependencies.
///
/// The root itself is not part of the result unless some dependency imports
/// it back. `deps_of` yields the direct dependencies of a file; files it
/// cannot resolve should yield an empty list and are still recorded.
/// Visited tracking is keyed by file name, so cycles terminate.
pub fn closure<F>(root_dependencies: &[String], mut deps_of: F) -> BTreeSet<String>
where
    F: FnMut(&str) -> Vec<String>,
{
    let mut todo: VecDeque<String> = root_dependencies.iter().cloned().collect();
    let mut done: HashSet<String> = HashSet::new();
    let mut result = BTreeSet::new();

    while let Some(current) = todo.pop_front() {
        if done.contains(&current) {
            continue;
        }
        todo.extend(deps_of(&current));
        result.insert(current.clone());
        done.insert(current);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn graph(edges: &[(&str, &[&str])]) -> HashMap<String, Vec<String>> {
        edges
            .iter()
            .map(|(from, to)| {
                (
                    from.to_string(),
                    to.iter().map(|s| s.to_string()).collect(),
                )
            })
            .collect()
    }

    fn walk(g: &HashMap<String, Vec<String>>, root: &str) -> (BTreeSet<String>, usize) {
        let mut visits = 0;
        let result = closure(&g[root], |name| {
            visits += 1;
            g.get(name).cloned().unwrap_or_default()
        });
        (result, visits)
    }

    #[test]
    fn test_diamond_visits_shared_dependency_once() {
        let g = graph(&[
            ("A", &["B", "C"]),
            ("B", &["D"]),
            ("C", &["D"]),
            ("D", &[]),
        ]);
        let (result, visits) = walk(&g, "A");
        let expected: BTreeSet<String> = ["B", "C", "D"].iter().map(|s| s.to_string()).collect();
        assert_eq!(result, expected);
        assert_eq!(visits, 3);
    }

    #[test]
    fn test_cycle_terminates() {
        let g = graph(&[("A", &["B"]), ("B", &["C"]), ("C", &["B", "A"])]);
        let (result, _) = walk(&g, "A");
        // A comes back in through C
        assert_eq!(result.len(), 3);
        assert!(result.contains("A"));
    }

    #[test]
    fn test_no_dependencies() {
        let g = graph(&[("A", &[])]);
        let (result, visits) = walk(&g, "A");
        assert!(result.is_empty());
        assert_eq!(visits, 0);
    }

    #[test]
    fn test_unresolvable_dependency_is_recorded() {
        let g = graph(&[("A", &["missing.proto"])]);
        let (result, _) = walk(&g, "A");
        assert!(result.contains("missing.proto"));
    }
}
