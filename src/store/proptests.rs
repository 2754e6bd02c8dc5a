use proptest::prelude::*;

use super::GraphStore;
use crate::error::ReachError;

/// Parallel-edge counts, `adj[i][j]` edges from `i` to `j`.
#[derive(Clone, Debug)]
struct Model {
    adj: Vec<Vec<i64>>,
}

impl Model {
    fn new(n: usize, edges: &[(usize, usize)]) -> Self {
        let mut adj = vec![vec![0; n]; n];
        for &(i, j) in edges {
            adj[i][j] += 1;
        }
        Model { adj }
    }

    fn n(&self) -> usize {
        self.adj.len()
    }

    /// Distinct paths of length at least one, by plain recursion.
    fn paths(&self, i: usize, j: usize) -> i64 {
        (0..self.n())
            .filter(|&k| self.adj[i][k] > 0)
            .map(|k| self.adj[i][k] * (i64::from(k == j) + self.paths(k, j)))
            .sum()
    }

    fn reaches(&self, i: usize, j: usize) -> bool {
        let mut seen = vec![false; self.n()];
        let mut stack: Vec<usize> = (0..self.n()).filter(|&k| self.adj[i][k] > 0).collect();
        while let Some(k) = stack.pop() {
            if k == j {
                return true;
            }
            if !std::mem::replace(&mut seen[k], true) {
                stack.extend((0..self.n()).filter(|&m| self.adj[k][m] > 0));
            }
        }
        false
    }
}

/// A random DAG on `0..n`: edges always point forward in a shuffled rank
/// order, so vertex order and topological order disagree.
fn dag() -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
    (1usize..8)
        .prop_flat_map(|n| {
            (
                Just((0..n).collect::<Vec<_>>()).prop_shuffle(),
                prop::collection::vec((0..n, 0..n), 0..20),
            )
        })
        .prop_map(|(rank, pairs)| {
            let edges = pairs
                .into_iter()
                .filter(|(a, b)| a != b)
                .map(|(a, b)| (rank[a.min(b)], rank[a.max(b)]))
                .collect();
            (rank.len(), edges)
        })
}

fn store(n: usize, edges: &[(usize, usize)]) -> GraphStore<usize> {
    let mut builder = GraphStore::builder();
    builder.add_nodes(0..n);
    for &(a, b) in edges {
        builder.add_edge(a, b);
    }
    builder.build().unwrap()
}

fn assert_matches(graph: &GraphStore<usize>, model: &Model) -> Result<(), TestCaseError> {
    for i in 0..model.n() {
        for j in 0..model.n() {
            prop_assert_eq!(graph.path_count(&i, &j), Ok(model.paths(i, j)));
            prop_assert_eq!(graph.does_path_exist(&i, &j), Ok(model.reaches(i, j)));
        }
        let ancestors: Vec<usize> = (0..model.n()).filter(|&a| model.reaches(a, i)).collect();
        prop_assert_eq!(graph.get_ancestors(&i), Ok(ancestors));
    }
    Ok(())
}

proptest! {
    #[test]
    fn construction_matches_brute_force((n, edges) in dag()) {
        let graph = store(n, &edges);
        assert_matches(&graph, &Model::new(n, &edges))?;
    }

    #[test]
    fn mutations_preserve_reachability(
        (n, edges) in dag(),
        ops in prop::collection::vec((any::<bool>(), 0usize..8, 0usize..8), 0..30),
    ) {
        let graph = store(n, &edges);
        let mut model = Model::new(n, &edges);

        for (insert, a, b) in ops {
            let (a, b) = (a % n, b % n);
            if insert {
                let allowed = a != b && model.adj[a][b] == 0 && !model.reaches(b, a);
                let result = graph.add_edge(&a, &b);
                prop_assert_eq!(result.is_ok(), allowed, "add {} -> {}: {:?}", a, b, result);
                if allowed {
                    model.adj[a][b] += 1;
                }
            } else {
                let result = graph.remove_edge(&a, &b);
                if model.adj[a][b] > 0 {
                    prop_assert_eq!(result, Ok(()));
                    model.adj[a][b] -= 1;
                } else {
                    prop_assert_eq!(result, Err(ReachError::EdgeNotFound { from: a, to: b }));
                }
            }
            assert_matches(&graph, &model)?;
        }
        prop_assert!(graph.is_consistent());
    }

    #[test]
    fn add_then_remove_restores_matrices(
        (n, edges) in dag(),
        a in 0usize..8,
        b in 0usize..8,
    ) {
        let (a, b) = (a % n, b % n);
        let graph = store(n, &edges);
        let (r, adj) = (graph.reachability(), graph.adjacency());

        if graph.add_edge(&a, &b).is_ok() {
            graph.remove_edge(&a, &b).unwrap();
        }
        prop_assert_eq!(graph.reachability(), r);
        prop_assert_eq!(graph.adjacency(), adj);
    }

    #[test]
    fn removing_sinks_keeps_the_rest((n, edges) in dag()) {
        let graph = store(n, &edges);
        let mut model = Model::new(n, &edges);

        let sinks: Vec<usize> = (0..n).filter(|&v| model.adj[v].iter().all(|&e| e == 0)).collect();
        for &v in &sinks {
            graph.remove_node(&v).unwrap();
            for row in &mut model.adj {
                row[v] = 0;
            }
        }

        let live: Vec<usize> = (0..n).filter(|v| !sinks.contains(v)).collect();
        prop_assert_eq!(graph.get_nodes(), live.clone());
        for &i in &live {
            for &j in &live {
                prop_assert_eq!(graph.path_count(&i, &j), Ok(model.paths(i, j)));
            }
        }
        prop_assert!(graph.is_consistent());
    }
}
