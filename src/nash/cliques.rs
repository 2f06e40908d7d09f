//! Connected components of the equilibrium set.
//!
//! Extreme equilibria are edges of a bipartite graph between player 1's and
//! player 2's polytope vertices. Two equilibria that share a vertex lie in a
//! common convex set of equilibria, so the components of this graph are the
//! connected components ("cliques") of the equilibrium set.
//!
//! ```text
//!   P vertices        Q vertices
//!      x0 ───────────── y0        equilibria: (x0,y0) (x0,y1) (x1,y2)
//!         └──────────── y1        components: {0, 1} {2}
//!      x1 ───────────── y2
//! ```

use std::collections::BTreeSet;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::nash::enummixed::EnumMixedSolution;
use crate::nash::number::Scalar;

/// A maximal Nash subset: every pairing of a `first` vertex with a `second`
/// vertex is an extreme equilibrium, so their convex hulls form a convex set
/// of equilibria.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NashSubset {
    /// Player 1 vertex indices, ascending.
    pub first: Vec<usize>,
    /// Player 2 vertex indices, ascending.
    pub second: Vec<usize>,
    /// Indices of the extreme equilibria inside the subset, ascending.
    pub equilibria: Vec<usize>,
}

/// Groups extreme equilibria by the polytope vertices they share.
#[derive(Debug, Clone)]
pub struct CliqueBuilder {
    pairs: Vec<(usize, usize)>,
}

impl CliqueBuilder {
    /// Builder over the equilibria of an enumeration result.
    pub fn new<T: Scalar>(solution: &EnumMixedSolution<T>) -> Self {
        Self::from_pairs(solution.vertex_pairs())
    }

    /// Builder over raw `(player 1 vertex, player 2 vertex)` pairs.
    pub fn from_pairs(pairs: Vec<(usize, usize)>) -> Self {
        Self { pairs }
    }

    /// Number of equilibria.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether there are no equilibria.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Partition the equilibria into connected components.
    ///
    /// Components are ordered by their first equilibrium and list their
    /// members ascending, so every equilibrium appears exactly once.
    pub fn build(&self) -> Vec<Vec<usize>> {
        let mut sets = DisjointSets::new(self.pairs.len());
        let mut first_seen: [FxHashMap<usize, usize>; 2] = Default::default();

        for (index, &(x, y)) in self.pairs.iter().enumerate() {
            for (side, vertex) in [(0, x), (1, y)] {
                match first_seen[side].get(&vertex).copied() {
                    Some(earlier) => sets.union(earlier, index),
                    None => {
                        first_seen[side].insert(vertex, index);
                    }
                }
            }
        }

        let mut slot: FxHashMap<usize, usize> = FxHashMap::default();
        let mut cliques: Vec<Vec<usize>> = Vec::new();
        for index in 0..self.pairs.len() {
            let root = sets.find(index);
            let position = *slot.entry(root).or_insert_with(|| {
                cliques.push(Vec::new());
                cliques.len() - 1
            });
            cliques[position].push(index);
        }
        cliques
    }

    /// All maximal Nash subsets.
    ///
    /// These are the maximal bicliques of the vertex graph. Each one is found
    /// as a closed pair: a set of player 2 vertices obtained by intersecting
    /// neighbourhoods, together with every player 1 vertex adjacent to all of
    /// them. Subsets of the same component may overlap.
    pub fn maximal_nash_subsets(&self) -> Vec<NashSubset> {
        let mut neighbours: Vec<(usize, BTreeSet<usize>)> = Vec::new();
        for &(x, y) in &self.pairs {
            match neighbours.iter_mut().find(|(v, _)| *v == x) {
                Some((_, set)) => {
                    set.insert(y);
                }
                None => neighbours.push((x, BTreeSet::from([y]))),
            }
        }

        let mut closed: Vec<BTreeSet<usize>> = Vec::new();
        for (_, set) in &neighbours {
            if !closed.contains(set) {
                closed.push(set.clone());
            }
        }
        let mut cursor = 0;
        while cursor < closed.len() {
            for other in 0..cursor {
                let meet: BTreeSet<usize> = closed[cursor].intersection(&closed[other]).copied().collect();
                if !meet.is_empty() && !closed.contains(&meet) {
                    closed.push(meet);
                }
            }
            cursor += 1;
        }

        closed
            .into_iter()
            .map(|second| {
                let mut first: Vec<usize> = neighbours
                    .iter()
                    .filter(|(_, set)| second.is_subset(set))
                    .map(|(v, _)| *v)
                    .collect();
                first.sort_unstable();
                let equilibria = self
                    .pairs
                    .iter()
                    .enumerate()
                    .filter(|(_, (x, y))| first.contains(x) && second.contains(y))
                    .map(|(i, _)| i)
                    .collect();
                NashSubset {
                    first,
                    second: second.into_iter().collect(),
                    equilibria,
                }
            })
            .collect()
    }
}

/// Union-find with path halving.
struct DisjointSets {
    parent: Vec<usize>,
}

impl DisjointSets {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            // Smaller index stays root.
            let (root, child) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[child] = root;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disjoint_equilibria_stay_apart() {
        let builder = CliqueBuilder::from_pairs(vec![(1, 1), (2, 2), (3, 3)]);
        assert_eq!(builder.build(), vec![vec![0], vec![1], vec![2]]);
    }

    #[test]
    fn test_shared_vertices_join_components() {
        // (1,1)-(1,2) share x1, (4,2) joins through y2, (5,6) is alone.
        let builder = CliqueBuilder::from_pairs(vec![(1, 1), (5, 6), (1, 2), (4, 2)]);
        assert_eq!(builder.build(), vec![vec![0, 2, 3], vec![1]]);
    }

    #[test]
    fn test_components_partition_equilibria() {
        let pairs = vec![(0, 3), (1, 4), (2, 3), (1, 5), (6, 7), (2, 7)];
        let cliques = CliqueBuilder::from_pairs(pairs.clone()).build();
        let mut seen: Vec<usize> = cliques.iter().flatten().copied().collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..pairs.len()).collect::<Vec<_>>());
        assert_eq!(cliques, vec![vec![0, 2, 4, 5], vec![1, 3]]);
    }

    #[test]
    fn test_maximal_nash_subsets() {
        // x0 meets y0 and y1, x1 meets y1 only.
        let builder = CliqueBuilder::from_pairs(vec![(0, 0), (0, 1), (1, 1)]);
        let subsets = builder.maximal_nash_subsets();
        assert_eq!(
            subsets,
            vec![
                NashSubset {
                    first: vec![0],
                    second: vec![0, 1],
                    equilibria: vec![0, 1],
                },
                NashSubset {
                    first: vec![0, 1],
                    second: vec![1],
                    equilibria: vec![1, 2],
                },
            ]
        );
        assert_eq!(builder.build().len(), 1);
    }

    #[test]
    fn test_empty() {
        let builder = CliqueBuilder::from_pairs(Vec::new());
        assert!(builder.is_empty());
        assert!(builder.build().is_empty());
        assert!(builder.maximal_nash_subsets().is_empty());
    }
}
