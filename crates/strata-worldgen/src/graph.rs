//! Complete-graph construction and Kruskal spanning trees, shared by the
//! district and room graphs.

use std::cmp::Ordering;

use glam::DVec2;

/// Undirected weighted edge between node indices, `from < to`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Edge {
    pub from: usize,
    pub to: usize,
    pub weight: f64,
}

/// Every pair of points, sorted by weight then by index pair so equal
/// distances resolve the same way on every run.
pub fn complete_graph(points: &[DVec2]) -> Vec<Edge> {
    let mut edges = Vec::with_capacity(points.len() * points.len().saturating_sub(1) / 2);
    for i in 0..points.len() {
        for j in (i + 1)..points.len() {
            edges.push(Edge {
                from: i,
                to: j,
                weight: points[i].distance(points[j]),
            });
        }
    }
    edges.sort_by(edge_order);
    edges
}

fn edge_order(a: &Edge, b: &Edge) -> Ordering {
    a.weight
        .total_cmp(&b.weight)
        .then(a.from.cmp(&b.from))
        .then(a.to.cmp(&b.to))
}

/// Kruskal's minimum spanning tree over edges already sorted by weight.
///
/// Returns a flag per edge: `true` when it belongs to the tree.
pub fn kruskal_mst(sorted_edges: &[Edge], num_nodes: usize) -> Vec<bool> {
    let mut parent: Vec<usize> = (0..num_nodes).collect();
    let mut rank = vec![0usize; num_nodes];

    fn find(parent: &mut [usize], i: usize) -> usize {
        if parent[i] != i {
            parent[i] = find(parent, parent[i]);
        }
        parent[i]
    }

    fn union(parent: &mut [usize], rank: &mut [usize], x: usize, y: usize) {
        if rank[x] < rank[y] {
            parent[x] = y;
        } else if rank[x] > rank[y] {
            parent[y] = x;
        } else {
            parent[y] = x;
            rank[x] += 1;
        }
    }

    sorted_edges
        .iter()
        .map(|edge| {
            let x = find(&mut parent, edge.from);
            let y = find(&mut parent, edge.to);
            if x == y {
                return false;
            }
            union(&mut parent, &mut rank, x, y);
            true
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_graph_sorted() {
        let points = [DVec2::ZERO, DVec2::new(3.0, 0.0), DVec2::new(1.0, 0.0)];
        let edges = complete_graph(&points);
        assert_eq!(edges.len(), 3);
        assert_eq!((edges[0].from, edges[0].to), (0, 2));
        assert_eq!((edges[1].from, edges[1].to), (1, 2));
        assert_eq!((edges[2].from, edges[2].to), (0, 1));
    }

    #[test]
    fn test_equal_weights_ordered_by_index() {
        let points = [
            DVec2::ZERO,
            DVec2::new(1.0, 0.0),
            DVec2::new(0.0, 1.0),
            DVec2::new(1.0, 1.0),
        ];
        let edges = complete_graph(&points);
        let unit: Vec<_> = edges
            .iter()
            .take_while(|e| e.weight == 1.0)
            .map(|e| (e.from, e.to))
            .collect();
        assert_eq!(unit, vec![(0, 1), (0, 2), (1, 3), (2, 3)]);
    }

    #[test]
    fn test_mst_spans_with_n_minus_one_edges() {
        let points: Vec<DVec2> = (0..6)
            .map(|i| DVec2::new(f64::from(i) * 2.0, f64::from(i % 2)))
            .collect();
        let edges = complete_graph(&points);
        let in_tree = kruskal_mst(&edges, points.len());
        assert_eq!(in_tree.iter().filter(|t| **t).count(), points.len() - 1);
    }

    #[test]
    fn test_single_node_has_no_edges() {
        let edges = complete_graph(&[DVec2::ONE]);
        assert!(edges.is_empty());
        assert!(kruskal_mst(&edges, 1).is_empty());
    }
}
