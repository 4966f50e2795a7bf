//! Dependency ordering of a node's subgraph.

use std::collections::HashMap;

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::error::GraphError;
use crate::graph::{Graph, Node, NodeId};

impl Graph {
    /// Nodes `root` depends on (including `root`), inputs before consumers.
    ///
    /// Inputs of nodes for which `is_boundary` holds are not visited, so a
    /// boundary node appears in the order without its dependencies.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::Cycle` if the subgraph is not a DAG.
    pub(crate) fn dependency_order<F>(
        &self,
        root: NodeId,
        is_boundary: F,
    ) -> Result<Vec<NodeId>, GraphError>
    where
        F: Fn(&Node) -> bool,
    {
        let mut dag: DiGraph<NodeId, ()> = DiGraph::new();
        let mut node_to_idx: HashMap<NodeId, NodeIndex> = HashMap::new();
        let mut stack = vec![root];

        self.node_checked(root)?;
        node_to_idx.insert(root, dag.add_node(root));
        while let Some(id) = stack.pop() {
            let node = self.node_checked(id)?;
            if is_boundary(node) {
                continue;
            }
            let consumer = node_to_idx[&id];
            for &input in &node.inputs {
                let input_idx = match node_to_idx.get(&input) {
                    Some(&idx) => idx,
                    None => {
                        self.node_checked(input)?;
                        let idx = dag.add_node(input);
                        node_to_idx.insert(input, idx);
                        stack.push(input);
                        idx
                    }
                };
                // Edge from input to consumer: inputs sort first.
                dag.add_edge(input_idx, consumer, ());
            }
        }

        let order = toposort(&dag, None)
            .map_err(|cycle| GraphError::Cycle(dag[cycle.node_id()].index()))?;
        Ok(order.into_iter().map(|idx| dag[idx]).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inputs_precede_consumers() {
        let mut g = Graph::new();
        let x = g.var("x", &[1]).unwrap();
        let a = g.sin(&x).unwrap();
        let b = g.cos(&x).unwrap();
        let y = g.mul(&a, &b).unwrap();
        let order = g.dependency_order(y.node_id(), |_| false).unwrap();

        assert_eq!(order.len(), 4);
        let position = |id: NodeId| order.iter().position(|&n| n == id).unwrap();
        assert!(position(x.node_id()) < position(a.node_id()));
        assert!(position(x.node_id()) < position(b.node_id()));
        assert!(position(a.node_id()) < position(y.node_id()));
        assert!(position(b.node_id()) < position(y.node_id()));
        assert_eq!(order.last(), Some(&y.node_id()));
    }

    #[test]
    fn test_boundary_stops_descent() {
        let mut g = Graph::new();
        let x = g.var("x", &[1]).unwrap();
        let a = g.sin(&x).unwrap();
        let y = g.exp(&a).unwrap();
        let order = g
            .dependency_order(y.node_id(), |node| node.id() == a.node_id())
            .unwrap();
        assert_eq!(order, vec![a.node_id(), y.node_id()]);
    }

    #[test]
    fn test_cycle_detected() {
        let mut g = Graph::new();
        let x = g.var("x", &[1]).unwrap();
        let y = g.sin(&x).unwrap();
        // Builders cannot create cycles; corrupt the arena directly.
        g.nodes[x.node_id().index()].op = Some(crate::ops::Op::Neg);
        g.nodes[x.node_id().index()].inputs.push(y.node_id());
        assert!(matches!(
            g.dependency_order(y.node_id(), |_| false),
            Err(GraphError::Cycle(_))
        ));
    }
}
