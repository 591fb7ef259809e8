use std::collections::HashMap;

use crate::models::PopulationNode;

/// A node under construction; `child` indexes into the arena
#[derive(Debug)]
struct PendingNode {
    path: String,
    child: Option<usize>,
}

/// Per-call construction state.
///
/// Nodes are keyed by their parent node and segment, so every requested
/// path that shares a prefix (`author`, `author.profile`) extends the same
/// node and each segment is stored once.
#[derive(Debug, Default)]
struct PopulationBuilder {
    nodes: Vec<PendingNode>,
    by_parent: HashMap<(Option<usize>, String), usize>,
    roots: Vec<usize>,
}

impl PopulationBuilder {
    fn add_path(&mut self, path: &str) {
        let mut parent: Option<usize> = None;

        for segment in path.split('.') {
            let key = (parent, segment.to_string());
            let index = match self.by_parent.get(&key) {
                Some(&index) => index,
                None => {
                    self.nodes.push(PendingNode {
                        path: key.1.clone(),
                        child: None,
                    });
                    let index = self.nodes.len() - 1;
                    self.by_parent.insert(key, index);
                    if parent.is_none() {
                        self.roots.push(index);
                    }
                    index
                }
            };

            // a node holds a single child; the latest path wins
            if let Some(parent) = parent {
                self.nodes[parent].child = Some(index);
            }
            parent = Some(index);
        }
    }

    fn build(self) -> Vec<PopulationNode> {
        self.roots.iter().map(|&root| self.materialize(root)).collect()
    }

    /// Children are always created after their parent, so the walk ends
    fn materialize(&self, root: usize) -> PopulationNode {
        let mut ancestors = Vec::new();
        let mut current = root;
        while let Some(child) = self.nodes[current].child {
            ancestors.push(current);
            current = child;
        }

        let mut node = PopulationNode::new(self.nodes[current].path.clone());
        for index in ancestors.into_iter().rev() {
            let mut parent = PopulationNode::new(self.nodes[index].path.clone());
            parent.populate = Some(Box::new(node));
            node = parent;
        }
        node
    }
}

/// `populate=author.profile,comments` → one root node per distinct relation
#[must_use]
pub fn build_population(population: &str) -> Vec<PopulationNode> {
    let mut builder = PopulationBuilder::default();
    for path in population.split(',').filter(|path| !path.is_empty()) {
        builder.add_path(path);
    }
    builder.build()
}
