use std::collections::HashSet;

use crate::error::StructuralError;
use crate::model::MindMapData;

impl MindMapData {
    /// Checks that the map is a well-formed forest and reports the first
    /// violation in the order documented on [`MindMapData::violations`].
    pub fn validate(&self) -> Result<(), StructuralError> {
        match self.violations().into_iter().next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Every structural violation, in check order: empty ids and key/id
    /// mismatches, root list entries, children lists, parent back-links,
    /// unlisted roots, then cycles. Node-level checks run in key order.
    pub fn violations(&self) -> Vec<StructuralError> {
        let mut found = Vec::new();
        self.check_keys(&mut found);
        self.check_roots(&mut found);
        self.check_children(&mut found);
        self.check_parents(&mut found);
        self.check_unlisted_roots(&mut found);
        self.check_cycles(&mut found);
        found
    }

    fn check_keys(&self, found: &mut Vec<StructuralError>) {
        for (key, node) in &self.nodes {
            if node.id.is_empty() {
                found.push(StructuralError::EmptyId);
            }
            if *key != node.id {
                found.push(StructuralError::KeyMismatch {
                    key: key.clone(),
                    id: node.id.clone(),
                });
            }
        }
    }

    fn check_roots(&self, found: &mut Vec<StructuralError>) {
        let mut seen = HashSet::new();
        for id in &self.root_ids {
            if !seen.insert(id.as_str()) {
                found.push(StructuralError::DuplicateRoot { id: id.clone() });
                continue;
            }
            match self.nodes.get(id) {
                None => found.push(StructuralError::MissingRoot { id: id.clone() }),
                Some(node) => {
                    if let Some(parent) = &node.parent_id {
                        found.push(StructuralError::RootHasParent {
                            id: id.clone(),
                            parent: parent.clone(),
                        });
                    }
                }
            }
        }
    }

    fn check_children(&self, found: &mut Vec<StructuralError>) {
        for (id, node) in &self.nodes {
            let mut seen = HashSet::new();
            for child_id in &node.children {
                if !seen.insert(child_id.as_str()) {
                    found.push(StructuralError::DuplicateChild {
                        parent: id.clone(),
                        child: child_id.clone(),
                    });
                    continue;
                }
                match self.nodes.get(child_id) {
                    None => found.push(StructuralError::DanglingChild {
                        parent: id.clone(),
                        child: child_id.clone(),
                    }),
                    Some(child) if child.parent_id.as_deref() != Some(id.as_str()) => {
                        found.push(StructuralError::ParentMismatch {
                            parent: id.clone(),
                            child: child_id.clone(),
                            actual: child.parent_id.clone(),
                        })
                    }
                    Some(_) => {}
                }
            }
        }
    }

    fn check_parents(&self, found: &mut Vec<StructuralError>) {
        for (id, node) in &self.nodes {
            let Some(parent_id) = &node.parent_id else {
                continue;
            };
            match self.nodes.get(parent_id) {
                None => found.push(StructuralError::DanglingParent {
                    child: id.clone(),
                    parent: parent_id.clone(),
                }),
                Some(parent) if !parent.children.contains(id) => {
                    found.push(StructuralError::MissingChildLink {
                        child: id.clone(),
                        parent: parent_id.clone(),
                    })
                }
                Some(_) => {}
            }
        }
    }

    fn check_unlisted_roots(&self, found: &mut Vec<StructuralError>) {
        for (id, node) in &self.nodes {
            if node.parent_id.is_none() && !self.root_ids.contains(id) {
                found.push(StructuralError::UnlistedRoot { id: id.clone() });
            }
        }
    }

    /// Follows each parent chain once. A chain ends at a root, at a dangling
    /// parent, or at a node already settled by an earlier chain; re-entering
    /// the current chain is a cycle, reported once at the re-entered node.
    fn check_cycles(&self, found: &mut Vec<StructuralError>) {
        let mut settled: HashSet<&str> = HashSet::new();

        for start in self.nodes.keys() {
            if settled.contains(start.as_str()) {
                continue;
            }

            let mut chain: Vec<&str> = Vec::new();
            let mut on_chain: HashSet<&str> = HashSet::new();
            let mut current = Some(start.as_str());

            while let Some(id) = current {
                if settled.contains(id) {
                    break;
                }
                if !on_chain.insert(id) {
                    found.push(StructuralError::Cycle { id: id.to_string() });
                    break;
                }
                chain.push(id);
                current = self
                    .nodes
                    .get(id)
                    .and_then(|node| node.parent_id.as_deref())
                    .filter(|parent| self.nodes.contains_key(*parent));
            }

            settled.extend(chain);
        }
    }
}
