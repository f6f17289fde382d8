use tracing::debug;

use crate::error::{EditError, StructuralError};
use crate::model::{MindMapData, Node};

/// Owner of a [`MindMapData`] that is known to be a valid forest.
///
/// Data only enters through [`MindMapStore::from_data`], which validates it,
/// and every edit below keeps it valid. A refused edit leaves the store as it
/// was.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MindMapStore {
    data: MindMapData,
}

impl MindMapStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_data(data: MindMapData) -> Result<Self, StructuralError> {
        data.validate()?;
        Ok(Self { data })
    }

    pub fn data(&self) -> &MindMapData {
        &self.data
    }

    pub fn into_data(self) -> MindMapData {
        self.data
    }

    /// Always passes for a store built through this API; kept for callers
    /// that want to assert it.
    pub fn validate(&self) -> Result<(), StructuralError> {
        self.data.validate()
    }

    pub fn len(&self) -> usize {
        self.data.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.nodes.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.data.nodes.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&Node> {
        self.data.nodes.get(id)
    }

    pub fn root_ids(&self) -> &[String] {
        &self.data.root_ids
    }

    pub fn roots(&self) -> impl Iterator<Item = &Node> + '_ {
        self.data
            .root_ids
            .iter()
            .filter_map(|id| self.data.nodes.get(id))
    }

    /// Direct children in display order. Empty for unknown ids.
    pub fn children<'a>(&'a self, id: &str) -> impl Iterator<Item = &'a Node> + use<'a> {
        self.data
            .nodes
            .get(id)
            .map(|node| node.children.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(|child| self.data.nodes.get(child))
    }

    pub fn parent(&self, id: &str) -> Option<&Node> {
        let parent_id = self.data.nodes.get(id)?.parent_id.as_deref()?;
        self.data.nodes.get(parent_id)
    }

    /// Ancestors from the direct parent up to the root.
    pub fn ancestors(&self, id: &str) -> Vec<&Node> {
        let mut chain = Vec::new();
        let mut current = self.parent(id);
        while let Some(node) = current {
            chain.push(node);
            current = self.parent(&node.id);
        }
        chain
    }

    /// Roots sit at depth 0.
    pub fn depth(&self, id: &str) -> Option<usize> {
        self.contains(id).then(|| self.ancestors(id).len())
    }

    /// The subtree below `id` in pre-order, without `id` itself.
    pub fn descendants(&self, id: &str) -> Vec<&Node> {
        let Some(node) = self.get(id) else {
            return Vec::new();
        };
        Walk::new(&self.data, &node.children, false)
            .map(|(_, node)| node)
            .collect()
    }

    pub fn is_descendant(&self, id: &str, ancestor: &str) -> bool {
        self.ancestors(id).iter().any(|node| node.id == ancestor)
    }

    /// Pre-order walk of the whole forest in display order.
    pub fn walk(&self) -> Walk<'_> {
        Walk::new(&self.data, &self.data.root_ids, false)
    }

    /// Like [`MindMapStore::walk`] but collapsed nodes hide their subtree.
    pub fn visible(&self) -> Walk<'_> {
        Walk::new(&self.data, &self.data.root_ids, true)
    }

    /// Adds a new top-level node at `index` in the root list, or at the end.
    pub fn insert_root(&mut self, node: Node, index: Option<usize>) -> Result<(), EditError> {
        self.check_insertable(&node)?;
        let index = resolve_index(index, self.data.root_ids.len())?;

        let mut node = node;
        node.parent_id = None;
        debug!(id = %node.id, index, "inserting root node");
        self.data.root_ids.insert(index, node.id.clone());
        self.data.nodes.insert(node.id.clone(), node);
        Ok(())
    }

    /// Adds a new node under `parent_id` at `index`, or at the end.
    pub fn insert_child(
        &mut self,
        parent_id: &str,
        node: Node,
        index: Option<usize>,
    ) -> Result<(), EditError> {
        self.check_insertable(&node)?;
        let siblings = self
            .data
            .nodes
            .get(parent_id)
            .ok_or_else(|| EditError::UnknownNode(parent_id.to_string()))?
            .children
            .len();
        let index = resolve_index(index, siblings)?;

        let mut node = node;
        node.parent_id = Some(parent_id.to_string());
        debug!(id = %node.id, parent = parent_id, index, "inserting child node");
        if let Some(parent) = self.data.nodes.get_mut(parent_id) {
            parent.children.insert(index, node.id.clone());
        }
        self.data.nodes.insert(node.id.clone(), node);
        Ok(())
    }

    /// Removes `id` and everything below it. Returns the removed nodes in
    /// pre-order, starting with `id`.
    pub fn remove(&mut self, id: &str) -> Result<Vec<Node>, EditError> {
        if !self.contains(id) {
            return Err(EditError::UnknownNode(id.to_string()));
        }

        let mut order: Vec<String> = vec![id.to_string()];
        order.extend(self.descendants(id).into_iter().map(|node| node.id.clone()));

        self.detach(id);
        let removed: Vec<Node> = order
            .iter()
            .filter_map(|node_id| self.data.nodes.remove(node_id))
            .collect();
        debug!(id, count = removed.len(), "removed subtree");
        Ok(removed)
    }

    /// Moves the subtree at `id` under `new_parent`, or to the roots when
    /// `new_parent` is `None`. `index` is taken among the destination
    /// siblings after `id` has been taken out.
    pub fn reparent(
        &mut self,
        id: &str,
        new_parent: Option<&str>,
        index: Option<usize>,
    ) -> Result<(), EditError> {
        if !self.contains(id) {
            return Err(EditError::UnknownNode(id.to_string()));
        }

        let sibling_count = match new_parent {
            Some(target) => {
                let parent = self
                    .get(target)
                    .ok_or_else(|| EditError::UnknownNode(target.to_string()))?;
                if target == id || self.is_descendant(target, id) {
                    return Err(EditError::WouldCycle {
                        id: id.to_string(),
                        target: target.to_string(),
                    });
                }
                parent.children.iter().filter(|child| *child != id).count()
            }
            None => self.data.root_ids.iter().filter(|root| *root != id).count(),
        };
        let index = resolve_index(index, sibling_count)?;

        self.detach(id);
        match new_parent {
            Some(target) => {
                if let Some(parent) = self.data.nodes.get_mut(target) {
                    parent.children.insert(index, id.to_string());
                }
            }
            None => self.data.root_ids.insert(index, id.to_string()),
        }
        if let Some(node) = self.data.nodes.get_mut(id) {
            node.parent_id = new_parent.map(str::to_string);
        }
        debug!(id, parent = ?new_parent, index, "reparented node");
        Ok(())
    }

    pub fn set_text(&mut self, id: &str, text: impl Into<String>) -> Result<(), EditError> {
        self.node_mut(id)?.text = text.into();
        Ok(())
    }

    pub fn move_to(&mut self, id: &str, x: f64, y: f64) -> Result<(), EditError> {
        check_position(x, y)?;
        let node = self.node_mut(id)?;
        node.x = x;
        node.y = y;
        Ok(())
    }

    pub fn resize(&mut self, id: &str, width: f64, height: f64) -> Result<(), EditError> {
        check_size(width, height)?;
        let node = self.node_mut(id)?;
        node.width = width;
        node.height = height;
        Ok(())
    }

    pub fn set_collapsed(&mut self, id: &str, collapsed: bool) -> Result<(), EditError> {
        self.node_mut(id)?.collapsed = collapsed;
        Ok(())
    }

    /// Flips the collapsed flag and returns the new value.
    pub fn toggle_collapsed(&mut self, id: &str) -> Result<bool, EditError> {
        let node = self.node_mut(id)?;
        node.collapsed = !node.collapsed;
        Ok(node.collapsed)
    }

    /// Only non-structural fields may be changed through this.
    fn node_mut(&mut self, id: &str) -> Result<&mut Node, EditError> {
        self.data
            .nodes
            .get_mut(id)
            .ok_or_else(|| EditError::UnknownNode(id.to_string()))
    }

    fn check_insertable(&self, node: &Node) -> Result<(), EditError> {
        if node.id.is_empty() {
            return Err(EditError::EmptyId);
        }
        if self.contains(&node.id) {
            return Err(EditError::DuplicateId(node.id.clone()));
        }
        if !node.children.is_empty() {
            return Err(EditError::ChildrenNotEmpty(node.id.clone()));
        }
        check_position(node.x, node.y)?;
        check_size(node.width, node.height)
    }

    /// Unlinks `id` from its parent's children or from the root list. The
    /// node's own `parent_id` is left for the caller to overwrite.
    fn detach(&mut self, id: &str) {
        let parent_id = self.get(id).and_then(|node| node.parent_id.clone());
        match parent_id {
            Some(parent_id) => {
                if let Some(parent) = self.data.nodes.get_mut(&parent_id) {
                    parent.children.retain(|child| child != id);
                }
            }
            None => self.data.root_ids.retain(|root| root != id),
        }
    }
}

fn check_position(x: f64, y: f64) -> Result<(), EditError> {
    if !x.is_finite() || !y.is_finite() {
        return Err(EditError::InvalidCoordinate { x, y });
    }
    Ok(())
}

fn check_size(width: f64, height: f64) -> Result<(), EditError> {
    let valid = |value: f64| value.is_finite() && value >= 0.0;
    if !valid(width) || !valid(height) {
        return Err(EditError::InvalidSize { width, height });
    }
    Ok(())
}

fn resolve_index(index: Option<usize>, len: usize) -> Result<usize, EditError> {
    match index {
        None => Ok(len),
        Some(index) if index <= len => Ok(index),
        Some(index) => Err(EditError::IndexOutOfRange { index, len }),
    }
}

/// Pre-order iterator over a forest, yielding `(depth, node)` with depth
/// counted from the starting nodes.
pub struct Walk<'a> {
    data: &'a MindMapData,
    stack: Vec<(usize, &'a str)>,
    skip_collapsed: bool,
}

impl<'a> Walk<'a> {
    fn new(data: &'a MindMapData, start: &'a [String], skip_collapsed: bool) -> Self {
        let stack = start.iter().rev().map(|id| (0, id.as_str())).collect();
        Self {
            data,
            stack,
            skip_collapsed,
        }
    }
}

impl<'a> Iterator for Walk<'a> {
    type Item = (usize, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        let data = self.data;
        while let Some((depth, id)) = self.stack.pop() {
            let Some(node) = data.nodes.get(id) else {
                continue;
            };
            if !(self.skip_collapsed && node.collapsed) {
                self.stack.extend(
                    node.children
                        .iter()
                        .rev()
                        .map(|child| (depth + 1, child.as_str())),
                );
            }
            return Some((depth, node));
        }
        None
    }
}
