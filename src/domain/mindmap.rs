use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MindMapNode {
  pub topic: String,
  #[serde(default)]
  pub children: Vec<MindMapNode>,
}

impl MindMapNode {
  /// Number of levels in the tree; a lone root has depth 1.
  pub fn depth(&self) -> usize {
    1 + self.children.iter().map(|c| c.depth()).max().unwrap_or(0)
  }

  /// Drop every node below `max_depth` levels.
  pub fn prune(&mut self, max_depth: usize) {
    if max_depth <= 1 {
      self.children.clear();
      return;
    }
    for child in &mut self.children {
      child.prune(max_depth - 1);
    }
  }

  pub fn node_count(&self) -> usize {
    1 + self.children.iter().map(|c| c.node_count()).sum::<usize>()
  }
}
