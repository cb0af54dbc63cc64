//! Derived layout facts for rendering a node row.

use super::NodeAccessor;
use crate::document::model::{NodeId, NodeKind, Scalar, TreeModel};

/// Which value editor a row uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RendererType {
    Container,
    Boolean,
    Number,
    String,
    ForeignKey,
    Ref,
}

impl RendererType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RendererType::Container => "container",
            RendererType::Boolean => "boolean",
            RendererType::Number => "number",
            RendererType::String => "string",
            RendererType::ForeignKey => "foreignKey",
            RendererType::Ref => "ref",
        }
    }
}

pub struct LayoutView<'a, M: TreeModel> {
    node: &'a NodeAccessor<M>,
}

impl<'a, M: TreeModel> LayoutView<'a, M> {
    pub(crate) fn new(node: &'a NodeAccessor<M>) -> Self {
        Self { node }
    }

    /// Parent hops to the root.
    pub fn depth(&self) -> usize {
        self.node
            .read(|m| {
                let mut depth = 0;
                let mut current = m.parent_id(self.node.id());
                while let Some(id) = current {
                    depth += 1;
                    current = m.parent_id(&id);
                }
                depth
            })
            .unwrap_or(0)
    }

    /// One entry per non-root ancestor, outermost first: `true` when that
    /// ancestor has a following sibling, so a vertical connector continues
    /// past this row at that level.
    pub fn guides(&self) -> Vec<bool> {
        self.node
            .read(|m| {
                let mut guides = Vec::new();
                let mut current = m.parent_id(self.node.id());
                while let Some(ancestor) = current {
                    let parent = m.parent_id(&ancestor);
                    if let Some(parent) = &parent {
                        guides.push(!is_last_child(m, parent, &ancestor));
                    }
                    current = parent;
                }
                guides.reverse();
                guides
            })
            .unwrap_or_default()
    }

    /// Whether this node is the last child of its parent. The root counts as
    /// last.
    pub fn is_last(&self) -> bool {
        self.node
            .read(|m| match m.parent_id(self.node.id()) {
                Some(parent) => is_last_child(m, &parent, self.node.id()),
                None => true,
            })
            .unwrap_or(true)
    }

    pub fn is_collapsible(&self) -> bool {
        self.node.child_count() > 0
    }

    /// Whether this node or any descendant can be collapsed.
    pub fn is_collapsible_tree(&self) -> bool {
        !self.collapsible_ids().is_empty()
    }

    /// Value editor for the row. Primitives are classified by the value
    /// they hold, not by a declared type.
    pub fn renderer_type(&self) -> RendererType {
        match self.node.kind() {
            Some(NodeKind::Object) | Some(NodeKind::Array) => RendererType::Container,
            Some(NodeKind::ForeignKey) => RendererType::ForeignKey,
            Some(NodeKind::Ref) => RendererType::Ref,
            Some(NodeKind::Primitive) | None => match self.node.value() {
                Some(Scalar::Bool(_)) => RendererType::Boolean,
                Some(Scalar::Number(_)) => RendererType::Number,
                _ => RendererType::String,
            },
        }
    }

    /// Summary shown in place of collapsed or long content.
    pub fn collapsed_label(&self) -> Option<String> {
        match self.node.kind()? {
            NodeKind::Array => Some(format!("<{} items>", self.node.child_count())),
            NodeKind::Object => Some(format!("<{} keys>", self.node.child_count())),
            NodeKind::Primitive => match self.node.value()? {
                Scalar::Text(text) if text.trim().is_empty() => Some("<empty text>".to_string()),
                Scalar::Text(text) => Some(format!(
                    "<text: {} words>",
                    text.split_whitespace().count()
                )),
                _ => None,
            },
            NodeKind::ForeignKey | NodeKind::Ref => None,
        }
    }

    /// Expands this node and every collapsible descendant.
    pub fn expand_all(&self) {
        if let Some(state) = self.node.tree_state() {
            state.expand_all(&self.collapsible_ids());
        }
    }

    /// Collapses this node and every collapsible descendant. On the root
    /// the root itself may stay expanded, depending on the tree settings.
    pub fn collapse_all(&self) {
        let Some(ctx) = self.node.context() else {
            return;
        };
        let keep_root = self.node.is_root() && ctx.settings.keep_root_expanded;
        ctx.state.collapse_all(&self.collapsible_ids(), keep_root);
    }

    /// Pre-order ids of this node and its descendants that have children.
    fn collapsible_ids(&self) -> Vec<NodeId> {
        self.node
            .read(|m| {
                let mut out = Vec::new();
                let mut stack = vec![self.node.id().clone()];
                while let Some(id) = stack.pop() {
                    let mut children = m.child_ids(&id);
                    if children.is_empty() {
                        continue;
                    }
                    out.push(id);
                    children.reverse();
                    stack.extend(children);
                }
                out
            })
            .unwrap_or_default()
    }
}

fn is_last_child<M: TreeModel>(model: &M, parent: &NodeId, id: &NodeId) -> bool {
    model.child_ids(parent).last() == Some(id)
}
