//! Text rendering of the collection hierarchy.

use crate::domain::CollectionNode;
use crate::mirror::{evaluate, FilterMask, Inclusion};

/// Draw `roots` as an indented tree, one collection per line.
///
/// With a mask, collections it would prune are marked `(skipped)` and their
/// descendants are not drawn.
pub fn render_forest(roots: &[CollectionNode], mask: Option<&FilterMask>) -> String {
    let mut lines = Vec::new();
    for root in roots {
        lines.push(root.name.clone());
        walk_tree(&root.children, "", mask, &mut lines);
    }
    lines.join("\n")
}

fn walk_tree(
    nodes: &[CollectionNode],
    prefix: &str,
    mask: Option<&FilterMask>,
    lines: &mut Vec<String>,
) {
    let total = nodes.len();
    for (idx, node) in nodes.iter().enumerate() {
        let is_last = idx + 1 == total;
        let connector = if is_last { "└── " } else { "├── " };

        let (marker, nested) = match evaluate(mask, &node.dir_name()) {
            Inclusion::Excluded => (" (skipped)", None),
            Inclusion::Full => ("", Some(None)),
            Inclusion::Partial(child) => ("", Some(Some(child))),
        };
        lines.push(format!("{prefix}{connector}{}{marker}", node.name));

        if let Some(child_mask) = nested {
            let extension = if is_last { "    " } else { "│   " };
            walk_tree(&node.children, &format!("{prefix}{extension}"), child_mask, lines);
        }
    }
}
