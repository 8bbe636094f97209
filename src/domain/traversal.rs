//! Canonical traversal shared by every encoder.
//!
//! The walk is a depth-first pre-order visit: a node is emitted (and its id
//! allocated) before any of its children, singular slots are visited before list
//! slots, slots follow declared order and list items follow list order. Ids are
//! therefore a pure function of visit rank.

use crate::domain::node::NodeView;
use crate::domain::session::ExportSession;
use crate::domain::text::singularize;
use crate::ports::Encoder;

/// Run one full export traversal from `root` and return the encoder's document.
pub fn run<N, E>(root: &N, mut encoder: E) -> String
where
    N: NodeView,
    E: Encoder<N>,
{
    let mut session = ExportSession::new();
    walk(root, None, "root", &mut session, &mut encoder);
    encoder.finish()
}

/// Visit `node` and its subtree, allocating ids from `session`.
pub fn walk<N, E>(
    node: &N,
    parent_id: Option<&str>,
    slot: &str,
    session: &mut ExportSession,
    encoder: &mut E,
) where
    N: NodeView,
    E: Encoder<N>,
{
    let id = session.next_node_id();
    encoder.emit_node(&id, slot, node);

    if let Some(parent) = parent_id {
        let edge_id = session.next_edge_id();
        encoder.emit_edge(&edge_id, parent, &id);
    }

    for (name, child) in node.singular_children() {
        if let Some(child) = child {
            walk(child, Some(&id), name, session, encoder);
        }
    }

    for (name, items) in node.list_children() {
        if items.is_empty() {
            continue;
        }
        let item_slot = singularize(name);
        let list_parent = encoder
            .enter_list(session, &id, name, items.len())
            .unwrap_or_else(|| id.clone());
        for item in items {
            walk(item, Some(&list_parent), item_slot, session, encoder);
        }
        encoder.leave_list(name);
    }

    encoder.leave_node(&id, slot, node);
}
