//! Hierarchy Tests
//!
//! Tests for:
//! - attach / detach and the sibling chain
//! - cycle and self-attach rejection
//! - destroy (orphaning) vs destroy_subtree (cascading)
//! - queries: children, descendants, depth, root_of, find_child
//! - stale handles

use glam::Vec3;
use myth_scene::scene::{NodeHandle, SceneGraph};

fn children(graph: &SceneGraph, parent: NodeHandle) -> Vec<NodeHandle> {
    graph.children(parent).collect()
}

/// Checks parent/child/sibling links of `parent` agree with each other.
fn assert_links_consistent(graph: &SceneGraph, parent: NodeHandle) {
    let kids = children(graph, parent);
    let node = graph.node(parent).unwrap();
    assert_eq!(node.child_count(), kids.len());
    assert_eq!(node.first_child(), kids.first().copied());
    assert_eq!(node.last_child(), kids.last().copied());

    for (i, &kid) in kids.iter().enumerate() {
        let k = graph.node(kid).unwrap();
        assert_eq!(k.parent(), Some(parent));
        let prev = if i == 0 { None } else { Some(kids[i - 1]) };
        assert_eq!(k.prev_sibling(), prev);
        assert_eq!(k.next_sibling(), kids.get(i + 1).copied());
    }
}

// ============================================================================
// Attach / Detach
// ============================================================================

#[test]
fn attach_appends_in_order() {
    let mut graph = SceneGraph::new();
    let p = graph.create_node_with_name("P");
    let a = graph.create_node_with_name("A");
    let b = graph.create_node_with_name("B");
    let c = graph.create_node_with_name("C");

    assert!(graph.attach_child(p, a, false));
    assert!(graph.attach_child(p, b, false));
    assert!(graph.attach_child(p, c, false));

    assert_eq!(children(&graph, p), vec![a, b, c]);
    assert_links_consistent(&graph, p);
}

#[test]
fn detach_middle_child_relinks_siblings() {
    let mut graph = SceneGraph::new();
    let p = graph.create_node();
    let a = graph.create_node();
    let b = graph.create_node();
    let c = graph.create_node();
    for n in [a, b, c] {
        graph.attach_child(p, n, false);
    }

    assert!(graph.detach_child(p, b, false));
    assert_eq!(children(&graph, p), vec![a, c]);
    assert_links_consistent(&graph, p);
    assert_eq!(graph.parent(b), None);
    assert_eq!(graph.node(b).unwrap().prev_sibling(), None);
    assert_eq!(graph.node(b).unwrap().next_sibling(), None);
}

#[test]
fn reattach_moves_between_parents() {
    let mut graph = SceneGraph::new();
    let p1 = graph.create_node();
    let p2 = graph.create_node();
    let child = graph.create_node();

    graph.attach_child(p1, child, false);
    assert!(graph.attach_child(p2, child, false));

    assert_eq!(graph.child_count(p1), 0);
    assert_eq!(children(&graph, p2), vec![child]);
    assert_eq!(graph.parent(child), Some(p2));
    assert_links_consistent(&graph, p1);
    assert_links_consistent(&graph, p2);
}

#[test]
fn attach_to_current_parent_is_noop() {
    let mut graph = SceneGraph::new();
    let p = graph.create_node();
    let a = graph.create_node();
    let b = graph.create_node();
    graph.attach_child(p, a, false);
    graph.attach_child(p, b, false);

    assert!(!graph.attach_child(p, a, false));
    assert_eq!(children(&graph, p), vec![a, b]);
}

#[test]
fn attach_to_self_is_rejected() {
    let mut graph = SceneGraph::new();
    let a = graph.create_node();
    assert!(!graph.attach_child(a, a, false));
    assert_eq!(graph.parent(a), None);
    assert_eq!(graph.child_count(a), 0);
}

#[test]
fn attach_to_descendant_is_rejected() {
    let mut graph = SceneGraph::new();
    let a = graph.create_node();
    let b = graph.create_node();
    let c = graph.create_node();
    graph.attach_child(a, b, false);
    graph.attach_child(b, c, false);

    // A → B → C; attaching A under C would close a loop.
    assert!(!graph.attach_child(c, a, false));
    assert_eq!(graph.parent(a), None);
    assert_eq!(children(&graph, c), Vec::<NodeHandle>::new());
    assert_eq!(children(&graph, a), vec![b]);
}

#[test]
fn detach_root_is_noop() {
    let mut graph = SceneGraph::new();
    let a = graph.create_node();
    assert!(!graph.detach(a, true));
}

#[test]
fn detach_child_with_wrong_parent_is_noop() {
    let mut graph = SceneGraph::new();
    let p = graph.create_node();
    let other = graph.create_node();
    let c = graph.create_node();
    graph.attach_child(p, c, false);

    assert!(!graph.detach_child(other, c, false));
    assert_eq!(graph.parent(c), Some(p));
}

#[test]
fn attach_keep_world_preserves_world_position() {
    let mut graph = SceneGraph::new();
    let parent = graph.create_node();
    graph.set_position(parent, Vec3::new(10.0, 0.0, 0.0));
    graph.set_scale(parent, Vec3::splat(2.0));

    let child = graph.create_node();
    graph.set_position(child, Vec3::new(4.0, 2.0, 0.0));

    assert!(graph.attach_child(parent, child, true));
    let world = graph.world_position(child).unwrap();
    assert!((world - Vec3::new(4.0, 2.0, 0.0)).length() < 1e-5);
    let local = graph.position(child).unwrap();
    assert!((local - Vec3::new(-3.0, 1.0, 0.0)).length() < 1e-5);
}

#[test]
fn attach_without_keep_world_keeps_local() {
    let mut graph = SceneGraph::new();
    let parent = graph.create_node();
    graph.set_position(parent, Vec3::new(10.0, 0.0, 0.0));
    let child = graph.create_node();
    graph.set_position(child, Vec3::new(1.0, 0.0, 0.0));

    graph.attach_child(parent, child, false);
    assert_eq!(graph.position(child), Some(Vec3::new(1.0, 0.0, 0.0)));
    assert_eq!(graph.world_position(child), Some(Vec3::new(11.0, 0.0, 0.0)));
}

#[test]
fn detach_keep_world_preserves_world_position() {
    let mut graph = SceneGraph::new();
    let parent = graph.create_node();
    graph.set_position(parent, Vec3::new(0.0, 5.0, 0.0));
    let child = graph.create_node();
    graph.attach_child(parent, child, false);
    graph.set_position(child, Vec3::new(1.0, 0.0, 0.0));

    assert!(graph.detach(child, true));
    assert_eq!(graph.position(child), Some(Vec3::new(1.0, 5.0, 0.0)));
}

// ============================================================================
// Destruction
// ============================================================================

#[test]
fn destroy_orphans_children() {
    let mut graph = SceneGraph::new();
    let root = graph.create_node();
    let p = graph.create_node();
    let c1 = graph.create_node();
    let c2 = graph.create_node();
    graph.attach_child(root, p, false);
    graph.attach_child(p, c1, false);
    graph.attach_child(p, c2, false);

    assert!(graph.destroy_node(p));

    assert!(!graph.contains(p));
    assert!(graph.contains(c1));
    assert!(graph.contains(c2));
    assert_eq!(graph.parent(c1), None);
    assert_eq!(graph.parent(c2), None);
    assert_eq!(graph.node(c1).unwrap().next_sibling(), None);
    assert_eq!(graph.node(c2).unwrap().prev_sibling(), None);
    assert_eq!(graph.child_count(root), 0);
    assert_eq!(graph.len(), 3);
}

#[test]
fn destroy_subtree_removes_everything_below() {
    let mut graph = SceneGraph::new();
    let root = graph.create_node();
    let a = graph.create_node();
    let b = graph.create_node();
    let c = graph.create_node();
    let keep = graph.create_node();
    graph.attach_child(root, a, false);
    graph.attach_child(a, b, false);
    graph.attach_child(root, c, false);

    assert_eq!(graph.destroy_subtree(root), 4);
    assert_eq!(graph.len(), 1);
    assert!(graph.contains(keep));
}

#[test]
fn destroy_stale_handle_is_noop() {
    let mut graph = SceneGraph::new();
    let a = graph.create_node();
    assert!(graph.destroy_node(a));
    assert!(!graph.destroy_node(a));
    assert_eq!(graph.destroy_subtree(a), 0);
}

#[test]
fn stale_handles_are_rejected_everywhere() {
    let mut graph = SceneGraph::new();
    let live = graph.create_node();
    let dead = graph.create_node();
    graph.destroy_node(dead);

    assert!(!graph.attach_child(live, dead, false));
    assert!(!graph.attach_child(dead, live, false));
    assert!(!graph.set_position(dead, Vec3::ONE));
    assert!(graph.world_transform(dead).is_none());
    assert!(graph.add_component(dead, "Visual").is_none());
    assert_eq!(graph.child_count(dead), 0);
}

// ============================================================================
// Queries
// ============================================================================

#[test]
fn descendants_are_pre_order() {
    let mut graph = SceneGraph::new();
    let r = graph.create_node();
    let a = graph.create_node();
    let a1 = graph.create_node();
    let a2 = graph.create_node();
    let b = graph.create_node();
    graph.attach_child(r, a, false);
    graph.attach_child(a, a1, false);
    graph.attach_child(a, a2, false);
    graph.attach_child(r, b, false);

    assert_eq!(graph.descendants(r), vec![a, a1, a2, b]);
}

#[test]
fn depth_and_root_of() {
    let mut graph = SceneGraph::new();
    let r = graph.create_node();
    let a = graph.create_node();
    let b = graph.create_node();
    graph.attach_child(r, a, false);
    graph.attach_child(a, b, false);

    assert_eq!(graph.depth(r), Some(0));
    assert_eq!(graph.depth(b), Some(2));
    assert_eq!(graph.root_of(b), Some(r));
    assert!(graph.is_ancestor_of(r, b));
    assert!(!graph.is_ancestor_of(b, r));
    assert!(!graph.is_ancestor_of(b, b));
}

#[test]
fn find_child_direct_and_recursive() {
    let mut graph = SceneGraph::new();
    let r = graph.create_node_with_name("Root");
    let arm = graph.create_node_with_name("Arm");
    let hand = graph.create_node_with_name("Hand");
    graph.attach_child(r, arm, false);
    graph.attach_child(arm, hand, false);

    assert_eq!(graph.find_child(r, "Arm", false), Some(arm));
    assert_eq!(graph.find_child(r, "Hand", false), None);
    assert_eq!(graph.find_child(r, "Hand", true), Some(hand));
}

#[test]
fn deep_chain_does_not_overflow() {
    let mut graph = SceneGraph::new();
    let root = graph.create_node();
    let mut tail = root;
    for _ in 0..5_000 {
        let next = graph.create_node();
        graph.attach_child(tail, next, false);
        tail = next;
    }
    graph.set_position(root, Vec3::X);
    assert_eq!(graph.depth(tail), Some(5_000));
    assert_eq!(graph.destroy_subtree(root), 5_001);
}

#[test]
fn roots_lists_parentless_nodes() {
    let mut graph = SceneGraph::new();
    let a = graph.create_node();
    let b = graph.create_node();
    let c = graph.create_node();
    graph.attach_child(a, b, false);

    let mut roots = graph.roots();
    roots.sort();
    let mut expected = vec![a, c];
    expected.sort();
    assert_eq!(roots, expected);
}
