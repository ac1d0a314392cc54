//! Scene Integration Tests
//!
//! Tests for:
//! - Scene membership: add / remove, subtree moves, destroy
//! - Scene bookkeeping: id index, static / hidden sets, component counts,
//!   pending transform changes
//! - NodeIndex lookups across a graph
//! - NodeBuilder and SceneNode convenience APIs
//! - GraphSettings

use glam::{Quat, Vec3};
use myth_scene::component::{PointLight, Visual};
use myth_scene::scene::{NodeHandle, NodeId, NodeIndex, Scene, SceneGraph, SceneHooks, SceneKey, TransformSpace};
use myth_scene::settings::GraphSettings;

fn graph_with_scene() -> (SceneGraph, SceneKey) {
    let mut graph = SceneGraph::new();
    let scene = graph.add_scene(Scene::new("Level"));
    (graph, scene)
}

fn scene(graph: &SceneGraph, key: SceneKey) -> &Scene {
    graph.scene::<Scene>(key).unwrap()
}

// ============================================================================
// Membership
// ============================================================================

#[test]
fn add_to_scene_brings_subtree() {
    let (mut graph, key) = graph_with_scene();
    let root = graph.create_node_with_name("Root");
    let child = graph.create_node_with_name("Child");
    graph.attach_child(root, child, false);

    assert!(graph.add_to_scene(root, key));
    assert_eq!(graph.node(root).unwrap().scene(), Some(key));
    assert_eq!(graph.node(child).unwrap().scene(), Some(key));
    assert_eq!(scene(&graph, key).len(), 2);
    assert_eq!(scene(&graph, key).find_by_name(&graph, "Child"), Some(child));
}

#[test]
fn attach_follows_parent_scene() {
    let mut graph = SceneGraph::new();
    let a = graph.add_scene(Scene::new("A"));
    let b = graph.add_scene(Scene::new("B"));
    let pa = graph.create_node();
    let pb = graph.create_node();
    let child = graph.create_node();
    let grandchild = graph.create_node();
    graph.add_to_scene(pa, a);
    graph.add_to_scene(pb, b);
    graph.attach_child(child, grandchild, false);
    graph.attach_child(pa, child, false);
    assert_eq!(scene(&graph, a).len(), 3);

    graph.attach_child(pb, child, false);
    assert_eq!(scene(&graph, a).len(), 1);
    assert_eq!(scene(&graph, b).len(), 3);
    assert_eq!(graph.node(grandchild).unwrap().scene(), Some(b));
}

#[test]
fn attaching_under_sceneless_parent_leaves_scene() {
    let (mut graph, key) = graph_with_scene();
    let n = graph.create_node();
    graph.add_to_scene(n, key);
    let free = graph.create_node();

    graph.attach_child(free, n, false);
    assert_eq!(graph.node(n).unwrap().scene(), None);
    assert!(scene(&graph, key).is_empty());
}

#[test]
fn add_to_scene_detaches_from_foreign_parent() {
    let (mut graph, key) = graph_with_scene();
    let parent = graph.create_node();
    let child = graph.create_node();
    graph.attach_child(parent, child, false);

    graph.add_to_scene(child, key);
    assert_eq!(graph.parent(child), None);
    assert_eq!(graph.node(parent).unwrap().scene(), None);
    assert_eq!(graph.node(child).unwrap().scene(), Some(key));
}

#[test]
fn destroy_removes_only_that_node_from_scene() {
    let (mut graph, key) = graph_with_scene();
    let p = graph.create_node();
    let c = graph.create_node();
    graph.attach_child(p, c, false);
    graph.add_to_scene(p, key);
    let p_id = graph.node(p).unwrap().id();

    graph.destroy_node(p);
    let s = scene(&graph, key);
    assert_eq!(s.len(), 1);
    assert_eq!(s.find_by_id(p_id), None);
    assert_eq!(graph.node(c).unwrap().scene(), Some(key));
}

#[test]
fn remove_scene_releases_members() {
    let (mut graph, key) = graph_with_scene();
    let n = graph.create_node();
    graph.add_to_scene(n, key);

    let removed = graph.remove_scene(key).unwrap();
    assert!(graph.scene::<Scene>(key).is_none());
    assert_eq!(graph.node(n).unwrap().scene(), None);

    let any: &dyn std::any::Any = &*removed;
    assert_eq!(any.downcast_ref::<Scene>().unwrap().len(), 1);
}

// ============================================================================
// Bookkeeping
// ============================================================================

#[test]
fn static_and_hidden_sets_track_flags() {
    let (mut graph, key) = graph_with_scene();
    let n = graph.create_node();
    graph.set_static(n, true);
    graph.add_to_scene(n, key);
    assert!(scene(&graph, key).is_static(n));

    graph.set_static(n, false);
    graph.set_visible(n, false);
    assert!(!scene(&graph, key).is_static(n));
    assert_eq!(scene(&graph, key).hidden_count(), 1);

    graph.remove_from_scene(n);
    assert_eq!(scene(&graph, key).hidden_count(), 0);
}

#[test]
fn component_counts_follow_add_and_remove() {
    let (mut graph, key) = graph_with_scene();
    let a = graph.create_node();
    let b = graph.create_node();
    graph.add_component(a, Visual::NAME);
    graph.add_to_scene(a, key);
    graph.add_to_scene(b, key);
    graph.add_component(b, Visual::NAME);
    graph.add_component(b, PointLight::NAME);
    assert_eq!(scene(&graph, key).component_count(Visual::NAME), 2);
    assert_eq!(scene(&graph, key).component_count(PointLight::NAME), 1);

    graph.remove_component(b, Visual::NAME);
    graph.destroy_node(a);
    assert_eq!(scene(&graph, key).component_count(Visual::NAME), 0);
    assert_eq!(scene(&graph, key).component_count(PointLight::NAME), 1);
}

#[test]
fn pending_changes_are_deduplicated() {
    let (mut graph, key) = graph_with_scene();
    let p = graph.create_node();
    let c = graph.create_node();
    graph.attach_child(p, c, false);
    graph.add_to_scene(p, key);
    graph.scene_mut::<Scene>(key).unwrap().drain_transform_changes();

    graph.set_position(p, Vec3::X);
    graph.set_rotation(p, Quat::from_rotation_y(0.3));
    graph.set_scale(c, Vec3::splat(2.0));

    let changed = graph.scene_mut::<Scene>(key).unwrap().drain_transform_changes();
    assert_eq!(changed, vec![p, c]);
    assert!(!scene(&graph, key).has_pending_changes());
}

#[test]
fn parent_scale_queues_offset_child() {
    let (mut graph, key) = graph_with_scene();
    let p = graph.create_node();
    let c = graph.create_node();
    graph.attach_child(p, c, false);
    graph.set_inherit(c, myth_scene::scene::NodeFlags::NO_SCALE_INHERIT, false);
    graph.set_position(c, Vec3::X);
    graph.add_to_scene(p, key);
    graph.scene_mut::<Scene>(key).unwrap().drain_transform_changes();

    graph.set_scale(p, Vec3::splat(2.0));
    let changed = graph.scene_mut::<Scene>(key).unwrap().drain_transform_changes();
    assert_eq!(changed, vec![p, c]);
}

#[test]
fn rename_is_visible_through_scene_lookup() {
    let (mut graph, key) = graph_with_scene();
    let n = graph.create_node_with_name("Old");
    graph.add_to_scene(n, key);
    graph.set_name(n, "New");
    assert_eq!(scene(&graph, key).find_by_name(&graph, "New"), Some(n));
    assert_eq!(scene(&graph, key).find_by_name(&graph, "Old"), None);
}

#[derive(Default)]
struct Tally {
    parent_changes: usize,
    renames: usize,
}

impl SceneHooks for Tally {
    fn parent_changed(&mut self, _handle: NodeHandle, _node: &myth_scene::scene::Node) {
        self.parent_changes += 1;
    }

    fn name_changed(&mut self, _handle: NodeHandle, _node: &myth_scene::scene::Node) {
        self.renames += 1;
    }
}

#[test]
fn custom_scene_hooks_receive_structure_changes() {
    let mut graph = SceneGraph::new();
    let key = graph.add_scene(Tally::default());
    let p = graph.create_node();
    let c = graph.create_node();
    graph.add_to_scene(p, key);
    graph.add_to_scene(c, key);

    graph.attach_child(p, c, false);
    graph.detach(c, false);
    graph.set_name(c, "Renamed");
    graph.set_name(c, "Renamed");

    let tally = graph.scene::<Tally>(key).unwrap();
    assert_eq!(tally.parent_changes, 2);
    assert_eq!(tally.renames, 1);
    assert!(graph.scene::<Scene>(key).is_none());
}

// ============================================================================
// NodeIndex
// ============================================================================

#[test]
fn node_index_resolves_live_nodes() {
    let mut graph = SceneGraph::new();
    let mut index = NodeIndex::new();
    let a = graph.create_node_with_name("Crate");
    let b = graph.create_node_with_name("Crate");
    let c = graph.create_node_with_name("Barrel");
    for h in [a, b, c] {
        index.insert(graph.node(h).unwrap().id(), h);
    }

    let b_id = graph.node(b).unwrap().id();
    assert_eq!(index.get(b_id), Some(b));
    assert_eq!(index.find_by_name(&graph, "Crate"), Some(a));
    assert_eq!(index.find_all_by_name(&graph, "Crate"), vec![a, b]);

    graph.destroy_node(a);
    assert_eq!(index.find_by_name(&graph, "Crate"), Some(b));
    assert_eq!(index.retain_live(&graph), 1);
    assert_eq!(index.len(), 2);
    assert_eq!(index.get(NodeId(9999)), None);
}

// ============================================================================
// Builder & wrapper
// ============================================================================

#[test]
fn builder_applies_everything_before_joining() {
    let (mut graph, key) = graph_with_scene();
    let room = graph.build_node("Room").with_scene(key).build();
    let lamp = graph
        .build_node("Lamp")
        .with_position(0.0, 3.0, 0.0)
        .with_scale(0.5)
        .with_layer(2)
        .with_component(PointLight::NAME)
        .with_component("Unknown")
        .with_parent(room)
        .build();

    let node = graph.node(lamp).unwrap();
    assert_eq!(node.name(), "Lamp");
    assert_eq!(node.parent(), Some(room));
    assert_eq!(node.layer(), 2);
    assert_eq!(node.scene(), Some(key));
    assert_eq!(graph.position(lamp), Some(Vec3::new(0.0, 3.0, 0.0)));
    assert_eq!(graph.component_names(lamp), vec![PointLight::NAME]);
    assert_eq!(scene(&graph, key).component_count(PointLight::NAME), 1);
}

#[test]
fn builder_ignores_degenerate_rotation() {
    let mut graph = SceneGraph::new();
    let n = graph
        .build_node("Tilted")
        .with_rotation(Quat::from_rotation_x(0.5))
        .with_rotation(Quat::from_xyzw(0.0, 0.0, 0.0, 0.0))
        .build();
    let rotation = graph.rotation(n).unwrap();
    assert!(rotation.abs_diff_eq(Quat::from_rotation_x(0.5), 1e-6));
}

#[test]
fn scene_node_chains_edits() {
    let mut graph = SceneGraph::new();
    let parent = graph.create_node();
    graph.set_position(parent, Vec3::new(5.0, 0.0, 0.0));
    let n = graph.create_node();

    graph
        .scene_node(n)
        .set_position(1.0, 2.0, 3.0)
        .set_scale(2.0)
        .translate(Vec3::X, TransformSpace::Parent)
        .set_name("Lamp")
        .with_component(Visual::NAME)
        .set_shadows(false, true)
        .attach_to(parent);

    let node = graph.node(n).unwrap();
    assert_eq!(node.name(), "Lamp");
    assert_eq!(node.parent(), Some(parent));
    assert_eq!(graph.world_position(n), Some(Vec3::new(2.0, 2.0, 3.0)));
    let visual = node.components().visual().unwrap();
    assert!(!visual.cast_shadows);
    assert!(visual.receive_shadows);
}

#[test]
fn set_shadows_queues_no_change() {
    let (mut graph, key) = graph_with_scene();
    let n = graph.build_node("Crate").with_scene(key).with_component(Visual::NAME).build();
    graph.scene_mut::<Scene>(key).unwrap().drain_transform_changes();

    graph.scene_node(n).set_shadows(true, false);
    assert!(!scene(&graph, key).has_pending_changes());
    assert!(!graph.node(n).unwrap().components().visual().unwrap().receive_shadows);
}

#[test]
fn scene_node_on_stale_handle_is_noop() {
    let mut graph = SceneGraph::new();
    let n = graph.create_node();
    graph.destroy_node(n);
    let wrapper = graph.scene_node(n).set_position(1.0, 1.0, 1.0).rotate_y(1.0);
    assert!(!wrapper.is_alive());
}

// ============================================================================
// Settings
// ============================================================================

#[test]
fn settings_from_partial_json() {
    let settings: GraphSettings = serde_json::from_str(r#"{ "first_node_id": 500 }"#).unwrap();
    assert_eq!(settings.first_node_id, 500);
    assert_eq!(settings.initial_node_capacity, GraphSettings::default().initial_node_capacity);

    let mut graph = SceneGraph::with_settings(settings);
    let n = graph.create_node();
    assert_eq!(graph.node(n).unwrap().id(), NodeId(500));
}
