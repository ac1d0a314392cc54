//! Component Tests
//!
//! Tests for:
//! - add / get / remove by name (fast slots and registry)
//! - idempotent add, no-op remove
//! - factory registration, fallback provider, name mismatch
//! - remove_all clearing fast slots
//! - built-in module behaviour (spot cones)

use myth_scene::component::{Component, ComponentProvider, EditorData, PointLight, SpotLight, Visual};
use myth_scene::errors::Result;
use myth_scene::persist::{ChunkReader, ChunkWriter};
use myth_scene::scene::{NodeHandle, SceneGraph};

// ============================================================================
// Helper
// ============================================================================

struct Health {
    owner: NodeHandle,
    hp: u32,
}

impl Component for Health {
    fn name(&self) -> &str {
        "Health"
    }

    fn owner(&self) -> NodeHandle {
        self.owner
    }

    fn serialize(&self, writer: &mut ChunkWriter) -> Result<()> {
        writer.write_u32(self.hp);
        Ok(())
    }

    fn deserialize(&mut self, reader: &mut ChunkReader<'_>) -> Result<()> {
        self.hp = reader.read_u32()?;
        Ok(())
    }
}

fn graph_with_health() -> SceneGraph {
    let mut graph = SceneGraph::new();
    graph
        .factory_mut()
        .register("Health", |owner| Box::new(Health { owner, hp: 100 }));
    graph
}

// ============================================================================
// Add / Get
// ============================================================================

#[test]
fn add_builtin_goes_to_fast_slot() {
    let mut graph = SceneGraph::new();
    let n = graph.create_node();

    let visual = graph.add_component(n, Visual::NAME).unwrap();
    assert!(visual.is::<Visual>());
    assert_eq!(visual.owner(), n);

    let node = graph.node(n).unwrap();
    assert!(node.components().visual().is_some());
    assert!(node.components().point_light().is_none());
}

#[test]
fn add_twice_returns_same_instance() {
    let mut graph = graph_with_health();
    let n = graph.create_node();

    graph
        .add_component(n, "Health")
        .and_then(|c| c.downcast_mut::<Health>())
        .unwrap()
        .hp = 7;

    let again = graph.add_component(n, "Health").unwrap();
    assert_eq!(again.downcast_ref::<Health>().unwrap().hp, 7);
    assert_eq!(graph.component_names(n), vec!["Health".to_owned()]);
}

#[test]
fn add_unknown_returns_none() {
    let mut graph = SceneGraph::new();
    let n = graph.create_node();
    assert!(graph.add_component(n, "DoesNotExist").is_none());
    assert!(graph.component_names(n).is_empty());
}

#[test]
fn typed_access_checks_type() {
    let mut graph = SceneGraph::new();
    let n = graph.create_node();
    graph.add_component(n, PointLight::NAME);

    assert!(graph.component_as::<PointLight>(n, PointLight::NAME).is_some());
    assert!(graph.component_as::<SpotLight>(n, PointLight::NAME).is_none());
    assert!(graph.has_component(n, PointLight::NAME));
    assert!(!graph.has_component(n, SpotLight::NAME));
}

#[test]
fn names_list_slots_then_registry_sorted() {
    let mut graph = graph_with_health();
    graph
        .factory_mut()
        .register("Armor", |owner| Box::new(Named { owner, name: "Armor" }));
    let n = graph.create_node();

    graph.add_component(n, "Health");
    graph.add_component(n, EditorData::NAME);
    graph.add_component(n, "Armor");
    graph.add_component(n, Visual::NAME);

    assert_eq!(graph.component_names(n), vec!["Visual", "EditorData", "Armor", "Health"]);
}

// ============================================================================
// Remove
// ============================================================================

#[test]
fn remove_unknown_is_noop() {
    let mut graph = graph_with_health();
    let n = graph.create_node();
    graph.add_component(n, "Health");
    graph.add_component(n, Visual::NAME);

    assert!(!graph.remove_component(n, "Nope"));
    assert!(!graph.remove_component(n, SpotLight::NAME));
    assert_eq!(graph.component_names(n), vec!["Visual", "Health"]);
}

#[test]
fn remove_component_from_fast_slot_and_registry() {
    let mut graph = graph_with_health();
    let n = graph.create_node();
    graph.add_component(n, "Health");
    graph.add_component(n, Visual::NAME);

    assert!(graph.remove_component(n, Visual::NAME));
    assert!(graph.node(n).unwrap().components().visual().is_none());
    assert!(graph.remove_component(n, "Health"));
    assert!(graph.component_names(n).is_empty());
}

#[test]
fn remove_all_clears_fast_slots_too() {
    let mut graph = graph_with_health();
    let n = graph.create_node();
    for name in [Visual::NAME, PointLight::NAME, SpotLight::NAME, EditorData::NAME, "Health"] {
        graph.add_component(n, name);
    }
    assert_eq!(graph.node(n).unwrap().components().len(), 5);

    assert_eq!(graph.remove_all_components(n), 5);
    let components = graph.node(n).unwrap().components();
    assert!(components.is_empty());
    assert!(components.visual().is_none());
    assert!(components.point_light().is_none());
    assert!(components.spot_light().is_none());
    assert!(components.editor_data().is_none());
}

// ============================================================================
// Factory
// ============================================================================

struct Named {
    owner: NodeHandle,
    name: &'static str,
}

impl Component for Named {
    fn name(&self) -> &str {
        self.name
    }

    fn owner(&self) -> NodeHandle {
        self.owner
    }

    fn serialize(&self, _writer: &mut ChunkWriter) -> Result<()> {
        Ok(())
    }

    fn deserialize(&mut self, _reader: &mut ChunkReader<'_>) -> Result<()> {
        Ok(())
    }
}

struct ScriptProvider;

impl ComponentProvider for ScriptProvider {
    fn create(&self, name: &str, owner: NodeHandle) -> Option<Box<dyn Component>> {
        match name {
            "Script:Door" => Some(Box::new(Named {
                owner,
                name: "Script:Door",
            })),
            _ => None,
        }
    }
}

#[test]
fn builtin_names_cannot_be_registered() {
    let mut graph = SceneGraph::new();
    assert!(
        !graph
            .factory_mut()
            .register(Visual::NAME, |owner| Box::new(Named { owner, name: "Visual" }))
    );
    assert!(graph.factory().is_registered(Visual::NAME));
}

#[test]
fn fallback_provider_resolves_unregistered_names() {
    let mut graph = SceneGraph::new();
    graph.factory_mut().set_fallback(Box::new(ScriptProvider));
    let n = graph.create_node();

    assert!(graph.add_component(n, "Script:Door").is_some());
    assert!(graph.add_component(n, "Script:Window").is_none());
    assert_eq!(graph.component_names(n), vec!["Script:Door"]);
}

#[test]
fn constructor_with_wrong_name_is_discarded() {
    let mut graph = SceneGraph::new();
    graph
        .factory_mut()
        .register("Alias", |owner| Box::new(Named { owner, name: "Other" }));
    let n = graph.create_node();
    assert!(graph.add_component(n, "Alias").is_none());
    assert!(graph.component_names(n).is_empty());
}

#[test]
fn unregister_stops_resolution() {
    let mut graph = graph_with_health();
    assert!(graph.factory_mut().unregister("Health"));
    let n = graph.create_node();
    assert!(graph.add_component(n, "Health").is_none());
}

#[test]
fn insert_component_checks_owner() {
    let mut graph = SceneGraph::new();
    let a = graph.create_node();
    let b = graph.create_node();

    assert!(graph.insert_component(a, Box::new(Health { owner: b, hp: 1 })).is_none());
    assert!(graph.insert_component(a, Box::new(Health { owner: a, hp: 1 })).is_some());

    // Existing instance wins over a second insert.
    graph.insert_component(a, Box::new(Health { owner: a, hp: 2 }));
    assert_eq!(graph.component_as::<Health>(a, "Health").unwrap().hp, 1);
}

// ============================================================================
// Built-ins
// ============================================================================

#[test]
fn spot_light_cones_are_clamped() {
    let mut graph = SceneGraph::new();
    let n = graph.create_node();
    graph.add_component(n, SpotLight::NAME);
    let spot = graph.component_as_mut::<SpotLight>(n, SpotLight::NAME).unwrap();

    spot.set_cones(1.0, 0.5);
    assert_eq!(spot.inner_cone(), 0.5);
    assert_eq!(spot.outer_cone(), 0.5);

    spot.set_cones(0.1, 10.0);
    assert_eq!(spot.outer_cone(), std::f32::consts::FRAC_PI_2);
    assert!((spot.inner_cone_cos() - 0.1f32.cos()).abs() < 1e-6);
}

#[test]
fn editor_summary_excludes_itself() {
    let mut graph = SceneGraph::new();
    let n = graph.create_node();
    graph.add_component(n, Visual::NAME);
    graph.add_component(n, EditorData::NAME);

    let set = graph.node(n).unwrap().components();
    let mut editor = EditorData::new(n);
    editor.refresh_summary(set);
    assert_eq!(editor.sibling_summary(), ["Visual".to_owned()]);
}
