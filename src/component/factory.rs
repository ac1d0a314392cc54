//! Component factory
//!
//! Resolves a module name to a freshly constructed instance. Resolution
//! order:
//!
//! 1. Built-in kinds known to the core ([`Visual`], [`PointLight`],
//!    [`SpotLight`], [`EditorData`])
//! 2. Constructors registered by the host with [`ComponentFactory::register`]
//! 3. The optional fallback [`ComponentProvider`]
//!
//! The same path is used for ordinary `add_component` calls and for module
//! entries met while reading saved data, so a host can extend the catalog
//! without touching the core.

use rustc_hash::FxHashMap;

use crate::component::{Component, EditorData, PointLight, SpotLight, Visual};
use crate::scene::NodeHandle;

/// Constructor stored per registered name.
pub type ComponentConstructor = Box<dyn Fn(NodeHandle) -> Box<dyn Component>>;

/// Catch-all resolver consulted after the named constructors.
///
/// Useful for hosts that build modules from data (e.g. a script runtime
/// that resolves `"Script:Door"`-style names on demand).
pub trait ComponentProvider {
    fn create(&self, name: &str, owner: NodeHandle) -> Option<Box<dyn Component>>;
}

#[derive(Default)]
pub struct ComponentFactory {
    constructors: FxHashMap<String, ComponentConstructor>,
    fallback: Option<Box<dyn ComponentProvider>>,
}

impl ComponentFactory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `name` is one of the kinds the core builds itself.
    #[must_use]
    pub fn is_builtin(name: &str) -> bool {
        matches!(
            name,
            Visual::NAME | PointLight::NAME | SpotLight::NAME | EditorData::NAME
        )
    }

    /// Registers a constructor for `name`, replacing any previous one.
    ///
    /// Built-in names cannot be overridden; returns `false` for them.
    pub fn register<F>(&mut self, name: &str, constructor: F) -> bool
    where
        F: Fn(NodeHandle) -> Box<dyn Component> + 'static,
    {
        if Self::is_builtin(name) {
            log::warn!("Component '{name}' is built in and cannot be re-registered");
            return false;
        }
        self.constructors
            .insert(name.to_owned(), Box::new(constructor));
        true
    }

    /// Removes the constructor for `name`. Returns whether one was present.
    pub fn unregister(&mut self, name: &str) -> bool {
        self.constructors.remove(name).is_some()
    }

    /// Whether `name` resolves without consulting the fallback.
    #[must_use]
    pub fn is_registered(&self, name: &str) -> bool {
        Self::is_builtin(name) || self.constructors.contains_key(name)
    }

    pub fn set_fallback(&mut self, provider: Box<dyn ComponentProvider>) {
        self.fallback = Some(provider);
    }

    pub fn clear_fallback(&mut self) -> Option<Box<dyn ComponentProvider>> {
        self.fallback.take()
    }

    /// Builds a module called `name` owned by `owner`.
    ///
    /// Returns `None` when nothing resolves the name, or when the resolved
    /// constructor produced a module reporting a different name (which would
    /// break the one-module-per-name rule on the node).
    #[must_use]
    pub fn create(&self, name: &str, owner: NodeHandle) -> Option<Box<dyn Component>> {
        let component = Self::create_builtin(name, owner)
            .or_else(|| self.constructors.get(name).map(|ctor| ctor(owner)))
            .or_else(|| {
                self.fallback
                    .as_ref()
                    .and_then(|provider| provider.create(name, owner))
            })?;

        if component.name() != name {
            log::warn!(
                "Constructor for '{name}' produced a component named '{}'; discarding it",
                component.name()
            );
            return None;
        }
        Some(component)
    }

    fn create_builtin(name: &str, owner: NodeHandle) -> Option<Box<dyn Component>> {
        match name {
            Visual::NAME => Some(Box::new(Visual::new(owner))),
            PointLight::NAME => Some(Box::new(PointLight::new(owner))),
            SpotLight::NAME => Some(Box::new(SpotLight::new(owner))),
            EditorData::NAME => Some(Box::new(EditorData::new(owner))),
            _ => None,
        }
    }
}

impl std::fmt::Debug for ComponentFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("ComponentFactory")
            .field("registered", &names)
            .field("has_fallback", &self.fallback.is_some())
            .finish()
    }
}
