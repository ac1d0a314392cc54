use crate::component::{Component, DynComponent, EditorData, PointLight, SpotLight, Visual, downcast_box};

/// Where a component name is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Visual,
    PointLight,
    SpotLight,
    Editor,
    Registry,
}

impl Slot {
    #[inline]
    fn of(name: &str) -> Self {
        match name {
            Visual::NAME => Self::Visual,
            PointLight::NAME => Self::PointLight,
            SpotLight::NAME => Self::SpotLight,
            EditorData::NAME => Self::Editor,
            _ => Self::Registry,
        }
    }
}

/// The modules attached to one node.
///
/// High-frequency kinds sit in dedicated fields for O(1) typed access; every
/// other kind lives in a registry kept sorted by name. At most one module
/// per name is stored. Every name-based operation checks the fast slots
/// first, so the two halves never disagree about what is attached.
#[derive(Default)]
pub struct ComponentSet {
    visual: Option<Box<Visual>>,
    point_light: Option<Box<PointLight>>,
    spot_light: Option<Box<SpotLight>>,
    editor: Option<Box<EditorData>>,
    registry: Vec<Box<dyn Component>>,
}

impl ComponentSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        usize::from(self.visual.is_some())
            + usize::from(self.point_light.is_some())
            + usize::from(self.spot_light.is_some())
            + usize::from(self.editor.is_some())
            + self.registry.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    #[inline]
    fn registry_position(&self, name: &str) -> std::result::Result<usize, usize> {
        self.registry.binary_search_by(|c| c.name().cmp(name))
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&DynComponent> {
        match Slot::of(name) {
            Slot::Visual => self.visual.as_deref().map(|c| c as &DynComponent),
            Slot::PointLight => self.point_light.as_deref().map(|c| c as &DynComponent),
            Slot::SpotLight => self.spot_light.as_deref().map(|c| c as &DynComponent),
            Slot::Editor => self.editor.as_deref().map(|c| c as &DynComponent),
            Slot::Registry => self
                .registry_position(name)
                .ok()
                .map(|i| &*self.registry[i]),
        }
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut DynComponent> {
        match Slot::of(name) {
            Slot::Visual => self.visual.as_deref_mut().map(|c| c as &mut DynComponent),
            Slot::PointLight => self
                .point_light
                .as_deref_mut()
                .map(|c| c as &mut DynComponent),
            Slot::SpotLight => self
                .spot_light
                .as_deref_mut()
                .map(|c| c as &mut DynComponent),
            Slot::Editor => self.editor.as_deref_mut().map(|c| c as &mut DynComponent),
            Slot::Registry => match self.registry_position(name) {
                Ok(i) => Some(&mut *self.registry[i] as &mut DynComponent),
                Err(_) => None,
            },
        }
    }

    /// Typed lookup by name.
    #[must_use]
    pub fn get_as<T: Component>(&self, name: &str) -> Option<&T> {
        self.get(name)?.downcast_ref::<T>()
    }

    pub fn get_as_mut<T: Component>(&mut self, name: &str) -> Option<&mut T> {
        self.get_mut(name)?.downcast_mut::<T>()
    }

    // ========================================================================
    // Fast-path typed accessors
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn visual(&self) -> Option<&Visual> {
        self.visual.as_deref()
    }

    #[inline]
    pub fn visual_mut(&mut self) -> Option<&mut Visual> {
        self.visual.as_deref_mut()
    }

    #[inline]
    #[must_use]
    pub fn point_light(&self) -> Option<&PointLight> {
        self.point_light.as_deref()
    }

    #[inline]
    pub fn point_light_mut(&mut self) -> Option<&mut PointLight> {
        self.point_light.as_deref_mut()
    }

    #[inline]
    #[must_use]
    pub fn spot_light(&self) -> Option<&SpotLight> {
        self.spot_light.as_deref()
    }

    #[inline]
    pub fn spot_light_mut(&mut self) -> Option<&mut SpotLight> {
        self.spot_light.as_deref_mut()
    }

    #[inline]
    #[must_use]
    pub fn editor_data(&self) -> Option<&EditorData> {
        self.editor.as_deref()
    }

    #[inline]
    pub fn editor_data_mut(&mut self) -> Option<&mut EditorData> {
        self.editor.as_deref_mut()
    }

    // ========================================================================
    // Enumeration
    // ========================================================================

    /// Names of every attached module: fast slots first, then the registry
    /// in name order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.iter().map(|c| c.name().to_owned()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DynComponent> {
        let visual = self.visual.as_deref().map(|c| c as &DynComponent);
        let point = self.point_light.as_deref().map(|c| c as &DynComponent);
        let spot = self.spot_light.as_deref().map(|c| c as &DynComponent);
        let editor = self.editor.as_deref().map(|c| c as &DynComponent);

        visual
            .into_iter()
            .chain(point)
            .chain(spot)
            .chain(editor)
            .chain(self.registry.iter().map(|c| &**c as &DynComponent))
    }

    // ========================================================================
    // Mutation (graph-internal)
    // ========================================================================

    /// Stores `component` under its name.
    ///
    /// Hands the component back when the name is already taken, or when a
    /// fast-slot name is claimed by a type other than the slot's own.
    pub(crate) fn insert(
        &mut self,
        component: Box<dyn Component>,
    ) -> std::result::Result<(), Box<dyn Component>> {
        if self.contains(component.name()) {
            return Err(component);
        }
        match Slot::of(component.name()) {
            Slot::Visual => self.visual = Some(downcast_box::<Visual>(component)?),
            Slot::PointLight => self.point_light = Some(downcast_box::<PointLight>(component)?),
            Slot::SpotLight => self.spot_light = Some(downcast_box::<SpotLight>(component)?),
            Slot::Editor => self.editor = Some(downcast_box::<EditorData>(component)?),
            Slot::Registry => {
                let Err(at) = self.registry_position(component.name()) else {
                    return Err(component);
                };
                self.registry.insert(at, component);
            }
        }
        Ok(())
    }

    /// Removes and returns the module called `name`.
    pub(crate) fn take(&mut self, name: &str) -> Option<Box<dyn Component>> {
        match Slot::of(name) {
            Slot::Visual => self.visual.take().map(|c| c as Box<dyn Component>),
            Slot::PointLight => self.point_light.take().map(|c| c as Box<dyn Component>),
            Slot::SpotLight => self.spot_light.take().map(|c| c as Box<dyn Component>),
            Slot::Editor => self.editor.take().map(|c| c as Box<dyn Component>),
            Slot::Registry => self
                .registry_position(name)
                .ok()
                .map(|i| self.registry.remove(i)),
        }
    }
}

impl std::fmt::Debug for ComponentSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter().map(|c| c.name())).finish()
    }
}
