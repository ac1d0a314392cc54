use glam::{Affine3A, EulerRot, Mat3, Quat, Vec3};

/// Squared length below which a quaternion or direction is treated as degenerate.
pub(crate) const DEGENERATE_EPSILON: f32 = 1e-8;

/// Spatial object: local position, orientation and scale.
///
/// A `Transform` knows nothing about hierarchy. World-space derivation lives
/// in the scene graph, which combines a node's `Transform` with its
/// ancestors' under the node's inheritance flags.
///
/// Scale is not clamped to positive values: a negative component mirrors
/// the node along that axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    #[must_use]
    pub fn new() -> Self {
        Self::IDENTITY
    }

    #[must_use]
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    #[must_use]
    pub fn from_position_rotation_scale(position: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            position,
            rotation: normalize_rotation(rotation).unwrap_or(Quat::IDENTITY),
            scale,
        }
    }

    // ========================================================================
    // Matrices
    // ========================================================================

    /// Local matrix (scale, then rotation, then translation).
    #[inline]
    #[must_use]
    pub fn local_matrix(&self) -> Affine3A {
        Affine3A::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Overwrites position/rotation/scale by decomposing `mat`.
    ///
    /// Shear cannot be represented and is lost in the decomposition.
    pub fn apply_local_matrix(&mut self, mat: Affine3A) {
        let (scale, rotation, translation) = mat.to_scale_rotation_translation();
        self.scale = scale;
        self.rotation = normalize_rotation(rotation).unwrap_or(Quat::IDENTITY);
        self.position = translation;
    }

    // ========================================================================
    // Rotation helpers
    // ========================================================================

    /// Sets the rotation, normalising it. Returns `false` and leaves the
    /// rotation untouched for a zero-length or non-finite quaternion.
    pub fn set_rotation(&mut self, rotation: Quat) -> bool {
        match normalize_rotation(rotation) {
            Some(q) => {
                self.rotation = q;
                true
            }
            None => false,
        }
    }

    /// Sets rotation from Euler angles (XYZ order, radians).
    pub fn set_rotation_euler(&mut self, x: f32, y: f32, z: f32) {
        self.rotation = Quat::from_euler(EulerRot::XYZ, x, y, z);
    }

    /// Current rotation as XYZ Euler angles.
    #[must_use]
    pub fn rotation_euler(&self) -> Vec3 {
        let (x, y, z) = self.rotation.to_euler(EulerRot::XYZ);
        Vec3::new(x, y, z)
    }

    pub fn set_rotation_euler_with_order(&mut self, x: f32, y: f32, z: f32, order: EulerRot) {
        self.rotation = Quat::from_euler(order, x, y, z);
    }

    // ========================================================================
    // Primitive operations
    // ========================================================================

    /// Moves by `delta` expressed in parent space.
    pub fn translate(&mut self, delta: Vec3) {
        self.position += delta;
    }

    /// Moves by `delta` expressed along this transform's own axes.
    pub fn translate_local(&mut self, delta: Vec3) {
        self.position += self.rotation * delta;
    }

    /// Applies `delta` in parent space (pre-multiplied).
    pub fn rotate(&mut self, delta: Quat) -> bool {
        self.set_rotation(delta * self.rotation)
    }

    /// Applies `delta` around this transform's own axes (post-multiplied).
    pub fn rotate_local(&mut self, delta: Quat) -> bool {
        self.set_rotation(self.rotation * delta)
    }

    /// Multiplies the scale componentwise.
    pub fn scale_by(&mut self, factor: Vec3) {
        self.scale *= factor;
    }

    /// Orients the transform so its forward axis (−Z) points at `target`.
    ///
    /// `target` and `up` are expressed in the parent's space. Returns `false`
    /// when `target` coincides with the position or the view direction is
    /// parallel to `up`; the rotation is then left unchanged.
    pub fn look_at(&mut self, target: Vec3, up: Vec3) -> bool {
        match look_rotation(target - self.position, up) {
            Some(q) => {
                self.rotation = q;
                true
            }
            None => false,
        }
    }

    #[inline]
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    #[inline]
    #[must_use]
    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    #[inline]
    #[must_use]
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalises `q`, rejecting zero-length and non-finite input.
#[inline]
pub(crate) fn normalize_rotation(q: Quat) -> Option<Quat> {
    let len_sq = q.length_squared();
    if !len_sq.is_finite() || len_sq < DEGENERATE_EPSILON {
        return None;
    }
    Some(q.normalize())
}

/// Rotation whose −Z axis points along `direction` with `up` as the up hint.
pub(crate) fn look_rotation(direction: Vec3, up: Vec3) -> Option<Quat> {
    if direction.length_squared() < DEGENERATE_EPSILON {
        return None;
    }
    let forward = direction.normalize();

    if forward.cross(up).length_squared() < 1e-4 {
        return None;
    }

    let right = forward.cross(up).normalize();
    let new_up = right.cross(forward).normalize();

    let rot_mat = Mat3::from_cols(right, new_up, -forward);
    normalize_rotation(Quat::from_mat3(&rot_mat))
}
