use glam::Vec3;

use crate::component::{Component, expect_body_version};
use crate::errors::Result;
use crate::persist::chunk::{ChunkReader, ChunkWriter};
use crate::scene::NodeHandle;

const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq)]
pub struct ShadowConfig {
    pub bias: f32,
    pub normal_bias: f32,
    pub map_size: u32,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            bias: 0.005,
            normal_bias: 0.02,
            map_size: 1024,
        }
    }
}

fn write_shadow(writer: &mut ChunkWriter, shadow: Option<&ShadowConfig>) {
    writer.write_bool(shadow.is_some());
    if let Some(shadow) = shadow {
        writer.write_f32(shadow.bias);
        writer.write_f32(shadow.normal_bias);
        writer.write_u32(shadow.map_size);
    }
}

fn read_shadow(reader: &mut ChunkReader<'_>) -> Result<Option<ShadowConfig>> {
    if !reader.read_bool()? {
        return Ok(None);
    }
    Ok(Some(ShadowConfig {
        bias: reader.read_f32()?,
        normal_bias: reader.read_f32()?,
        map_size: reader.read_u32()?,
    }))
}

// ============================================================================
// Point light
// ============================================================================

/// Omnidirectional light positioned at the owning node.
#[derive(Debug, Clone, PartialEq)]
pub struct PointLight {
    owner: NodeHandle,
    pub color: Vec3,
    /// Luminous intensity in candela.
    pub intensity: f32,
    /// Distance at which the contribution reaches zero.
    pub range: f32,
    pub shadow: Option<ShadowConfig>,
}

impl PointLight {
    pub const NAME: &'static str = "PointLight";

    #[must_use]
    pub fn new(owner: NodeHandle) -> Self {
        Self {
            owner,
            color: Vec3::ONE,
            intensity: 1.0,
            range: 10.0,
            shadow: None,
        }
    }
}

impl Component for PointLight {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn owner(&self) -> NodeHandle {
        self.owner
    }

    fn serialize(&self, writer: &mut ChunkWriter) -> Result<()> {
        writer.write_u32(FORMAT_VERSION);
        writer.write_vec3(self.color);
        writer.write_f32(self.intensity);
        writer.write_f32(self.range);
        write_shadow(writer, self.shadow.as_ref());
        Ok(())
    }

    fn deserialize(&mut self, reader: &mut ChunkReader<'_>) -> Result<()> {
        expect_body_version(reader, Self::NAME, FORMAT_VERSION)?;
        let color = reader.read_vec3()?;
        let intensity = reader.read_f32()?;
        let range = reader.read_f32()?;
        let shadow = read_shadow(reader)?;

        self.color = color;
        self.intensity = intensity;
        self.range = range;
        self.shadow = shadow;
        Ok(())
    }
}

// ============================================================================
// Spot light
// ============================================================================

/// Cone light shining down the owning node's −Z axis.
///
/// Cone angles are half-angles in radians. The cosines the renderer consumes
/// are derived and kept in sync by [`SpotLight::set_cones`].
#[derive(Debug, Clone, PartialEq)]
pub struct SpotLight {
    owner: NodeHandle,
    pub color: Vec3,
    pub intensity: f32,
    pub range: f32,
    pub shadow: Option<ShadowConfig>,
    inner_cone: f32,
    outer_cone: f32,
    inner_cone_cos: f32,
    outer_cone_cos: f32,
}

impl SpotLight {
    pub const NAME: &'static str = "SpotLight";

    #[must_use]
    pub fn new(owner: NodeHandle) -> Self {
        let mut light = Self {
            owner,
            color: Vec3::ONE,
            intensity: 1.0,
            range: 10.0,
            shadow: None,
            inner_cone: 0.0,
            outer_cone: 0.0,
            inner_cone_cos: 1.0,
            outer_cone_cos: 1.0,
        };
        light.set_cones(std::f32::consts::FRAC_PI_8, std::f32::consts::FRAC_PI_4);
        light
    }

    /// Sets both cone half-angles. `inner` is clamped to `[0, outer]` and
    /// `outer` to `[0, π/2]`.
    pub fn set_cones(&mut self, inner: f32, outer: f32) {
        let outer = outer.clamp(0.0, std::f32::consts::FRAC_PI_2);
        let inner = inner.clamp(0.0, outer);
        self.inner_cone = inner;
        self.outer_cone = outer;
        self.inner_cone_cos = inner.cos();
        self.outer_cone_cos = outer.cos();
    }

    #[inline]
    #[must_use]
    pub fn inner_cone(&self) -> f32 {
        self.inner_cone
    }

    #[inline]
    #[must_use]
    pub fn outer_cone(&self) -> f32 {
        self.outer_cone
    }

    #[inline]
    #[must_use]
    pub fn inner_cone_cos(&self) -> f32 {
        self.inner_cone_cos
    }

    #[inline]
    #[must_use]
    pub fn outer_cone_cos(&self) -> f32 {
        self.outer_cone_cos
    }
}

impl Component for SpotLight {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn owner(&self) -> NodeHandle {
        self.owner
    }

    fn serialize(&self, writer: &mut ChunkWriter) -> Result<()> {
        writer.write_u32(FORMAT_VERSION);
        writer.write_vec3(self.color);
        writer.write_f32(self.intensity);
        writer.write_f32(self.range);
        writer.write_f32(self.inner_cone);
        writer.write_f32(self.outer_cone);
        write_shadow(writer, self.shadow.as_ref());
        Ok(())
    }

    fn deserialize(&mut self, reader: &mut ChunkReader<'_>) -> Result<()> {
        expect_body_version(reader, Self::NAME, FORMAT_VERSION)?;
        let color = reader.read_vec3()?;
        let intensity = reader.read_f32()?;
        let range = reader.read_f32()?;
        let inner = reader.read_f32()?;
        let outer = reader.read_f32()?;
        let shadow = read_shadow(reader)?;

        self.color = color;
        self.intensity = intensity;
        self.range = range;
        self.set_cones(inner, outer);
        self.shadow = shadow;
        Ok(())
    }
}
