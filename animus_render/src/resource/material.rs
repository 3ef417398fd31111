/// Material: a shader program plus an ordered property map.
///
/// Each property is a tagged `MaterialValue`, resolved once when it is set
/// and dispatched by pattern match when the material is applied.

use glam::Vec3;

use crate::error::Result;
use crate::graphics_device::{GraphicsDevice, ProgramHandle, Texture, UniformValue};

/// Material property value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MaterialValue {
    Scalar(f32),
    Vec3(Vec3),
    /// Sampled texture bound to `unit`; the sampler uniform receives the unit index
    Texture { unit: u32, texture: Texture },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    name: String,
    program: ProgramHandle,
    properties: Vec<(String, MaterialValue)>,
}

impl Material {
    pub fn new(name: &str, program: ProgramHandle) -> Self {
        Self {
            name: name.to_string(),
            program,
            properties: Vec::new(),
        }
    }

    /// Physically based defaults: Albedo, Metallic, Roughness, AO
    pub fn physical(name: &str, program: ProgramHandle) -> Self {
        Self::new(name, program)
            .with("Albedo", MaterialValue::Vec3(Vec3::new(0.3, 0.1, 1.0)))
            .with("Metallic", MaterialValue::Scalar(0.3))
            .with("Roughness", MaterialValue::Scalar(0.8))
            .with("AO", MaterialValue::Scalar(0.2))
    }

    /// Builder form of `set`
    pub fn with(mut self, name: &str, value: MaterialValue) -> Self {
        self.set(name, value);
        self
    }

    /// Insert or replace a property, keeping first-insertion order
    pub fn set(&mut self, name: &str, value: MaterialValue) {
        match self.properties.iter_mut().find(|(key, _)| key == name) {
            Some((_, slot)) => *slot = value,
            None => self.properties.push((name.to_string(), value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&MaterialValue> {
        self.properties
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// Make the program current and upload every property
    pub fn apply(&self, device: &mut dyn GraphicsDevice) -> Result<()> {
        device.use_program(Some(self.program))?;
        for (name, value) in &self.properties {
            match value {
                MaterialValue::Scalar(v) => device.set_uniform(name, UniformValue::Float(*v))?,
                MaterialValue::Vec3(v) => device.set_uniform(name, UniformValue::Vec3(*v))?,
                MaterialValue::Texture { unit, texture } => {
                    device.bind_texture(*unit, Some(texture))?;
                    device.set_uniform(name, UniformValue::Int(*unit as i32))?;
                }
            }
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn program(&self) -> ProgramHandle {
        self.program
    }

    pub fn properties(&self) -> &[(String, MaterialValue)] {
        &self.properties
    }
}

#[cfg(test)]
#[path = "material_tests.rs"]
mod tests;
