//! Materials of the palette, decoded from `MATL` property dictionaries.
//!
//! Files written before version 200 use different keys and units for several properties.
//! Each field prefers its current key and only falls back to the old one when it is absent.

use std::str::FromStr;

use crate::error::{SceneError, VoxError};
use crate::syntax::Dict;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum MaterialKind {
    #[default]
    Diffuse,
    Metal,
    Emit,
    Glass,
    Blend,
    Cloud,
}

impl TryFrom<&str> for MaterialKind {
    type Error = VoxError;

    fn try_from(s: &str) -> Result<Self, VoxError> {
        Ok(match s {
            "_diffuse" => MaterialKind::Diffuse,
            "_metal" => MaterialKind::Metal,
            "_emit" => MaterialKind::Emit,
            "_glass" => MaterialKind::Glass,
            "_blend" => MaterialKind::Blend,
            "_cloud" => MaterialKind::Cloud,
            _ => return Err(VoxError::UnknownMaterialType { key: "_type", value: s.to_owned() }),
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum MediaType {
    #[default]
    Absorb,
    Scatter,
    Emissive,
    SubsurfaceScattering,
}

impl TryFrom<&str> for MediaType {
    type Error = VoxError;

    fn try_from(s: &str) -> Result<Self, VoxError> {
        Ok(match s {
            "_absorb" => MediaType::Absorb,
            "_scatter" => MediaType::Scatter,
            "_emit" => MediaType::Emissive,
            "_sss" => MediaType::SubsurfaceScattering,
            _ => {
                return Err(VoxError::UnknownMaterialType {
                    key: "_media_type",
                    value: s.to_owned(),
                })
            }
        })
    }
}

/// Surface description of one palette slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub kind: MaterialKind,
    pub media_type: MediaType,
    /// Range [0.0 ~ 100.0].
    pub roughness: f32,
    /// Index of refraction. Range [1.0 ~ 3.0].
    pub ior: f32,
    /// Range [1.0 ~ 2.0].
    pub specular: f32,
    /// Range [0.0 ~ 100.0].
    pub emission: f32,
    /// Range [0 ~ 4].
    pub power: u8,
    /// Range [0.0 ~ 100.0] (was called "glow" before version 200).
    pub ldr: f32,
    /// Range [0.0 ~ 100.0].
    pub metallic: f32,
    /// Range [0.0 ~ 100.0] (was called "glass" before version 200).
    pub transparency: f32,
    /// Range [0.0 ~ 100.0] (was called "attenuate" before version 200).
    pub density: f32,
    /// Range [-0.9 ~ 0.9].
    pub phase: f32,
}

impl Default for Material {
    fn default() -> Self {
        Material {
            kind: MaterialKind::Diffuse,
            media_type: MediaType::Absorb,
            roughness: 10.0,
            ior: 1.3,
            specular: 1.0,
            emission: 0.0,
            power: 0,
            ldr: 0.0,
            metallic: 0.0,
            transparency: 0.0,
            density: 50.0,
            phase: 0.0,
        }
    }
}

enum Found<T> {
    Current(T),
    Legacy(T),
}

fn parse_value<T: FromStr>(attribute: &'static str, value: &str) -> Result<T, VoxError> {
    value.parse().map_err(|_| {
        SceneError::InvalidAttributeValue { attribute, value: value.to_owned() }.into()
    })
}

fn get<T: FromStr>(props: &Dict, key: &'static str) -> Result<Option<T>, VoxError> {
    props.get(key).map(|value| parse_value(key, value)).transpose()
}

/// Looks up `current`, and only when it is missing, `legacy`.
fn get_either(
    props: &Dict,
    current: &'static str,
    legacy: &'static str,
) -> Result<Option<Found<f32>>, VoxError> {
    if let Some(value) = get(props, current)? {
        return Ok(Some(Found::Current(value)));
    }
    Ok(get(props, legacy)?.map(Found::Legacy))
}

impl Material {
    /// Applies a `MATL` property dictionary.
    ///
    /// Without a `_type` key the material is left untouched.
    pub(crate) fn apply_properties(&mut self, props: &Dict) -> Result<(), VoxError> {
        let Some(kind) = props.get("_type") else {
            return Ok(());
        };
        self.kind = MaterialKind::try_from(kind.as_str())?;

        if let Some(media_type) = props.get("_media_type") {
            self.media_type = MediaType::try_from(media_type.as_str())?;
        }
        if let Some(roughness) = get::<f32>(props, "_rough")? {
            self.roughness = roughness * 100.0;
        }
        match get_either(props, "_ri", "_ior")? {
            Some(Found::Current(ior)) => self.ior = ior,
            Some(Found::Legacy(ior)) => self.ior = ior + 1.0,
            None => {}
        }
        match get_either(props, "_sp", "_spec")? {
            Some(Found::Current(specular)) => self.specular = specular,
            Some(Found::Legacy(specular)) => self.specular = specular + 1.0,
            None => {}
        }
        if let Some(Found::Current(emission) | Found::Legacy(emission)) =
            get_either(props, "_emit", "_weight")?
        {
            self.emission = emission * 100.0;
        }
        if let Some(power) = get::<u8>(props, "_flux")? {
            self.power = power;
        }
        if let Some(Found::Current(ldr) | Found::Legacy(ldr)) = get_either(props, "_ldr", "_glow")? {
            self.ldr = ldr * 100.0;
        }
        if let Some(metallic) = get::<f32>(props, "_metal")? {
            self.metallic = metallic * 100.0;
        }
        // `_alpha` tends to mirror `_trans` and is not mapped.
        if let Some(Found::Current(transparency) | Found::Legacy(transparency)) =
            get_either(props, "_trans", "_weight")?
        {
            self.transparency = transparency * 100.0;
        }
        match get_either(props, "_d", "_att")? {
            Some(Found::Current(density)) => self.density = density * 1000.0,
            Some(Found::Legacy(density)) => self.density = density * 100.0,
            None => {}
        }
        if let Some(phase) = get::<f32>(props, "_g")? {
            self.phase = phase;
        }
        Ok(())
    }
}
