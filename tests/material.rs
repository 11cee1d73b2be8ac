mod common;

use anyhow::Result;
use common::VoxWriter;
use pretty_assertions::assert_eq;
use vox_scene::{Material, MaterialKind, MediaType, SceneError, VoxError};

fn material(props: &[(&str, &str)]) -> Result<Material, VoxError> {
    let scene = vox_scene::parse_bytes(&VoxWriter::new().material(1, props).build())?;
    Ok(scene.materials[1])
}

#[test]
fn legacy_keys_apply_when_current_key_is_absent() -> Result<()> {
    let legacy = material(&[("_type", "_diffuse"), ("_ior", "0.5"), ("_spec", "0.5")])?;
    assert_eq!(legacy.ior, 1.5);
    assert_eq!(legacy.specular, 1.5);

    let both = material(&[("_type", "_diffuse"), ("_ri", "2.0"), ("_ior", "0.5"), ("_sp", "1.25")])?;
    assert_eq!(both.ior, 2.0);
    assert_eq!(both.specular, 1.25);
    Ok(())
}

#[test]
fn weight_fills_emission_and_transparency() -> Result<()> {
    let glass = material(&[("_type", "_glass"), ("_weight", "0.25")])?;
    assert_eq!(glass.kind, MaterialKind::Glass);
    assert_eq!(glass.emission, 25.0);
    assert_eq!(glass.transparency, 25.0);

    let glass = material(&[("_type", "_glass"), ("_trans", "0.5"), ("_weight", "0.25")])?;
    assert_eq!(glass.transparency, 50.0);
    assert_eq!(glass.emission, 25.0);
    Ok(())
}

#[test]
fn density_units_depend_on_key() -> Result<()> {
    assert_eq!(material(&[("_type", "_cloud"), ("_d", "0.25")])?.density, 250.0);
    assert_eq!(material(&[("_type", "_cloud"), ("_att", "0.5")])?.density, 50.0);
    Ok(())
}

#[test]
fn full_property_set() -> Result<()> {
    let emit = material(&[
        ("_type", "_emit"),
        ("_media_type", "_scatter"),
        ("_rough", "0.5"),
        ("_emit", "0.75"),
        ("_flux", "3"),
        ("_glow", "0.25"),
        ("_metal", "0.125"),
        ("_g", "-0.5"),
        ("_alpha", "0.5"),
    ])?;
    assert_eq!(
        emit,
        Material {
            kind: MaterialKind::Emit,
            media_type: MediaType::Scatter,
            roughness: 50.0,
            emission: 75.0,
            power: 3,
            ldr: 25.0,
            metallic: 12.5,
            phase: -0.5,
            ..Material::default()
        }
    );
    Ok(())
}

#[test]
fn missing_type_leaves_slot_alone() -> Result<()> {
    assert_eq!(material(&[("_rough", "0.5"), ("_metal", "1.0")])?, Material::default());
    Ok(())
}

#[test]
fn unknown_types_are_errors() {
    assert_eq!(
        material(&[("_type", "_plastic")]),
        Err(VoxError::UnknownMaterialType { key: "_type", value: "_plastic".to_owned() })
    );
    assert_eq!(
        material(&[("_type", "_glass"), ("_media_type", "_fog")]),
        Err(VoxError::UnknownMaterialType { key: "_media_type", value: "_fog".to_owned() })
    );
}

#[test]
fn malformed_numbers_are_errors() {
    assert_eq!(
        material(&[("_type", "_metal"), ("_rough", "rough")]),
        Err(VoxError::MalformedScene(SceneError::InvalidAttributeValue {
            attribute: "_rough",
            value: "rough".to_owned(),
        }))
    );
    assert!(matches!(
        material(&[("_type", "_emit"), ("_flux", "1.5")]),
        Err(VoxError::MalformedScene(SceneError::InvalidAttributeValue { attribute: "_flux", .. }))
    ));
}

#[test]
fn materials_are_indexed_by_palette_slot() -> Result<()> {
    let bytes = VoxWriter::new()
        .material(0, &[("_type", "_metal")])
        .material(255, &[("_type", "_glass")])
        .material(300, &[("_type", "_emit")])
        .build();
    let scene = vox_scene::parse_bytes(&bytes)?;
    assert_eq!(scene.materials[0].kind, MaterialKind::Metal);
    assert_eq!(scene.materials[255].kind, MaterialKind::Glass);
    assert!(scene.materials[1..255].iter().all(|m| *m == Material::default()));
    Ok(())
}
