//! Adjustments made to finished instances once the whole file has been read.

use std::collections::HashMap;

use log::debug;

use crate::math::Vector;
use crate::semantic::Scene;
use crate::settings::ReaderSettings;

/// Moves instances of models with an odd extent on some axis by half a voxel along that axis,
/// so they line up with models of even extent.
pub(crate) fn add_voxel_offsets(scene: &mut Scene, settings: &ReaderSettings) {
    let system = settings.coordinate_system();
    let half_scale = |extent: u32, scale: f32| if extent % 2 == 1 { scale * 0.5 } else { 0.0 };

    for instance in &scene.instances {
        let size = scene.models[instance.model_index].size;
        let mut offset = Vector::new(
            half_scale(size.x, settings.voxel_scale.x),
            half_scale(size.y, settings.voxel_scale.y),
            half_scale(size.z, settings.voxel_scale.z),
        );
        if system.flipped_handedness() {
            offset.x = -offset.x;
        }
        if system.flipped_up_axis() {
            offset.z = -offset.z;
        }
        if offset == Vector::ZERO {
            continue;
        }

        let transform = &mut scene.transforms[instance.transform_index];
        if !system.is_native() {
            offset = transform.matrix.transform_vector(offset);
        }
        transform.matrix.set_translation(transform.matrix.translation() + offset);
        transform.local_position += offset;
    }
}

/// Replaces mirroring instance transforms by a mirrored copy of their model.
///
/// A mirrored transform always has all three axes negated, so reversing the flat voxel data
/// mirrors the model the same way and negating the basis cancels the transform's mirroring.
/// Each original model gets at most one mirrored copy.
pub(crate) fn avoid_negative_scale(scene: &mut Scene) {
    let mut mirrored_models: HashMap<usize, usize> = HashMap::new();

    for instance in &mut scene.instances {
        let transform = &mut scene.transforms[instance.transform_index];
        if transform.matrix.determinant3() >= 0.0 {
            continue;
        }

        let models = &mut scene.models;
        let mirrored = *mirrored_models.entry(instance.model_index).or_insert_with(|| {
            let mirrored = models[instance.model_index].mirrored();
            models.push(mirrored);
            models.len() - 1
        });
        debug!(
            "instance of model {} has negative scale, using mirrored model {mirrored}",
            instance.model_index
        );
        instance.model_index = mirrored;
        transform.matrix.negate_basis();
    }
}
