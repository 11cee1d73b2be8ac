//! Prints the contents of a `.vox` file: models, transforms, instances, groups, non-diffuse
//! materials and the palette.

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use vox_scene::{Handedness, MaterialKind, ReaderSettings, Scene, UpAxis};

#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Path of the .vox file to inspect.
    path: PathBuf,

    /// Convert to a left-handed coordinate system.
    #[arg(long)]
    left_handed: bool,

    /// Convert to a Y-up coordinate system.
    #[arg(long)]
    y_up: bool,

    /// Size of one voxel.
    #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"], default_values_t = [1.0, 1.0, 1.0])]
    voxel_scale: Vec<f32>,

    /// Keep instances of odd-sized models on the integer grid.
    #[arg(long)]
    no_voxel_offsets: bool,

    /// Keep mirrored transforms instead of mirroring their models.
    #[arg(long)]
    keep_negative_scale: bool,

    /// More log output; repeat for more.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn settings(&self) -> ReaderSettings {
        let handedness = if self.left_handed { Handedness::Left } else { Handedness::Right };
        let up_axis = if self.y_up { UpAxis::Y } else { UpAxis::Z };
        let [x, y, z] = [0, 1, 2].map(|axis| self.voxel_scale.get(axis).copied().unwrap_or(1.0));
        ReaderSettings::default()
            .with_coordinate_system(handedness, up_axis)
            .with_voxel_scale([x, y, z])
            .with_voxel_offsets(!self.no_voxel_offsets)
            .with_negative_scale_avoidance(!self.keep_negative_scale)
    }
}

fn color_swatch(scene: &Scene, index: u8) -> String {
    let color = scene.palette_color(index);
    format!("\x1b[48;2;{};{};{}m  ", color.red, color.green, color.blue)
}

fn print_scene(scene: &Scene) {
    println!("Version: {}\n", scene.version);

    for model in &scene.models {
        println!("Model:");
        println!("    Size: {}, {}, {}", model.size.x, model.size.y, model.size.z);
        println!("    Voxel data size: {}", model.voxel_data.len());
        println!();
    }

    for transform in &scene.transforms {
        let world = transform.position();
        let local = transform.local_position;
        println!("Transform:");
        println!("    Name: {}", transform.name);
        println!("    Hidden: {}", transform.hidden);
        println!("    World position: {}, {}, {}", world.x, world.y, world.z);
        println!("    Local position: {}, {}, {}", local.x, local.y, local.z);
        if let Some(rotation) = transform.local_rotation {
            println!(
                "    Local rotation: {}, {}, {}, {}",
                rotation.x, rotation.y, rotation.z, rotation.w
            );
        }
        println!();
    }

    for instance in &scene.instances {
        println!("Instance:");
        println!("    Name: {}", scene.transforms[instance.transform_index].name);
        println!("    Model index: {}", instance.model_index);
        println!();
    }

    for group in &scene.groups {
        println!("Group:");
        println!("    Name: {}", scene.transforms[group.transform_index].name);
        println!("    Children:");
        for &child in &group.child_transform_indices {
            match scene.transforms[child].name.as_str() {
                "" => println!("        Child transform: {child}"),
                name => println!("        Child transform: {child} ({name})"),
            }
        }
        println!();
    }

    let mut diffuse_count = 0;
    for (index, material) in scene.materials.iter().enumerate() {
        if material.kind == MaterialKind::Diffuse {
            diffuse_count += 1;
            continue;
        }
        println!("Material:");
        println!("    Material index: {index}");
        println!("    Type: {:?}", material.kind);
        println!("    Media type: {:?}", material.media_type);
        println!("    Roughness: {}", material.roughness);
        println!("    Index of refraction: {}", material.ior);
        println!("    Specular: {}", material.specular);
        println!("    Emission: {}", material.emission);
        println!("    Power: {}", material.power);
        println!("    Ldr: {}", material.ldr);
        println!("    Metallic: {}", material.metallic);
        println!("    Transparency: {}", material.transparency);
        println!("    Density: {}", material.density);
        println!("    Phase: {}", material.phase);
        println!();
    }
    println!("+ diffuse material count: {diffuse_count}\n");

    println!("Palette:");
    for row in (0..32u8).rev() {
        let line: String = (0..8u8).map(|column| color_swatch(scene, row * 8 + column)).collect();
        println!("{line}\x1b[0m");
    }
}

fn main() -> Result<(), anyhow::Error> {
    let args = Args::parse();

    use simplelog::LevelFilter::{Debug, Off, Trace, Warn};
    simplelog::TermLogger::init(
        match args.verbose {
            0 => Warn,
            1 => Debug,
            _ => Trace,
        },
        simplelog::ConfigBuilder::new()
            .set_target_level(Off)
            .set_location_level(Off)
            .build(),
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    )?;

    let bytes = std::fs::read(&args.path)
        .with_context(|| format!("failed to read {}", args.path.display()))?;
    let scene = Scene::from_bytes(&bytes, &args.settings())
        .with_context(|| format!("failed to decode {}", args.path.display()))?;
    print_scene(&scene);
    Ok(())
}
