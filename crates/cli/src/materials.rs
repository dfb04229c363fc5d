use std::{error::Error, io::Write, path::Path};

use toetools_formats::{mdf::MaterialDescriptor, skm::SkeletalMesh};

/// Lists every material of a skeletal mesh along with missing material and texture files.
/// Missing files are reported, not treated as failures.
pub fn report_materials(
    path: &Path,
    root: &Path,
    out: &mut impl Write,
) -> Result<(), Box<dyn Error>> {
    let mesh = SkeletalMesh::open(path)?;
    let mut missing = 0usize;

    for (index, reference) in mesh.materials.iter().enumerate() {
        let (material, err) = MaterialDescriptor::load(root, &reference.path);
        if let Some(err) = err {
            missing += 1;
            writeln!(out, "[{index}] {}: {err}", reference.path)?;
            continue;
        }

        let visibility = if material.material_class.is_renderable() {
            ""
        } else {
            ", not rendered"
        };
        writeln!(
            out,
            "[{index}] {}: {:?}, {} texture(s){visibility}",
            reference.path, material.material_class, material.texture_count
        )?;

        for layer in 0..material.texture_count {
            let Some(texture) = material.resolve_texture(layer, root) else {
                continue;
            };

            if !texture.is_file() {
                missing += 1;
                writeln!(out, "    texture [{layer}] missing: {}", texture.display())?;
            }
        }
    }

    writeln!(out, "{missing} missing file(s)")?;

    Ok(())
}
