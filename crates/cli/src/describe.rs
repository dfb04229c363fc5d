use std::{
    error::Error,
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

use toetools_formats::{
    dag::{ClippingMesh, DagHeader, ScaleFactor},
    mdf::{MaterialDescriptor, RenderFlags},
    skm::{SkeletalMesh, SkmError},
};

pub fn describe_skm(
    path: &Path,
    validate: bool,
    out: &mut impl Write,
) -> Result<(), Box<dyn Error>> {
    let mesh = SkeletalMesh::open(path)?;

    writeln!(out, "Bones: {}", mesh.bone_count())?;
    for bone in &mesh.bones {
        match bone.parent() {
            Some(parent) => writeln!(out, "  [{}] {} (parent {parent})", bone.index, bone.name)?,
            None => writeln!(out, "  [{}] {} (root)", bone.index, bone.name)?,
        }
    }

    writeln!(out, "Materials: {}", mesh.material_count())?;
    for (index, material) in mesh.materials.iter().enumerate() {
        writeln!(out, "  [{index}] {}", material.path)?;
    }

    writeln!(out, "Vertices: {}", mesh.vertex_count())?;
    writeln!(out, "Triangles: {}", mesh.triangle_count())?;

    if validate {
        match mesh.validate() {
            Ok(()) => writeln!(out, "References: ok")?,
            Err(SkmError::Invalid(defects)) => {
                writeln!(out, "References: {} broken", defects.len())?;
                for defect in defects {
                    writeln!(out, "  {defect}")?;
                }
            }
            Err(err) => return Err(err.into()),
        }
    }

    Ok(())
}

pub fn describe_dag(
    path: &Path,
    scale: Option<ScaleFactor>,
    out: &mut impl Write,
) -> Result<(), Box<dyn Error>> {
    let header = DagHeader::read(&mut BufReader::new(File::open(path)?))?;
    let mesh = ClippingMesh::open(path, scale)?;

    writeln!(out, "Objects: {}", header.object_count())?;
    writeln!(
        out,
        "Origin: {:.3} {:.3} {:.3}",
        mesh.origin.x, mesh.origin.y, mesh.origin.z
    )?;
    writeln!(out, "Bounding radius: {:.3}", mesh.bounding_radius)?;
    writeln!(
        out,
        "Vertices: {} at {:#x}",
        mesh.vertices.len(),
        header.vertex_data_offset()
    )?;
    writeln!(
        out,
        "Triangles: {} at {:#x}",
        mesh.triangles.len(),
        header.face_data_offset()
    )?;

    Ok(())
}

pub fn describe_mdf(path: &Path, out: &mut impl Write) -> Result<(), Box<dyn Error>> {
    let material = MaterialDescriptor::from_file(path)?;

    writeln!(out, "Class: {:?}", material.material_class)?;
    writeln!(out, "Blend: {:?}", material.material_blend_type)?;
    writeln!(out, "Render flags: {}", flag_names(material.render_flags))?;

    let color = material.color;
    writeln!(out, "Color: {} {} {} {}", color.r, color.g, color.b, color.a)?;
    let specular = material.specular;
    writeln!(
        out,
        "Specular: {} {} {} {} power {}",
        specular.r, specular.g, specular.b, specular.a, material.specular_power
    )?;

    if !material.gloss_map.is_empty() {
        writeln!(out, "Gloss map: {}", material.gloss_map)?;
    }

    for (index, layer) in material.layers().iter().enumerate() {
        writeln!(
            out,
            "Texture [{index}] {} uv {:?} blend {:?} speed {} {}",
            layer.path, layer.uv_type, layer.blend_type, layer.scroll_speed.x, layer.scroll_speed.y
        )?;
    }

    Ok(())
}

fn flag_names(flags: RenderFlags) -> String {
    if flags.is_empty() {
        return "none".to_string();
    }

    flags
        .iter_names()
        .map(|(name, _)| name)
        .collect::<Vec<_>>()
        .join(" | ")
}
