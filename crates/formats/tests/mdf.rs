use std::fs;

use toetools_formats::{
    glam::Vec2,
    mdf::{
        BlendType, MaterialBlendType, MaterialClass, MaterialDescriptor, MdfError, RenderFlags,
        Rgba, UvType,
    },
};

const ROBE: &str = "\
# robe of the archmage\r
Textured\r
Texture \"art\\meshes\\PCs\\robe.tga\"\r
Texture 1 art/meshes/PCs/shimmer.tga\r
UVType 1 Drift\r
BlendType 1 CurrentAlphaAdd\r
SpeedU 1 0.1\r
MaterialBlendType AlphaAdd\r
RenderFlags LinearFiltering RecalculateNormals\r
Specular 200 200 255 255\r
SpecularPower 40\r
GlossMap art/meshes/PCs/robe_gloss.tga\r
";

#[test]
fn parses_a_full_material() {
    let material = MaterialDescriptor::parse(ROBE);

    assert_eq!(material.material_class, MaterialClass::Textured);
    assert_eq!(material.texture_count, 2);
    assert_eq!(material.texture_layers[0].path, "art/meshes/PCs/robe.tga");
    assert_eq!(material.texture_layers[0].uv_type, UvType::Mesh);
    assert_eq!(material.texture_layers[1].path, "art/meshes/PCs/shimmer.tga");
    assert_eq!(material.texture_layers[1].uv_type, UvType::Drift);
    assert_eq!(material.texture_layers[1].blend_type, BlendType::CurrentAlphaAdd);
    assert!(material.texture_layers[1].scroll_speed.abs_diff_eq(Vec2::new(6.0, 0.0), 1e-5));
    assert_eq!(material.material_blend_type, MaterialBlendType::AlphaAdd);
    assert_eq!(
        material.render_flags,
        RenderFlags::LINEAR_FILTERING | RenderFlags::RECALCULATE_NORMALS
    );
    assert_eq!(material.specular, Rgba::new(200, 200, 255, 255));
    assert_eq!(material.specular_power, 40.0);
    assert_eq!(material.color, Rgba::default());
    assert_eq!(material.gloss_map, "art/meshes/PCs/robe_gloss.tga");
}

#[test]
fn later_directives_win() {
    let material = MaterialDescriptor::parse("general\nclipper\ntexture a.tga\ntexture b.tga");

    assert_eq!(material.material_class, MaterialClass::Clipper);
    assert_eq!(material.texture_layers[0].path, "b.tga");
}

#[test]
fn load_relative_to_root() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("art/meshes")).unwrap();
    fs::write(dir.path().join("art/meshes/robe.mdf"), ROBE).unwrap();

    let (material, err) = MaterialDescriptor::load(dir.path(), "art\\meshes\\robe.mdf");

    assert!(err.is_none());
    assert_eq!(material.texture_count, 2);
    assert_eq!(
        material.resolve_texture(1, dir.path()),
        Some(dir.path().join("art/meshes/PCs/shimmer.tga"))
    );
}

#[test]
fn missing_file_yields_default_material_and_error() {
    let dir = tempfile::tempdir().unwrap();

    let (material, err) = MaterialDescriptor::load(dir.path(), "art/missing.mdf");

    assert_eq!(material, MaterialDescriptor::default());
    assert!(matches!(err, Some(MdfError::NotFound(path)) if path.ends_with("art/missing.mdf")));
}

#[test]
fn from_file_reports_missing_file() {
    let dir = tempfile::tempdir().unwrap();

    assert!(matches!(
        MaterialDescriptor::from_file(dir.path().join("nope.mdf")),
        Err(MdfError::NotFound(_))
    ));
}

#[test]
fn invalid_utf8_is_tolerated() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("odd.mdf");
    fs::write(&path, b"general\ntexture \xff\xfe.tga\nrenderflags notlit\n").unwrap();

    let material = MaterialDescriptor::from_file(&path).unwrap();

    assert_eq!(material.material_class, MaterialClass::General);
    assert_eq!(material.texture_layers[0].path, "\u{fffd}\u{fffd}.tga");
    assert_eq!(material.render_flags, RenderFlags::NOT_LIT);
}

#[test]
fn default_material() {
    let material = MaterialDescriptor::default();

    assert_eq!(material.texture_count, 0);
    assert!(material.layers().is_empty());
    assert_eq!(material.material_class, MaterialClass::Textured);
    assert_eq!(material.render_flags, RenderFlags::empty());
    assert_eq!(material.resolve_gloss_map("/data"), None);
}
