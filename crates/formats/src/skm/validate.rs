use std::fmt::{Display, Formatter};

use super::SkeletalMesh;

/// A cross-table reference in a skeletal mesh that points nowhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkmDefect {
    ParentOutOfRange { bone: usize, parent: i16 },
    ParentCycle { bone: usize },
    InfluenceOutOfRange { vertex: usize, bone: u16 },
    MaterialOutOfRange { triangle: usize, material: u16 },
    VertexOutOfRange { triangle: usize, vertex: u16 },
}

impl Display for SkmDefect {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SkmDefect::ParentOutOfRange { bone, parent } => {
                write!(f, "bone {bone} has parent {parent}, which does not exist")
            }
            SkmDefect::ParentCycle { bone } => {
                write!(f, "bone {bone} is its own ancestor")
            }
            SkmDefect::InfluenceOutOfRange { vertex, bone } => {
                write!(f, "vertex {vertex} is weighted to missing bone {bone}")
            }
            SkmDefect::MaterialOutOfRange { triangle, material } => {
                write!(f, "triangle {triangle} uses missing material {material}")
            }
            SkmDefect::VertexOutOfRange { triangle, vertex } => {
                write!(f, "triangle {triangle} uses missing vertex {vertex}")
            }
        }
    }
}

pub(super) fn defects(mesh: &SkeletalMesh) -> Vec<SkmDefect> {
    let mut defects = Vec::new();
    let bone_count = mesh.bones.len();

    for bone in &mesh.bones {
        if let Some(parent) = bone.parent() {
            if parent >= bone_count {
                defects.push(SkmDefect::ParentOutOfRange {
                    bone: bone.index,
                    parent: bone.parent_index,
                });
            }
        }
    }

    // Only worth walking the hierarchy once every parent link is known to be in range.
    if defects.is_empty() {
        defects.extend(
            (0..bone_count)
                .filter(|&bone| in_cycle(mesh, bone))
                .map(|bone| SkmDefect::ParentCycle { bone }),
        );
    }

    for (vertex, data) in mesh.vertices.iter().enumerate() {
        defects.extend(
            data.bone_indices()
                .filter(|&bone| bone as usize >= bone_count)
                .map(|bone| SkmDefect::InfluenceOutOfRange { vertex, bone }),
        );
    }

    for (triangle, data) in mesh.triangles.iter().enumerate() {
        if data.material_index as usize >= mesh.materials.len() {
            defects.push(SkmDefect::MaterialOutOfRange {
                triangle,
                material: data.material_index,
            });
        }

        defects.extend(
            data.vertices
                .iter()
                .filter(|&&vertex| vertex as usize >= mesh.vertices.len())
                .map(|&vertex| SkmDefect::VertexOutOfRange { triangle, vertex }),
        );
    }

    defects
}

/// Follows parent links from `start`. A chain longer than the bone table must loop.
fn in_cycle(mesh: &SkeletalMesh, start: usize) -> bool {
    let mut current = mesh.bones[start].parent();

    for _ in 0..mesh.bones.len() {
        match current {
            Some(bone) if bone == start => return true,
            Some(bone) => current = mesh.bones[bone].parent(),
            None => return false,
        }
    }

    false
}
