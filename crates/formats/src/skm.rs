//! Skeletal meshes (`.skm`): bones, material references, skinned vertices and triangles.
//!
//! The header holds an offset/count pair per section. Sections can sit anywhere in the file and
//! in any order, so each one is read by seeking to its own offset. Positions, normals and bone
//! transforms are converted to Z-up while reading.

use std::{
    fmt::{Display, Formatter},
    fs::File,
    io::{self, BufReader, Cursor, Read, Seek, SeekFrom},
    path::{Path, PathBuf},
};

use byteorder::{ReadBytesExt, LE};
use glam::{Mat4, Vec2, Vec3};
use smallvec::SmallVec;
use thiserror::Error;
use tracing::{debug, warn};

pub use self::{
    header::{SkmHeader, HEADER_SIZE},
    validate::SkmDefect,
};
use crate::{
    coords::{bone_to_z_up, matrix_from_rows, to_z_up},
    io_ext::{is_truncation, ReadFormatsExt, SeekExt},
};

mod header;
mod validate;

/// A vertex record has room for this many bone influences.
pub const MAX_INFLUENCES: usize = 6;

#[derive(Debug, Error)]
pub enum SkmError {
    #[error("Could not access skeletal mesh")]
    Io(#[from] io::Error),

    #[error("truncated header")]
    TruncatedHeader,

    #[error("truncated section: {0}")]
    TruncatedSection(SkmSection),

    #[error("Vertex {vertex} declares {count} bone influences, at most 6 are allowed")]
    InvalidInfluenceCount { vertex: usize, count: u16 },

    #[error("Skeletal mesh has {} broken reference(s)", .0.len())]
    Invalid(Vec<SkmDefect>),
}

impl SkmError {
    /// Turns a failed read into `truncation` when the stream simply ran out of bytes.
    pub(crate) fn from_read(err: io::Error, truncation: SkmError) -> SkmError {
        if is_truncation(&err) {
            truncation
        } else {
            SkmError::Io(err)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkmSection {
    Bones,
    Materials,
    Vertices,
    Faces,
}

impl Display for SkmSection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            SkmSection::Bones => "bones",
            SkmSection::Materials => "materials",
            SkmSection::Vertices => "vertices",
            SkmSection::Faces => "faces",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bone {
    /// Position in the bone table, assigned in read order.
    pub index: usize,
    pub name: String,

    /// Index of the parent bone, `-1` for a root.
    pub parent_index: i16,
    pub flags: u16,

    /// The stored inverse world (inverse bind pose) matrix, exactly as it appears on disk.
    pub inverse_world: Mat4,

    /// The bone's world transform: `inverse_world` inverted, then rotated into Z-up space.
    pub local_transform: Mat4,
}

impl Bone {
    pub fn parent(&self) -> Option<usize> {
        usize::try_from(self.parent_index).ok()
    }

    pub fn is_root(&self) -> bool {
        self.parent_index < 0
    }
}

/// Path of a material descriptor, as stored in the mesh. Its position in
/// [`SkeletalMesh::materials`] is what triangles refer to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterialReference {
    pub path: String,
}

impl MaterialReference {
    /// Joins the stored path onto a data root, normalizing separators to `/`.
    pub fn resolve(&self, root: impl AsRef<Path>) -> PathBuf {
        root.as_ref().join(self.path.replace('\\', "/"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoneInfluence {
    pub bone: u16,
    pub weight: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkinnedVertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub uv: Vec2,

    /// The meaningful influences only. Weights are passed through as stored and are not
    /// required to sum to one.
    pub influences: SmallVec<[BoneInfluence; MAX_INFLUENCES]>,
}

impl SkinnedVertex {
    pub fn influence_count(&self) -> usize {
        self.influences.len()
    }

    pub fn bone_indices(&self) -> impl Iterator<Item = u16> + '_ {
        self.influences.iter().map(|influence| influence.bone)
    }

    pub fn weights(&self) -> impl Iterator<Item = f32> + '_ {
        self.influences.iter().map(|influence| influence.weight)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Triangle {
    pub material_index: u16,

    /// Vertex indices in stored winding order.
    pub vertices: [u16; 3],
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkeletalMesh {
    pub bones: Vec<Bone>,
    pub materials: Vec<MaterialReference>,
    pub vertices: Vec<SkinnedVertex>,
    pub triangles: Vec<Triangle>,
}

impl SkeletalMesh {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SkmError> {
        let mut reader = BufReader::new(File::open(path)?);

        Self::from_reader(&mut reader)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SkmError> {
        Self::from_reader(&mut Cursor::new(bytes))
    }

    /// Decodes a whole skeletal mesh. Any section that does not fit inside the stream fails the
    /// entire read.
    pub fn from_reader(r: &mut (impl Read + Seek)) -> Result<Self, SkmError> {
        let header = SkmHeader::read(r)?;
        debug!(?header, "Reading skeletal mesh");

        let bones = read_section(r, header.bone_offset(), header.bone_count())?;
        let materials = read_section(r, header.material_offset(), header.material_count())?;
        let vertices = read_section(r, header.vertex_offset(), header.vertex_count())?;
        let triangles = read_section(r, header.face_offset(), header.face_count())?;

        Ok(Self {
            bones,
            materials,
            vertices,
            triangles,
        })
    }

    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn bone_by_name(&self, name: &str) -> Option<&Bone> {
        self.bones.iter().find(|bone| bone.name == name)
    }

    /// Checks every cross-table reference: parent bones, influence bones, triangle materials and
    /// triangle vertices, plus parent cycles. Reading never runs this on its own.
    pub fn validate(&self) -> Result<(), SkmError> {
        let defects = validate::defects(self);

        if defects.is_empty() {
            Ok(())
        } else {
            Err(SkmError::Invalid(defects))
        }
    }
}

/// A fixed-size record of one section.
trait SkmRecord: Sized {
    const SECTION: SkmSection;
    const SIZE: u64;

    fn from_reader(r: &mut impl Read, index: usize) -> Result<Self, SkmError>;
}

impl SkmRecord for Bone {
    const SECTION: SkmSection = SkmSection::Bones;
    const SIZE: u64 = 2 + 2 + 48 + 12 * 4;

    fn from_reader(r: &mut impl Read, index: usize) -> Result<Self, SkmError> {
        let flags = r.read_u16::<LE>()?;
        let parent_index = r.read_i16::<LE>()?;
        let name = r.read_fixed_str::<48>()?;

        let mut rows = [[0.0f32; 4]; 3];
        for row in &mut rows {
            r.read_f32_into::<LE>(row)?;
        }

        let inverse_world = matrix_from_rows(rows);
        if inverse_world.determinant() == 0.0 {
            warn!(bone = %name, index, "Bone has a singular inverse world matrix");
        }

        Ok(Self {
            index,
            name,
            parent_index,
            flags,
            inverse_world,
            local_transform: bone_to_z_up(inverse_world.inverse()),
        })
    }
}

impl SkmRecord for MaterialReference {
    const SECTION: SkmSection = SkmSection::Materials;
    const SIZE: u64 = 128;

    fn from_reader(r: &mut impl Read, _index: usize) -> Result<Self, SkmError> {
        Ok(Self {
            path: r.read_fixed_str::<128>()?,
        })
    }
}

impl SkmRecord for SkinnedVertex {
    const SECTION: SkmSection = SkmSection::Vertices;
    const SIZE: u64 = 16 + 16 + 8 + 2 + 2 + 12 + 24;

    fn from_reader(r: &mut impl Read, index: usize) -> Result<Self, SkmError> {
        let position = read_padded_vec3(r)?;
        let normal = read_padded_vec3(r)?;
        let uv = Vec2::new(r.read_f32::<LE>()?, r.read_f32::<LE>()?);

        let _unk28 = r.read_u16::<LE>()?;
        let influence_count = r.read_u16::<LE>()?;

        let mut bone_ids = [0u16; MAX_INFLUENCES];
        r.read_u16_into::<LE>(&mut bone_ids)?;
        let mut weights = [0.0f32; MAX_INFLUENCES];
        r.read_f32_into::<LE>(&mut weights)?;

        if influence_count as usize > MAX_INFLUENCES {
            return Err(SkmError::InvalidInfluenceCount {
                vertex: index,
                count: influence_count,
            });
        }

        let influences = bone_ids
            .into_iter()
            .zip(weights)
            .take(influence_count as usize)
            .map(|(bone, weight)| BoneInfluence { bone, weight })
            .collect();

        Ok(Self {
            position: to_z_up(position),
            normal: to_z_up(normal),
            uv,
            influences,
        })
    }
}

impl SkmRecord for Triangle {
    const SECTION: SkmSection = SkmSection::Faces;
    const SIZE: u64 = 2 + 3 * 2;

    fn from_reader(r: &mut impl Read, _index: usize) -> Result<Self, SkmError> {
        let material_index = r.read_u16::<LE>()?;
        let mut vertices = [0u16; 3];
        r.read_u16_into::<LE>(&mut vertices)?;

        Ok(Self {
            material_index,
            vertices,
        })
    }
}

/// Reads four floats and drops the fourth.
fn read_padded_vec3(r: &mut impl Read) -> io::Result<Vec3> {
    let mut values = [0.0f32; 4];
    r.read_f32_into::<LE>(&mut values)?;

    Ok(Vec3::new(values[0], values[1], values[2]))
}

fn read_section<T: SkmRecord>(
    r: &mut (impl Read + Seek),
    offset: u64,
    count: usize,
) -> Result<Vec<T>, SkmError> {
    debug!(section = %T::SECTION, offset, count, "Reading section");

    if !r.contains_records(offset, count as u64, T::SIZE)? {
        return Err(SkmError::TruncatedSection(T::SECTION));
    }

    r.seek(SeekFrom::Start(offset))?;

    let mut records = Vec::with_capacity(count);
    for index in 0..count {
        let record = T::from_reader(r, index).map_err(|err| match err {
            SkmError::Io(err) => SkmError::from_read(err, SkmError::TruncatedSection(T::SECTION)),
            err => err,
        })?;

        records.push(record);
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_sizes() {
        assert_eq!(Bone::SIZE, 196);
        assert_eq!(MaterialReference::SIZE, 128);
        assert_eq!(SkinnedVertex::SIZE, 80);
        assert_eq!(Triangle::SIZE, 8);
    }

    #[test]
    fn truncated_section_message() {
        let err = SkmError::TruncatedSection(SkmSection::Vertices);

        assert_eq!(err.to_string(), "truncated section: vertices");
    }

    #[test]
    fn root_bone_has_no_parent() {
        let bone = Bone {
            index: 0,
            name: "Bip01".to_string(),
            parent_index: -1,
            flags: 0,
            inverse_world: Mat4::IDENTITY,
            local_transform: Mat4::IDENTITY,
        };

        assert!(bone.is_root());
        assert_eq!(bone.parent(), None);
        assert_eq!(Bone { parent_index: 3, ..bone }.parent(), Some(3));
    }

    #[test]
    fn material_paths_resolve_against_root() {
        let reference = MaterialReference {
            path: "art\\meshes\\PCs\\pc_human_male.mdf".to_string(),
        };

        assert_eq!(
            reference.resolve("/data"),
            PathBuf::from("/data/art/meshes/PCs/pc_human_male.mdf")
        );
    }

    #[test]
    fn empty_header_reads_empty_mesh() {
        let mesh = SkeletalMesh::from_bytes(&[0u8; 40]).unwrap();

        assert_eq!(mesh.bone_count(), 0);
        assert_eq!(mesh.triangle_count(), 0);
        mesh.validate().unwrap();
    }

    #[test]
    fn short_header() {
        assert!(matches!(
            SkeletalMesh::from_bytes(&[0u8; 39]),
            Err(SkmError::TruncatedHeader)
        ));
    }
}
