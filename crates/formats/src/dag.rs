//! Clipping meshes (`.dag`): the simplified collision/visibility boundary of an object.
//!
//! A file is a 40-byte header followed by local-space vertex positions and triangle index
//! triples. Positions stay in the format's own axis convention; no axis conversion happens here.

use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Read, Seek, SeekFrom, Write},
    path::Path,
    str::FromStr,
};

use byteorder::{ReadBytesExt, WriteBytesExt, LE};
use glam::Vec3;
use thiserror::Error;
use tracing::debug;
use zerocopy::AsBytes;

pub use self::header::{DagHeader, DATA_START_OFFSET, FACE_SIZE, HEADER_SIZE, VERTEX_SIZE};
use crate::io_ext::{is_truncation, SeekExt};

mod header;

#[derive(Debug, Error)]
pub enum DagError {
    #[error("Could not access clipping mesh")]
    Io(#[source] io::Error),

    #[error("Clipping mesh data is truncated")]
    Truncated,

    #[error("Triangle {triangle} references vertex {index}, which does not fit a 16-bit index")]
    IndexOverflow { triangle: usize, index: u32 },

    #[error("{0} elements do not fit the clipping mesh header")]
    CountOverflow(usize),
}

impl From<io::Error> for DagError {
    fn from(err: io::Error) -> Self {
        if is_truncation(&err) {
            DagError::Truncated
        } else {
            DagError::Io(err)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("Scale factor {0} is outside the accepted range {min} to {max}", min = ScaleFactor::MIN, max = ScaleFactor::MAX)]
pub struct InvalidScaleFactor(pub f32);

/// Uniform scale between the game's units and the units of the consuming tool.
///
/// Reading multiplies positions by the factor, writing divides by it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleFactor(f32);

impl ScaleFactor {
    pub const MIN: f32 = 0.01;
    pub const MAX: f32 = 2.0;

    /// Brings a human male model to roughly one unit per meter.
    pub const DEFAULT: Self = Self(0.0225);

    pub fn new(factor: f32) -> Result<Self, InvalidScaleFactor> {
        if (Self::MIN..=Self::MAX).contains(&factor) {
            Ok(Self(factor))
        } else {
            Err(InvalidScaleFactor(factor))
        }
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

impl Default for ScaleFactor {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Debug, Error)]
pub enum ParseScaleFactorError {
    #[error("Scale factor is not a number")]
    Number(#[from] std::num::ParseFloatError),

    #[error(transparent)]
    Range(#[from] InvalidScaleFactor),
}

impl FromStr for ScaleFactor {
    type Err = ParseScaleFactorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s.trim().parse()?)?)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClippingMesh {
    /// World-space origin of the object.
    pub origin: Vec3,

    /// Radius of the horizontal (XY) footprint around [`ClippingMesh::origin`].
    pub bounding_radius: f32,

    /// Vertex positions relative to the origin.
    pub vertices: Vec<Vec3>,

    /// Vertex index triples in their stored winding order.
    pub triangles: Vec<[u16; 3]>,
}

impl ClippingMesh {
    pub fn open(path: impl AsRef<Path>, scale: Option<ScaleFactor>) -> Result<Self, DagError> {
        let mut reader = BufReader::new(File::open(path)?);

        Self::from_reader(&mut reader, scale)
    }

    pub fn from_bytes(bytes: &[u8], scale: Option<ScaleFactor>) -> Result<Self, DagError> {
        Self::from_reader(&mut io::Cursor::new(bytes), scale)
    }

    /// Decodes a clipping mesh. With a scale factor, the origin and every vertex are multiplied
    /// by it right after reading. The stored bounding radius is returned untouched.
    pub fn from_reader(
        r: &mut (impl Read + Seek),
        scale: Option<ScaleFactor>,
    ) -> Result<Self, DagError> {
        let header = DagHeader::read(r)?;
        let vertex_count = header.vertex_count();
        let face_count = header.face_count();

        debug!(
            vertex_count,
            face_count,
            vertex_data_offset = header.vertex_data_offset(),
            face_data_offset = header.face_data_offset(),
            "Reading clipping mesh"
        );

        seek_records(r, header.vertex_data_offset(), vertex_count, VERTEX_SIZE)?;
        let mut vertices = Vec::with_capacity(vertex_count);
        for _ in 0..vertex_count {
            vertices.push(Vec3::new(
                r.read_f32::<LE>()?,
                r.read_f32::<LE>()?,
                r.read_f32::<LE>()?,
            ));
        }

        seek_records(r, header.face_data_offset(), face_count, FACE_SIZE)?;
        let mut triangles = Vec::with_capacity(face_count);
        for _ in 0..face_count {
            triangles.push([
                r.read_u16::<LE>()?,
                r.read_u16::<LE>()?,
                r.read_u16::<LE>()?,
            ]);
        }

        let mut origin = header.origin();
        if let Some(scale) = scale {
            let factor = scale.get();

            origin *= factor;
            for vertex in &mut vertices {
                *vertex *= factor;
            }
        }

        Ok(Self {
            origin,
            bounding_radius: header.bounding_radius(),
            vertices,
            triangles,
        })
    }

    /// Prepares a triangulated mesh for writing.
    ///
    /// `local_vertices` are relative to `world_offset`, the object's world position. With a
    /// scale factor, positions and origin are divided by it. The bounding radius is the largest
    /// XY distance between the resulting origin and any vertex in world space.
    pub fn from_triangles(
        world_offset: Vec3,
        local_vertices: &[Vec3],
        triangles: &[[u32; 3]],
        scale: Option<ScaleFactor>,
    ) -> Result<Self, DagError> {
        let divisor = scale.map_or(1.0, ScaleFactor::get);

        let origin = world_offset / divisor;
        let vertices = local_vertices
            .iter()
            .map(|vertex| *vertex / divisor)
            .collect();

        let world_vertices = local_vertices
            .iter()
            .map(|vertex| (*vertex + world_offset) / divisor);
        let bounding_radius = Self::compute_bounding_radius(origin, world_vertices);

        let triangles = triangles
            .iter()
            .enumerate()
            .map(|(triangle, indices)| {
                let mut narrowed = [0u16; 3];
                for (out, &index) in narrowed.iter_mut().zip(indices) {
                    *out = u16::try_from(index)
                        .map_err(|_| DagError::IndexOverflow { triangle, index })?;
                }

                Ok(narrowed)
            })
            .collect::<Result<Vec<_>, DagError>>()?;

        Ok(Self {
            origin,
            bounding_radius,
            vertices,
            triangles,
        })
    }

    /// Largest planar (XY) distance from `origin` to any of `world_vertices`, or 0 when there
    /// are none.
    pub fn compute_bounding_radius(
        origin: Vec3,
        world_vertices: impl IntoIterator<Item = Vec3>,
    ) -> f32 {
        let center = origin.truncate();

        world_vertices
            .into_iter()
            .map(|vertex| vertex.truncate().distance(center))
            .fold(0.0, f32::max)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), DagError> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer)?;
        writer.flush()?;

        Ok(())
    }

    /// Encodes the mesh as stored: object count 1, vertex data right after the header, face
    /// data right after the vertices.
    pub fn write_to(&self, w: &mut impl Write) -> Result<(), DagError> {
        let vertex_count = u32::try_from(self.vertices.len())
            .map_err(|_| DagError::CountOverflow(self.vertices.len()))?;
        let face_count = u32::try_from(self.triangles.len())
            .map_err(|_| DagError::CountOverflow(self.triangles.len()))?;

        let header =
            DagHeader::single_object(self.origin, self.bounding_radius, vertex_count, face_count)
                .ok_or(DagError::CountOverflow(self.vertices.len()))?;

        w.write_all(header.as_bytes())?;

        for vertex in &self.vertices {
            w.write_f32::<LE>(vertex.x)?;
            w.write_f32::<LE>(vertex.y)?;
            w.write_f32::<LE>(vertex.z)?;
        }

        for triangle in &self.triangles {
            for index in triangle {
                w.write_u16::<LE>(*index)?;
            }
        }

        Ok(())
    }
}

fn seek_records(
    r: &mut (impl Read + Seek),
    offset: u64,
    count: usize,
    record_size: u32,
) -> Result<(), DagError> {
    if !r.contains_records(offset, count as u64, record_size as u64)? {
        return Err(DagError::Truncated);
    }

    r.seek(SeekFrom::Start(offset))?;

    Ok(())
}
