use std::{io::Read, mem::size_of};

use byteorder::LE;
use glam::Vec3;
use zerocopy::{AsBytes, FromBytes, FromZeroes, F32, U32};

use crate::dag::DagError;

/// Size of the fixed header, which is also where vertex data starts in files we write.
pub const HEADER_SIZE: u32 = 0x28;

/// Value of the data start field in every known file.
pub const DATA_START_OFFSET: u32 = 0x18;

/// Size of one vertex record: three `f32` coordinates.
pub const VERTEX_SIZE: u32 = 12;

/// Size of one face record: three `u16` vertex indices.
pub const FACE_SIZE: u32 = 6;

#[derive(AsBytes, FromZeroes, FromBytes, Clone, Copy)]
#[repr(packed)]
pub struct DagHeader {
    pub(crate) origin: [F32<LE>; 3],
    pub(crate) bounding_radius: F32<LE>,
    pub(crate) object_count: U32<LE>,
    pub(crate) data_start_offset: U32<LE>,
    pub(crate) vertex_count: U32<LE>,
    pub(crate) face_count: U32<LE>,
    pub(crate) vertex_data_offset: U32<LE>,
    pub(crate) face_data_offset: U32<LE>,
}

const _: () = assert!(size_of::<DagHeader>() == HEADER_SIZE as usize);

impl DagHeader {
    /// Reads the header from the start of a clipping mesh stream.
    pub fn read(r: &mut impl Read) -> Result<Self, DagError> {
        let mut bytes = [0u8; HEADER_SIZE as usize];
        r.read_exact(&mut bytes)?;

        <Self as FromBytes>::read_from(&bytes[..]).ok_or(DagError::Truncated)
    }

    /// Header for a single-object file whose vertex data immediately follows the header and
    /// whose face data immediately follows the vertices.
    pub(crate) fn single_object(
        origin: Vec3,
        bounding_radius: f32,
        vertex_count: u32,
        face_count: u32,
    ) -> Option<Self> {
        let face_data_offset = vertex_count
            .checked_mul(VERTEX_SIZE)?
            .checked_add(HEADER_SIZE)?;

        Some(Self {
            origin: origin.to_array().map(F32::new),
            bounding_radius: F32::new(bounding_radius),
            object_count: U32::new(1),
            data_start_offset: U32::new(DATA_START_OFFSET),
            vertex_count: U32::new(vertex_count),
            face_count: U32::new(face_count),
            vertex_data_offset: U32::new(HEADER_SIZE),
            face_data_offset: U32::new(face_data_offset),
        })
    }

    pub fn origin(&self) -> Vec3 {
        let [x, y, z] = self.origin;

        Vec3::new(x.get(), y.get(), z.get())
    }

    pub fn bounding_radius(&self) -> f32 {
        self.bounding_radius.get()
    }

    pub fn object_count(&self) -> u32 {
        self.object_count.get()
    }

    pub fn data_start_offset(&self) -> u32 {
        self.data_start_offset.get()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count.get() as usize
    }

    pub fn face_count(&self) -> usize {
        self.face_count.get() as usize
    }

    pub fn vertex_data_offset(&self) -> u64 {
        self.vertex_data_offset.get() as u64
    }

    pub fn face_data_offset(&self) -> u64 {
        self.face_data_offset.get() as u64
    }
}

impl std::fmt::Debug for DagHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DagHeader")
            .field("origin", &self.origin())
            .field("bounding_radius", &self.bounding_radius())
            .field("object_count", &self.object_count())
            .field("data_start_offset", &self.data_start_offset())
            .field("vertex_count", &self.vertex_count())
            .field("face_count", &self.face_count())
            .field("vertex_data_offset", &self.vertex_data_offset())
            .field("face_data_offset", &self.face_data_offset())
            .finish()
    }
}
