use std::{io::Read, mem::size_of};

use byteorder::LE;
use zerocopy::{FromBytes, FromZeroes, U32};

use crate::{io_ext::zerocopy::Padding, skm::SkmError};

pub const HEADER_SIZE: usize = 0x28;

#[derive(FromZeroes, FromBytes, Clone, Copy)]
#[repr(packed)]
pub struct SkmHeader {
    pub(crate) bone_count: U32<LE>,
    pub(crate) bone_offset: U32<LE>,
    pub(crate) material_count: U32<LE>,
    pub(crate) material_offset: U32<LE>,
    pub(crate) vertex_count: U32<LE>,
    pub(crate) vertex_offset: U32<LE>,
    pub(crate) face_count: U32<LE>,
    pub(crate) face_offset: U32<LE>,

    #[doc(hidden)]
    _reserved: Padding<8>,
}

const _: () = assert!(size_of::<SkmHeader>() == HEADER_SIZE);

impl SkmHeader {
    pub fn read(r: &mut impl Read) -> Result<Self, SkmError> {
        let mut bytes = [0u8; HEADER_SIZE];
        r.read_exact(&mut bytes)
            .map_err(|err| SkmError::from_read(err, SkmError::TruncatedHeader))?;

        <Self as FromBytes>::read_from(&bytes[..]).ok_or(SkmError::TruncatedHeader)
    }

    pub fn bone_count(&self) -> usize {
        self.bone_count.get() as usize
    }

    pub fn bone_offset(&self) -> u64 {
        self.bone_offset.get() as u64
    }

    pub fn material_count(&self) -> usize {
        self.material_count.get() as usize
    }

    pub fn material_offset(&self) -> u64 {
        self.material_offset.get() as u64
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count.get() as usize
    }

    pub fn vertex_offset(&self) -> u64 {
        self.vertex_offset.get() as u64
    }

    pub fn face_count(&self) -> usize {
        self.face_count.get() as usize
    }

    pub fn face_offset(&self) -> u64 {
        self.face_offset.get() as u64
    }
}

impl std::fmt::Debug for SkmHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SkmHeader")
            .field("bone_count", &self.bone_count())
            .field("bone_offset", &self.bone_offset())
            .field("material_count", &self.material_count())
            .field("material_offset", &self.material_offset())
            .field("vertex_count", &self.vertex_count())
            .field("vertex_offset", &self.vertex_offset())
            .field("face_count", &self.face_count())
            .field("face_offset", &self.face_offset())
            .finish()
    }
}
