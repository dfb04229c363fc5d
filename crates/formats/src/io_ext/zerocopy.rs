use zerocopy::{FromBytes, FromZeroes};

/// Reserved bytes inside a fixed-layout structure.
#[derive(FromZeroes, FromBytes, Clone, Copy)]
#[repr(C)]
pub struct Padding<const N: usize>([u8; N]);
