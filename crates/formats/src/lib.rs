pub use glam;

pub mod coords;
pub mod dag;
pub mod io_ext;
pub mod mdf;
pub mod skm;

pub mod prelude {
    pub use crate::{
        dag::{ClippingMesh, DagError, ScaleFactor},
        mdf::{MaterialClass, MaterialDescriptor, MdfError, RenderFlags},
        skm::{Bone, MaterialReference, SkeletalMesh, SkinnedVertex, SkmError, Triangle},
    };
}
