/// Extensions for Rust standard library IO traits.
mod read;
mod seek;
pub mod zerocopy;

pub use read::*;
pub use seek::*;
