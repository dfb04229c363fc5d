pub mod formats {
    pub use toetools_formats::*;
}

pub mod prelude {
    pub use super::formats::prelude::*;
}
