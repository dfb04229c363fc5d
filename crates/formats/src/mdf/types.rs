use std::str::FromStr;

use bitflags::bitflags;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unrecognized {kind} \"{keyword}\"")]
pub struct UnknownKeyword {
    pub kind: &'static str,
    pub keyword: String,
}

impl UnknownKeyword {
    fn new(kind: &'static str, keyword: &str) -> Self {
        Self {
            kind,
            keyword: keyword.to_string(),
        }
    }
}

/// How a texture layer's coordinates are generated or animated.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum UvType {
    #[default]
    Mesh = 0,
    Environment = 1,
    Drift = 2,
    Swirl = 3,
    Wavey = 4,
}

impl FromStr for UvType {
    type Err = UnknownKeyword;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "mesh" => Self::Mesh,
            "environment" => Self::Environment,
            "drift" => Self::Drift,
            "swirl" => Self::Swirl,
            "wavey" => Self::Wavey,
            _ => return Err(UnknownKeyword::new("uv type", s)),
        })
    }
}

/// How a texture layer combines with the layers below it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum BlendType {
    #[default]
    Modulate = 0,
    Add = 1,
    TextureAlpha = 2,
    CurrentAlpha = 3,
    CurrentAlphaAdd = 4,
}

impl FromStr for BlendType {
    type Err = UnknownKeyword;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "modulate" => Self::Modulate,
            "add" => Self::Add,
            "texturealpha" => Self::TextureAlpha,
            "currentalpha" => Self::CurrentAlpha,
            "currentalphaadd" => Self::CurrentAlphaAdd,
            _ => return Err(UnknownKeyword::new("blend type", s)),
        })
    }
}

/// How the finished material blends with the frame buffer.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MaterialBlendType {
    #[default]
    None = 0,
    Alpha = 1,
    Add = 2,
    AlphaAdd = 3,
}

impl FromStr for MaterialBlendType {
    type Err = UnknownKeyword;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "none" => Self::None,
            "alpha" => Self::Alpha,
            "add" => Self::Add,
            "alphaadd" => Self::AlphaAdd,
            _ => return Err(UnknownKeyword::new("material blend type", s)),
        })
    }
}

/// Rendering path a material is meant for.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MaterialClass {
    #[default]
    Textured = 0,
    General = 1,

    /// Writes depth only. Never drawn as a visible surface.
    Clipper = 2,
}

impl MaterialClass {
    pub fn is_renderable(self) -> bool {
        self != MaterialClass::Clipper
    }
}

impl FromStr for MaterialClass {
    type Err = UnknownKeyword;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "textured" => Self::Textured,
            "general" => Self::General,
            "clipper" => Self::Clipper,
            _ => return Err(UnknownKeyword::new("material class", s)),
        })
    }
}

bitflags! {
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RenderFlags: u8 {
        const DOUBLE = 0x01;
        const RECALCULATE_NORMALS = 0x04;
        const Z_FILL_ONLY = 0x08;
        const COLOR_FILL_ONLY = 0x10;
        const NOT_LIT = 0x20;
        const DISABLE_Z = 0x40;
        const LINEAR_FILTERING = 0x80;
    }
}

impl RenderFlags {
    /// Looks up a single flag by its descriptor keyword, ignoring case.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Some(match keyword.to_ascii_lowercase().as_str() {
            "double" => Self::DOUBLE,
            "recalculatenormals" => Self::RECALCULATE_NORMALS,
            "zfillonly" => Self::Z_FILL_ONLY,
            "colorfillonly" => Self::COLOR_FILL_ONLY,
            "notlit" => Self::NOT_LIT,
            "disablez" => Self::DISABLE_Z,
            "linearfiltering" => Self::LINEAR_FILTERING,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Self::new(0, 0, 0, 255)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_ignore_case() {
        assert_eq!("Environment".parse::<UvType>(), Ok(UvType::Environment));
        assert_eq!("CURRENTALPHAADD".parse::<BlendType>(), Ok(BlendType::CurrentAlphaAdd));
        assert_eq!("alphaAdd".parse::<MaterialBlendType>(), Ok(MaterialBlendType::AlphaAdd));
        assert_eq!("Clipper".parse::<MaterialClass>(), Ok(MaterialClass::Clipper));
        assert_eq!(RenderFlags::from_keyword("NotLit"), Some(RenderFlags::NOT_LIT));
    }

    #[test]
    fn unknown_keywords() {
        let err = "sparkle".parse::<UvType>().unwrap_err();

        assert_eq!(err.to_string(), "Unrecognized uv type \"sparkle\"");
        assert_eq!("sparkle".parse::<UvType>().unwrap_or_default(), UvType::Mesh);
        assert_eq!(RenderFlags::from_keyword("highquality"), None);
    }

    #[test]
    fn flag_bits() {
        let flags = RenderFlags::DOUBLE | RenderFlags::LINEAR_FILTERING;

        assert_eq!(flags.bits(), 0x81);
        assert_eq!(RenderFlags::all().bits(), 0xfd);
    }

    #[test]
    fn clipper_is_not_rendered() {
        assert!(MaterialClass::Textured.is_renderable());
        assert!(MaterialClass::General.is_renderable());
        assert!(!MaterialClass::Clipper.is_renderable());
    }

    #[test]
    fn opaque_black_by_default() {
        assert_eq!(Rgba::default(), Rgba::new(0, 0, 0, 255));
    }
}
