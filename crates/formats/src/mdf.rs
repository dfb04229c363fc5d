//! Material descriptors (`.mdf`): line-oriented text describing how a surface is shaded.
//!
//! Parsing never fails. Unknown keywords, unknown enum values and directives with unusable
//! arguments are skipped, so a half-broken material still renders with whatever did parse.

use std::{
    fs,
    io,
    path::{Path, PathBuf},
};

use glam::Vec2;
use thiserror::Error;
use tracing::{debug, error, warn};

pub use self::types::{
    BlendType, MaterialBlendType, MaterialClass, RenderFlags, Rgba, UnknownKeyword, UvType,
};

mod types;

/// Number of texture layers a material can stack.
pub const MAX_TEXTURE_LAYERS: usize = 4;

/// Scroll speeds are written per second and stored per frame at this rate.
pub const FRAMES_PER_SECOND: f32 = 60.0;

#[derive(Debug, Error)]
pub enum MdfError {
    #[error("Material file {0} does not exist")]
    NotFound(PathBuf),

    #[error("Could not read material file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct TextureLayer {
    /// Data-root relative path with `/` separators, empty when the layer is unused.
    pub path: String,
    pub uv_type: UvType,
    pub blend_type: BlendType,

    /// U and V scroll speed per frame.
    pub scroll_speed: Vec2,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct MaterialDescriptor {
    pub texture_layers: [TextureLayer; MAX_TEXTURE_LAYERS],

    /// One past the highest layer a `texture` directive assigned.
    pub texture_count: usize,
    pub gloss_map: String,
    pub color: Rgba,
    pub specular: Rgba,
    pub specular_power: f32,
    pub material_blend_type: MaterialBlendType,
    pub render_flags: RenderFlags,
    pub material_class: MaterialClass,
}

impl MaterialDescriptor {
    pub fn parse(text: &str) -> Self {
        let mut descriptor = Self::default();

        for (line_number, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Err(reason) = descriptor.apply(line) {
                warn!(
                    line = line_number + 1,
                    directive = line,
                    reason,
                    "Skipping material directive"
                );
            }
        }

        descriptor
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, MdfError> {
        let path = path.as_ref();

        let bytes = fs::read(path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                MdfError::NotFound(path.to_path_buf())
            } else {
                MdfError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        debug!(path = %path.display(), "Parsing material");
        Ok(Self::parse(&String::from_utf8_lossy(&bytes)))
    }

    /// Loads `material_path` relative to `root`. Any failure yields the default material
    /// together with the error, so callers can report it and carry on.
    pub fn load(root: impl AsRef<Path>, material_path: &str) -> (Self, Option<MdfError>) {
        let path = resolve(root.as_ref(), material_path);

        match Self::from_file(&path) {
            Ok(descriptor) => (descriptor, None),
            Err(err) => {
                error!(path = %path.display(), "Falling back to default material: {err}");
                (Self::default(), Some(err))
            }
        }
    }

    pub fn layers(&self) -> &[TextureLayer] {
        &self.texture_layers[..self.texture_count.min(MAX_TEXTURE_LAYERS)]
    }

    pub fn resolve_texture(&self, layer: usize, root: impl AsRef<Path>) -> Option<PathBuf> {
        let layer = self.texture_layers.get(layer)?;

        (!layer.path.is_empty()).then(|| resolve(root.as_ref(), &layer.path))
    }

    pub fn resolve_gloss_map(&self, root: impl AsRef<Path>) -> Option<PathBuf> {
        (!self.gloss_map.is_empty()).then(|| resolve(root.as_ref(), &self.gloss_map))
    }

    fn apply(&mut self, line: &str) -> Result<(), &'static str> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some((keyword, args)) = tokens.split_first() else {
            return Ok(());
        };
        let keyword = keyword.to_ascii_lowercase();

        match keyword.as_str() {
            "texture" => {
                // A leading unsigned number is only a layer when a path follows it.
                let (layer, path) = match args {
                    [] => return Err("missing path"),
                    [first, _, ..] if is_layer_number(first) => {
                        let layer = first.parse::<usize>().map_err(|_| "layer out of range")?;
                        (layer, skip_tokens(line, 2))
                    }
                    [_, ..] => (0, skip_tokens(line, 1)),
                };

                let slot = self.texture_layers.get_mut(layer).ok_or("layer out of range")?;
                slot.path = normalize_path(path);
                self.texture_count = self.texture_count.max(layer + 1);
            }
            "uvtype" => {
                let [layer, kind, ..] = args else {
                    return Err("expected a layer and a uv type");
                };

                self.layer_mut(layer)?.uv_type = kind.parse().unwrap_or_default();
            }
            "blendtype" => {
                let [layer, kind, ..] = args else {
                    return Err("expected a layer and a blend type");
                };

                self.layer_mut(layer)?.blend_type = kind.parse().unwrap_or_default();
            }
            "materialblendtype" => {
                let [kind, ..] = args else {
                    return Err("expected a blend type");
                };

                self.material_blend_type = kind.parse().unwrap_or_default();
            }
            "renderflags" => {
                for flag in args.iter().filter_map(|token| RenderFlags::from_keyword(token)) {
                    self.render_flags |= flag;
                }
            }
            "speedu" | "speedv" => {
                let [layer, speed, ..] = args else {
                    return Err("expected a layer and a speed");
                };

                let speed = parse_speed(speed)?;
                let layer = self.layer_mut(layer)?;
                if keyword == "speedu" {
                    layer.scroll_speed.x = speed;
                } else {
                    layer.scroll_speed.y = speed;
                }
            }
            "speed" => {
                let [speed, ..] = args else {
                    return Err("expected a speed");
                };

                let speed = parse_speed(speed)?;
                for layer in &mut self.texture_layers {
                    layer.scroll_speed = Vec2::splat(speed);
                }
            }
            "color" => self.color = parse_rgba(args)?,
            "specular" => self.specular = parse_rgba(args)?,
            "specularpower" => {
                let [power, ..] = args else {
                    return Err("expected a power");
                };

                self.specular_power = power.parse().map_err(|_| "bad specular power")?;
            }
            "glossmap" => {
                if args.is_empty() {
                    return Err("missing path");
                }

                self.gloss_map = normalize_path(skip_tokens(line, 1));
            }
            other => {
                if let Ok(class) = other.parse::<MaterialClass>() {
                    self.material_class = class;
                } else if let Some(flag) = RenderFlags::from_keyword(other) {
                    self.render_flags |= flag;
                } else {
                    debug!(keyword = other, "Ignoring unknown material keyword");
                }
            }
        }

        Ok(())
    }

    fn layer_mut(&mut self, layer: &str) -> Result<&mut TextureLayer, &'static str> {
        if !is_layer_number(layer) {
            return Err("bad layer");
        }
        let layer: usize = layer.parse().map_err(|_| "layer out of range")?;

        self.texture_layers.get_mut(layer).ok_or("layer out of range")
    }
}

fn is_layer_number(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit())
}

fn parse_speed(token: &str) -> Result<f32, &'static str> {
    token
        .parse::<f32>()
        .map(|speed| speed * FRAMES_PER_SECOND)
        .map_err(|_| "bad speed")
}

fn parse_rgba(args: &[&str]) -> Result<Rgba, &'static str> {
    let [r, g, b, a, ..] = args else {
        return Err("expected four color channels");
    };

    let channel = |token: &str| token.parse::<u8>().map_err(|_| "color channel is not 0-255");

    Ok(Rgba::new(channel(r)?, channel(g)?, channel(b)?, channel(a)?))
}

/// The rest of `line` after its first `count` whitespace separated tokens, with inner whitespace
/// kept as written.
fn skip_tokens(line: &str, count: usize) -> &str {
    let mut rest = line.trim_start();

    for _ in 0..count {
        rest = match rest.find(char::is_whitespace) {
            Some(end) => rest[end..].trim_start(),
            None => "",
        };
    }

    rest.trim_end()
}

fn normalize_path(path: &str) -> String {
    path.trim_matches('"').replace('\\', "/")
}

fn resolve(root: &Path, relative: &str) -> PathBuf {
    root.join(normalize_path(relative))
}
