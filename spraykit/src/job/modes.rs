//! Job option enums and their canonical names.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// A mode name that matched no variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown {kind} '{value}' (expected one of: {expected})")]
pub struct ModeParseError {
    pub kind: &'static str,
    pub value: String,
    pub expected: String,
}

/// Implements `name()`, `ALL`, `Display` and case-insensitive `FromStr`
/// over a fixed name table.
macro_rules! named_modes {
    ($ty:ident, $kind:literal, { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $ty {
            pub const ALL: &'static [$ty] = &[$($ty::$variant),+];

            pub fn name(self) -> &'static str {
                match self {
                    $($ty::$variant => $name),+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }

        impl FromStr for $ty {
            type Err = ModeParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
                $ty::ALL
                    .iter()
                    .copied()
                    .find(|mode| mode.name() == wanted)
                    .ok_or_else(|| ModeParseError {
                        kind: $kind,
                        value: s.to_string(),
                        expected: $ty::ALL
                            .iter()
                            .map(|mode| mode.name())
                            .collect::<Vec<_>>()
                            .join(", "),
                    })
            }
        }
    };
}

/// How frames are cropped to their content before resizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AutocropMode {
    /// One union box per mip level; falls back to per-frame boxes when the
    /// frames of a level differ in size.
    #[default]
    Automatic,
    /// Each frame cropped to its own box.
    Individual,
    /// One union box per mip level, even across differently sized frames.
    BoundingBox,
    None,
}

named_modes!(AutocropMode, "autocrop mode", {
    Automatic => "automatic",
    Individual => "individual",
    BoundingBox => "bounding_box",
    None => "none",
});

/// Texture filtering flags written to the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureSampleMode {
    Trilinear,
    #[default]
    Anisotropic,
    /// Nearest-neighbour; only honoured without mipmaps.
    PointSample,
    None,
}

named_modes!(TextureSampleMode, "sample mode", {
    Trilinear => "trilinear",
    Anisotropic => "anisotropic",
    PointSample => "point",
    None => "none",
});

/// How the mipmap count is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MipmapInputMode {
    /// A single level.
    #[default]
    OneOnly,
    /// A full chain down to 1×1 for the current resolution.
    MaxOnly,
    /// Whatever count the caller sets.
    UserOption,
}

named_modes!(MipmapInputMode, "mipmap mode", {
    OneOnly => "one",
    MaxOnly => "max",
    UserOption => "user",
});

/// How the base resolution is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ResolutionInputMode {
    /// Largest resolution that fits the file size budget.
    #[default]
    Automatic,
    Manual,
}

named_modes!(ResolutionInputMode, "resolution mode", {
    Automatic => "automatic",
    Manual => "manual",
});

/// What happens to smaller mip levels when an image is imported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MipmapPropagation {
    /// The image fills every smaller level.
    #[default]
    Fill,
    /// The image fills smaller levels that have no image yet.
    NoOverwrite,
    /// Only the target level changes.
    None,
}

named_modes!(MipmapPropagation, "mipmap propagation", {
    Fill => "fill",
    NoOverwrite => "no_overwrite",
    None => "none",
});
