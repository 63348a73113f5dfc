//! Resolution search against a byte budget.

use super::{data_size, max_mipmaps};
use crate::format::PixelFormat;

/// Largest width or height the container header can carry.
pub const MAX_RESOLUTION: u32 = u16::MAX as u32;

/// Shape rules the budget search applies to candidate resolutions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolutionConstraints {
    /// Increment between candidates, and the first candidate.
    pub step: u32,
    /// Result must be square.
    pub square: bool,
    /// Candidates double instead of growing by `step`.
    pub power_of_two: bool,
}

impl Default for ResolutionConstraints {
    fn default() -> Self {
        Self {
            step: 1,
            square: false,
            power_of_two: false,
        }
    }
}

impl ResolutionConstraints {
    /// Constraints for encoding `format` with `mipmaps` levels.
    ///
    /// Block formats need multiples of 4. A mipmapped block texture must also
    /// be a power-of-two square so every level stays block aligned.
    pub fn for_format(format: PixelFormat, mipmaps: u32) -> Self {
        if format.is_block_compressed() {
            let mipmapped = mipmaps != 1;
            Self {
                step: 4,
                square: mipmapped,
                power_of_two: mipmapped,
            }
        } else {
            Self::default()
        }
    }

    pub fn with_step(mut self, step: u32) -> Self {
        self.step = step;
        self
    }

    pub fn with_square(mut self, square: bool) -> Self {
        self.square = square;
        self
    }

    pub fn with_power_of_two(mut self, power_of_two: bool) -> Self {
        self.power_of_two = power_of_two;
        self
    }
}

/// Largest resolution whose data size fits `budget` bytes.
///
/// Candidates are square and grow from `step` either by `step` or by
/// doubling. `mipmaps == 0` means a full chain for every candidate. On the
/// first candidate that overshoots, the height is reduced by one increment;
/// the width follows it when the result must be square or the reduced
/// rectangle still does not fit. Returns the last candidate once the search
/// passes [`MAX_RESOLUTION`].
///
/// # Arguments
///
/// * `format` - Output pixel format
/// * `mipmaps` - Mip levels per candidate, or 0 for a full chain
/// * `frames` - Frame count; every frame costs the same
/// * `budget` - Bytes available for image data, header excluded
/// * `constraints` - Growth step and shape rules, usually from
///   [`ResolutionConstraints::for_format`]
///
/// # Returns
///
/// `(width, height)` of the chosen candidate. A zero dimension means not even
/// the smallest candidate fits.
///
/// # Example
///
/// ```
/// use spraykit::format::PixelFormat;
/// use spraykit::size::{solve_resolution_for_budget, ResolutionConstraints};
///
/// // 40 000 bytes of RGBA8888 is exactly 100×100
/// let constraints = ResolutionConstraints::for_format(PixelFormat::Rgba8888, 1);
/// let fit = solve_resolution_for_budget(PixelFormat::Rgba8888, 1, 1, 40_000, constraints);
/// assert_eq!(fit, (100, 100));
///
/// // Nothing fits in 3 bytes
/// let fit = solve_resolution_for_budget(PixelFormat::Rgba8888, 1, 1, 3, constraints);
/// assert_eq!(fit, (0, 0));
/// ```
pub fn solve_resolution_for_budget(
    format: PixelFormat,
    mipmaps: u32,
    frames: u32,
    budget: u64,
    constraints: ResolutionConstraints,
) -> (u32, u32) {
    let step = constraints.step.max(1);
    let automatic_mipmaps = mipmaps == 0;
    let levels = |w: u32, h: u32| {
        if automatic_mipmaps {
            max_mipmaps(w, h)
        } else {
            mipmaps
        }
    };

    let mut width = 0;
    let mut height = 0;
    let mut res = step;

    while res <= MAX_RESOLUTION {
        width = res;
        height = res;

        let size = data_size(format, width, height, levels(width, height), frames);
        if size == budget {
            break;
        }

        if size > budget {
            height = if constraints.power_of_two {
                height >> 1
            } else {
                height.saturating_sub(step)
            };

            let reduced = data_size(format, width, height, levels(width, height), frames);
            if height == 0 || reduced > budget || constraints.square {
                width = height;
            }
            break;
        }

        res = if constraints.power_of_two {
            res << 1
        } else {
            res + step
        };
    }

    (width, height)
}
