//! The mip × frame table of source images.

use std::sync::Arc;

use super::MipmapPropagation;
use crate::source::RasterFrame;

/// Source images indexed by `[mipmap][frame]`, mip 0 being the largest level.
///
/// A slot may be empty; encoding requires every slot to be filled. Frames
/// are shared, so filling many slots from one image costs one decode.
#[derive(Debug, Clone, Default)]
pub struct SourceGrid {
    slots: Vec<Vec<Option<Arc<RasterFrame>>>>,
    frames: usize,
}

impl SourceGrid {
    pub fn new(mipmaps: u32, frames: u32) -> Self {
        let frames = frames as usize;
        Self {
            slots: vec![vec![None; frames]; mipmaps as usize],
            frames,
        }
    }

    pub fn mipmaps(&self) -> u32 {
        self.slots.len() as u32
    }

    pub fn frames(&self) -> u32 {
        self.frames as u32
    }

    pub fn get(&self, mipmap: u32, frame: u32) -> Option<&Arc<RasterFrame>> {
        self.slots
            .get(mipmap as usize)
            .and_then(|level| level.get(frame as usize))
            .and_then(Option::as_ref)
    }

    /// Stores `image` at a slot. Returns `false`, leaving the grid untouched,
    /// when the slot is outside the grid.
    pub fn set(&mut self, mipmap: u32, frame: u32, image: Arc<RasterFrame>) -> bool {
        match self
            .slots
            .get_mut(mipmap as usize)
            .and_then(|level| level.get_mut(frame as usize))
        {
            Some(slot) => {
                *slot = Some(image);
                true
            }
            None => false,
        }
    }

    /// Changes the grid shape, keeping existing slots.
    ///
    /// Under `Fill` or `NoOverwrite`, mip levels added below the previous
    /// smallest level take that level's images.
    pub fn resize(&mut self, mipmaps: u32, frames: u32, propagation: MipmapPropagation) {
        let frames = frames as usize;
        for level in &mut self.slots {
            level.resize(frames, None);
        }
        self.frames = frames;

        let old_mipmaps = self.slots.len();
        let template = self.slots.last().cloned();
        self.slots.resize(mipmaps as usize, vec![None; frames]);

        if propagation != MipmapPropagation::None {
            if let Some(template) = template {
                for level in self.slots.iter_mut().skip(old_mipmaps) {
                    level.clone_from(&template);
                }
            }
        }
    }

    /// Places `images` at consecutive frames starting at `(mipmap, frame)`,
    /// growing the frame count if they run past the end, then propagates each
    /// image to the smaller levels.
    ///
    /// Returns the number of frames placed, zero when `mipmap` is outside the
    /// grid.
    pub fn import(
        &mut self,
        images: Vec<RasterFrame>,
        mipmap: u32,
        frame: u32,
        propagation: MipmapPropagation,
    ) -> u32 {
        if mipmap >= self.mipmaps() || images.is_empty() {
            return 0;
        }

        let count = images.len() as u32;
        let needed = frame + count;
        if needed > self.frames() {
            self.resize(self.mipmaps(), needed, MipmapPropagation::None);
        }

        for (offset, image) in images.into_iter().enumerate() {
            let image = Arc::new(image);
            let frame = frame as usize + offset;
            self.slots[mipmap as usize][frame] = Some(Arc::clone(&image));

            for level in self.slots.iter_mut().skip(mipmap as usize + 1) {
                let slot = &mut level[frame];
                match propagation {
                    MipmapPropagation::Fill => *slot = Some(Arc::clone(&image)),
                    MipmapPropagation::NoOverwrite if slot.is_none() => {
                        *slot = Some(Arc::clone(&image))
                    }
                    MipmapPropagation::NoOverwrite | MipmapPropagation::None => {}
                }
            }
        }

        count
    }

    /// Empty slots in mip-major order.
    pub fn missing_slots(&self) -> Vec<(u32, u32)> {
        self.slots
            .iter()
            .enumerate()
            .flat_map(|(mipmap, level)| {
                level
                    .iter()
                    .enumerate()
                    .filter(|(_, slot)| slot.is_none())
                    .map(move |(frame, _)| (mipmap as u32, frame as u32))
            })
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.slots.iter().flatten().all(Option::is_some)
    }

    /// Images of one mip level in frame order.
    pub fn level(&self, mipmap: u32) -> &[Option<Arc<RasterFrame>>] {
        self.slots
            .get(mipmap as usize)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
