//! Shared fakes for crate tests.

use crate::surface::{RenderSurface, SurfaceElement, SurfaceError};
use quire_types::Rect;
use std::cell::Cell;
use std::collections::HashMap;

pub(crate) struct StaticElement {
    height_px: f32,
    rects: Vec<Rect>,
}

impl StaticElement {
    pub fn with_rects(rects: Vec<Rect>) -> Self {
        let height_px = rects
            .iter()
            .map(Rect::bottom)
            .fold(0.0_f32, f32::max);
        Self { height_px, rects }
    }
}

impl SurfaceElement for StaticElement {
    fn box_height_px(&self) -> Result<f32, SurfaceError> {
        Ok(self.height_px)
    }

    fn inline_rects_px(&self) -> Result<Vec<Rect>, SurfaceError> {
        Ok(self.rects.clone())
    }
}

/// A surface with fixed per-position heights. `ready_after` simulates a host
/// that paints real geometry only after a few frames; `failing` errors on
/// every probe.
pub(crate) struct StaticSurface {
    heights: HashMap<usize, f32>,
    fail: bool,
    probes_until_ready: Cell<u32>,
    ready_height_px: f32,
    flushes: Cell<u32>,
}

impl StaticSurface {
    pub fn with_heights(heights: &[(usize, f32)]) -> Self {
        Self {
            heights: heights.iter().copied().collect(),
            fail: false,
            probes_until_ready: Cell::new(0),
            ready_height_px: heights.first().map(|&(_, h)| h).unwrap_or(0.0),
            flushes: Cell::new(0),
        }
    }

    pub fn ready_after(probes: u32, height_px: f32) -> Self {
        Self {
            heights: HashMap::new(),
            fail: false,
            probes_until_ready: Cell::new(probes),
            ready_height_px: height_px,
            flushes: Cell::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            heights: HashMap::new(),
            fail: true,
            probes_until_ready: Cell::new(0),
            ready_height_px: 0.0,
            flushes: Cell::new(0),
        }
    }

    pub fn flush_count(&self) -> u32 {
        self.flushes.get()
    }
}

impl RenderSurface for StaticSurface {
    fn element_at(&self, pos: usize) -> Result<Box<dyn SurfaceElement + '_>, SurfaceError> {
        if self.fail {
            return Err(SurfaceError::Detached);
        }
        match self.heights.get(&pos) {
            Some(&height_px) => Ok(Box::new(StaticElement {
                height_px,
                rects: Vec::new(),
            })),
            None => Err(SurfaceError::Missing(pos)),
        }
    }

    fn flush_layout(&self) {
        self.flushes.set(self.flushes.get() + 1);
    }

    fn first_block_height_px(&self) -> Result<Option<f32>, SurfaceError> {
        if self.fail {
            return Err(SurfaceError::Detached);
        }
        let remaining = self.probes_until_ready.get();
        if remaining > 0 {
            self.probes_until_ready.set(remaining - 1);
            return Ok(Some(0.0));
        }
        Ok(Some(self.ready_height_px))
    }

    fn container_height_px(&self) -> Result<f32, SurfaceError> {
        if self.fail {
            return Err(SurfaceError::Detached);
        }
        Ok(0.0)
    }

    fn child_count(&self) -> Result<usize, SurfaceError> {
        if self.fail {
            return Err(SurfaceError::Detached);
        }
        Ok(self.heights.len().max(1))
    }
}
