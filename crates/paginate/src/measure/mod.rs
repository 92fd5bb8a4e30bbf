//! Block measurement: renderer probe with estimation fallback, behind a
//! content-hash cache.

mod cache;
mod estimate;

pub use cache::CacheStats;

use crate::config::PaginationConfig;
use crate::surface::RenderSurface;
use cache::MeasureCache;
use estimate::{EstimateParams, estimate_height, is_splittable, item_heights, min_split_height};
use log::debug;
use quire_doc::{DocNode, Document, NodeKind};
use quire_types::PageDimensions;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// Result of measuring one top-level block.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockMeasurement {
    /// Offset of the block in the document's linear position space.
    pub pos: usize,
    pub kind: NodeKind,
    /// Vertical extent in points.
    pub height: f32,
    /// True only for containers whose items may be redistributed across
    /// pages (tables and lists).
    pub splittable: bool,
    /// Minimum height that must accompany the first kept item on a page.
    pub min_height: Option<f32>,
    /// Per-child heights for splittable containers.
    pub item_heights: Option<Vec<f32>>,
}

impl BlockMeasurement {
    pub fn page_break(pos: usize) -> Self {
        Self {
            pos,
            kind: NodeKind::PageBreak,
            height: 0.0,
            splittable: false,
            min_height: None,
            item_heights: None,
        }
    }
}

/// Derives the cache key from the parts of a block that affect its height.
fn content_hash(node: &DocNode) -> u64 {
    let mut hasher = DefaultHasher::new();
    node.kind().as_str().hash(&mut hasher);
    node.child_count().hash(&mut hasher);
    let text = node.text_content();
    text.chars().count().hash(&mut hasher);
    let prefix: String = text.chars().take(50).collect();
    prefix.hash(&mut hasher);
    hasher.finish()
}

/// Measures top-level blocks, preferring probed geometry from an attached
/// rendering surface and falling back to content-based estimation.
///
/// Measurement never fails: every surface error folds into estimation.
pub struct Measurer {
    dims: PageDimensions,
    default_line_height: f32,
    pixels_per_point: f32,
    surface: Option<Rc<dyn RenderSurface>>,
    cache: MeasureCache,
}

impl Measurer {
    pub fn new(config: &PaginationConfig, dims: PageDimensions) -> Self {
        Self {
            dims,
            default_line_height: config.default_line_height,
            pixels_per_point: config.pixels_per_point,
            surface: None,
            cache: MeasureCache::new(cache::DEFAULT_MAX_ENTRIES),
        }
    }

    pub fn set_surface(&mut self, surface: Option<Rc<dyn RenderSurface>>) {
        self.surface = surface;
    }

    pub fn has_surface(&self) -> bool {
        self.surface.is_some()
    }

    /// Estimation depends on the content width, so changing dimensions
    /// invalidates everything.
    pub fn set_dimensions(&mut self, dims: PageDimensions) {
        self.dims = dims;
        self.cache.clear();
    }

    /// Re-read the text parameters after a configuration change. Clears the
    /// cache for the same reason as [`Measurer::set_dimensions`].
    pub fn apply_config(&mut self, config: &PaginationConfig, dims: PageDimensions) {
        self.default_line_height = config.default_line_height;
        self.pixels_per_point = config.pixels_per_point;
        self.set_dimensions(dims);
    }

    fn estimate_params(&self) -> EstimateParams {
        EstimateParams {
            content_width: self.dims.content_width,
            line_height: self.default_line_height,
            pixels_per_point: self.pixels_per_point,
        }
    }

    /// Measure every top-level block of the document, in document order.
    pub fn measure_document(&mut self, doc: &Document) -> Vec<BlockMeasurement> {
        let requests: Vec<(usize, &DocNode)> = doc.blocks().collect();
        self.measure_batch(&requests)
    }

    /// Single-block entry point.
    pub fn measure_node(&mut self, node: &DocNode, pos: usize) -> BlockMeasurement {
        if node.kind() == NodeKind::PageBreak {
            return BlockMeasurement::page_break(pos);
        }
        let hash = content_hash(node);
        let height = match self.cache.probe(pos, hash) {
            Some(height) => height,
            None => {
                let height = self.resolve_height(node, pos);
                self.cache.insert(pos, hash, height);
                height
            }
        };
        self.finish(node, pos, height)
    }

    /// Batched measurement in two phases: probe the cache for every request,
    /// then flush the surface layout once and resolve the misses. The single
    /// flush avoids layout thrash when many blocks changed at once.
    pub fn measure_batch(&mut self, requests: &[(usize, &DocNode)]) -> Vec<BlockMeasurement> {
        let mut out: Vec<Option<BlockMeasurement>> = vec![None; requests.len()];
        let mut misses: Vec<usize> = Vec::new();

        for (index, &(pos, node)) in requests.iter().enumerate() {
            if node.kind() == NodeKind::PageBreak {
                out[index] = Some(BlockMeasurement::page_break(pos));
                continue;
            }
            if let Some(height) = self.cache.probe(pos, content_hash(node)) {
                out[index] = Some(self.finish(node, pos, height));
            } else {
                misses.push(index);
            }
        }

        if !misses.is_empty() {
            if let Some(surface) = &self.surface {
                surface.flush_layout();
            }
            for index in misses {
                let (pos, node) = requests[index];
                let height = self.resolve_height(node, pos);
                self.cache.insert(pos, content_hash(node), height);
                out[index] = Some(self.finish(node, pos, height));
            }
        }

        out.into_iter().flatten().collect()
    }

    fn resolve_height(&self, node: &DocNode, pos: usize) -> f32 {
        if let Some(surface) = &self.surface {
            match surface
                .element_at(pos)
                .and_then(|element| element.box_height_px())
            {
                Ok(px) => return px / self.pixels_per_point,
                Err(err) => {
                    debug!("surface probe at {pos} failed ({err}); estimating instead");
                }
            }
        }
        estimate_height(node, &self.estimate_params())
    }

    fn finish(&self, node: &DocNode, pos: usize, height: f32) -> BlockMeasurement {
        let kind = node.kind();
        let params = self.estimate_params();
        let splittable = is_splittable(kind);
        BlockMeasurement {
            pos,
            kind,
            height,
            splittable,
            min_height: if splittable {
                min_split_height(node, &params)
            } else {
                None
            },
            item_heights: if splittable {
                item_heights(node, &params)
            } else {
                None
            },
        }
    }

    /// Evict cache entries whose position falls within `[from, to]`.
    pub fn invalidate_range(&mut self, from: usize, to: usize) {
        self.cache.invalidate_range(from, to);
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}
