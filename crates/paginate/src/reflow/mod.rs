//! The reflow engine: owns configuration, the measurer, and the page
//! computer; translates document mutations into debounced reflow passes and
//! fans out the resulting events.

mod events;

pub use events::Subscription;

use crate::PaginationError;
use crate::compute::PageComputer;
use crate::config::{ConfigPatch, PaginationConfig};
use crate::measure::{CacheStats, Measurer};
use crate::model::PaginationModel;
use crate::scheduler::{Scheduler, TimerHandle};
use crate::surface::RenderSurface;
use events::Registry;
use log::{error, warn};
use quire_doc::{DocChange, Document, MappedRange};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineStats {
    pub last_reflow_time_ms: u64,
    pub page_count: usize,
    pub cache: CacheStats,
    pub is_reflowing: bool,
    pub pending_changes: usize,
    pub reflow_count: u64,
    pub total_reflow_time_ms: u64,
    pub average_reflow_time_ms: f64,
}

struct EngineState {
    config: PaginationConfig,
    measurer: Rc<RefCell<Measurer>>,
    computer: PageComputer,
    doc: Option<Rc<Document>>,
    model: Option<Rc<PaginationModel>>,
    pending: Vec<DocChange>,
    timer: Option<TimerHandle>,
    is_reflowing: bool,
    destroyed: bool,
    reflow_count: u64,
    total_reflow_ms: u64,
    last_reflow_ms: u64,
}

struct EngineInner {
    scheduler: Rc<dyn Scheduler>,
    reflow_start: Registry<()>,
    pages_changed: Registry<PaginationModel>,
    reflow_end: Registry<PaginationModel>,
    state: RefCell<EngineState>,
}

/// Owns the pagination pipeline for one document view.
///
/// All operations run on one logical thread; the only suspension points are
/// the scheduler callbacks. The current model is swapped atomically at the
/// end of a pass and prior models are discarded.
pub struct PaginationEngine {
    inner: Rc<EngineInner>,
}

impl Clone for PaginationEngine {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl PaginationEngine {
    pub fn new(
        config: PaginationConfig,
        scheduler: Rc<dyn Scheduler>,
    ) -> Result<Self, PaginationError> {
        let dims = config.derive_dimensions()?;
        let measurer = Rc::new(RefCell::new(Measurer::new(&config, dims.clone())));
        let mut computer = PageComputer::new(&config, dims);
        computer.attach_measurer(measurer.clone());
        Ok(Self {
            inner: Rc::new(EngineInner {
                scheduler,
                reflow_start: Registry::default(),
                pages_changed: Registry::default(),
                reflow_end: Registry::default(),
                state: RefCell::new(EngineState {
                    config,
                    measurer,
                    computer,
                    doc: None,
                    model: None,
                    pending: Vec::new(),
                    timer: None,
                    is_reflowing: false,
                    destroyed: false,
                    reflow_count: 0,
                    total_reflow_ms: 0,
                    last_reflow_ms: 0,
                }),
            }),
        })
    }

    /// Push the latest document snapshot. Does not schedule a pass by
    /// itself; pair with [`PaginationEngine::request_reflow`].
    pub fn set_document(&self, doc: Rc<Document>) {
        self.inner.state.borrow_mut().doc = Some(doc);
    }

    /// Attach or detach the rendering surface used for height probes.
    pub fn set_surface(&self, surface: Option<Rc<dyn RenderSurface>>) {
        let state = self.inner.state.borrow();
        state.measurer.borrow_mut().set_surface(surface);
    }

    /// Merge a configuration patch. On an actual change the measurement
    /// cache is cleared and an immediate reflow runs; an invalid patch is
    /// rejected with no side effects.
    pub fn set_config(&self, patch: &ConfigPatch) -> Result<(), PaginationError> {
        let changed = {
            let mut state = self.inner.state.borrow_mut();
            let next = state.config.merged(patch);
            if next == state.config {
                false
            } else {
                let dims = next.derive_dimensions()?;
                state.config = next;
                let config = state.config.clone();
                state.measurer.borrow_mut().apply_config(&config, dims.clone());
                state.computer.apply_config(&config, dims);
                true
            }
        };
        if changed {
            self.request_immediate_reflow();
        }
        Ok(())
    }

    pub fn config(&self) -> PaginationConfig {
        self.inner.state.borrow().config.clone()
    }

    /// Last published model, if any pass has completed.
    pub fn get_model(&self) -> Option<Rc<PaginationModel>> {
        self.inner.state.borrow().model.clone()
    }

    /// Schedule a debounced reflow; multiple requests coalesce into one
    /// pass. An optional change record joins the pending set.
    pub fn request_reflow(&self, change: Option<DocChange>) {
        {
            let mut state = self.inner.state.borrow_mut();
            if state.destroyed {
                return;
            }
            if let Some(change) = change {
                state.pending.push(change);
            }
        }
        let delay = self.inner.state.borrow().config.reflow_debounce_ms;
        schedule_pass(&self.inner, delay);
    }

    /// Cancel any pending timer and run a pass synchronously.
    pub fn request_immediate_reflow(&self) {
        cancel_timer(&self.inner);
        run_pass(&self.inner);
    }

    /// Schedule the pass on the host's paint cycle (zero-delay timer when
    /// the host has no paint hook).
    pub fn request_raf_reflow(&self) {
        let mut state = self.inner.state.borrow_mut();
        if state.destroyed {
            return;
        }
        if let Some(handle) = state.timer.take() {
            self.inner.scheduler.cancel(handle);
        }
        let weak = Rc::downgrade(&self.inner);
        state.timer = Some(self.inner.scheduler.next_frame(Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.state.borrow_mut().timer = None;
                run_pass(&inner);
            }
        })));
    }

    /// Schedule the pass for idle time with a timeout.
    pub fn request_idle_reflow(&self, timeout_ms: u64) {
        let mut state = self.inner.state.borrow_mut();
        if state.destroyed {
            return;
        }
        if let Some(handle) = state.timer.take() {
            self.inner.scheduler.cancel(handle);
        }
        let weak = Rc::downgrade(&self.inner);
        state.timer = Some(self.inner.scheduler.when_idle(
            timeout_ms,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.state.borrow_mut().timer = None;
                    run_pass(&inner);
                }
            }),
        ));
    }

    /// Translate a batch of editor changes into the pending set and drop the
    /// covered span from the measurement cache.
    pub fn handle_change_set(&self, ranges: &[MappedRange]) {
        if ranges.is_empty() {
            return;
        }
        let changes: Vec<DocChange> = ranges.iter().map(DocChange::from_mapped).collect();
        let (from, to) = changes.iter().fold((usize::MAX, 0), |(lo, hi), change| {
            (lo.min(change.range.from), hi.max(change.range.to))
        });
        {
            let mut state = self.inner.state.borrow_mut();
            if state.destroyed {
                return;
            }
            state.measurer.borrow_mut().invalidate_range(from, to);
            state.pending.extend(changes);
        }
        self.request_reflow(None);
    }

    /// Drop every cached measurement and the current model, then run a full
    /// pass right away.
    pub fn force_full_reflow(&self) {
        {
            let mut state = self.inner.state.borrow_mut();
            if state.destroyed {
                return;
            }
            state.measurer.borrow_mut().clear_cache();
            state.model = None;
            state.pending.clear();
        }
        self.request_immediate_reflow();
    }

    pub fn get_page_for_position(&self, pos: usize) -> Option<u32> {
        self.inner
            .state
            .borrow()
            .model
            .as_ref()
            .and_then(|model| model.page_for_position(pos))
    }

    pub fn get_position_range_for_page(&self, page_number: u32) -> Option<(usize, usize)> {
        self.inner
            .state
            .borrow()
            .model
            .as_ref()
            .and_then(|model| model.page(page_number))
            .map(|page| (page.start_pos, page.end_pos))
    }

    pub fn on_reflow_start(&self, handler: impl Fn() + 'static) -> Subscription {
        self.inner.reflow_start.subscribe(move |_| handler())
    }

    pub fn on_pages_changed(
        &self,
        handler: impl Fn(&PaginationModel) + 'static,
    ) -> Subscription {
        self.inner.pages_changed.subscribe(handler)
    }

    pub fn on_reflow_end(&self, handler: impl Fn(&PaginationModel) + 'static) -> Subscription {
        self.inner.reflow_end.subscribe(handler)
    }

    pub fn get_stats(&self) -> EngineStats {
        let state = self.inner.state.borrow();
        let cache = state.measurer.borrow().cache_stats();
        EngineStats {
            last_reflow_time_ms: state.last_reflow_ms,
            page_count: state.model.as_ref().map_or(0, |model| model.page_count()),
            cache,
            is_reflowing: state.is_reflowing,
            pending_changes: state.pending.len(),
            reflow_count: state.reflow_count,
            total_reflow_time_ms: state.total_reflow_ms,
            average_reflow_time_ms: if state.reflow_count == 0 {
                0.0
            } else {
                state.total_reflow_ms as f64 / state.reflow_count as f64
            },
        }
    }

    /// Cancel timers, drop handlers, and release the surface and model. The
    /// engine is inert afterwards.
    pub fn destroy(&self) {
        cancel_timer(&self.inner);
        self.inner.reflow_start.clear();
        self.inner.pages_changed.clear();
        self.inner.reflow_end.clear();
        let mut state = self.inner.state.borrow_mut();
        state.destroyed = true;
        state.pending.clear();
        state.model = None;
        state.doc = None;
        state.measurer.borrow_mut().set_surface(None);
    }
}

fn cancel_timer(inner: &Rc<EngineInner>) {
    let mut state = inner.state.borrow_mut();
    if let Some(handle) = state.timer.take() {
        inner.scheduler.cancel(handle);
    }
}

fn schedule_pass(inner: &Rc<EngineInner>, delay_ms: u64) {
    let mut state = inner.state.borrow_mut();
    if state.destroyed {
        return;
    }
    if let Some(handle) = state.timer.take() {
        inner.scheduler.cancel(handle);
    }
    let weak = Rc::downgrade(inner);
    state.timer = Some(inner.scheduler.after(
        delay_ms,
        Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.state.borrow_mut().timer = None;
                run_pass(&inner);
            }
        }),
    ));
}

/// One reflow pass: decide incremental vs. full, compute, publish, emit.
fn run_pass(inner: &Rc<EngineInner>) {
    {
        let mut state = inner.state.borrow_mut();
        if state.destroyed {
            return;
        }
        if !state.measurer.borrow().has_surface() {
            warn!("reflow requested without a rendering surface; skipping");
            return;
        }
        if state.doc.is_none() {
            warn!("reflow requested without a document snapshot; skipping");
            return;
        }
        if state.is_reflowing {
            let delay = state.config.reflow_debounce_ms;
            drop(state);
            schedule_pass(inner, delay);
            return;
        }
        state.is_reflowing = true;
    }

    // Handler lists are pinned at pass start; subscriptions made by handlers
    // take effect on the next pass.
    let start_handlers = inner.reflow_start.snapshot();
    let changed_handlers = inner.pages_changed.snapshot();
    let end_handlers = inner.reflow_end.snapshot();

    if !inner.state.borrow().destroyed {
        for handler in &start_handlers {
            handler(&());
        }
    }

    let started_ms = inner.scheduler.now_ms();
    let computed = {
        let state = inner.state.borrow();
        state.doc.clone().map(|doc| {
            let from = state.pending.iter().map(|change| change.range.from).min();
            match (state.model.clone(), from) {
                (Some(prior), Some(from)) => state.computer.compute_from(&doc, &prior, from),
                _ => state.computer.compute(&doc),
            }
        })
    };
    let Some(result) = computed else {
        // A start handler tore the engine down.
        inner.state.borrow_mut().is_reflowing = false;
        return;
    };

    match result {
        Err(err) => {
            // Keep the last-good model; skip reflow-end so listeners do not
            // mistake the failed pass for a completed one.
            error!("reflow pass failed: {err}");
            inner.state.borrow_mut().is_reflowing = false;
        }
        Ok(model) => {
            let model = Rc::new(model);
            let changed = {
                let mut state = inner.state.borrow_mut();
                state.pending.clear();
                let changed = state
                    .model
                    .as_ref()
                    .is_none_or(|prev| !prev.same_pages(&model));
                state.model = Some(model.clone());
                let elapsed = inner.scheduler.now_ms().saturating_sub(started_ms);
                state.reflow_count += 1;
                state.total_reflow_ms += elapsed;
                state.last_reflow_ms = elapsed;
                changed
            };
            if changed && !inner.state.borrow().destroyed {
                for handler in &changed_handlers {
                    handler(&model);
                }
            }
            if !inner.state.borrow().destroyed {
                for handler in &end_handlers {
                    handler(&model);
                }
            }
            inner.state.borrow_mut().is_reflowing = false;
        }
    }
}
