//! Gate that holds the first reflow until the rendering surface has
//! measurable geometry.
//!
//! Measuring too early caches zero heights for every block, which produces a
//! one-page model that immediately reflows again once the host paints. The
//! gate waits two paint-cycle yields, probes the first block, and backs off
//! exponentially until the surface is ready or the retry budget is spent.

use crate::scheduler::Scheduler;
use crate::surface::RenderSurface;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReadinessConfig {
    pub min_height_threshold_px: f32,
    pub base_delay_ms: u64,
    pub max_retries: u32,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            min_height_threshold_px: 1.0,
            base_delay_ms: 16,
            max_retries: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReadinessReport {
    pub ready: bool,
    /// Number of probes performed.
    pub attempts: u32,
    pub elapsed_ms: u64,
    pub first_block_height_px: Option<f32>,
}

enum Probe {
    Ready(Option<f32>),
    NotReady,
    Failed,
}

fn probe(surface: &dyn RenderSurface, threshold_px: f32) -> Probe {
    match surface.first_block_height_px() {
        Err(_) => Probe::Failed,
        Ok(Some(height)) if height >= threshold_px => Probe::Ready(Some(height)),
        Ok(Some(_)) => Probe::NotReady,
        Ok(None) => {
            // No children yet: an empty surface with real extent still
            // counts as ready (there is nothing to measure).
            match (surface.container_height_px(), surface.child_count()) {
                (Ok(height), Ok(0)) if height > threshold_px => Probe::Ready(None),
                (Err(_), _) | (_, Err(_)) => Probe::Failed,
                _ => Probe::NotReady,
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReadinessGate {
    config: ReadinessConfig,
}

struct GateRun {
    surface: Rc<dyn RenderSurface>,
    scheduler: Rc<dyn Scheduler>,
    config: ReadinessConfig,
    started_ms: u64,
    on_done: RefCell<Option<Box<dyn FnOnce(ReadinessReport)>>>,
}

impl GateRun {
    fn finish(self: &Rc<Self>, ready: bool, attempts: u32, first_block_height_px: Option<f32>) {
        if let Some(done) = self.on_done.borrow_mut().take() {
            done(ReadinessReport {
                ready,
                attempts,
                elapsed_ms: self.scheduler.now_ms().saturating_sub(self.started_ms),
                first_block_height_px,
            });
        }
    }

    /// Yield two paint cycles, then probe.
    fn schedule_check(self: Rc<Self>, attempt: u32) {
        let scheduler = self.scheduler.clone();
        let run = self;
        scheduler.clone().next_frame(Box::new(move || {
            let inner = run.clone();
            scheduler.next_frame(Box::new(move || inner.check(attempt)));
        }));
    }

    fn check(self: Rc<Self>, attempt: u32) {
        match probe(self.surface.as_ref(), self.config.min_height_threshold_px) {
            Probe::Ready(height) => self.finish(true, attempt + 1, height),
            Probe::Failed => self.finish(false, attempt + 1, None),
            Probe::NotReady => {
                if attempt >= self.config.max_retries {
                    self.finish(false, attempt + 1, None);
                } else {
                    let delay = self.config.base_delay_ms << attempt;
                    let run = self.clone();
                    self.scheduler
                        .clone()
                        .after(delay, Box::new(move || run.schedule_check(attempt + 1)));
                }
            }
        }
    }
}

impl ReadinessGate {
    pub fn new(config: ReadinessConfig) -> Self {
        Self { config }
    }

    /// One synchronous probe, no waiting.
    pub fn is_ready(&self, surface: &dyn RenderSurface) -> bool {
        matches!(
            probe(surface, self.config.min_height_threshold_px),
            Probe::Ready(_)
        )
    }

    /// Probe with retries; `on_done` receives the final report. A surface
    /// error ends the wait immediately with `ready = false`.
    pub fn wait_for_ready(
        &self,
        surface: Rc<dyn RenderSurface>,
        scheduler: Rc<dyn Scheduler>,
        on_done: impl FnOnce(ReadinessReport) + 'static,
    ) {
        let started_ms = scheduler.now_ms();
        let run = Rc::new(GateRun {
            surface,
            scheduler,
            config: self.config,
            started_ms,
            on_done: RefCell::new(Some(Box::new(on_done))),
        });
        run.schedule_check(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::VirtualScheduler;
    use crate::test_utils::StaticSurface;

    fn report_slot() -> (
        Rc<RefCell<Option<ReadinessReport>>>,
        impl FnOnce(ReadinessReport) + 'static,
    ) {
        let slot = Rc::new(RefCell::new(None));
        let writer = slot.clone();
        (slot, move |report| *writer.borrow_mut() = Some(report))
    }

    #[test]
    fn ready_surface_reports_on_the_first_attempt() {
        let scheduler = Rc::new(VirtualScheduler::new());
        let surface = Rc::new(StaticSurface::with_heights(&[(1, 40.0)]));
        let (slot, on_done) = report_slot();
        ReadinessGate::default().wait_for_ready(surface, scheduler.clone(), on_done);
        scheduler.run_pending();
        let report = slot.borrow().unwrap();
        assert!(report.ready);
        assert_eq!(report.attempts, 1);
        assert_eq!(report.first_block_height_px, Some(40.0));
    }

    #[test]
    fn gate_retries_until_geometry_appears() {
        let scheduler = Rc::new(VirtualScheduler::new());
        let surface = Rc::new(StaticSurface::ready_after(2, 32.0));
        let (slot, on_done) = report_slot();
        ReadinessGate::default().wait_for_ready(surface, scheduler.clone(), on_done);
        scheduler.advance_ms(1000);
        let report = slot.borrow().unwrap();
        assert!(report.ready);
        assert_eq!(report.attempts, 3);
        // Two backoff delays were consumed: 16 and 32 ms.
        assert!(report.elapsed_ms >= 48);
    }

    #[test]
    fn exhausted_retries_report_not_ready() {
        let scheduler = Rc::new(VirtualScheduler::new());
        let surface = Rc::new(StaticSurface::ready_after(100, 32.0));
        let (slot, on_done) = report_slot();
        ReadinessGate::default().wait_for_ready(surface, scheduler.clone(), on_done);
        scheduler.advance_ms(10_000);
        let report = slot.borrow().unwrap();
        assert!(!report.ready);
        assert_eq!(report.attempts, 6);
    }

    #[test]
    fn surface_errors_end_the_wait_immediately() {
        let scheduler = Rc::new(VirtualScheduler::new());
        let surface = Rc::new(StaticSurface::failing());
        let (slot, on_done) = report_slot();
        ReadinessGate::default().wait_for_ready(surface, scheduler.clone(), on_done);
        scheduler.run_pending();
        let report = slot.borrow().unwrap();
        assert!(!report.ready);
        assert_eq!(report.attempts, 1);
    }

    #[test]
    fn quick_predicate_does_not_wait() {
        let gate = ReadinessGate::default();
        assert!(gate.is_ready(&StaticSurface::with_heights(&[(1, 10.0)])));
        assert!(!gate.is_ready(&StaticSurface::ready_after(1, 10.0)));
        assert!(!gate.is_ready(&StaticSurface::failing()));
    }
}
