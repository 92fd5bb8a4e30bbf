pub mod fixtures;

use quire::{
    PaginationConfig, PaginationEngine, RenderSurface, Subscription, SurfaceElement, SurfaceError,
    VirtualScheduler,
};
use std::cell::RefCell;
use std::rc::Rc;

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

/// A surface with paint-ready geometry but no per-block elements: probes
/// fail over to estimation, which keeps expected heights deterministic.
pub struct TestSurface;

impl RenderSurface for TestSurface {
    fn element_at(&self, pos: usize) -> Result<Box<dyn SurfaceElement + '_>, SurfaceError> {
        Err(SurfaceError::Missing(pos))
    }

    fn flush_layout(&self) {}

    fn first_block_height_px(&self) -> Result<Option<f32>, SurfaceError> {
        Ok(Some(24.0))
    }

    fn container_height_px(&self) -> Result<f32, SurfaceError> {
        Ok(800.0)
    }

    fn child_count(&self) -> Result<usize, SurfaceError> {
        Ok(1)
    }
}

pub struct Harness {
    pub engine: PaginationEngine,
    pub scheduler: Rc<VirtualScheduler>,
}

pub fn harness() -> Harness {
    harness_with_config(PaginationConfig::default())
}

pub fn harness_with_config(config: PaginationConfig) -> Harness {
    let scheduler = Rc::new(VirtualScheduler::new());
    let engine = PaginationEngine::new(config, scheduler.clone())
        .expect("test config must derive valid dimensions");
    engine.set_surface(Some(Rc::new(TestSurface)));
    Harness { engine, scheduler }
}

/// Record the engine's event stream as readable labels.
pub fn record_events(engine: &PaginationEngine) -> (Rc<RefCell<Vec<String>>>, Vec<Subscription>) {
    let log = Rc::new(RefCell::new(Vec::new()));

    let start_log = log.clone();
    let start = engine.on_reflow_start(move || start_log.borrow_mut().push("start".to_string()));

    let changed_log = log.clone();
    let changed = engine.on_pages_changed(move |model| {
        changed_log
            .borrow_mut()
            .push(format!("pages-changed({})", model.page_count()));
    });

    let end_log = log.clone();
    let end = engine.on_reflow_end(move |model| {
        end_log
            .borrow_mut()
            .push(format!("end({})", model.page_count()));
    });

    (log, vec![start, changed, end])
}
