use std::cell::RefCell;
use std::rc::Rc;

use landgrid_client::{
    GridConfig, GridView, LandStore, ManualScheduler, RecordingSurface, SharedGridView,
    Subscription, bind_source,
};
use landgrid_shared::LandCollection;

use crate::script::{ReplayScript, ReplayStep};

/// What a replay run ended with.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ReplayReport {
    pub steps: usize,
    pub frames: u64,
    pub draw_commands: usize,
    pub selections: Vec<Option<u32>>,
    pub selected: Option<u32>,
    pub zoom: f64,
    pub pan: (f64, f64),
}

/// Headless host for one grid view: a land store, a deterministic scheduler
/// and a recording surface.
pub struct Replay {
    store: LandStore,
    view: SharedGridView<RecordingSurface, ManualScheduler>,
    selections: Rc<RefCell<Vec<Option<u32>>>>,
    draw_commands: usize,
    _lands: Subscription,
}

impl Replay {
    pub fn new(config: GridConfig, lands: LandCollection, width: f64, height: f64) -> Self {
        let store = LandStore::new(lands);
        let view = Rc::new(RefCell::new(GridView::new(
            config,
            RecordingSurface::new(),
            ManualScheduler::new(),
        )));
        let lands = bind_source(&view, &store);

        let selections = Rc::new(RefCell::new(Vec::new()));
        {
            let sink = selections.clone();
            let mut view = view.borrow_mut();
            view.on_tile_selected(move |id| {
                tracing::info!(selected = ?id, "tile selection changed");
                sink.borrow_mut().push(id);
            });
            view.mount(width, height);
        }

        Self {
            store,
            view,
            selections,
            draw_commands: 0,
            _lands: lands,
        }
    }

    pub fn run(&mut self, script: &ReplayScript) -> ReplayReport {
        if let Some(user) = script.user.as_deref() {
            self.view.borrow_mut().set_current_user(Some(user));
        }
        for (index, step) in script.steps.iter().enumerate() {
            tracing::debug!(index, ?step, "replay step");
            self.apply(step);
        }
        self.report(script.steps.len())
    }

    pub fn apply(&mut self, step: &ReplayStep) {
        // Store events notify the view through its subscription, so they must
        // run without a borrow held.
        if let ReplayStep::Event { event } = step {
            if !self.store.apply(event) {
                tracing::info!(seq = event.seq(), "feed event ignored");
            }
            return;
        }
        if let ReplayStep::Frame { count } = step {
            for _ in 0..*count {
                self.fire_frame();
            }
            return;
        }

        let mut view = self.view.borrow_mut();
        match step {
            ReplayStep::PointerDown { x, y } => view.pointer_down(*x, *y),
            ReplayStep::PointerMove { x, y } => view.pointer_move(*x, *y),
            ReplayStep::PointerUp { x, y } => view.pointer_up(*x, *y),
            ReplayStep::PointerLeave => view.pointer_leave(),
            ReplayStep::Click { x, y } => {
                view.pointer_down(*x, *y);
                view.pointer_up(*x, *y);
            }
            ReplayStep::Wheel { x, y, delta_y } => view.wheel(*x, *y, *delta_y),
            ReplayStep::Resize { width, height } => view.resize(*width, *height),
            ReplayStep::SetUser { address } => view.set_current_user(address.as_deref()),
            ReplayStep::Unmount => view.unmount(),
            ReplayStep::Event { .. } | ReplayStep::Frame { .. } => {}
        }
    }

    /// Run the pending frame callback, as the browser would on vsync.
    fn fire_frame(&mut self) {
        let mut view = self.view.borrow_mut();
        if view.scheduler().pending().is_none() {
            tracing::debug!("no frame pending");
            return;
        }
        let Some(stats) = view.frame() else {
            return;
        };
        let commands = view.surface_mut().take().len();
        self.draw_commands += commands;
        let vp = view.viewport();
        tracing::info!(
            frame = view.frames_drawn(),
            tiles = stats.tiles_drawn,
            background = stats.background_drawn,
            selection = stats.selection_drawn,
            commands,
            zoom = vp.zoom,
            pan_x = vp.pan_x,
            pan_y = vp.pan_y,
            "frame"
        );
    }

    pub fn report(&self, steps: usize) -> ReplayReport {
        let view = self.view.borrow();
        let vp = view.viewport();
        ReplayReport {
            steps,
            frames: view.frames_drawn(),
            draw_commands: self.draw_commands,
            selections: self.selections.borrow().clone(),
            selected: view.selected(),
            zoom: vp.zoom,
            pan: (vp.pan_x, vp.pan_y),
        }
    }
}

#[cfg(test)]
mod tests {
    use landgrid_shared::LandRecord;

    use super::*;

    fn full_board() -> LandCollection {
        (0..165)
            .map(|id| {
                if id % 7 == 0 {
                    LandRecord::owned_by(id, "0xAB")
                } else {
                    LandRecord::unclaimed(id)
                }
            })
            .collect()
    }

    fn script(json: &str) -> ReplayScript {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn click_then_frames_reports_selection() {
        let mut replay = Replay::new(GridConfig::default(), full_board(), 1500.0, 1100.0);
        let report = replay.run(&script(
            r#"{"steps":[
                {"op":"click","x":850,"y":150},
                {"op":"frame","count":2},
                {"op":"click","x":1050,"y":250},
                {"op":"frame"}
            ]}"#,
        ));
        assert_eq!(report.selected, Some(40));
        assert_eq!(report.selections, vec![Some(23), Some(40)]);
        assert_eq!(report.frames, 3);
        assert!(report.draw_commands > 0);
    }

    #[test]
    fn frames_after_unmount_draw_nothing() {
        let mut replay = Replay::new(GridConfig::default(), full_board(), 1500.0, 1100.0);
        let report = replay.run(&script(
            r#"{"steps":[{"op":"frame"},{"op":"unmount"},{"op":"frame","count":5}]}"#,
        ));
        assert_eq!(report.frames, 1);
    }

    #[test]
    fn feed_update_removing_selected_land_clears_selection() {
        let mut replay = Replay::new(GridConfig::default(), full_board(), 1500.0, 1100.0);
        replay.apply(&ReplayStep::Click { x: 850.0, y: 150.0 });
        let report = replay.run(&script(
            r#"{"steps":[
                {"op":"event","event":{"type":"Snapshot","seq":1,"lands":[{"id":0}],"timestamp":"2026-01-01T00:00:00Z"}}
            ]}"#,
        ));
        assert_eq!(report.selected, None);
        assert_eq!(report.selections, vec![Some(23), None]);
    }

    #[test]
    fn wheel_zoom_is_reported() {
        let mut replay = Replay::new(GridConfig::default(), full_board(), 1500.0, 1100.0);
        let report = replay.run(&script(
            r#"{"steps":[{"op":"wheel","x":100,"y":100,"delta_y":-1}]}"#,
        ));
        assert!((report.zoom - 1.1).abs() < 1e-12);
        assert!((report.pan.0 + 10.0).abs() < 1e-9);
    }
}
