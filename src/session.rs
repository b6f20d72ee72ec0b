use std::{
    collections::HashSet,
    sync::Arc,
    time::{Duration as StdDuration, Instant},
};

use starchart::{
    animator::OrbitalAnimator,
    bodies::{SystemData, SystemTree},
    camera::CameraController,
    layout::{LayoutMap, LayoutSlot},
    registry::ObjectRegistry,
    scene::SceneNode,
    time::SimClock,
    viewmode::{ViewModeConfig, ViewModeId, ViewModeRegistry},
};
use time::Duration;
use tracing::warn;

/// A layout request older than this is reported as timed out; the last
/// good layout keeps rendering meanwhile.
const LAYOUT_TIMEOUT: StdDuration = StdDuration::from_secs(5);

/// Everything owned by the currently viewed system: the authoritative
/// object list, mounted scene nodes, the live-transform registry, the
/// layout delivery slot, clock, animator and camera.
///
/// Per-frame ordering is fixed here: clock, then the animator (parents
/// before children), then the camera. Framing never samples a position
/// the animator has not written this frame.
pub struct SystemSession {
    pub modes: ViewModeRegistry,
    pub mode: ViewModeId,
    pub clock: SimClock,
    pub camera: CameraController,
    pub slot: LayoutSlot,
    system: Option<Arc<SystemData>>,
    tree: SystemTree,
    registry: ObjectRegistry,
    nodes: Vec<SceneNode>,
    animator: OrbitalAnimator,
    selected: Option<Arc<str>>,
    pending_since: Option<Instant>,
    profile_frame_after_layout: Option<Arc<str>>,
}

impl Default for SystemSession {
    fn default() -> Self {
        Self {
            modes: ViewModeRegistry::builtin(),
            mode: ViewModeId::realistic(),
            clock: SimClock::new(),
            camera: CameraController::new(),
            slot: LayoutSlot::new(),
            system: None,
            tree: SystemTree::default(),
            registry: ObjectRegistry::new(),
            nodes: Vec::new(),
            animator: OrbitalAnimator::from_entropy(),
            selected: None,
            pending_since: None,
            profile_frame_after_layout: None,
        }
    }
}

impl SystemSession {
    pub fn system(&self) -> Option<&Arc<SystemData>> {
        self.system.as_ref()
    }

    pub fn tree(&self) -> &SystemTree {
        &self.tree
    }

    pub fn registry(&self) -> &ObjectRegistry {
        &self.registry
    }

    pub fn selected(&self) -> Option<&Arc<str>> {
        self.selected.as_ref()
    }

    pub fn layouts(&self) -> Arc<LayoutMap> {
        self.slot.current()
    }

    pub fn mode_config(&self) -> Option<Arc<ViewModeConfig>> {
        self.modes.config(&self.mode)
    }

    /// Install a freshly loaded system. Same system id keeps live
    /// registry entries and scene nodes; a different id tears the
    /// previous session state down.
    pub fn install_system(&mut self, system: SystemData) {
        let system = Arc::new(system);
        let changed = self.registry.system_id().map(|s| &**s) != Some(&*system.id);
        self.registry.bind_system(&system.id);
        if changed {
            self.nodes.clear();
            self.selected = None;
            self.clock = SimClock::new();
            self.camera = CameraController::new();
        }
        self.tree = SystemTree::build(&system.objects);
        self.system = Some(system);
        self.sync_mounts();
        self.animator.force_refresh();
    }

    /// Reconcile mounted nodes with the authoritative object list:
    /// mount what is new, unmount what is gone. Registry writes happen
    /// here, on lifecycle edges, never mid-frame.
    fn sync_mounts(&mut self) {
        let Some(system) = &self.system else { return };
        let wanted: HashSet<&str> = system.objects.iter().map(|o| &*o.id).collect();

        let registry = &mut self.registry;
        self.nodes.retain(|node| {
            let keep = wanted.contains(&**node.id());
            if !keep {
                node.unmount(registry);
            }
            keep
        });

        let mounted: HashSet<Arc<str>> = self.nodes.iter().map(|n| n.id().clone()).collect();
        for object in &system.objects {
            if !mounted.contains(&object.id) {
                self.nodes.push(SceneNode::mount(object.id.clone(), registry));
            }
        }
    }

    /// Switch view modes. The layout cache key changes with the mode,
    /// so a recomputation request must follow (the caller sends it via
    /// the backend); profile modes additionally park a framing request
    /// that is only released once the new layout has landed.
    pub fn set_mode(&mut self, mode: ViewModeId) {
        if mode == self.mode {
            return;
        }
        self.mode = mode;
        self.animator.force_refresh();
        if self
            .mode_config()
            .is_some_and(|c| c.orbit_scaling.is_linear())
        {
            let focal = self
                .selected
                .clone()
                .or_else(|| self.tree.roots().first().cloned());
            self.profile_frame_after_layout = focal;
        }
    }

    /// Note the start of an async layout calculation.
    pub fn begin_layout(&mut self) -> u64 {
        self.pending_since = Some(Instant::now());
        self.slot.begin()
    }

    /// Accept a finished layout unless it was superseded.
    pub fn apply_layout(&mut self, generation: u64, layouts: Arc<LayoutMap>) {
        if self.slot.deliver(generation, layouts) {
            self.pending_since = None;
            self.animator.force_refresh();
            self.release_profile_frame();
        }
    }

    pub fn fail_layout(&mut self, generation: u64, message: impl Into<String>) {
        if self.slot.fail(generation, message) {
            self.pending_since = None;
            // Frame against the stale-but-valid fallback rather than
            // leaving the camera wherever the old mode put it.
            self.release_profile_frame();
        }
    }

    fn release_profile_frame(&mut self) {
        if let Some(focal) = self.profile_frame_after_layout.take() {
            self.camera.request_profile(focal);
        }
    }

    pub fn select(&mut self, id: Arc<str>) {
        if self.system.as_ref().and_then(|s| s.find(&id)).is_none() {
            warn!(%id, "selection of unknown object ignored");
            return;
        }
        self.selected = Some(id.clone());
        if self
            .mode_config()
            .is_some_and(|c| c.orbit_scaling.is_linear())
        {
            self.camera.request_profile(id);
        } else {
            self.camera.request_focus(id);
        }
    }

    /// One frame: advance the clock, reposition every object (parents
    /// before children), then let the camera sample the fresh state.
    pub fn tick(&mut self, frame_dt: Duration, now: f64) {
        if self.slot.is_pending() {
            if let Some(since) = self.pending_since {
                if since.elapsed() > LAYOUT_TIMEOUT {
                    let generation = self.slot.generation();
                    self.fail_layout(generation, "layout calculation timed out");
                }
            }
        }

        let Some(system) = self.system.clone() else { return };
        let Some(config) = self.mode_config() else { return };

        self.clock.advance(frame_dt);
        let layouts = self.slot.current();
        self.animator.tick(
            &self.clock,
            &system,
            &self.tree,
            &layouts,
            config.orbit_scaling.is_linear(),
            &self.registry,
        );
        self.camera.update(
            now,
            &system,
            &self.tree,
            &layouts,
            &self.registry,
            &config.camera,
        );
    }
}
