use scenepatch_protocol::{LoadEventMode, config::LoadEventSection};
use tracing::{debug, info, instrument, warn};

use crate::{
    host::{EventHost, HostContext, SceneKind},
    plugins::Plugin,
};

/// Runs a common event right after a save file has been loaded.
///
/// In [`LoadEventMode::Instant`] the event runs to completion on its own interpreter before the
/// map scene starts, i.e. while the screen is still black, so it should only contain logic
/// commands. Starting a new game never triggers it.
#[derive(Debug)]
pub struct LoadEventPlugin {
    common_event_id: u32,
    mode: LoadEventMode,
    max_updates: u32,
    pending: bool,
}

impl LoadEventPlugin {
    pub fn new(config: &LoadEventSection) -> Self {
        Self {
            common_event_id: config.common_event_id(),
            mode: config.mode(),
            max_updates: config.max_updates(),
            pending: false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    #[instrument(skip(self, events), fields(common_event = self.common_event_id))]
    fn run_to_completion(&self, events: &mut dyn EventHost) {
        let Some(mut interpreter) = events.start_common_event(self.common_event_id) else {
            debug!("common event does not exist");
            return;
        };

        let mut updates = 0;
        while interpreter.is_running() {
            if updates >= self.max_updates {
                warn!(
                    updates,
                    "common event still running after update limit, abandoning it"
                );
                return;
            }

            interpreter.update();
            updates += 1;
        }

        info!(updates, "ran common event after load");
    }
}

impl Plugin for LoadEventPlugin {
    fn name(&self) -> &'static str {
        "LoadEvent"
    }

    fn before_load_success(&mut self, _ctx: &mut HostContext<'_>) {
        if self.mode == LoadEventMode::Instant {
            self.pending = true;
        }
    }

    fn after_load_success(&mut self, ctx: &mut HostContext<'_>) {
        if self.mode == LoadEventMode::Reserve {
            ctx.events.reserve_common_event(self.common_event_id);
        }
    }

    fn before_scene_start(&mut self, ctx: &mut HostContext<'_>, scene: SceneKind) {
        if scene == SceneKind::Map && std::mem::take(&mut self.pending) {
            self.run_to_completion(&mut *ctx.events);
        }
    }
}

#[cfg(test)]
mod test {
    use scenepatch_protocol::{LoadEventMode, config::LoadEventSection};

    use super::LoadEventPlugin;
    use crate::{
        host::{Host, SceneKind},
        plugins::Plugin,
        sim::SimHost,
    };

    fn plugin(mode: LoadEventMode) -> LoadEventPlugin {
        LoadEventPlugin::new(&LoadEventSection {
            common_event_id: Some(7),
            mode: Some(mode),
            max_updates: Some(50),
            ..Default::default()
        })
    }

    #[test]
    fn instant_event_runs_once_before_map_start() {
        let mut host = SimHost::default();
        host.events.define(7, ["switch 1 on", "variable 2 = 5"]);
        let mut plugin = plugin(LoadEventMode::Instant);

        plugin.before_load_success(&mut host.context());
        plugin.after_load_success(&mut host.context());
        assert!(plugin.is_pending());
        assert!(host.events.executed.is_empty());

        plugin.before_scene_start(&mut host.context(), SceneKind::Map);
        plugin.before_scene_start(&mut host.context(), SceneKind::Map);

        assert!(!plugin.is_pending());
        assert_eq!(vec!["switch 1 on", "variable 2 = 5"], host.events.executed);
        assert!(host.events.reserved.is_empty());
    }

    #[test]
    fn new_game_does_not_trigger() {
        let mut host = SimHost::default();
        host.events.define(7, ["switch 1 on"]);
        let mut plugin = plugin(LoadEventMode::Instant);

        plugin.before_scene_start(&mut host.context(), SceneKind::Map);

        assert!(host.events.executed.is_empty());
    }

    #[test]
    fn other_scenes_keep_the_flag() {
        let mut host = SimHost::default();
        host.events.define(7, ["switch 1 on"]);
        let mut plugin = plugin(LoadEventMode::Instant);

        plugin.before_load_success(&mut host.context());
        plugin.before_scene_start(&mut host.context(), SceneKind::Battle);

        assert!(plugin.is_pending());
        assert!(host.events.executed.is_empty());
    }

    #[test]
    fn missing_event_is_skipped() {
        let mut host = SimHost::default();
        let mut plugin = plugin(LoadEventMode::Instant);

        plugin.before_load_success(&mut host.context());
        plugin.before_scene_start(&mut host.context(), SceneKind::Map);

        assert!(!plugin.is_pending());
        assert!(host.events.executed.is_empty());
    }

    #[test]
    fn runaway_event_is_abandoned() {
        let mut host = SimHost::default();
        host.events.define(7, ["tick", "loop"]);
        let mut plugin = plugin(LoadEventMode::Instant);

        plugin.before_load_success(&mut host.context());
        plugin.before_scene_start(&mut host.context(), SceneKind::Map);

        assert_eq!(50, host.events.executed.len());
    }

    #[test]
    fn reserve_mode_queues_the_event() {
        let mut host = SimHost::default();
        let mut plugin = plugin(LoadEventMode::Reserve);

        plugin.before_load_success(&mut host.context());
        plugin.after_load_success(&mut host.context());
        plugin.before_scene_start(&mut host.context(), SceneKind::Map);

        assert!(!plugin.is_pending());
        assert_eq!(vec![7], host.events.reserved);
        assert!(host.events.executed.is_empty());
    }
}
