use std::{any::Any, fmt::Debug};

use scenepatch_protocol::{CommandArgs, CommandError, PictureId, PluginConfig};
use tracing::{instrument, warn};

use crate::{
    host::{Host, SceneKind},
    plugins::{
        ChoicePositionPlugin, GridLayout, LoadEventPlugin, PictureMaskPlugin, Plugin,
        SavefileListPlugin, Size, TitleCommand, TitleMenuPlugin, WindowRect,
    },
};

/// Owns the registered plugins and runs their hooks around the engine's own behaviour.
///
/// The lifecycle wrappers take the engine's implementation as `base` and call it at
/// the point the patched engine method would have.
#[derive(Default)]
pub struct PatchApp {
    plugins: Vec<Box<dyn Plugin>>,
}

impl Debug for PatchApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatchApp")
            .field(
                "plugins",
                &self.plugins.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl PatchApp {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers every patch `config` enables.
    pub fn from_config(config: &PluginConfig) -> Self {
        let mut app = Self::new();

        if config.picture_mask.enabled() {
            app.register_plugin(PictureMaskPlugin::new(&config.picture_mask));
        }

        if config.load_event.enabled() {
            app.register_plugin(LoadEventPlugin::new(&config.load_event));
        }

        if config.choice_position.enabled() {
            app.register_plugin(ChoicePositionPlugin::new());
        }

        if config.title_menu.enabled() {
            app.register_plugin(TitleMenuPlugin::new(&config.title_menu));
        }

        if config.savefile_list.enabled() {
            app.register_plugin(SavefileListPlugin::new(&config.savefile_list));
        }

        app
    }

    pub fn register_plugin<P>(&mut self, plugin: P)
    where
        P: Plugin,
    {
        self.plugins.push(Box::new(plugin));
    }

    pub fn plugin_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.plugins.iter().map(|p| p.name())
    }

    pub fn plugin<P: Plugin>(&self) -> Option<&P> {
        self.plugins.iter().find_map(|p| {
            let plugin: &dyn Any = &**p;
            plugin.downcast_ref::<P>()
        })
    }

    #[instrument(skip(self, host, args))]
    pub fn dispatch_command<H>(
        &mut self,
        host: &mut H,
        plugin: &str,
        command: &str,
        args: &CommandArgs,
    ) -> Result<(), CommandError>
    where
        H: Host + ?Sized,
    {
        let result = match self
            .plugins
            .iter_mut()
            .find(|p| p.name() == plugin || p.aliases().contains(&plugin))
        {
            Some(target) => target.command(&mut host.context(), command, args),
            None => Err(CommandError::UnknownPlugin(plugin.to_owned())),
        };

        if let Err(error) = &result {
            warn!(%error, ?args, "plugin command was not applied");
        }

        result
    }

    #[instrument(skip(self, host, base))]
    pub fn start_scene<H, R>(
        &mut self,
        host: &mut H,
        scene: SceneKind,
        base: impl FnOnce(&mut H) -> R,
    ) -> R
    where
        H: Host + ?Sized,
    {
        {
            let mut ctx = host.context();
            for plugin in &mut self.plugins {
                plugin.before_scene_start(&mut ctx, scene);
            }
        }

        let result = base(host);

        let mut ctx = host.context();
        for plugin in &mut self.plugins {
            plugin.after_scene_start(&mut ctx, scene);
        }

        result
    }

    #[instrument(skip(self, host, base))]
    pub fn stop_scene<H, R>(
        &mut self,
        host: &mut H,
        scene: SceneKind,
        base: impl FnOnce(&mut H) -> R,
    ) -> R
    where
        H: Host + ?Sized,
    {
        {
            let mut ctx = host.context();
            for plugin in &mut self.plugins {
                plugin.before_scene_stop(&mut ctx, scene);
            }
        }

        base(host)
    }

    #[instrument(skip(self, host, base))]
    pub fn load_success<H, R>(&mut self, host: &mut H, base: impl FnOnce(&mut H) -> R) -> R
    where
        H: Host + ?Sized,
    {
        {
            let mut ctx = host.context();
            for plugin in &mut self.plugins {
                plugin.before_load_success(&mut ctx);
            }
        }

        let result = base(host);

        let mut ctx = host.context();
        for plugin in &mut self.plugins {
            plugin.after_load_success(&mut ctx);
        }

        result
    }

    #[instrument(skip(self, host, base))]
    pub fn erase_picture<H, R>(
        &mut self,
        host: &mut H,
        id: PictureId,
        base: impl FnOnce(&mut H) -> R,
    ) -> R
    where
        H: Host + ?Sized,
    {
        {
            let mut ctx = host.context();
            for plugin in &mut self.plugins {
                plugin.before_picture_erase(&mut ctx, id);
            }
        }

        base(host)
    }

    /// Notifies plugins that the engine reset its message state.
    pub fn message_cleared(&mut self) {
        for plugin in &mut self.plugins {
            plugin.message_cleared();
        }
    }

    /// Filters the engine's title screen commands.
    pub fn title_commands(&self, mut commands: Vec<TitleCommand>) -> Vec<TitleCommand> {
        for plugin in &self.plugins {
            plugin.title_commands(&mut commands);
        }

        commands
    }

    pub fn savefile_layout(&self, mut layout: GridLayout) -> GridLayout {
        for plugin in &self.plugins {
            plugin.savefile_layout(&mut layout);
        }

        layout
    }

    /// Number of rows the choice window shows for `choice_count` choices, given the engine's
    /// own row count.
    pub fn choice_visible_rows(&self, mut rows: usize, choice_count: usize) -> usize {
        for plugin in &self.plugins {
            plugin.choice_visible_rows(&mut rows, choice_count);
        }

        rows
    }

    /// Adjusts a choice window the engine has just placed inside `bounds`.
    pub fn choice_placement(&mut self, mut rect: WindowRect, bounds: Size) -> WindowRect {
        for plugin in &mut self.plugins {
            plugin.choice_placement(&mut rect, bounds);
        }

        rect
    }
}
