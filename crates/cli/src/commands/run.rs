use std::{
    fs,
    path::{Path, PathBuf},
};

use clap::Args;
use color_eyre::eyre::{WrapErr, eyre};
use indexmap::IndexMap;
use scenepatch_host::{
    PatchApp, PictureDisplay, SceneKind, plugins::PictureMaskPlugin, sim::SimHost,
};
use scenepatch_protocol::{CommandArgs, PictureId, PluginConfig};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::{config::Config, output::OutputBuilder};

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Script of engine events to replay, as TOML or JSON.
    #[clap(value_hint = clap::ValueHint::FilePath)]
    script: PathBuf,
}

/// A recorded sequence of engine events.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Script {
    /// Number of picture slots on the simulated screen.
    #[serde(default)]
    max_pictures: Option<usize>,

    steps: Vec<Step>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    ShowPicture {
        id: PictureId,
    },
    ErasePicture {
        id: PictureId,
    },
    Command {
        plugin: String,
        command: String,
        #[serde(default)]
        args: IndexMap<String, Value>,
    },
    /// Leave the map scene, as when opening the menu or saving.
    Suspend,
    /// Return to the map scene.
    Resume,
    LoadSuccess,
    DefineCommonEvent {
        id: u32,
        commands: Vec<String>,
    },
}

impl Script {
    pub fn from_file<P: AsRef<Path>>(path: P) -> color_eyre::Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read script {}", path.display()))?;

        let script = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => toml::from_str(&contents)?,
            Some("json") => serde_json::from_str(&contents)?,
            ext => {
                return Err(eyre!(
                    "unsupported script format: {}",
                    ext.unwrap_or("no file extension")
                ));
            }
        };

        Ok(script)
    }
}

/// Plugin commands carry their arguments as strings.
fn command_arg(value: Value) -> String {
    match value {
        Value::String(value) => value,
        Value::Null => String::new(),
        value => value.to_string(),
    }
}

/// Replays steps through a [`PatchApp`] hooked into a [`SimHost`].
pub struct Replay {
    app: PatchApp,
    host: SimHost,
    steps: usize,
    rejected: usize,
}

impl Replay {
    pub fn new(config: &PluginConfig, max_pictures: Option<usize>) -> Self {
        Self {
            app: PatchApp::from_config(config),
            host: max_pictures
                .map(SimHost::with_max_pictures)
                .unwrap_or_default(),
            steps: 0,
            rejected: 0,
        }
    }

    #[instrument(skip(self))]
    pub fn apply(&mut self, step: Step) {
        let Self {
            app,
            host,
            steps,
            rejected,
        } = self;
        *steps += 1;

        match step {
            Step::ShowPicture { id } => host.show_picture(id),
            Step::ErasePicture { id } => {
                app.erase_picture(host, id, |host| host.remove_picture(id))
            }
            Step::Command {
                plugin,
                command,
                args,
            } => {
                let args: CommandArgs = args
                    .into_iter()
                    .map(|(key, value)| (key, command_arg(value)))
                    .collect();

                if app.dispatch_command(host, &plugin, &command, &args).is_err() {
                    *rejected += 1;
                }
            }
            Step::Suspend => app.stop_scene(host, SceneKind::Map, SimHost::teardown),
            Step::Resume => app.start_scene(host, SceneKind::Map, SimHost::rebuild),
            Step::LoadSuccess => app.load_success(host, |_| debug!("save file loaded")),
            Step::DefineCommonEvent { id, commands } => host.events.define(id, commands),
        }
    }

    pub fn report(&self) -> OutputBuilder {
        let mut output = OutputBuilder::new("Replay");
        output.property("Plugins", self.app.plugin_names().collect::<Vec<_>>().join(", "));
        output.property("Steps", self.steps);
        output.property("Rejected commands", self.rejected);

        if let Some(plugin) = self.app.plugin::<PictureMaskPlugin>() {
            output.section("Mask registry", |builder| {
                for (subject, mask) in plugin.registry().iter() {
                    builder.property(subject, mask);
                }
            });
        }

        output.section("Visual masks", |builder| {
            for subject in self.host.screen.displayed_picture_ids() {
                if let Some(mask) = self.host.visual_mask(subject) {
                    builder.property(subject, mask);
                }
            }
        });

        output.section("Common events", |builder| {
            let events = &self.host.events;
            builder.property("Executed", list_or_none(&events.executed));
            builder.property("Reserved", list_or_none(&events.reserved));
        });

        output
    }
}

fn list_or_none<T: ToString>(items: &[T]) -> String {
    if items.is_empty() {
        "<none>".to_owned()
    } else {
        items
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[instrument(skip(config))]
pub fn run(config: &Config, args: RunArgs) -> color_eyre::Result<()> {
    let script = Script::from_file(&args.script)?;
    let mut replay = Replay::new(&config.plugins, script.max_pictures);

    for step in script.steps {
        replay.apply(step);
    }

    print!("{}", replay.report().build());

    Ok(())
}
