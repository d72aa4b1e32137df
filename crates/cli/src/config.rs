use std::path::Path;

use clap::ArgAction;
use directories::ProjectDirs;
use scenepatch_protocol::{
    LoadEventMode, PluginConfig,
    config::{LoadEventSection, PictureMaskSection, TitleMenuSection},
};

const PROJECT_QUALIFIER: &str = "io.github";
const PROJECT_ORG: &str = "scenepatch";
const PROJECT_NAME: &str = "scenepatch";

pub const CONFIG_FILE_NAME: &str = "scenepatch.toml";

/// Plugin settings that can be overridden from the command line.
#[derive(Debug, Default, clap::Args)]
#[group(multiple = true)]
pub struct Options {
    /// Durable state key the picture mask snapshot is stored under.
    #[clap(long, help_heading = "Configuration")]
    snapshot_key: Option<String>,

    /// Common event to run after a save file was loaded.
    #[clap(long, help_heading = "Configuration")]
    common_event_id: Option<u32>,

    /// How the common event is run after a save file was loaded.
    #[clap(long, help_heading = "Configuration")]
    load_event_mode: Option<LoadEventMode>,

    /// Keep the "Options" entry on the title screen.
    #[clap(long, help_heading = "Configuration", action = ArgAction::SetTrue)]
    show_title_options: bool,
}

impl Options {
    /// The configuration layer described by these options. Unset options leave the lower
    /// layers untouched.
    pub fn into_layer(self) -> PluginConfig {
        PluginConfig {
            picture_mask: PictureMaskSection {
                snapshot_key: self.snapshot_key,
                ..Default::default()
            },
            load_event: LoadEventSection {
                common_event_id: self.common_event_id,
                mode: self.load_event_mode,
                ..Default::default()
            },
            title_menu: TitleMenuSection {
                show_options: self.show_title_options.then_some(true),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

pub struct Config {
    pub known_dirs: KnownDirs,
    pub plugins: PluginConfig,
}

#[derive(Debug)]
pub struct KnownDirs {
    /// The current working directory we launched from.
    cwd: Option<Box<Path>>,

    project_dirs: Option<ProjectDirs>,
}

impl Default for KnownDirs {
    fn default() -> Self {
        Self {
            cwd: std::env::current_dir()
                .map(|cwd| cwd.into_boxed_path())
                .ok(),
            project_dirs: ProjectDirs::from(PROJECT_QUALIFIER, PROJECT_ORG, PROJECT_NAME),
        }
    }
}

impl KnownDirs {
    /// Candidate configuration directories, ordered from least priority to highest.
    ///
    /// - $XDG_CONFIG_DIR:=$HOME/.config/scenepatch (Linux)
    /// - %LOCALAPPDATA%/scenepatch/scenepatch/config (Windows)
    /// - the current working directory
    pub fn config_dirs(&self) -> impl Iterator<Item = Box<Path>> {
        let config_dirs = [
            self.project_dirs
                .as_ref()
                .map(|proj| Box::from(proj.config_local_dir())),
            self.cwd.clone(),
        ];

        config_dirs.into_iter().flatten()
    }

    pub fn config_files(&self) -> impl Iterator<Item = Box<Path>> {
        self.config_dirs()
            .map(|dir| dir.join(CONFIG_FILE_NAME).into_boxed_path())
    }
}
