use std::{
    fs, io,
    path::{Path, PathBuf},
};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use thiserror::Error;
use tracing::error;

use crate::{ArgsError, CommandArgs};

/// Durable state key the picture mask snapshot is stored under unless configured otherwise.
pub const DEFAULT_SNAPSHOT_KEY: &str = "pictureMasks";

pub const DEFAULT_COMMON_EVENT_ID: u32 = 153;

pub const DEFAULT_MAX_UPDATES: u32 = 10_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("\"{0}\" is unsupported")]
    UnsupportedFormat(String),
}

/// Settings for every patch. Unset values take the defaults exposed by each section's accessors.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(default)]
pub struct PluginConfig {
    pub picture_mask: PictureMaskSection,
    pub load_event: LoadEventSection,
    pub choice_position: ChoicePositionSection,
    pub title_menu: TitleMenuSection,
    pub savefile_list: SavefileListSection,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(default)]
pub struct PictureMaskSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    /// Durable state key the mask snapshot is written to when the map scene stops.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_key: Option<String>,
}

/// How the common event is triggered after a save file was loaded.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Deserialize,
    Serialize,
    JsonSchema,
    Display,
    EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LoadEventMode {
    /// Run the event to completion before the map scene starts fading in.
    #[default]
    Instant,

    /// Queue the event on the engine's reserved common event slot.
    Reserve,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(default)]
pub struct LoadEventSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub common_event_id: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<LoadEventMode>,

    /// Upper bound on interpreter updates for an instant event.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_updates: Option<u32>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(default)]
pub struct ChoicePositionSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(default)]
pub struct TitleMenuSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    /// Keep the "Options" entry in the title command window.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_options: Option<bool>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(default)]
pub struct SavefileListSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub columns: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible_rows: Option<u32>,
}

impl PluginConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(toml::from_str(&contents)?),
            Some("json") => Ok(serde_json::from_str(&contents)?),
            ext => Err(ConfigError::UnsupportedFormat(
                ext.unwrap_or("no file extension").to_owned(),
            )),
        }
    }

    /// Loads and merges each file in turn. Files that can't be loaded are logged and skipped.
    pub fn from_files<P: AsRef<Path>>(files: impl IntoIterator<Item = P>) -> Self {
        files
            .into_iter()
            .fold(Self::default(), |config, file| {
                let path = file.as_ref();

                match Self::from_file(path) {
                    Ok(item) => config.merge(item),
                    Err(error) => {
                        error!(?path, %error, "failed to load configuration");
                        config
                    }
                }
            })
    }

    /// Overlays `other` on top of `self`; values set in `other` win.
    pub fn merge(self, other: Self) -> Self {
        Self {
            picture_mask: self.picture_mask.merge(other.picture_mask),
            load_event: self.load_event.merge(other.load_event),
            choice_position: self.choice_position.merge(other.choice_position),
            title_menu: self.title_menu.merge(other.title_menu),
            savefile_list: self.savefile_list.merge(other.savefile_list),
        }
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

impl PictureMaskSection {
    pub fn enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }

    pub fn snapshot_key(&self) -> &str {
        self.snapshot_key.as_deref().unwrap_or(DEFAULT_SNAPSHOT_KEY)
    }

    fn merge(self, other: Self) -> Self {
        Self {
            enabled: other.enabled.or(self.enabled),
            snapshot_key: other.snapshot_key.or(self.snapshot_key),
        }
    }
}

#[derive(Deserialize)]
struct LoadEventParameters {
    #[serde(rename = "CommonEventId", default)]
    common_event_id: Option<u32>,
}

impl LoadEventSection {
    /// Reads the section from the engine's plugin parameter map.
    pub fn from_parameters(params: &CommandArgs) -> Result<Self, ArgsError> {
        let LoadEventParameters { common_event_id } = params.decode()?;

        Ok(Self {
            common_event_id,
            ..Default::default()
        })
    }

    pub fn enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }

    pub fn common_event_id(&self) -> u32 {
        self.common_event_id.unwrap_or(DEFAULT_COMMON_EVENT_ID)
    }

    pub fn mode(&self) -> LoadEventMode {
        self.mode.unwrap_or_default()
    }

    pub fn max_updates(&self) -> u32 {
        self.max_updates.unwrap_or(DEFAULT_MAX_UPDATES)
    }

    fn merge(self, other: Self) -> Self {
        Self {
            enabled: other.enabled.or(self.enabled),
            common_event_id: other.common_event_id.or(self.common_event_id),
            mode: other.mode.or(self.mode),
            max_updates: other.max_updates.or(self.max_updates),
        }
    }
}

impl ChoicePositionSection {
    pub fn enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }

    fn merge(self, other: Self) -> Self {
        Self {
            enabled: other.enabled.or(self.enabled),
        }
    }
}

impl TitleMenuSection {
    pub fn enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }

    pub fn show_options(&self) -> bool {
        self.show_options.unwrap_or(false)
    }

    fn merge(self, other: Self) -> Self {
        Self {
            enabled: other.enabled.or(self.enabled),
            show_options: other.show_options.or(self.show_options),
        }
    }
}

impl SavefileListSection {
    pub fn enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }

    pub fn columns(&self) -> u32 {
        self.columns.unwrap_or(3)
    }

    pub fn visible_rows(&self) -> u32 {
        self.visible_rows.unwrap_or(2)
    }

    fn merge(self, other: Self) -> Self {
        Self {
            enabled: other.enabled.or(self.enabled),
            columns: other.columns.or(self.columns),
            visible_rows: other.visible_rows.or(self.visible_rows),
        }
    }
}

#[cfg(test)]
mod test {
    use std::{error::Error, io::Write};

    use super::{ConfigError, LoadEventMode, LoadEventSection, PluginConfig};
    use crate::CommandArgs;

    #[test]
    fn empty_config_uses_defaults() {
        let config: PluginConfig = toml::from_str("").unwrap();

        assert!(config.picture_mask.enabled());
        assert_eq!("pictureMasks", config.picture_mask.snapshot_key());
        assert_eq!(153, config.load_event.common_event_id());
        assert_eq!(LoadEventMode::Instant, config.load_event.mode());
        assert!(!config.title_menu.show_options());
        assert_eq!(3, config.savefile_list.columns());
        assert_eq!(2, config.savefile_list.visible_rows());
    }

    #[test]
    fn later_layers_win() {
        let base: PluginConfig = toml::from_str(
            r#"
            [load_event]
            common_event_id = 12
            mode = "reserve"

            [title_menu]
            show_options = true
            "#,
        )
        .unwrap();

        let overlay: PluginConfig = toml::from_str(
            r#"
            [load_event]
            common_event_id = 40
            "#,
        )
        .unwrap();

        let merged = base.merge(overlay);

        assert_eq!(40, merged.load_event.common_event_id());
        assert_eq!(LoadEventMode::Reserve, merged.load_event.mode());
        assert!(merged.title_menu.show_options());
    }

    #[test]
    fn serializes_only_what_was_set() {
        let config: PluginConfig = toml::from_str(
            r#"
            [savefile_list]
            columns = 4
            "#,
        )
        .unwrap();

        let rendered = config.to_toml().unwrap();

        assert!(rendered.contains("columns = 4"), "{rendered}");
        assert!(!rendered.contains("visible_rows"), "{rendered}");
        assert!(!rendered.contains("enabled"), "{rendered}");
    }

    #[test]
    fn loads_json_and_toml_files() -> Result<(), Box<dyn Error>> {
        let mut toml_file = tempfile::Builder::new().suffix(".toml").tempfile()?;
        writeln!(toml_file, "[picture_mask]\nsnapshot_key = \"masks\"")?;

        let mut json_file = tempfile::Builder::new().suffix(".json").tempfile()?;
        writeln!(json_file, r#"{{ "picture_mask": {{ "enabled": false }} }}"#)?;

        let config = PluginConfig::from_files([toml_file.path(), json_file.path()]);

        assert_eq!("masks", config.picture_mask.snapshot_key());
        assert!(!config.picture_mask.enabled());
        Ok(())
    }

    #[test]
    fn unknown_extension_is_rejected() -> Result<(), Box<dyn Error>> {
        let file = tempfile::Builder::new().suffix(".ini").tempfile()?;

        let err = PluginConfig::from_file(file.path()).unwrap_err();

        assert!(matches!(err, ConfigError::UnsupportedFormat(ext) if ext == "ini"));
        Ok(())
    }

    #[test]
    fn unreadable_files_are_skipped() {
        let config = PluginConfig::from_files(["/nonexistent/scenepatch.toml"]);

        assert_eq!(PluginConfig::default(), config);
    }

    #[test]
    fn reads_engine_parameters() {
        let params = CommandArgs::new().with("CommonEventId", "42");
        assert_eq!(
            42,
            LoadEventSection::from_parameters(&params)
                .unwrap()
                .common_event_id()
        );

        let params = CommandArgs::new().with("CommonEventId", "");
        assert_eq!(
            153,
            LoadEventSection::from_parameters(&params)
                .unwrap()
                .common_event_id()
        );
    }
}
