use serde::Deserialize;
use thiserror::Error;

use crate::{ArgsError, ChoicePlacement, CommandArgs, PictureId};

/// Plugin name the picture mask commands are registered under.
pub const PICTURE_MASK: &str = "PictureMask";

/// Plugin name the choice window commands are registered under.
pub const CHOICE_POSITION: &str = "ChoicePosition";

/// Older plugin name existing event scripts address the picture mask commands to.
pub const PICTURE_MASK_ALIAS: &str = "HR_PictureMask";

/// Older plugin name existing event scripts address the choice window command to.
pub const CHOICE_POSITION_ALIAS: &str = "SimpleChoicePos";

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("no plugin named {0:?} is registered")]
    UnknownPlugin(String),

    #[error("plugin {plugin:?} has no command {command:?}")]
    UnknownCommand { plugin: String, command: String },

    #[error("invalid arguments for {command}: {source}")]
    InvalidArgs {
        command: String,
        #[source]
        source: ArgsError,
    },
}

impl CommandError {
    fn unknown(plugin: &str, command: &str) -> Self {
        Self::UnknownCommand {
            plugin: plugin.to_owned(),
            command: command.to_owned(),
        }
    }

    fn invalid_args(command: &str) -> impl FnOnce(ArgsError) -> Self {
        move |source| Self::InvalidArgs {
            command: command.to_owned(),
            source,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MaskCommand {
    /// Mask `subject` with the contents of `mask`.
    Set { subject: PictureId, mask: PictureId },
    Clear { subject: PictureId },
    ClearAll,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SetMaskArgs {
    texture_id: PictureId,
    mask_id: PictureId,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClearMaskArgs {
    texture_id: PictureId,
}

impl MaskCommand {
    pub const SET: &'static str = "SET_MASK";
    pub const CLEAR: &'static str = "CLEAR_MASK";
    pub const CLEAR_ALL: &'static str = "CLEAR_ALL_MASK";

    pub fn parse(name: &str, args: &CommandArgs) -> Result<Self, CommandError> {
        match name {
            Self::SET => {
                let SetMaskArgs {
                    texture_id,
                    mask_id,
                } = args.decode().map_err(CommandError::invalid_args(name))?;

                Ok(Self::Set {
                    subject: texture_id,
                    mask: mask_id,
                })
            }
            Self::CLEAR => {
                let ClearMaskArgs { texture_id } =
                    args.decode().map_err(CommandError::invalid_args(name))?;

                Ok(Self::Clear {
                    subject: texture_id,
                })
            }
            Self::CLEAR_ALL => Ok(Self::ClearAll),
            _ => Err(CommandError::unknown(PICTURE_MASK, name)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChoiceCommand {
    SetPosition(ChoicePlacement),
}

impl ChoiceCommand {
    pub const SET_POSITION: &'static str = "SET_POSITION";
    pub const SET_POS: &'static str = "setPos";

    pub fn parse(name: &str, args: &CommandArgs) -> Result<Self, CommandError> {
        match name {
            Self::SET_POSITION | Self::SET_POS => Ok(Self::SetPosition(
                args.decode().map_err(CommandError::invalid_args(name))?,
            )),
            _ => Err(CommandError::unknown(CHOICE_POSITION, name)),
        }
    }
}
