//! Types shared between the scenepatch runtime and the engine adapters that drive it.
//!
//! Engines hand plugin commands and plugin parameters over as loosely typed string maps
//! ([`CommandArgs`]); this crate turns them into typed commands and configuration.

pub mod args;
pub mod choice;
pub mod command;
pub mod config;
mod picture;

pub use self::{
    args::{ArgsError, CommandArgs},
    choice::ChoicePlacement,
    command::{ChoiceCommand, CommandError, MaskCommand},
    config::{ConfigError, LoadEventMode, PluginConfig},
    picture::{InvalidPictureId, PictureId},
};
