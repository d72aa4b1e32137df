//! Presentation patches for an RPG engine runtime.
//!
//! The engine is reached only through the collaborator traits in [`host`]. An engine adapter
//! owns a [`PatchApp`], implements [`Host`] for its scene state and routes plugin commands and
//! scene lifecycle events through the app instead of patching engine classes in place.

pub mod app;
pub mod host;
pub mod plugins;
pub mod sim;

pub use self::{
    app::PatchApp,
    host::{
        DurableState, EventHost, Host, HostContext, Interpreter, PictureDisplay, RenderLayer,
        SceneKind, VisualHandle,
    },
    plugins::Plugin,
};
