pub mod backend;
pub mod draw;
pub mod error;
pub mod gui;
pub mod logging;
pub mod queue;
pub mod settings;
pub mod submit;
