//! Application module: the view model between the controller and the TUI.
//!
//! The `App` model lives in `app::model` and holds the list cursor, catalog
//! status and the last controller snapshot.

mod model;

pub use model::*;

#[cfg(test)]
mod tests;
