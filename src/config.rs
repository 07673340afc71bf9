//! Settings for the story player.
//!
//! `schema` holds the typed settings tree with its defaults; `load` layers the
//! optional config file and `TALES__*` environment variables on top.

mod load;
mod schema;

pub use schema::*;

#[cfg(test)]
mod tests;
