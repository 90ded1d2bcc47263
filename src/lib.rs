//! photo-shelf: a native photo library.
//!
//! - [`scanner`]: image / raw image classification from header bytes, dimension
//!   probing and the cache directory layout
//! - [`state`]: the SQLite catalog of albums and media
//! - [`ui`]: global style and page routing for the application shell

pub mod config;
pub mod error;
pub mod scanner;
pub mod state;
pub mod ui;

pub use config::Config;
pub use error::{ClassifyError, Result, ShelfError};
