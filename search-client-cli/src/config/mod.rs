//! Configuration for the search client CLI.

mod settings;

pub use settings::Settings;
