pub mod sources;

pub use sources::{SearchConfig, SourcesConfig};
