mod args;

pub use args::{Cli, LifecycleCommand, OutputFormat};
