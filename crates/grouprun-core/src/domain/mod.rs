//! Domain types describing a unit of work to run.

mod environment;
mod process_spec;
mod streams;

pub use environment::{EnvironmentBlock, effective_environment};
pub use process_spec::ProcessSpec;
pub use streams::{CaptureBuffer, InputSource, OutputTarget, StreamReader};
