pub mod run;
pub mod sink;

pub use run::{run, split_events, RunOptions, RunSummary, WorkerReport};
pub use sink::{EmissionRecord, JsonLinesSink, TallySink};
