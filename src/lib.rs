//! Batch driver for the gammagen primary generator: parallel run loop,
//! emission sinks and the run summary.

pub mod app;
