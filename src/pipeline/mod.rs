// Pipelines: end-to-end runs built from the themes components.

pub mod cluster;

pub use cluster::{ClusterOptions, ClusterRun};
