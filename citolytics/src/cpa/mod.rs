//! Co-citation proximity analysis.

pub mod aggregate;
pub mod emitter;
pub mod link_graph;
pub mod scoring;
pub mod stats;
