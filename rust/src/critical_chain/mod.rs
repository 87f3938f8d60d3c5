//! Critical chain and buffer computation.
//!
//! The critical chain is the longest effort-weighted dependency path through a
//! task set. Buffers are sized as a share of that length and track how much of
//! the reserve later delays have eaten.

mod buffer;
mod graph;

pub use buffer::{
    buffer_percentage, calculate_phase_buffer, calculate_phase_buffers, calculate_project_buffer,
    get_buffer_status, update_buffer_consumption, ProjectBufferInfo,
};
pub use graph::{find_critical_chain, ChainGraph, CriticalChain};
