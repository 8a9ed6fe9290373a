//! Client-side reassembly module
//!
//! Mirror image of the stream transport: reads the chunk stream of one
//! response, buffers it, and parses it once the connection closes.
//!
//! ```text
//! Initial ──start──▶ Loading ──stream ends──▶ Complete
//!                       ▲                        │
//!                       └─────── start ──────────┘
//! ```

mod reassembler;

pub use reassembler::{ClientReassembler, LoadState, ReassemblyBuffer, ReassemblyProgress};

#[cfg(test)]
mod tests;
