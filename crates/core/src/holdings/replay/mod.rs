//! Transaction replay engine.
//!
//! A pure reducer folding an ordered transaction slice into a running
//! aggregate. Recomputation is the system's consistency mechanism, so the
//! fold must be a pure function of the ordered input: no clock, no counter,
//! no hidden state.

mod replay_engine;
mod state;


pub use replay_engine::{apply_transaction, replay};
pub use state::SharesAggregate;
