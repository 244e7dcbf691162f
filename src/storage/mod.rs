pub mod accumulator;
pub mod store;
pub mod sync;

pub use accumulator::{Accumulator, AccumulatorSet, SharedAccumulator};
pub use store::{CrossRefStore, SyncStats};
pub use sync::Synchronizer;
