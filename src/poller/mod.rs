pub mod scheduler;

pub use scheduler::{CycleOutcome, Poller};
