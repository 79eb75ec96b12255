mod coordinator;
mod outcome;

pub use coordinator::BatchCoordinator;
pub use outcome::BatchOutcome;
