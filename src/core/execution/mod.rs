pub mod controller;
pub mod replication;
pub mod state;

// Re-export commonly used types
pub use controller::SequentialController;
pub use replication::ReplicationDriver;
pub use state::SimulationState;
