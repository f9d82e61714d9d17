pub mod cancel;
pub mod controller;
pub mod simulation;
pub mod state;
pub mod transmitter;

pub use cancel::{cancel_pair, CancelHandle, CancelSignal};
pub use controller::{RunSummary, SimulationController};
pub use simulation::SimulationLoop;
pub use state::SimulationState;
pub use transmitter::{frame_file_name, TransmitReceipt, Transmitter};
