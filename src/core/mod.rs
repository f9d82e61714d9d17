pub mod config;
pub mod error;
pub mod frame;
pub mod sample;

pub use config::SimulatorConfig;
pub use error::{ConnectionOp, Result, TelemetryError};
pub use frame::{Batch, CompressedFrame, EncodedFrame, Metadata, DATA_TYPE_KEY, GZIP_DATA_TYPE};
pub use sample::{Sample, Timestamp};
