//! API clients for external services
//!
//! - Seedr: authenticated storage listing and file resolution
//! - Device: OAuth-style device-code authorization endpoints
//! - Cinemeta: title/year metadata for IMDb ids

pub mod cinemeta;
pub mod device;
pub mod seedr;

pub use cinemeta::CinemetaClient;
pub use device::DeviceAuthClient;
pub use seedr::{SeedrClient, SeedrError};
