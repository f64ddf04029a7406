//! Connectivity detection

pub mod probe;
pub mod status;

pub use probe::{ConnectivityProbe, ProbeConfig, ProbeError};
pub use status::NetworkStatus;
