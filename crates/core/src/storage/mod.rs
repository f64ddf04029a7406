//! Local store ports

pub mod ports;
