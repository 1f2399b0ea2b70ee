//! Station lists from NTRIP caster source tables.

pub mod client;
pub mod filter;
pub mod sourcetable;
pub mod update;
