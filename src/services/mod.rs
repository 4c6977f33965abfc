// src/services/mod.rs

pub mod deltas;
pub mod format;
pub mod google_oauth;
pub mod normalize;
pub mod sheets;
pub mod timeseries;
