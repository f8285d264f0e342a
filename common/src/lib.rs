pub mod chart;
pub mod config;
pub mod error;
pub mod label;
pub mod plot;
pub mod series;
pub mod summary;
pub mod util;

pub const BATCH_SIZE: &str = "batchSize";
pub const NUM_CLIENTS: &str = "numClients";
pub const THROUGHPUT: &str = "throughput_ops_per_sec";
pub const EFFICIENCY: &str = "efficiency";
