pub mod contract;
pub mod error;
pub mod executor;
pub mod flow;
pub mod model;
pub mod registry;
pub mod telemetry;
pub mod template;
