// Domain layer: config-facing models and the ports the processors are built on.

pub mod model;
pub mod ports;
