// Domain layer: resource, option and response models plus the transport port.

pub mod model;
pub mod ports;
