// Domain layer: records, form payloads and ports (interfaces).

pub mod forms;
pub mod model;
pub mod ports;
