// Domain layer: project model, cancellation scope and the ports teardown drives.

pub mod cancel;
pub mod model;
pub mod ports;
