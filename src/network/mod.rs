pub mod model;
pub mod network;
pub mod topology;

pub use model::TrainedModel;
pub use network::Network;
pub use topology::Topology;
