pub mod init;
pub mod matrix;

pub use init::{init_bound, initialize_weights};
