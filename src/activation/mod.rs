pub mod sigmoid;

pub use sigmoid::{sigmoid, sigmoid_array, sigmoid_derivative_from_output};
