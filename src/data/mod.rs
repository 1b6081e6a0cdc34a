pub mod dataset;
pub mod idx;
pub mod split;

pub use dataset::{DataSplits, Dataset};
pub use idx::{load_idx_pair, parse_idx_pair};
pub use split::holdout;
