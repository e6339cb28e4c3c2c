pub mod personalization;
pub mod ranking;
pub mod sampling;
pub mod search;

pub use personalization::personalize;
pub use ranking::{popular, rank};
pub use search::search;
