mod models;
mod right;

pub use models::*;
pub use right::Right;
