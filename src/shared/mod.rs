pub mod shutdown;
pub mod time;
pub mod types;

pub use shutdown::*;
pub use time::*;
pub use types::*;
