pub mod countdown;
pub mod pours;
pub mod session;

pub use countdown::*;
pub use pours::*;
pub use session::*;
