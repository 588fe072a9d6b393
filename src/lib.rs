pub mod brewing;
pub mod display;
pub mod recipe;
pub mod system;
pub mod types;

pub use brewing::*;
pub use recipe::*;
pub use system::{BrewConfig, BrewError, ListenerId, TransitionError};
pub use types::*;
