//! Request handlers.

pub mod credentials;
pub mod health;
pub mod video;

pub use credentials::*;
pub use health::*;
pub use video::*;
