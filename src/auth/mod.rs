pub mod account;
pub mod permissions;

pub use account::*;
pub use permissions::*;
