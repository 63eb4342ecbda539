// Domain models shared by the engine, the collaborators and the HTTP layer
pub mod account;
pub mod action;

// Re-export commonly used types
pub use account::*;
pub use action::*;
