pub mod control;
pub mod login;
pub mod progress;
pub mod queue;
