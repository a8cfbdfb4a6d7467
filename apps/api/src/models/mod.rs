pub mod envelope;
pub mod student;
pub mod suggestion;
pub mod thread;
