//! 저장 계층.

pub mod mongo;

pub use mongo::MongoBroker;
