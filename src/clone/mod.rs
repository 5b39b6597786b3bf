pub mod orchestrator;
pub mod runner;
pub mod task;
