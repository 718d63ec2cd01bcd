pub mod args;
pub mod cleanup;
pub mod error;
pub mod media;
pub mod paths;
pub mod prompt;
pub mod steps;
pub mod timestamp;
pub mod workflow;
