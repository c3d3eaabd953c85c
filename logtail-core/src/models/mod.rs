//! Core data structures

mod target;

pub use target::{
    DEFAULT_SSH_PORT, DisplayOptions, Target, TargetConfig, Transport, parse_port,
};
