#![no_std]

extern crate alloc;

pub mod card;
pub mod config;
pub mod locale;
pub mod power;
pub mod sources;
pub mod ui;

pub use card::{CardError, PowerGraphCard, RefreshSchedule};
pub use config::{CardConfig, ConfigError, DebugSetting};
pub use power::{DisplayRow, PowerReading, ReduceOptions, reduce};
