//! Application lifecycle control: open and close apps by symbolic name.

pub mod controller;
pub mod launcher;

pub use controller::{Closed, Opened, ProcessController};
pub use launcher::{
    default_launcher, split_command, MacLauncher, ProcessLauncher, SharedLauncher,
    TerminateOutcome, UnixLauncher, WindowsLauncher,
};
