pub mod controller;
pub mod state;

pub use controller::{TimerConfig, TimerController, TimerSnapshot};
pub use state::{Phase, PomodoroSettings, SettingsPatch, TimerState};
