use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Work,
    ShortBreak,
    LongBreak,
}

impl Default for Phase {
    fn default() -> Self {
        Phase::Work
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PomodoroSettings {
    /// Minutes per work session.
    #[serde(default = "default_work_duration")]
    pub work_duration: u32,
    #[serde(default = "default_short_break_duration")]
    pub short_break_duration: u32,
    #[serde(default = "default_long_break_duration")]
    pub long_break_duration: u32,
    /// A long break follows every this-many completed work sessions.
    #[serde(default = "default_long_break_interval")]
    pub long_break_interval: u32,
    #[serde(default = "default_auto_start_breaks")]
    pub auto_start_breaks: bool,
    #[serde(default)]
    pub auto_start_pomodoros: bool,
}

fn default_work_duration() -> u32 {
    25
}

fn default_short_break_duration() -> u32 {
    5
}

fn default_long_break_duration() -> u32 {
    15
}

fn default_long_break_interval() -> u32 {
    4
}

fn default_auto_start_breaks() -> bool {
    true
}

impl Default for PomodoroSettings {
    fn default() -> Self {
        Self {
            work_duration: default_work_duration(),
            short_break_duration: default_short_break_duration(),
            long_break_duration: default_long_break_duration(),
            long_break_interval: default_long_break_interval(),
            auto_start_breaks: default_auto_start_breaks(),
            auto_start_pomodoros: false,
        }
    }
}

impl PomodoroSettings {
    pub fn duration_secs(&self, phase: Phase) -> u32 {
        let minutes = match phase {
            Phase::Work => self.work_duration,
            Phase::ShortBreak => self.short_break_duration,
            Phase::LongBreak => self.long_break_duration,
        };
        minutes * 60
    }

    pub fn apply(&mut self, patch: SettingsPatch) {
        if let Some(value) = patch.work_duration {
            self.work_duration = value;
        }
        if let Some(value) = patch.short_break_duration {
            self.short_break_duration = value;
        }
        if let Some(value) = patch.long_break_duration {
            self.long_break_duration = value;
        }
        if let Some(value) = patch.long_break_interval {
            self.long_break_interval = value;
        }
        if let Some(value) = patch.auto_start_breaks {
            self.auto_start_breaks = value;
        }
        if let Some(value) = patch.auto_start_pomodoros {
            self.auto_start_pomodoros = value;
        }
    }
}

/// Partial settings update; unset fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    pub work_duration: Option<u32>,
    pub short_break_duration: Option<u32>,
    pub long_break_duration: Option<u32>,
    pub long_break_interval: Option<u32>,
    pub auto_start_breaks: Option<bool>,
    pub auto_start_pomodoros: Option<bool>,
}

/// The persisted countdown snapshot. While `is_running` is true,
/// `end_time` (epoch millis) is the sole source of truth for the remaining
/// time; `time_left` is a derived display value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    pub is_running: bool,
    #[serde(rename = "timerType")]
    pub phase: Phase,
    pub time_left: u32,
    pub completed_pomodoros: u32,
    pub end_time: Option<i64>,
    #[serde(default)]
    pub last_updated: i64,
}

impl Default for TimerState {
    fn default() -> Self {
        Self {
            is_running: false,
            phase: Phase::Work,
            time_left: 1500, // 25 minutes in seconds
            completed_pomodoros: 0,
            end_time: None,
            last_updated: 0,
        }
    }
}

impl TimerState {
    /// Remaining seconds re-derived from the scheduled end time, clamped
    /// to zero. Falls back to the frozen `time_left` when not scheduled.
    pub fn remaining_at(&self, now_millis: i64) -> u32 {
        match self.end_time {
            Some(end) => ((end - now_millis) as f64 / 1000.0).round().max(0.0) as u32,
            None => self.time_left,
        }
    }

    /// The break that follows once `completed` work sessions are done.
    pub fn break_after(completed: u32, settings: &PomodoroSettings) -> Phase {
        if settings.long_break_interval > 0 && completed % settings.long_break_interval == 0 {
            Phase::LongBreak
        } else {
            Phase::ShortBreak
        }
    }
}
