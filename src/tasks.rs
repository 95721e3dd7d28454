//! Port to the task manager. The engine never owns task data; it only
//! reads the weighted completion percentage at rollover, clears completion
//! flags for the new week, and credits the focused task when a work
//! session completes.

use anyhow::Result;

pub trait TaskProgress: Send + Sync {
    /// Weighted completion percentage across all tasks, 0-100.
    fn overall_completion_percentage(&self) -> Result<u8>;

    /// Uncheck every task. Invoked once per weekly rollover.
    fn clear_all_completion_flags(&self) -> Result<()>;

    /// Credit the current focus task with one completed pomodoro.
    fn increment_current_task_pomodoro_count(&self) -> Result<()>;
}

/// Stand-in used when no task manager is wired up; reports 0% so the
/// rollover can still record its week.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTaskProgress;

impl TaskProgress for NoopTaskProgress {
    fn overall_completion_percentage(&self) -> Result<u8> {
        Ok(0)
    }

    fn clear_all_completion_flags(&self) -> Result<()> {
        Ok(())
    }

    fn increment_current_task_pomodoro_count(&self) -> Result<()> {
        Ok(())
    }
}
