use crate::analysis::domain::analysis_task::AnalysisTask;

pub const BUSY_LABEL: &str = "Processing...";

/// A user-facing action control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    Capture,
    Detect,
    Emotion,
}

impl Trigger {
    pub const ALL: &[Trigger] = &[Trigger::Capture, Trigger::Detect, Trigger::Emotion];

    pub fn for_task(task: AnalysisTask) -> Trigger {
        match task {
            AnalysisTask::Detection => Trigger::Detect,
            AnalysisTask::Emotion => Trigger::Emotion,
        }
    }

    pub fn idle_label(self) -> &'static str {
        match self {
            Trigger::Capture => "Capture Photo",
            Trigger::Detect => "Detect Faces",
            Trigger::Emotion => "Analyze Emotion",
        }
    }

    pub fn confirmation_label(self) -> &'static str {
        match self {
            Trigger::Capture => "Captured!",
            Trigger::Detect => "Detection Complete",
            Trigger::Emotion => "Analysis Complete",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Affordance {
    Ready,
    Busy,
    Confirming,
}

/// Enabled flag plus visible affordance of one control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerControl {
    trigger: Trigger,
    enabled: bool,
    affordance: Affordance,
}

impl TriggerControl {
    pub fn new(trigger: Trigger, enabled: bool) -> Self {
        Self {
            trigger,
            enabled,
            affordance: Affordance::Ready,
        }
    }

    pub fn trigger(&self) -> Trigger {
        self.trigger
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn affordance(&self) -> Affordance {
        self.affordance
    }

    pub fn label(&self) -> &'static str {
        match self.affordance {
            Affordance::Ready => self.trigger.idle_label(),
            Affordance::Busy => BUSY_LABEL,
            Affordance::Confirming => self.trigger.confirmation_label(),
        }
    }

    pub fn set_busy(&mut self) {
        self.enabled = false;
        self.affordance = Affordance::Busy;
    }

    pub fn set_confirming(&mut self, enabled: bool) {
        self.enabled = enabled;
        self.affordance = Affordance::Confirming;
    }

    /// Back to enabled with the idle label.
    pub fn restore(&mut self) {
        self.enabled = true;
        self.affordance = Affordance::Ready;
    }
}
