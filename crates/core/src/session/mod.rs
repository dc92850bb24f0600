pub mod result_summary;
pub mod revert_scheduler;
pub mod session_state;
pub mod trigger_control;
pub mod ui_state_controller;
