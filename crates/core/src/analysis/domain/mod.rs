pub mod analysis_client;
pub mod analysis_error;
pub mod analysis_result;
pub mod analysis_task;
