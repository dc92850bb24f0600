pub mod http_analysis_client;
pub mod wire;
