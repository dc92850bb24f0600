pub mod analysis;
pub mod capture;
pub mod pipeline;
pub mod rendering;
pub mod session;
pub mod shared;
