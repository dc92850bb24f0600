pub mod result_renderer;
pub mod scene;
