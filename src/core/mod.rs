pub mod camera;
pub mod color;
pub mod output;
pub mod renderer;
pub mod scene;
pub mod shape;
pub mod tessellate;
pub mod utils;
pub mod window;

pub use output::{render_to_files, OutputSettings};
pub use window::preview;
