pub mod blank;
pub mod composite;
pub mod input;
pub mod model;
pub mod render;
pub mod state;
pub mod surface;

pub use blank::is_blank;
pub use input::{InputAdapter, SurfaceRect};
pub use model::{Color, StrokePoint, StrokeStyle, SurfaceStyle};
pub use state::DrawingState;
pub use surface::DrawingSurface;
