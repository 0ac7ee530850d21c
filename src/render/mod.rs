//! Drawing chains and free nodes onto an abstract [`Surface`].

pub mod renderer;
pub mod spline;
pub mod style;
pub mod surface;

pub use renderer::{ChainRenderer, RenderStats};
pub use style::{ChainStyle, NodeStyle, Rgba, Smoothing, Stroke};
pub use surface::{DrawCommand, RecordingSurface, Surface};
