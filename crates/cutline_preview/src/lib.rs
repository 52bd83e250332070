pub mod driver;
pub mod error;
pub mod media;
pub mod scene;
pub mod surface;

pub use driver::{PlaybackDriver, StepOutcome};
pub use error::{PreviewError, Result};
pub use media::{MediaPlayer, MediaSync, TracingPlayer};
pub use scene::{load_project, parse_project};
pub use surface::{RenderSurface, TracingSurface};
