pub mod compositing;
pub mod editing;
pub mod error;
pub mod gesture;
pub mod playback;
pub mod resolver;
pub mod settings;
pub mod snapping;
pub mod transition;
pub mod types;

pub use error::{CoreError, Result};
pub use settings::EditorSettings;
