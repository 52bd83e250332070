use crate::error::Result;
use cutline_core::compositing::Layer;

/// Receives the composited layer stack, bottom to top, once per tick.
pub trait RenderSurface {
    fn present(&mut self, time: f64, layers: &[Layer]) -> Result<()>;
}

/// Headless surface that logs every layer it is handed.
#[derive(Debug, Default)]
pub struct TracingSurface {
    frames: u64,
}

impl TracingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl RenderSurface for TracingSurface {
    fn present(&mut self, time: f64, layers: &[Layer]) -> Result<()> {
        self.frames += 1;
        tracing::debug!(frame = self.frames, time, layers = layers.len(), "present");
        for layer in layers {
            tracing::debug!(
                item = %layer.item_id,
                track = layer.track_index,
                role = ?layer.role,
                progress = ?layer.progress,
                z = layer.z_index,
                opacity = ?layer.params.opacity,
                clip = ?layer.params.clip_path.as_ref().map(ToString::to_string),
                filter = ?layer.params.filter.as_ref().map(ToString::to_string),
                "layer"
            );
        }
        Ok(())
    }
}
