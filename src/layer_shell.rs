// SPDX-License-Identifier: GPL-3.0-only

//! Layer-shell placement for the keyboard surface.
//!
//! The keyboard lives on the Overlay layer of `zwlr_layer_shell_v1`, anchored
//! to the bottom, left and right edges so it spans the full output width. Its
//! exclusive zone equals its height, which makes the compositor push other
//! windows up instead of covering them.
//!
//! The layer protocol does not report the output size before the first
//! configure, so [`screen_height`] asks `wl_output` directly for the current
//! mode and scale.

use cosmic::iced::window;
use cosmic::iced::{Limits, Task};
use cosmic::iced_runtime::platform_specific::wayland::layer_surface::{
    IcedMargin, IcedOutput, SctkLayerSurfaceSettings,
};
use cosmic::iced_winit::platform_specific::wayland::commands::layer_surface::{
    Anchor, KeyboardInteractivity, Layer, set_exclusive_zone, set_size,
};
use wayland_client::globals::{GlobalListContents, registry_queue_init};
use wayland_client::protocol::{wl_output, wl_registry};
use wayland_client::{Connection, Dispatch, QueueHandle, WEnum};

use crate::app_settings;

/// Namespace announced to the compositor.
pub const NAMESPACE: &str = "platanitos-keyboard";

/// Full-width bottom anchor.
#[must_use]
pub fn keyboard_anchor() -> Anchor {
    Anchor::BOTTOM | Anchor::LEFT | Anchor::RIGHT
}

/// Rounds a logical height to whole surface pixels, never below one.
#[must_use]
pub fn surface_height_px(height: f32) -> u32 {
    if !height.is_finite() || height < 1.0 {
        1
    } else {
        height.round() as u32
    }
}

/// Exclusive zone reserving the whole surface height.
#[must_use]
pub fn exclusive_zone(height_px: u32) -> i32 {
    i32::try_from(height_px).unwrap_or(i32::MAX)
}

/// Settings for the keyboard layer surface at the given logical height.
#[must_use]
pub fn keyboard_surface_settings(id: window::Id, height: f32) -> SctkLayerSurfaceSettings {
    let height_px = surface_height_px(height);

    SctkLayerSurfaceSettings {
        id,
        layer: Layer::Overlay,
        keyboard_interactivity: KeyboardInteractivity::None,
        input_zone: None,
        anchor: keyboard_anchor(),
        output: IcedOutput::Active,
        namespace: NAMESPACE.to_string(),
        margin: IcedMargin::default(),
        size: Some((None, Some(height_px))),
        exclusive_zone: exclusive_zone(height_px),
        size_limits: Limits::NONE.min_height(1.0),
    }
}

/// Resizes an open keyboard surface and its exclusive zone together.
pub fn resize_surface<M: Send + 'static>(id: window::Id, height: f32) -> Task<M> {
    let height_px = surface_height_px(height);
    tracing::debug!("Resizing keyboard surface {:?} to {}px", id, height_px);

    Task::batch([
        set_size(id, None, Some(height_px)),
        set_exclusive_zone(id, exclusive_zone(height_px)),
    ])
}

// ============================================================================
// Output Probe
// ============================================================================

/// Errors raised while probing outputs.
#[derive(Debug, thiserror::Error)]
pub enum OutputProbeError {
    #[error("Wayland connection failed: {0}")]
    Connection(String),
    #[error("no output reported a current mode")]
    NoOutput,
}

/// What one `wl_output` reported about itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputGeometry {
    pub mode_width: i32,
    pub mode_height: i32,
    pub scale: i32,
    /// Rotated by 90 or 270 degrees, so the mode width is the visible height.
    pub rotated: bool,
}

impl Default for OutputGeometry {
    fn default() -> Self {
        Self {
            mode_width: 0,
            mode_height: 0,
            scale: 1,
            rotated: false,
        }
    }
}

impl OutputGeometry {
    /// Visible height in logical pixels, if a mode has been reported.
    #[must_use]
    pub fn logical_height(&self) -> Option<f32> {
        let physical = if self.rotated {
            self.mode_width
        } else {
            self.mode_height
        };
        if physical <= 0 {
            return None;
        }
        Some(physical as f32 / self.scale.max(1) as f32)
    }
}

#[derive(Default)]
struct OutputProbe {
    outputs: Vec<OutputGeometry>,
}

impl Dispatch<wl_registry::WlRegistry, GlobalListContents> for OutputProbe {
    fn event(
        _: &mut Self,
        _: &wl_registry::WlRegistry,
        _: wl_registry::Event,
        _: &GlobalListContents,
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
    }
}

impl Dispatch<wl_output::WlOutput, usize> for OutputProbe {
    fn event(
        state: &mut Self,
        _: &wl_output::WlOutput,
        event: wl_output::Event,
        index: &usize,
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
        let Some(geometry) = state.outputs.get_mut(*index) else {
            return;
        };

        match event {
            wl_output::Event::Mode {
                flags: WEnum::Value(flags),
                width,
                height,
                ..
            } if flags.contains(wl_output::Mode::Current) => {
                geometry.mode_width = width;
                geometry.mode_height = height;
            }
            wl_output::Event::Scale { factor } => geometry.scale = factor,
            wl_output::Event::Geometry {
                transform: WEnum::Value(transform),
                ..
            } => {
                geometry.rotated = matches!(
                    transform,
                    wl_output::Transform::_90
                        | wl_output::Transform::_270
                        | wl_output::Transform::Flipped90
                        | wl_output::Transform::Flipped270
                );
            }
            _ => {}
        }
    }
}

/// Queries every output once and returns the first logical height found.
pub fn probe_screen_height() -> Result<f32, OutputProbeError> {
    let connection =
        Connection::connect_to_env().map_err(|e| OutputProbeError::Connection(e.to_string()))?;
    let (globals, mut queue) = registry_queue_init::<OutputProbe>(&connection)
        .map_err(|e| OutputProbeError::Connection(e.to_string()))?;
    let qh = queue.handle();

    let announced: Vec<(u32, u32)> = globals.contents().with_list(|list| {
        list.iter()
            .filter(|global| global.interface == "wl_output")
            .map(|global| (global.name, global.version))
            .collect()
    });

    let mut probe = OutputProbe {
        outputs: vec![OutputGeometry::default(); announced.len()],
    };
    let _outputs: Vec<wl_output::WlOutput> = announced
        .iter()
        .enumerate()
        .map(|(index, (name, version))| {
            globals
                .registry()
                .bind::<wl_output::WlOutput, _, _>(*name, (*version).min(4), &qh, index)
        })
        .collect();

    queue
        .roundtrip(&mut probe)
        .map_err(|e| OutputProbeError::Connection(e.to_string()))?;

    probe
        .outputs
        .iter()
        .find_map(OutputGeometry::logical_height)
        .ok_or(OutputProbeError::NoOutput)
}

/// Logical screen height, or the fallback when no output answers.
#[must_use]
pub fn screen_height() -> f32 {
    match probe_screen_height() {
        Ok(height) => {
            tracing::info!("Screen height: {}", height);
            height
        }
        Err(e) => {
            tracing::warn!(
                "Could not read the screen height ({}), assuming {}",
                e,
                app_settings::FALLBACK_SCREEN_HEIGHT
            );
            app_settings::FALLBACK_SCREEN_HEIGHT
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test: Surface spans the bottom edge and reserves its height
    #[test]
    fn test_keyboard_surface_settings() {
        let id = window::Id::unique();
        let settings = keyboard_surface_settings(id, 320.4);

        assert_eq!(settings.id, id);
        assert_eq!(settings.anchor, Anchor::BOTTOM | Anchor::LEFT | Anchor::RIGHT);
        assert_eq!(settings.size, Some((None, Some(320))));
        assert_eq!(settings.exclusive_zone, 320);
        assert_eq!(settings.namespace, NAMESPACE);
    }

    /// Test: Heights round to whole pixels and never reach zero
    #[test]
    fn test_surface_height_px() {
        assert_eq!(surface_height_px(88.0), 88);
        assert_eq!(surface_height_px(99.6), 100);
        assert_eq!(surface_height_px(0.0), 1);
        assert_eq!(surface_height_px(-5.0), 1);
        assert_eq!(surface_height_px(f32::NAN), 1);
    }

    #[test]
    fn test_exclusive_zone_saturates() {
        assert_eq!(exclusive_zone(88), 88);
        assert_eq!(exclusive_zone(u32::MAX), i32::MAX);
    }

    /// Test: Logical height divides by scale and follows rotation
    #[test]
    fn test_output_logical_height() {
        let plain = OutputGeometry {
            mode_width: 1920,
            mode_height: 1080,
            ..Default::default()
        };
        assert_eq!(plain.logical_height(), Some(1080.0));

        let hidpi = OutputGeometry {
            mode_width: 2560,
            mode_height: 1600,
            scale: 2,
            rotated: false,
        };
        assert_eq!(hidpi.logical_height(), Some(800.0));

        let portrait = OutputGeometry {
            rotated: true,
            ..plain
        };
        assert_eq!(portrait.logical_height(), Some(1920.0));
    }

    /// Test: An output without a mode has no height
    #[test]
    fn test_output_without_mode() {
        assert_eq!(OutputGeometry::default().logical_height(), None);

        let zero_scale = OutputGeometry {
            mode_width: 800,
            mode_height: 600,
            scale: 0,
            rotated: false,
        };
        assert_eq!(zero_scale.logical_height(), Some(600.0));
    }
}
