//! Overlay scene construction for the corner editor.
//!
//! Produces a renderer-agnostic display list in screen space; the UI layer
//! draws it with whatever canvas it has. Purely presentational: nothing here
//! mutates corner state.

use serde::{Deserialize, Serialize};

use super::point::{Corner, CornerSet};
use super::transform::FitTransform;
use crate::config::CaptureConfig;

/// Active handles are drawn this much larger than idle ones.
const ACTIVE_HANDLE_SCALE: f32 = 1.4;

/// Border width of the confirmed-region highlight, screen px.
const HIGHLIGHT_BORDER_WIDTH: f32 = 4.0;

/// Opacity of the highlight fill (0.0-1.0).
const HIGHLIGHT_FILL_ALPHA: f32 = 0.25;

/// What the overlay should communicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayMode {
    /// Connecting edges plus one draggable circular handle per corner.
    Handles,
    /// Translucent fill of the quadrilateral with a thick border, no
    /// handles; the confirmed-region preview before extraction.
    Highlight,
}

/// A straight segment between two screen-space points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub from: (f32, f32),
    pub to: (f32, f32),
}

/// One draggable corner handle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Handle {
    pub corner: Corner,
    pub center: (f32, f32),
    pub radius: f32,
    /// Hovered or mid-drag; render enlarged/recolored.
    pub active: bool,
}

/// Translucent quadrilateral fill for highlight mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuadFill {
    /// Screen-space polygon in tl→tr→br→bl order.
    pub polygon: [(f32, f32); 4],
    pub fill_alpha: f32,
    pub border_width: f32,
}

/// Display list the UI renders verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayScene {
    pub edges: Vec<Edge>,
    pub handles: Vec<Handle>,
    pub fill: Option<QuadFill>,
    /// No source image loaded; render a placeholder, accept no input.
    pub placeholder: bool,
}

impl OverlayScene {
    /// Idle scene for when no source image is available. Not an error.
    pub fn placeholder() -> OverlayScene {
        OverlayScene {
            edges: Vec::new(),
            handles: Vec::new(),
            fill: None,
            placeholder: true,
        }
    }
}

/// Build the overlay for the current corners.
///
/// `active` marks the hovered/dragged corner in handles mode. Pass
/// `None` corners to get the placeholder scene.
pub fn build_overlay(
    corners: Option<&CornerSet>,
    mode: OverlayMode,
    active: Option<Corner>,
    transform: &FitTransform,
    config: &CaptureConfig,
) -> OverlayScene {
    let Some(corners) = corners else {
        return OverlayScene::placeholder();
    };

    let screen: Vec<(Corner, (f32, f32))> = Corner::ALL
        .iter()
        .map(|&c| (c, transform.image_to_screen(corners.get(c))))
        .collect();

    // tl→tr→br→bl ring.
    let ring = [
        screen[0].1, // top_left
        screen[1].1, // top_right
        screen[3].1, // bottom_right
        screen[2].1, // bottom_left
    ];

    match mode {
        OverlayMode::Handles => {
            let edges = (0..4)
                .map(|i| Edge {
                    from: ring[i],
                    to: ring[(i + 1) % 4],
                })
                .collect();
            let base_radius = config.handle_radius();
            let handles = screen
                .iter()
                .map(|&(corner, center)| {
                    let is_active = active == Some(corner);
                    Handle {
                        corner,
                        center,
                        radius: if is_active {
                            base_radius * ACTIVE_HANDLE_SCALE
                        } else {
                            base_radius
                        },
                        active: is_active,
                    }
                })
                .collect();
            OverlayScene {
                edges,
                handles,
                fill: None,
                placeholder: false,
            }
        }
        OverlayMode::Highlight => OverlayScene {
            edges: Vec::new(),
            handles: Vec::new(),
            fill: Some(QuadFill {
                polygon: ring,
                fill_alpha: HIGHLIGHT_FILL_ALPHA,
                border_width: HIGHLIGHT_BORDER_WIDTH,
            }),
            placeholder: false,
        },
    }
}
