//! Floor plan annotation.

pub mod catalog;
pub mod icons;

use std::fs;
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::config::MapsConfig;
use crate::error::RenderError;

/// Where to mark a client.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement<'a> {
    pub device_id: &'a str,
    pub floor_image_ref: &'a str,
    pub x: f64,
    pub y: f64,
}

/// A written client map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub path: PathBuf,
    /// The client's own floor plan was missing and the default map was used.
    pub used_default_map: bool,
}

pub trait MapRenderer {
    fn place(&self, placement: &Placement<'_>) -> Result<Rendered, RenderError>;
}

/// Pastes the configured threat icon onto floor plan images with the `image` crate.
pub struct FloorPlanRenderer {
    floorplan_dir: PathBuf,
    default_map: PathBuf,
    icon_path: PathBuf,
    output_dir: PathBuf,
    extensions: Vec<String>,
}

impl FloorPlanRenderer {
    pub fn new(config: &MapsConfig) -> Self {
        Self {
            floorplan_dir: config.floorplan_dir.clone(),
            default_map: config.default_map_path(),
            icon_path: config.icon_path(),
            output_dir: config.output_dir.clone(),
            extensions: config.extensions.clone(),
        }
    }

    /// Output file for a device; `00:11:22` becomes `00_11_22.png`.
    pub fn output_path(&self, device_id: &str) -> PathBuf {
        self.output_dir.join(format!("{}.png", file_stem_for(device_id)))
    }

    fn resolve_floor(&self, floor_image_ref: &str) -> Result<(PathBuf, bool), RenderError> {
        if let Some(path) = catalog::find_floor_plan(&self.floorplan_dir, floor_image_ref, &self.extensions) {
            return Ok((path, false));
        }

        if self.default_map.is_file() {
            warn!(
                "Floor plan {:?} not found in {}, using default map",
                floor_image_ref,
                self.floorplan_dir.display()
            );
            Ok((self.default_map.clone(), true))
        } else {
            Err(RenderError::NoFloorPlan(floor_image_ref.to_string()))
        }
    }
}

impl MapRenderer for FloorPlanRenderer {
    fn place(&self, placement: &Placement<'_>) -> Result<Rendered, RenderError> {
        let (floor_path, used_default_map) = self.resolve_floor(placement.floor_image_ref)?;

        let mut floor = image::open(&floor_path)?.to_rgba8();
        let icon = image::open(&self.icon_path)?.to_rgba8();

        let x = placement.x.round() as i64;
        let y = placement.y.round() as i64;
        image::imageops::overlay(&mut floor, &icon, x, y);

        if !self.output_dir.exists() {
            fs::create_dir_all(&self.output_dir)?;
        }
        let path = self.output_path(placement.device_id);
        floor.save(&path)?;

        debug!(
            "Placed {} at ({}, {}) on {} -> {}",
            placement.device_id,
            x,
            y,
            floor_path.display(),
            path.display()
        );

        Ok(Rendered {
            path,
            used_default_map,
        })
    }
}

fn file_stem_for(device_id: &str) -> String {
    device_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}
