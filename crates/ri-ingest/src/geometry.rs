//! # Geometry Planner
//!
//! Computes the centered square crop and the set of thumbnail targets for a
//! raster. Pure arithmetic, no error path: any dimensions yield a valid
//! `CropPlan` and a (possibly empty) scale set.

use ri_core::models::Extent;
use std::collections::BTreeSet;

/// Fixed thumbnail targets the scaling worker knows how to produce.
pub const SCALE_CANDIDATES: [Extent; 3] = [
    Extent { x: 512, y: 512 },
    Extent { x: 256, y: 256 },
    Extent { x: 128, y: 128 },
];

/// The largest centered square that fits the source raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropPlan {
    pub origin: Extent,
    pub size: u32,
}

/// Plans the crop: `size = min(w, h)`, origin centered with integer
/// truncation toward the lower coordinate on odd remainders.
pub fn plan_crop(width: u32, height: u32) -> CropPlan {
    let size = width.min(height);
    CropPlan {
        origin: Extent::new((width - size) / 2, (height - size) / 2),
        size,
    }
}

/// Retains only candidates strictly smaller than the crop in both
/// dimensions. An image at or below the smallest candidate yields an empty
/// set — nothing to downscale, which is a valid outcome.
pub fn plan_scales(crop_size: u32) -> BTreeSet<Extent> {
    SCALE_CANDIDATES
        .iter()
        .copied()
        .filter(|c| c.x < crop_size && c.y < crop_size)
        .collect()
}
