//! Fallback searches used when a point query comes back empty.
//!
//! - [`NearestFeatureResolver`] re-measures range-query candidates against
//!   their polygon edges and keeps the closest one.
//! - [`RingProbe`] samples a raster on concentric rings around the point.

mod nearest;
mod ring;

pub use nearest::{
    NearestFeature, NearestFeatureResolver, NearestResolution, DEFAULT_NEARBY_RADIUS_M,
};
pub use ring::{RingHit, RingProbe};
