//! In-memory services backed by fixture data.
//!
//! These implement the service traits without any network I/O and are used
//! by the test suites and for offline runs. Latency and failures can be
//! injected to exercise the aggregator's barrier and supersession paths,
//! and [`PanickingService`] stands in for a broken implementation.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use futures::future::BoxFuture;

use super::types::{FeatureService, RasterService, RasterValue, ServiceError};
use crate::coord::{haversine_km, GeoPoint};
use crate::geometry::{edge_distance_km, Feature, Geometry};

/// Polygon service over a fixed feature list.
pub struct MemoryFeatureService {
    name: String,
    features: Vec<Feature>,
    latency: Option<Duration>,
    failure: Option<ServiceError>,
    calls: AtomicUsize,
}

impl MemoryFeatureService {
    pub fn new(name: impl Into<String>, features: Vec<Feature>) -> Self {
        Self {
            name: name.into(),
            features,
            latency: None,
            failure: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Service whose every call fails with `error`.
    pub fn failing(name: impl Into<String>, error: ServiceError) -> Self {
        Self {
            failure: Some(error),
            ..Self::new(name, Vec::new())
        }
    }

    /// Delays every response by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Number of queries received so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn begin(&self) -> Result<(), ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        match &self.failure {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }
}

impl FeatureService for MemoryFeatureService {
    fn name(&self) -> &str {
        &self.name
    }

    fn query_contains(
        &self,
        point: GeoPoint,
    ) -> BoxFuture<'_, Result<Option<Feature>, ServiceError>> {
        Box::pin(async move {
            self.begin().await?;
            Ok(self
                .features
                .iter()
                .find(|f| f.geometry.contains(point))
                .cloned())
        })
    }

    fn query_nearby(
        &self,
        point: GeoPoint,
        radius_m: f64,
    ) -> BoxFuture<'_, Result<Vec<Feature>, ServiceError>> {
        Box::pin(async move {
            self.begin().await?;
            let radius_km = radius_m / 1000.0;
            // Like a service-side range search, geometries that cannot be
            // measured here are still returned as candidates.
            Ok(self
                .features
                .iter()
                .filter(|f| match &f.geometry {
                    Geometry::Unsupported(_) => true,
                    geometry => {
                        geometry.contains(point)
                            || edge_distance_km(point, geometry).is_some_and(|d| d <= radius_km)
                    }
                })
                .cloned()
                .collect())
        })
    }
}

type Sampler = Box<dyn Fn(GeoPoint) -> Option<RasterValue> + Send + Sync>;

/// Raster service backed by a sampling function.
pub struct MemoryRasterService {
    name: String,
    sampler: Sampler,
    latency: Option<Duration>,
    failure: Option<ServiceError>,
    calls: AtomicUsize,
}

impl MemoryRasterService {
    pub fn new(
        name: impl Into<String>,
        sampler: impl Fn(GeoPoint) -> Option<RasterValue> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            sampler: Box::new(sampler),
            latency: None,
            failure: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Raster holding values only at the given locations.
    ///
    /// A sample matches a location within `radius_km` of it; the first
    /// matching location wins.
    pub fn with_points(
        name: impl Into<String>,
        points: Vec<(GeoPoint, RasterValue)>,
        radius_km: f64,
    ) -> Self {
        Self::new(name, move |p| {
            points
                .iter()
                .find(|(at, _)| haversine_km(p, *at) <= radius_km)
                .map(|(_, value)| value.clone())
        })
    }

    /// Service whose every call fails with `error`.
    pub fn failing(name: impl Into<String>, error: ServiceError) -> Self {
        Self {
            failure: Some(error),
            ..Self::new(name, |_| None)
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Number of identify calls received so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl RasterService for MemoryRasterService {
    fn name(&self) -> &str {
        &self.name
    }

    fn identify_at(
        &self,
        point: GeoPoint,
        _tolerance_cells: u32,
    ) -> BoxFuture<'_, Result<Option<RasterValue>, ServiceError>> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(latency) = self.latency {
                tokio::time::sleep(latency).await;
            }
            if let Some(e) = &self.failure {
                return Err(e.clone());
            }
            Ok((self.sampler)(point))
        })
    }
}

/// A service that accepts requests and never answers.
pub struct StalledService {
    name: String,
}

impl StalledService {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl FeatureService for StalledService {
    fn name(&self) -> &str {
        &self.name
    }

    fn query_contains(
        &self,
        _point: GeoPoint,
    ) -> BoxFuture<'_, Result<Option<Feature>, ServiceError>> {
        Box::pin(futures::future::pending())
    }

    fn query_nearby(
        &self,
        _point: GeoPoint,
        _radius_m: f64,
    ) -> BoxFuture<'_, Result<Vec<Feature>, ServiceError>> {
        Box::pin(futures::future::pending())
    }
}

impl RasterService for StalledService {
    fn name(&self) -> &str {
        &self.name
    }

    fn identify_at(
        &self,
        _point: GeoPoint,
        _tolerance_cells: u32,
    ) -> BoxFuture<'_, Result<Option<RasterValue>, ServiceError>> {
        Box::pin(futures::future::pending())
    }
}

/// A service that panics on every request.
pub struct PanickingService {
    name: String,
}

impl PanickingService {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl FeatureService for PanickingService {
    fn name(&self) -> &str {
        &self.name
    }

    fn query_contains(
        &self,
        _point: GeoPoint,
    ) -> BoxFuture<'_, Result<Option<Feature>, ServiceError>> {
        panic!("{} crashed in query_contains", self.name)
    }

    fn query_nearby(
        &self,
        _point: GeoPoint,
        _radius_m: f64,
    ) -> BoxFuture<'_, Result<Vec<Feature>, ServiceError>> {
        panic!("{} crashed in query_nearby", self.name)
    }
}

impl RasterService for PanickingService {
    fn name(&self) -> &str {
        &self.name
    }

    fn identify_at(
        &self,
        _point: GeoPoint,
        _tolerance_cells: u32,
    ) -> BoxFuture<'_, Result<Option<RasterValue>, ServiceError>> {
        panic!("{} crashed in identify_at", self.name)
    }
}
