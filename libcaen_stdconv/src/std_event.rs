//! The standardized event representation consumed by downstream analysis.

use ndarray::Array2;

/// A single zero-suppressed pixel hit on a plane.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelHit {
    pub x: usize,
    pub y: usize,
    /// Collected charge in ADC units (baseline subtracted, summed over the pulse)
    pub charge: f64,
    /// Constant-fraction hit time in nanoseconds from the start of the record
    pub time_ns: f64,
}

/// One sensor plane of the standard event. For the CAEN converter there is
/// one plane per DUT, with the plane geometry taken from the channel matrix.
#[derive(Debug, Clone)]
pub struct StandardPlane {
    id: u32,
    sensor: String,
    size_x: usize,
    size_y: usize,
    hits: Vec<PixelHit>,
}

impl StandardPlane {
    pub fn new(id: u32, sensor: impl Into<String>, size_x: usize, size_y: usize) -> Self {
        Self {
            id,
            sensor: sensor.into(),
            size_x,
            size_y,
            hits: Vec::new(),
        }
    }

    /// Record a hit pixel. Coordinates outside the plane are a logic error
    /// upstream, so they panic in debug builds only.
    pub fn push_pixel(&mut self, x: usize, y: usize, charge: f64, time_ns: f64) {
        debug_assert!(x < self.size_x && y < self.size_y);
        self.hits.push(PixelHit {
            x,
            y,
            charge,
            time_ns,
        });
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn sensor(&self) -> &str {
        &self.sensor
    }

    /// Plane dimensions as (x, y)
    pub fn size(&self) -> (usize, usize) {
        (self.size_x, self.size_y)
    }

    pub fn hits(&self) -> &[PixelHit] {
        &self.hits
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// The plane's charge as a dense matrix; pixels without a hit are zero.
    /// Convenient for downstream code that wants array data rather than the
    /// zero-suppressed hit list.
    pub fn charge_matrix(&self) -> Array2<f64> {
        let mut matrix = Array2::<f64>::zeros([self.size_x, self.size_y]);
        for hit in self.hits.iter() {
            matrix[[hit.x, hit.y]] += hit.charge;
        }
        matrix
    }
}

/// The standardized event: one plane per DUT connected to the digitizer.
#[derive(Debug, Clone, Default)]
pub struct StandardEvent {
    trigger_number: u32,
    planes: Vec<StandardPlane>,
}

impl StandardEvent {
    pub fn new(trigger_number: u32) -> Self {
        Self {
            trigger_number,
            planes: Vec::new(),
        }
    }

    pub fn trigger_number(&self) -> u32 {
        self.trigger_number
    }

    pub fn set_trigger_number(&mut self, trigger_number: u32) {
        self.trigger_number = trigger_number;
    }

    pub fn add_plane(&mut self, plane: StandardPlane) {
        self.planes.push(plane);
    }

    pub fn planes(&self) -> &[StandardPlane] {
        &self.planes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_charge_matrix() {
        let mut plane = StandardPlane::new(0, "LGAD_CAEN", 2, 2);
        plane.push_pixel(0, 1, 12.5, 33.0);
        plane.push_pixel(1, 0, 4.0, 35.5);
        let matrix = plane.charge_matrix();
        assert_eq!(matrix[[0, 1]], 12.5);
        assert_eq!(matrix[[1, 0]], 4.0);
        assert_eq!(matrix[[0, 0]], 0.0);
        assert_eq!(matrix[[1, 1]], 0.0);
        assert_eq!(plane.hits().len(), 2);
        assert!(!plane.is_empty());
    }
}
