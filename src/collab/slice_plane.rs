/// Slice plane selected by a gradient direction and frequency offset
///
/// The plane is normal to the gradient and sits `deltaf / (gamma * |G|)`
/// away from the phantom centre along that normal.

use super::{PlaneRequest, SlicePlane, SlicePlotter};

#[derive(Debug, Clone, Copy, Default)]
pub struct SlicePlaneCalculator;

impl SlicePlotter for SlicePlaneCalculator {
    fn plot_plane(&self, request: PlaneRequest) -> Result<SlicePlane, String> {
        let g = [request.gx as f64, request.gy as f64, request.gz as f64];
        let deltaf = request.deltaf as f64;
        let gamma = request.gamma as f64;
        if g.iter().chain([deltaf, gamma].iter()).any(|v| !v.is_finite()) {
            return Err("Plane parameters must be finite".to_string());
        }

        let norm = (g[0] * g[0] + g[1] * g[1] + g[2] * g[2]).sqrt();
        if norm == 0.0 {
            return Err("Gradient vector is zero".to_string());
        }
        if gamma == 0.0 {
            return Err("Gyromagnetic ratio is zero".to_string());
        }

        let normal = [g[0] / norm, g[1] / norm, g[2] / norm];
        // metres to mm
        let r = deltaf / (gamma * norm) * 1000.0;

        Ok(SlicePlane {
            normal,
            offset_mm: [r * normal[0], r * normal[1], r * normal[2]],
            distance_mm: r,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(gx: f32, gy: f32, gz: f32, deltaf: f32, gamma: f32) -> PlaneRequest {
        PlaneRequest { gx, gy, gz, deltaf, gamma }
    }

    #[test]
    fn test_centered_plane_along_x() {
        let plane = SlicePlaneCalculator.plot_plane(req(1.0, 0.0, 0.0, 0.0, 42.58)).unwrap();
        assert_eq!(plane.normal, [1.0, 0.0, 0.0]);
        assert_eq!(plane.offset_mm, [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_offset_distance() {
        let plane = SlicePlaneCalculator.plot_plane(req(0.0, 3.0, 4.0, 100.0, 50.0)).unwrap();
        // 100 / (50 * 5) m = 0.4 m
        assert!((plane.distance_mm - 400.0).abs() < 1e-9);
        assert!((plane.normal[1] - 0.6).abs() < 1e-9);
        assert!((plane.offset_mm[2] - 320.0).abs() < 1e-6);
    }

    #[test]
    fn test_proton_slice_offset_in_mm() {
        // 1 kHz off resonance under 10 mT/m for 1H
        let plane = SlicePlaneCalculator.plot_plane(req(0.01, 0.0, 0.0, 1000.0, 42.577e6)).unwrap();
        assert!((plane.distance_mm - 2.3487).abs() < 1e-3, "{}", plane.distance_mm);
    }

    #[test]
    fn test_degenerate_inputs() {
        assert!(SlicePlaneCalculator.plot_plane(req(0.0, 0.0, 0.0, 1.0, 42.58)).is_err());
        assert!(SlicePlaneCalculator.plot_plane(req(1.0, 0.0, 0.0, 1.0, 0.0)).is_err());
        assert!(SlicePlaneCalculator.plot_plane(req(f32::NAN, 0.0, 0.0, 1.0, 1.0)).is_err());
    }
}
