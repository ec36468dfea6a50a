/// Map projections available to the renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    Equirectangular,
    /// The Natural Earth projection (Šavrič et al.), polynomial form.
    NaturalEarth,
}

impl Projection {
    /// Project longitude/latitude in degrees to unitless plane coordinates,
    /// y pointing north.
    pub fn project(&self, lon: f64, lat: f64) -> (f64, f64) {
        let lambda = lon.clamp(-180.0, 180.0).to_radians();
        let phi = lat.clamp(-90.0, 90.0).to_radians();
        match self {
            Projection::Equirectangular => (lambda, phi),
            Projection::NaturalEarth => {
                let phi2 = phi * phi;
                let phi4 = phi2 * phi2;
                let x = lambda
                    * (0.8707 - 0.131979 * phi2
                        + phi4 * (-0.013791 + phi4 * (0.003971 * phi2 - 0.001529 * phi4)));
                let y = phi
                    * (1.007226
                        + phi2 * (0.015085 + phi4 * (-0.044475 + 0.028874 * phi2 - 0.005916 * phi4)));
                (x, y)
            }
        }
    }

    /// Half-width and half-height of the projected globe.
    fn half_extent(&self) -> (f64, f64) {
        let (x, _) = self.project(180.0, 0.0);
        let (_, y) = self.project(0.0, 90.0);
        (x, y)
    }
}

/// A projection fitted into a pixel rectangle, aspect preserved and centered.
#[derive(Debug, Clone, Copy)]
pub struct PixelFrame {
    projection: Projection,
    center: (f64, f64),
    scale: f64,
}

impl PixelFrame {
    pub fn fit(projection: Projection, top_left: (i32, i32), size: (u32, u32)) -> Self {
        let (half_w, half_h) = projection.half_extent();
        let scale = (size.0 as f64 / (2.0 * half_w)).min(size.1 as f64 / (2.0 * half_h));
        let center = (
            top_left.0 as f64 + size.0 as f64 / 2.0,
            top_left.1 as f64 + size.1 as f64 / 2.0,
        );
        PixelFrame {
            projection,
            center,
            scale,
        }
    }

    pub fn to_pixel(&self, lon: f64, lat: f64) -> (i32, i32) {
        let (x, y) = self.projection.project(lon, lat);
        (
            (self.center.0 + x * self.scale).round() as i32,
            (self.center.1 - y * self.scale).round() as i32,
        )
    }

    /// Project a ring, collapsing runs that land on the same pixel. Returns
    /// `None` when fewer than three distinct pixels remain.
    pub fn ring_to_pixels(&self, ring: &[[f64; 2]]) -> Option<Vec<(i32, i32)>> {
        let mut pixels: Vec<(i32, i32)> = ring.iter().map(|p| self.to_pixel(p[0], p[1])).collect();
        pixels.dedup();
        (pixels.len() >= 3).then_some(pixels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn origin_lands_in_the_middle() {
        for projection in [Projection::Equirectangular, Projection::NaturalEarth] {
            let frame = PixelFrame::fit(projection, (10, 20), (400, 200));
            assert_eq!(frame.to_pixel(0.0, 0.0), (210, 120));
        }
    }

    #[test]
    fn natural_earth_is_symmetric_and_narrows_at_poles() {
        let p = Projection::NaturalEarth;
        let (x, y) = p.project(120.0, 45.0);
        let (mx, my) = p.project(-120.0, -45.0);
        assert!((x + mx).abs() < 1e-12 && (y + my).abs() < 1e-12);

        let (equator, _) = p.project(180.0, 0.0);
        let (pole, _) = p.project(180.0, 90.0);
        assert!(pole < equator);
        assert!((equator - 0.8707 * PI).abs() < 1e-9);
    }

    #[test]
    fn equirectangular_fills_a_two_to_one_box() {
        let frame = PixelFrame::fit(Projection::Equirectangular, (0, 0), (360, 180));
        assert_eq!(frame.to_pixel(-180.0, 90.0), (0, 0));
        assert_eq!(frame.to_pixel(180.0, -90.0), (360, 180));
    }

    #[test]
    fn tiny_rings_collapse() {
        let frame = PixelFrame::fit(Projection::Equirectangular, (0, 0), (360, 180));
        let speck = [[10.0, 10.0], [10.001, 10.0], [10.0, 10.001], [10.0, 10.0]];
        assert!(frame.ring_to_pixels(&speck).is_none());

        let square = [[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0], [0.0, 0.0]];
        assert_eq!(frame.ring_to_pixels(&square).map(|r| r.len()), Some(5));
    }
}
