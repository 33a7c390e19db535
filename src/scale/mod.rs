//! Pure coordinate mappings used by the force generators and the renderer.

use std::f64::consts::PI;

use crate::{
    config::MIN_POSITIVE_DOMAIN,
    types::{Category, GeoPoint, Vec2},
};

/// Linear interpolation on `sqrt(x)`.
#[derive(Clone, Copy, Debug)]
pub struct SqrtScale {
    d0: f64,
    d1: f64,
    r0: f64,
    r1: f64,
}

impl SqrtScale {
    pub fn new(domain: (f64, f64), range: (f32, f32)) -> Self {
        Self {
            d0: domain.0.max(0.0).sqrt(),
            d1: domain.1.max(0.0).sqrt(),
            r0: range.0 as f64,
            r1: range.1 as f64,
        }
    }

    pub fn apply(&self, value: f64) -> f32 {
        let span = self.d1 - self.d0;
        if span <= 0.0 {
            return ((self.r0 + self.r1) / 2.0) as f32;
        }
        let t = (value.max(0.0).sqrt() - self.d0) / span;
        (self.r0 + t * (self.r1 - self.r0)) as f32
    }
}

/// Linear interpolation on `ln(x)`. The domain minimum is clamped to
/// `MIN_POSITIVE_DOMAIN` so zero never reaches the logarithm.
#[derive(Clone, Copy, Debug)]
pub struct LogScale {
    d0: f64,
    d1: f64,
    r0: f64,
    r1: f64,
}

impl LogScale {
    pub fn new(domain: (f64, f64), range: (f32, f32)) -> Self {
        let lo = domain.0.max(MIN_POSITIVE_DOMAIN);
        let hi = domain.1.max(lo);
        Self {
            d0: lo.ln(),
            d1: hi.ln(),
            r0: range.0 as f64,
            r1: range.1 as f64,
        }
    }

    pub fn apply(&self, value: f64) -> f32 {
        let span = self.d1 - self.d0;
        if span <= 0.0 {
            return ((self.r0 + self.r1) / 2.0) as f32;
        }
        let t = (value.max(MIN_POSITIVE_DOMAIN).ln() - self.d0) / span;
        (self.r0 + t * (self.r1 - self.r0)) as f32
    }

    /// Powers of ten inside the domain, for axis labels.
    pub fn decades(&self) -> Vec<f64> {
        let lo = (self.d0 / 10f64.ln()).ceil() as i32;
        let hi = (self.d1 / 10f64.ln()).floor() as i32;
        (lo..=hi).map(|exp| 10f64.powi(exp)).collect()
    }
}

/// Evenly partitions a range across an ordered set of categories.
#[derive(Clone, Debug)]
pub struct BandScale {
    domain: Vec<Category>,
    start: f32,
    step: f32,
}

impl BandScale {
    pub fn new(domain: Vec<Category>, range: (f32, f32)) -> Self {
        let step = if domain.is_empty() {
            0.0
        } else {
            (range.1 - range.0) / domain.len() as f32
        };
        Self {
            domain,
            start: range.0,
            step,
        }
    }

    /// Start of the category's band, or `None` when it is not in the domain.
    pub fn position(&self, category: &Category) -> Option<f32> {
        self.domain
            .iter()
            .position(|c| c == category)
            .map(|idx| self.start + idx as f32 * self.step)
    }

    pub fn center(&self, category: &Category) -> Option<f32> {
        self.position(category).map(|x| x + self.step / 2.0)
    }

    pub fn bandwidth(&self) -> f32 {
        self.step
    }

    pub fn domain(&self) -> &[Category] {
        &self.domain
    }
}

/// Plate carrée projection with a d3-style scale and translate.
#[derive(Clone, Copy, Debug)]
pub struct Equirectangular {
    scale: f64,
    translate: (f64, f64),
}

impl Equirectangular {
    pub fn new(scale: f64, translate: (f32, f32)) -> Self {
        Self {
            scale,
            translate: (translate.0 as f64, translate.1 as f64),
        }
    }

    pub fn project(&self, point: GeoPoint) -> Vec2 {
        let lambda = point.longitude.to_radians();
        let phi = point.latitude.to_radians();
        Vec2::new(
            (self.translate.0 + self.scale * lambda) as f32,
            (self.translate.1 - self.scale * phi) as f32,
        )
    }

    /// Scale that fits the full longitude range into `width - 2 * margin`.
    pub fn fit_width(width: f32, margin: f32) -> f64 {
        (width as f64 / 2.0 - margin as f64) / PI
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1.0e-3
    }

    mod sqrt_scale {
        use super::*;

        #[test]
        fn maps_extent_to_range() {
            let scale = SqrtScale::new((100.0, 1_000_000.0), (10.0, 80.0));
            assert!(approx(scale.apply(100.0), 10.0));
            assert!(approx(scale.apply(1_000_000.0), 80.0));
        }

        #[test]
        fn is_strictly_increasing() {
            let scale = SqrtScale::new((1.0, 1.0e9), (10.0, 80.0));
            let values = [1.0, 10.0, 1.0e3, 1.0e5, 1.0e7, 1.0e9];
            for pair in values.windows(2) {
                assert!(scale.apply(pair[0]) < scale.apply(pair[1]));
            }
        }

        #[test]
        fn degenerate_domain_uses_midpoint() {
            let scale = SqrtScale::new((5.0, 5.0), (10.0, 80.0));
            assert_eq!(scale.apply(5.0), 45.0);
        }
    }

    mod log_scale {
        use super::*;

        #[test]
        fn larger_values_map_toward_range_end() {
            let scale = LogScale::new((100.0, 1_000_000.0), (720.0, 160.0));
            assert!(approx(scale.apply(100.0), 720.0));
            assert!(approx(scale.apply(10_000.0), 440.0));
            assert!(approx(scale.apply(1_000_000.0), 160.0));
        }

        #[test]
        fn zero_is_clamped_not_infinite() {
            let scale = LogScale::new((0.0, 1000.0), (0.0, 100.0));
            assert!(scale.apply(0.0).is_finite());
        }

        #[test]
        fn decades_inside_domain() {
            let scale = LogScale::new((50.0, 20_000.0), (0.0, 1.0));
            assert_eq!(scale.decades(), vec![100.0, 1000.0, 10_000.0]);
        }
    }

    mod band_scale {
        use super::*;

        fn continents() -> Vec<Category> {
            ["EU", "AS", "AF", "NA"].into_iter().map(Category::new).collect()
        }

        #[test]
        fn splits_range_evenly() {
            let scale = BandScale::new(continents(), (0.0, 400.0));
            assert_eq!(scale.bandwidth(), 100.0);
            assert_eq!(scale.position(&Category::new("EU")), Some(0.0));
            assert_eq!(scale.position(&Category::new("NA")), Some(300.0));
            assert_eq!(scale.center(&Category::new("AS")), Some(150.0));
        }

        #[test]
        fn unknown_category_is_none() {
            let scale = BandScale::new(continents(), (0.0, 400.0));
            assert_eq!(scale.position(&Category::new("AN")), None);
        }

        #[test]
        fn empty_domain_has_zero_bandwidth() {
            let scale = BandScale::new(Vec::new(), (0.0, 400.0));
            assert_eq!(scale.bandwidth(), 0.0);
        }
    }

    mod equirectangular {
        use super::*;

        #[test]
        fn origin_maps_to_translate() {
            let projection = Equirectangular::new(100.0, (600.0, 300.0));
            let p = projection.project(GeoPoint {
                longitude: 0.0,
                latitude: 0.0,
            });
            assert_eq!(p, Vec2::new(600.0, 300.0));
        }

        #[test]
        fn east_is_right_and_north_is_up() {
            let projection = Equirectangular::new(100.0, (600.0, 300.0));
            let p = projection.project(GeoPoint {
                longitude: 90.0,
                latitude: 45.0,
            });
            assert!(p.x > 600.0);
            assert!(p.y < 300.0);
        }

        #[test]
        fn fit_width_spans_longitudes() {
            let scale = Equirectangular::fit_width(1200.0, 80.0);
            let projection = Equirectangular::new(scale, (600.0, 0.0));
            let east = projection.project(GeoPoint {
                longitude: 180.0,
                latitude: 0.0,
            });
            assert!(approx(east.x, 1120.0));
        }
    }
}
