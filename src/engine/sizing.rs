//! Radius mapping for company bubbles and contact dots.

use eframe::egui::Vec2;

use super::config::SizingConfig;

/// Company sizes below this are treated as this, so log10 stays >= 1.
const SIZE_FLOOR: u32 = 10;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RadiusBounds {
    pub min: f32,
    pub max: f32,
}

impl RadiusBounds {
    pub fn for_canvas(canvas: Vec2, large_network: bool, config: &SizingConfig) -> Self {
        let short_side = canvas.x.min(canvas.y).max(1.0);
        let (min_fraction, max_fraction) = if large_network {
            (config.large_min_fraction, config.large_max_fraction)
        } else {
            (config.min_fraction, config.max_fraction)
        };

        let min = (short_side * min_fraction).max(config.min_radius_floor);
        let max = (short_side * max_fraction).max(min + 1.0);
        Self { min, max }
    }
}

/// Log10 spread of employee counts across one dataset.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CompanyScale {
    min_log: f32,
    range: f32,
}

impl CompanyScale {
    pub fn from_sizes(sizes: impl IntoIterator<Item = u32>) -> Self {
        let mut min_log = f32::INFINITY;
        let mut max_log = f32::NEG_INFINITY;
        for size in sizes {
            let log = size_log(size);
            min_log = min_log.min(log);
            max_log = max_log.max(log);
        }

        if !min_log.is_finite() || !max_log.is_finite() {
            return Self {
                min_log: 1.0,
                range: 1.0,
            };
        }

        Self {
            min_log,
            range: (max_log - min_log).max(1.0),
        }
    }

    pub fn normalized(&self, size: u32) -> f32 {
        ((size_log(size) - self.min_log) / self.range).clamp(0.0, 1.0)
    }
}

fn size_log(size: u32) -> f32 {
    (size.max(SIZE_FLOOR) as f32).log10()
}

pub fn company_radius(
    employee_count: u32,
    scale: &CompanyScale,
    bounds: RadiusBounds,
    config: &SizingConfig,
) -> f32 {
    let t = scale.normalized(employee_count).powf(config.exponent);
    bounds.min + t * (bounds.max - bounds.min)
}

pub fn home_company_radius(bounds: RadiusBounds, config: &SizingConfig) -> f32 {
    bounds.max * config.home_fraction
}

pub fn contact_radius(
    influence: f32,
    max_influence: f32,
    is_home: bool,
    large_network: bool,
    config: &SizingConfig,
) -> f32 {
    let normalized = if influence.is_finite() {
        (influence.max(0.0) / max_influence.max(1.0)).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let (base, span) = if large_network {
        (config.large_contact_base, config.large_contact_span)
    } else {
        (config.contact_base, config.contact_span)
    };

    let bonus = if is_home {
        config.home_contact_bonus
    } else {
        0.0
    };
    base + normalized * span + bonus
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;
    use proptest::prelude::*;

    use super::*;

    fn bounds() -> RadiusBounds {
        RadiusBounds::for_canvas(vec2(1200.0, 800.0), false, &SizingConfig::default())
    }

    #[test]
    fn large_networks_use_tighter_bounds() {
        let config = SizingConfig::default();
        let small = RadiusBounds::for_canvas(vec2(1200.0, 800.0), false, &config);
        let large = RadiusBounds::for_canvas(vec2(1200.0, 800.0), true, &config);
        assert!(large.max < small.max);
        assert!(large.min <= small.min);
        assert!(small.max > small.min);
    }

    #[test]
    fn single_company_dataset_does_not_divide_by_zero() {
        let config = SizingConfig::default();
        let scale = CompanyScale::from_sizes([250]);
        let radius = company_radius(250, &scale, bounds(), &config);
        assert!(radius.is_finite());
        assert_eq!(radius, bounds().min);
    }

    #[test]
    fn empty_dataset_scale_is_finite() {
        let scale = CompanyScale::from_sizes(std::iter::empty());
        assert!(scale.normalized(1000).is_finite());
    }

    #[test]
    fn tiny_companies_share_the_floor() {
        let config = SizingConfig::default();
        let scale = CompanyScale::from_sizes([1, 5, 10, 5000]);
        let one = company_radius(1, &scale, bounds(), &config);
        let ten = company_radius(10, &scale, bounds(), &config);
        assert_eq!(one, ten);
    }

    #[test]
    fn home_company_uses_fixed_fraction() {
        let config = SizingConfig::default();
        assert_eq!(home_company_radius(bounds(), &config), bounds().max * config.home_fraction);
    }

    #[test]
    fn contact_radius_grows_with_influence() {
        let config = SizingConfig::default();
        let low = contact_radius(1.0, 10.0, false, false, &config);
        let high = contact_radius(9.0, 10.0, false, false, &config);
        let home = contact_radius(1.0, 10.0, true, false, &config);
        assert!(high > low);
        assert!(home > low);
        assert!(contact_radius(f32::NAN, 0.0, false, true, &config).is_finite());
    }

    proptest! {
        #[test]
        fn company_radius_is_monotone(
            sizes in prop::collection::vec(1u32..200_000, 1..40),
            a in 1u32..500_000,
            b in 1u32..500_000,
        ) {
            let config = SizingConfig::default();
            let scale = CompanyScale::from_sizes(sizes);
            let (small, large) = if a <= b { (a, b) } else { (b, a) };
            let small_radius = company_radius(small, &scale, bounds(), &config);
            let large_radius = company_radius(large, &scale, bounds(), &config);
            prop_assert!(small_radius <= large_radius);
            prop_assert!(large_radius <= bounds().max + 1e-3);
        }
    }
}
