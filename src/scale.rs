//! Mapping from scale values to angles and pixels, and "nice" tick selection.
//!
//! Everything here is a pure function of its arguments; the gauges and the
//! plot share these so a given configuration always lands on the same pixels.

/// Upper bound on ticks produced by one iterator, guarding against tiny spacings.
pub const MAX_TICKS: usize = 10_000;

/// Spacings below this are replaced by 0.1 when building a tick range.
const MIN_SPACING: f64 = 0.000_001;

/// Linear map from `[scale_start, scale_start + total_range]` onto
/// `[low_angle, high_angle]` in degrees. The value is not clamped.
pub fn value_to_angle(
    value: f64,
    scale_start: f64,
    total_range: f64,
    low_angle: f64,
    high_angle: f64,
) -> f64 {
    if total_range <= 0.0 {
        return low_angle;
    }
    low_angle + (value - scale_start) / total_range * (high_angle - low_angle)
}

/// Clamp `value` to the scale and map it onto `[0, pixel_extent]`.
///
/// Vertical scales are inverted so that larger values sit higher on screen.
pub fn value_to_pixel(
    value: f64,
    scale_start: f64,
    total_range: f64,
    pixel_extent: f64,
    vertical: bool,
) -> f64 {
    let pixel = if total_range > 0.0 {
        let clamped = value.clamp(scale_start, scale_start + total_range);
        (clamped - scale_start) / total_range * pixel_extent
    } else {
        0.0
    };
    if vertical {
        pixel_extent - pixel
    } else {
        pixel
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickSpacing {
    pub spacing: f64,
    /// Decimal digits needed to print a multiple of `spacing` exactly.
    pub digits: usize,
}

/// Round spacing so that `num_ticks` ticks cover `max_value`.
///
/// The spacing is `{1, 2, 4, 5, 10} x 10^k`. Degenerate input yields a unit spacing.
pub fn nice_tick_spacing(num_ticks: u32, max_value: f64) -> TickSpacing {
    if num_ticks == 0 || max_value <= 0.0 || !max_value.is_finite() {
        return TickSpacing {
            spacing: 1.0,
            digits: 0,
        };
    }

    let mut per_tick = max_value / f64::from(num_ticks);
    let mut place: i32 = 0;
    while per_tick > 10.0 {
        per_tick /= 10.0;
        place += 1;
    }
    while per_tick < 1.0 {
        per_tick *= 10.0;
        place -= 1;
    }

    let multiplier = if per_tick > 5.001 {
        10.0
    } else if per_tick > 4.001 {
        5.0
    } else if per_tick > 2.001 {
        4.0
    } else if per_tick > 1.001 {
        2.0
    } else {
        1.0
    };
    let spacing = multiplier * 10f64.powi(place);
    if multiplier == 10.0 {
        place += 1;
    }

    TickSpacing {
        spacing,
        digits: (-place).max(0) as usize,
    }
}

/// Tick layout for one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickRange {
    pub start: f64,
    pub end: f64,
    pub num_ticks: u32,
    pub digits: usize,
    pub spacing: f64,
}

impl TickRange {
    /// The unit range used when there is nothing to measure.
    pub const UNIT: TickRange = TickRange {
        start: 0.0,
        end: 1.0,
        num_ticks: 0,
        digits: 0,
        spacing: 1.0,
    };

    pub fn span(&self) -> f64 {
        self.end - self.start
    }

    /// Value of tick `index`; index `num_ticks` is the end.
    pub fn value_at(&self, index: u32) -> f64 {
        self.start + f64::from(index) * self.spacing
    }
}

/// Exactly `num_ticks` ticks of nice spacing starting at or below `min_value`.
pub fn tick_range(min_value: f64, max_value: f64, num_ticks: u32) -> TickRange {
    let TickSpacing {
        mut spacing,
        mut digits,
    } = nice_tick_spacing(num_ticks, max_value - min_value);
    if spacing < MIN_SPACING {
        spacing = 0.1;
        digits = 1;
    }

    let start = min_value - min_value.rem_euclid(spacing);
    TickRange {
        start,
        end: start + f64::from(num_ticks) * spacing,
        num_ticks,
        digits,
        spacing,
    }
}

/// Like [`tick_range`] with `num_ticks` as a suggestion: the spacing is kept
/// and the count becomes the smallest that reaches `max_value`.
pub fn tick_range_fitted(min_value: f64, max_value: f64, num_ticks: u32) -> TickRange {
    let base = tick_range(min_value, max_value, num_ticks);
    let reaches = |i: u32| {
        let v = base.value_at(i);
        if min_value < max_value {
            v >= max_value
        } else {
            v <= max_value
        }
    };
    let count = (0..MAX_TICKS as u32).find(|&i| reaches(i)).unwrap_or(MAX_TICKS as u32);
    TickRange {
        end: base.value_at(count),
        num_ticks: count,
        ..base
    }
}

/// Multiples of `spacing` in `[from, to]`, starting from the first one at or
/// above `from`. Yields nothing when `spacing` is not positive.
pub fn ticks_between(from: f64, to: f64, spacing: f64) -> impl Iterator<Item = f64> {
    let valid = spacing > 0.0 && from.is_finite() && to.is_finite();
    let first = if valid {
        (from / spacing).ceil() * spacing
    } else {
        0.0
    };
    (0..MAX_TICKS)
        .take_while(move |_| valid)
        .map(move |i| first + i as f64 * spacing)
        .take_while(move |v| *v <= to + spacing * 1e-9)
}

/// `start`, `start + spacing`, ... up to and including `end`. Yields nothing
/// when `spacing` is not positive.
pub fn ticks_from(start: f64, end: f64, spacing: f64) -> impl Iterator<Item = f64> {
    let valid = spacing > 0.0 && start.is_finite() && end.is_finite();
    (0..MAX_TICKS)
        .take_while(move |_| valid)
        .map(move |i| start + i as f64 * spacing)
        .take_while(move |v| *v <= end + spacing * 1e-9)
}

/// True when `value` is within rounding error of a multiple of `spacing`.
pub fn is_multiple_of(value: f64, spacing: f64) -> bool {
    if spacing <= 0.0 {
        return false;
    }
    let ratio = value / spacing;
    (ratio - ratio.round()).abs() < 1e-6
}
