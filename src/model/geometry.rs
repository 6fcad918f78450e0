//! Length units used by DrawingML.

/// English Metric Units per inch.
pub const EMU_PER_INCH: i64 = 914_400;

/// English Metric Units per typographic point.
pub const EMU_PER_POINT: i64 = 12_700;

/// Convert EMUs to inches.
pub fn emu_to_inches(emu: i64) -> f64 {
    emu as f64 / EMU_PER_INCH as f64
}

/// Convert EMUs to points.
pub fn emu_to_points(emu: i64) -> f64 {
    emu as f64 / EMU_PER_POINT as f64
}

/// Convert inches to EMUs, rounding to the nearest unit.
pub fn inches_to_emu(inches: f64) -> i64 {
    (inches * EMU_PER_INCH as f64).round() as i64
}

/// Convert points to EMUs, rounding to the nearest unit.
pub fn points_to_emu(points: f64) -> i64 {
    (points * EMU_PER_POINT as f64).round() as i64
}

/// Round to four decimal places, the precision definitions are stored with.
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// A rectangle in EMUs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmuRect {
    pub x: i64,
    pub y: i64,
    pub cx: i64,
    pub cy: i64,
}

impl EmuRect {
    /// Create a rectangle from EMU offsets and extents.
    pub fn new(x: i64, y: i64, cx: i64, cy: i64) -> Self {
        Self { x, y, cx, cy }
    }

    /// Create a rectangle from inch measurements.
    pub fn from_inches(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            x: inches_to_emu(left),
            y: inches_to_emu(top),
            cx: inches_to_emu(width),
            cy: inches_to_emu(height),
        }
    }
}
