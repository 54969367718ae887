pub const DEFAULT_CDCR_TOLERANCE: f64 = 0.05;
pub const DEFAULT_WINDOW_SIZES: [usize; 8] = [7, 14, 21, 30, 60, 90, 180, 270];
