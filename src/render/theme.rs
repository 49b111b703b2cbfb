// Color palettes and state thresholds

use super::color::{Color, rgb};

/// Named palette, selected once at startup.
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub bg_top_active: Color,
    pub bg_bottom_active: Color,
    pub bg_top_idle: Color,
    pub bg_bottom_idle: Color,
    pub icon_normal: Color,
    pub icon_dim: Color,
    pub text_value: Color,
    pub text_status: Color,
    pub state_low: Color,
    pub state_medium: Color,
    pub state_high: Color,
    pub accent_info: Color,
    pub accent_time: Color,
    pub bar_bg: Color,
    pub bar_border: Color,
    pub spark_bg: Color,
    pub grid_color: Color,
    pub band_color: Color,
}

pub const NEUTRAL: Theme = Theme {
    bg_top_active: rgb(8, 8, 16),
    bg_bottom_active: rgb(2, 2, 6),
    bg_top_idle: rgb(4, 4, 8),
    bg_bottom_idle: rgb(1, 1, 4),
    icon_normal: rgb(200, 200, 200),
    icon_dim: rgb(80, 80, 80),
    text_value: rgb(220, 220, 220),
    text_status: rgb(140, 140, 140),
    state_low: rgb(60, 180, 120),
    state_medium: rgb(220, 180, 60),
    state_high: rgb(220, 80, 60),
    accent_info: rgb(80, 160, 200),
    accent_time: rgb(180, 140, 100),
    bar_bg: rgb(10, 10, 18),
    bar_border: rgb(30, 30, 40),
    spark_bg: rgb(10, 10, 15),
    grid_color: rgb(30, 30, 40),
    band_color: rgb(0, 0, 0),
};

pub const NEON: Theme = Theme {
    bg_top_active: rgb(10, 6, 20),
    bg_bottom_active: rgb(3, 2, 8),
    bg_top_idle: rgb(6, 4, 12),
    bg_bottom_idle: rgb(2, 1, 5),
    icon_normal: rgb(210, 240, 255),
    icon_dim: rgb(70, 90, 110),
    text_value: rgb(220, 240, 255),
    text_status: rgb(150, 170, 200),
    state_low: rgb(0, 220, 200),
    state_medium: rgb(255, 120, 180),
    state_high: rgb(255, 110, 60),
    accent_info: rgb(120, 190, 255),
    accent_time: rgb(255, 160, 90),
    bar_bg: rgb(14, 10, 24),
    bar_border: rgb(40, 35, 60),
    spark_bg: rgb(14, 12, 24),
    grid_color: rgb(40, 35, 60),
    band_color: rgb(0, 0, 0),
};

pub const ORANGE: Theme = Theme {
    bg_top_active: rgb(16, 10, 18),
    bg_bottom_active: rgb(7, 4, 9),
    bg_top_idle: rgb(10, 7, 12),
    bg_bottom_idle: rgb(4, 3, 6),
    icon_normal: rgb(235, 220, 200),
    icon_dim: rgb(110, 90, 80),
    text_value: rgb(240, 225, 210),
    text_status: rgb(170, 145, 120),
    state_low: rgb(80, 200, 140),
    state_medium: rgb(245, 150, 60),
    state_high: rgb(255, 100, 50),
    accent_info: rgb(245, 130, 60),
    accent_time: rgb(255, 150, 70),
    bar_bg: rgb(18, 12, 16),
    bar_border: rgb(40, 30, 25),
    spark_bg: rgb(14, 10, 12),
    grid_color: rgb(245, 130, 60),
    band_color: rgb(0, 0, 0),
};

impl Theme {
    /// Palette by name; unknown names fall back to `neutral`.
    pub fn by_name(name: &str) -> Theme {
        match name {
            "neon" => NEON,
            "orange" => ORANGE,
            _ => NEUTRAL,
        }
    }
}

/// Low / medium / high boundaries per metric kind.
pub fn thresholds(key: &str) -> Option<[f64; 3]> {
    match key {
        "cpu" => Some([40.0, 70.0, 90.0]),
        "ram" => Some([60.0, 80.0, 95.0]),
        "temp" => Some([50.0, 65.0, 80.0]),
        "net" => Some([800.0, 1800.0, 2500.0]),
        _ => None,
    }
}
