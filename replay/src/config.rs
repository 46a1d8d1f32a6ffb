use landgrid_client::GridConfig;
use landgrid_client::config::{DEFAULT_COLS, DEFAULT_MAX_ZOOM, DEFAULT_ROWS};

pub const DEFAULT_VIEW_WIDTH: f64 = 1500.0;
pub const DEFAULT_VIEW_HEIGHT: f64 = 1100.0;

pub fn grid_rows() -> u32 {
    std::env::var("LANDGRID_ROWS")
        .ok()
        .and_then(|value| value.trim().parse::<u32>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_ROWS)
}

pub fn grid_cols() -> u32 {
    std::env::var("LANDGRID_COLS")
        .ok()
        .and_then(|value| value.trim().parse::<u32>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_COLS)
}

pub fn max_zoom() -> f64 {
    std::env::var("LANDGRID_MAX_ZOOM")
        .ok()
        .and_then(|value| value.trim().parse::<f64>().ok())
        .filter(|value| value.is_finite() && *value >= 1.0)
        .unwrap_or(DEFAULT_MAX_ZOOM)
}

pub fn view_width() -> f64 {
    positive_f64("LANDGRID_VIEW_WIDTH").unwrap_or(DEFAULT_VIEW_WIDTH)
}

pub fn view_height() -> f64 {
    positive_f64("LANDGRID_VIEW_HEIGHT").unwrap_or(DEFAULT_VIEW_HEIGHT)
}

fn positive_f64(key: &str) -> Option<f64> {
    std::env::var(key)
        .ok()
        .and_then(|value| value.trim().parse::<f64>().ok())
        .filter(|value| value.is_finite() && *value > 0.0)
}

/// Grid settings for a replay run, defaults overridden from the environment.
pub fn grid_config() -> GridConfig {
    GridConfig {
        max_zoom: max_zoom(),
        ..GridConfig::with_dimensions(grid_rows(), grid_cols())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_env() {
        temp_env::with_vars_unset(
            [
                "LANDGRID_ROWS",
                "LANDGRID_COLS",
                "LANDGRID_MAX_ZOOM",
                "LANDGRID_VIEW_WIDTH",
                "LANDGRID_VIEW_HEIGHT",
            ],
            || {
                let config = grid_config();
                assert_eq!((config.rows, config.cols), (11, 15));
                assert_eq!(config.max_zoom, 8.0);
                assert_eq!(view_width(), DEFAULT_VIEW_WIDTH);
                assert_eq!(view_height(), DEFAULT_VIEW_HEIGHT);
            },
        );
    }

    #[test]
    fn env_overrides_dimensions_and_zoom() {
        temp_env::with_vars(
            [
                ("LANDGRID_ROWS", Some("4")),
                ("LANDGRID_COLS", Some(" 6 ")),
                ("LANDGRID_MAX_ZOOM", Some("3.5")),
                ("LANDGRID_VIEW_WIDTH", Some("600")),
            ],
            || {
                let config = grid_config();
                assert_eq!((config.rows, config.cols), (4, 6));
                assert_eq!(config.max_zoom, 3.5);
                assert_eq!(view_width(), 600.0);
            },
        );
    }

    #[test]
    fn invalid_values_fall_back_to_defaults() {
        temp_env::with_vars(
            [
                ("LANDGRID_ROWS", Some("0")),
                ("LANDGRID_COLS", Some("wide")),
                ("LANDGRID_MAX_ZOOM", Some("0.5")),
                ("LANDGRID_VIEW_HEIGHT", Some("-20")),
            ],
            || {
                assert_eq!(grid_rows(), DEFAULT_ROWS);
                assert_eq!(grid_cols(), DEFAULT_COLS);
                assert_eq!(max_zoom(), DEFAULT_MAX_ZOOM);
                assert_eq!(view_height(), DEFAULT_VIEW_HEIGHT);
            },
        );
    }
}
