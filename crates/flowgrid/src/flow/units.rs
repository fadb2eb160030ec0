//! Pixel <-> sheet unit conversions.
//!
//! Column widths on the host sheet are measured in characters of the default font,
//! row heights in points. Both conversions are approximations of the sheet's own
//! model and are lossy: converting back recovers the pixel value to within one
//! pixel, not exactly.

/// Pixels of cell margin the sheet adds around a column's character cells.
const COLUMN_MARGIN_PX: f64 = 5.0;
/// Pixel width of one character of the default font.
const CHAR_WIDTH_PX: f64 = 7.0;
/// Points per pixel at 96 dpi.
const POINTS_PER_PIXEL: f64 = 0.75;

/// Column width in character units for a width in pixels.
pub fn pixels_to_column_units(px: f64) -> f64 {
    if px <= 0.0 {
        return 0.0;
    }
    (px - COLUMN_MARGIN_PX) / CHAR_WIDTH_PX
}

/// Row height in points for a height in pixels.
pub fn pixels_to_row_units(px: f64) -> f64 {
    if px == 0.0 {
        return 0.0;
    }
    px * POINTS_PER_PIXEL
}

/// Pixel width of a column given its width in character units.
pub fn column_units_to_pixels(units: f64) -> f64 {
    if units <= 0.0 {
        return 0.0;
    }
    units * CHAR_WIDTH_PX + COLUMN_MARGIN_PX
}

/// Pixel height of a row given its height in points.
pub fn row_units_to_pixels(units: f64) -> f64 {
    units / POINTS_PER_PIXEL
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn zero_and_negative_pixels_map_to_zero_columns() {
        assert_eq!(pixels_to_column_units(0.0), 0.0);
        assert_eq!(pixels_to_column_units(-12.0), 0.0);
    }

    #[test]
    fn column_units_follow_character_model() {
        // 75px cell: (75 - 5) / 7 = 10 characters.
        assert_eq!(pixels_to_column_units(75.0), 10.0);
        assert_eq!(pixels_to_column_units(140.0), 135.0 / 7.0);
    }

    #[test]
    fn zero_pixels_map_to_zero_points() {
        assert_eq!(pixels_to_row_units(0.0), 0.0);
    }

    #[test]
    fn row_units_are_three_quarters_of_pixels() {
        assert_eq!(pixels_to_row_units(80.0), 60.0);
        assert_eq!(pixels_to_row_units(20.0), 15.0);
    }

    #[test]
    fn row_height_round_trip_within_one_pixel() {
        for px in [1.0, 7.0, 19.0, 40.0, 61.0, 80.0, 133.0, 409.0] {
            let back = row_units_to_pixels(pixels_to_row_units(px));
            assert!(
                (back - px).abs() <= 1.0,
                "row height {px}px came back as {back}px"
            );
        }
    }

    #[test]
    fn column_width_round_trip_within_one_pixel() {
        for px in [6.0, 40.0, 75.0, 140.0, 255.0] {
            let back = column_units_to_pixels(pixels_to_column_units(px));
            assert!(
                (back - px).abs() <= 1.0,
                "column width {px}px came back as {back}px"
            );
        }
    }
}
