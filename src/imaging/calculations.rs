//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Uniform scale factor that brings `source_width` down to at most `max_width`.
///
/// Never greater than 1.0: images narrower than the bound are left alone.
///
/// # Examples
/// ```
/// # use tayo_photos::imaging::calculate_scale;
/// assert_eq!(calculate_scale(1600, 800), 0.5);
/// assert_eq!(calculate_scale(400, 800), 1.0);
/// ```
pub fn calculate_scale(source_width: u32, max_width: u32) -> f64 {
    if source_width == 0 {
        return 1.0;
    }
    (max_width as f64 / source_width as f64).min(1.0)
}

/// Calculate output dimensions for a width-bounded downscale.
///
/// Both edges are multiplied by the same factor from [`calculate_scale`] and
/// rounded to the nearest pixel. Neither edge drops below 1px, so extreme
/// panoramas still produce a drawable raster.
///
/// # Arguments
/// * `source` - Original image dimensions (width, height)
/// * `max_width` - Upper bound on the output width
///
/// # Returns
/// * `(width, height)` - Output dimensions
///
/// # Examples
/// ```
/// # use tayo_photos::imaging::calculate_bounded_dimensions;
/// assert_eq!(calculate_bounded_dimensions((1600, 1200), 800), (800, 600));
/// assert_eq!(calculate_bounded_dimensions((400, 300), 800), (400, 300));
/// ```
pub fn calculate_bounded_dimensions(source: (u32, u32), max_width: u32) -> (u32, u32) {
    let (src_w, src_h) = source;
    let scale = calculate_scale(src_w, max_width);
    if scale >= 1.0 {
        return source;
    }

    let w = ((src_w as f64 * scale).round() as u32).max(1);
    let h = ((src_h as f64 * scale).round() as u32).max(1);
    (w, h)
}
