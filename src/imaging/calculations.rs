//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Calculate the bounded size of a thumbnail.
///
/// Returns `None` when the larger side is already within `max_size`, meaning
/// the thumbnail is a same-size copy. Otherwise the larger side is clamped to
/// `max_size` and the other is scaled by the same ratio and truncated. Width
/// drives the calculation when the sides are equal. A side that truncates to
/// zero is clamped to one pixel.
///
/// # Examples
/// ```
/// # use simple_thumb::imaging::calculate_thumbnail_dimensions;
/// assert_eq!(calculate_thumbnail_dimensions((800, 600), 400), Some((400, 300)));
/// assert_eq!(calculate_thumbnail_dimensions((300, 300), 400), None);
/// ```
pub fn calculate_thumbnail_dimensions(source: (u32, u32), max_size: u32) -> Option<(u32, u32)> {
    let (width, height) = source;

    if width.max(height) <= max_size {
        return None;
    }

    let (new_w, new_h) = if width >= height && width > max_size {
        // Landscape or square: width is clamped
        let h = height as f64 / width as f64 * max_size as f64;
        (max_size, h as u32)
    } else {
        // Portrait: height is clamped
        let w = width as f64 / height as f64 * max_size as f64;
        (w as u32, max_size)
    };

    Some((new_w.max(1), new_h.max(1)))
}

/// Dimensions after applying an orientation that may swap the axes.
pub fn oriented_dimensions(source: (u32, u32), swaps_axes: bool) -> (u32, u32) {
    if swaps_axes {
        (source.1, source.0)
    } else {
        source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // calculate_thumbnail_dimensions tests
    // =========================================================================

    #[test]
    fn thumbnail_landscape() {
        // 800x600 bounded at 400 → 400x300
        assert_eq!(
            calculate_thumbnail_dimensions((800, 600), 400),
            Some((400, 300))
        );
    }

    #[test]
    fn thumbnail_portrait() {
        // 600x800 bounded at 400 → 300x400
        assert_eq!(
            calculate_thumbnail_dimensions((600, 800), 400),
            Some((300, 400))
        );
    }

    #[test]
    fn thumbnail_square_width_drives() {
        assert_eq!(
            calculate_thumbnail_dimensions((1000, 1000), 250),
            Some((250, 250))
        );
    }

    #[test]
    fn thumbnail_within_bounds_is_none() {
        assert_eq!(calculate_thumbnail_dimensions((300, 300), 400), None);
        assert_eq!(calculate_thumbnail_dimensions((400, 100), 400), None);
    }

    #[test]
    fn thumbnail_truncates_not_rounds() {
        // 1000x667 → 400 x 266.8 → 266
        assert_eq!(
            calculate_thumbnail_dimensions((1000, 667), 400),
            Some((400, 266))
        );
        // 667x1000 → 266.8 x 400 → 266
        assert_eq!(
            calculate_thumbnail_dimensions((667, 1000), 400),
            Some((266, 400))
        );
    }

    #[test]
    fn thumbnail_extreme_strip_keeps_one_pixel() {
        // 10000x1 bounded at 100 → 100 x 0.01 → clamped to 1
        assert_eq!(
            calculate_thumbnail_dimensions((10000, 1), 100),
            Some((100, 1))
        );
    }

    #[test]
    fn thumbnail_never_exceeds_bound() {
        for (w, h) in [(1920, 1080), (1080, 1920), (4000, 3999), (3999, 4000), (513, 512)] {
            let (tw, th) = calculate_thumbnail_dimensions((w, h), 512).unwrap();
            assert!(tw.max(th) <= 512, "{w}x{h} → {tw}x{th}");
            assert_eq!(tw.max(th), 512, "{w}x{h} → {tw}x{th}");
        }
    }

    // =========================================================================
    // oriented_dimensions tests
    // =========================================================================

    #[test]
    fn oriented_swaps_when_asked() {
        assert_eq!(oriented_dimensions((800, 600), true), (600, 800));
        assert_eq!(oriented_dimensions((800, 600), false), (800, 600));
    }
}
