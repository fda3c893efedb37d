use image::{DynamicImage, GenericImageView};
use img_squeeze::estimator::sample_size;
use img_squeeze::processing::{fit_inside, resize_image};
use img_squeeze::scanner::is_image_file;
use img_squeeze::utils::{percent_complete, saved_percent};
use img_squeeze::CompressionSettings;
use proptest::prelude::*;
use std::path::Path;

proptest! {
    #[test]
    fn settings_quality_in_range(quality in 1u8..=100u8) {
        let settings = CompressionSettings { quality, ..Default::default() };
        prop_assert!(settings.validate().is_ok());
    }

    #[test]
    fn settings_invalid_quality(quality in 0u8..=255u8) {
        let settings = CompressionSettings { quality, ..Default::default() };
        if quality == 0 || quality > 100 {
            prop_assert!(settings.validate().is_err());
        } else {
            prop_assert!(settings.validate().is_ok());
        }
    }

    #[test]
    fn fit_inside_stays_within_bounds(
        width in 1u32..=5000u32,
        height in 1u32..=5000u32,
        max in 1u32..=2000u32
    ) {
        match fit_inside(width, height, Some(max)) {
            Some((w, h)) => {
                prop_assert!(w <= max && h <= max);
                prop_assert!(w >= 1 && h >= 1);
                prop_assert!(w.max(h) == max);
                prop_assert!(w <= width && h <= height);
            }
            None => prop_assert!(width <= max && height <= max),
        }
    }

    #[test]
    fn fit_inside_never_enlarges(width in 1u32..=500u32, height in 1u32..=500u32) {
        let max = width.max(height) + 1;
        prop_assert_eq!(fit_inside(width, height, Some(max)), None);
        prop_assert_eq!(fit_inside(width, height, None), None);
    }

    #[test]
    fn fit_inside_keeps_aspect_ratio(
        width in 100u32..=4000u32,
        height in 100u32..=4000u32,
        max in 50u32..=99u32
    ) {
        let (w, h) = fit_inside(width, height, Some(max)).unwrap();
        let original = width as f64 / height as f64;
        let resized = w as f64 / h as f64;
        // Rounding one edge to whole pixels bounds the drift.
        let tolerance = original / w.min(h) as f64 + 1.0 / h as f64 + 0.01;
        prop_assert!((original - resized).abs() <= tolerance);
    }

    #[test]
    fn resize_image_matches_fit_inside(
        width in 10u32..=300u32,
        height in 10u32..=300u32,
        max in 10u32..=200u32
    ) {
        let mut img = DynamicImage::new_rgb8(width, height);
        resize_image(&mut img, Some(max));
        let expected = fit_inside(width, height, Some(max)).unwrap_or((width, height));
        prop_assert_eq!(img.dimensions(), expected);
    }

    #[test]
    fn is_image_file_supported_extensions(
        name in "[a-zA-Z0-9_]{1,20}",
        ext in prop::sample::select(vec!["jpg", "JPEG", "png", "webp", "tif", "tiff", "gif", "AVIF"])
    ) {
        let filename = format!("{}.{}", name, ext);
        prop_assert!(is_image_file(Path::new(&filename)));
    }

    #[test]
    fn is_image_file_unsupported_extensions(
        name in "[a-zA-Z0-9_]{1,20}",
        ext in prop::sample::select(vec!["txt", "pdf", "doc", "mp4", "bmp", "heic", "svg"])
    ) {
        let filename = format!("{}.{}", name, ext);
        prop_assert!(!is_image_file(Path::new(&filename)));
    }

    #[test]
    fn sample_size_is_clamped(total in 1usize..=100_000usize) {
        let n = sample_size(total);
        prop_assert!((1..=10).contains(&n));
        prop_assert!(n <= total);
    }

    #[test]
    fn saved_percent_matches_sizes(original in 1u64..=10_000_000u64, compressed in 0u64..=20_000_000u64) {
        let percent = saved_percent(original, compressed);
        let exact = (original as f64 - compressed as f64) / original as f64 * 100.0;
        prop_assert!((percent - exact).abs() <= 0.0051);
        if compressed <= original {
            prop_assert!((0.0..=100.0).contains(&percent));
        } else {
            prop_assert!(percent <= 0.0);
        }
    }

    #[test]
    fn percent_complete_is_monotonic(total in 1usize..=1000usize) {
        let mut previous = 0.0;
        for current in 1..=total {
            let percent = percent_complete(current, total);
            prop_assert!(percent >= previous);
            previous = percent;
        }
        prop_assert_eq!(previous, 100.0);
    }
}

#[test]
fn saved_percent_zero_original() {
    assert_eq!(saved_percent(0, 0), 0.0);
    assert_eq!(saved_percent(0, 500), 0.0);
}
