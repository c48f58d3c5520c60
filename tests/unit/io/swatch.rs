//! Tests for swatch statistics, deduplication and directory loading

#[cfg(test)]
mod tests {
    use blockmap::io::swatch::{Swatch, SwatchLibrary, SwatchStats};
    use blockmap::spatial::tiles::ColorMode;
    use image::{Rgba, RgbaImage};
    use std::path::PathBuf;

    fn solid(size: u32, rgb: [u8; 3]) -> RgbaImage {
        let [r, g, b] = rgb;
        RgbaImage::from_pixel(size, size, Rgba([r, g, b, 255]))
    }

    fn close(a: [f64; 3], b: [f64; 3]) -> bool {
        a.iter().zip(&b).all(|(x, y)| (x - y).abs() < 1e-9)
    }

    // Tests solid swatches have matching average and dominant colors
    // Verified by skipping the final division by 255
    #[test]
    fn test_solid_stats() {
        let stats = SwatchStats::analyze(&solid(16, [255, 0, 51]));
        assert!(close(stats.average, [1.0, 0.0, 0.2]));
        assert!(close(stats.dominant, stats.average));
        assert!((stats.dominant_share - 1.0).abs() < 1e-12);
        assert!(stats.has_dominant());
    }

    // Tests a split swatch has no representative dominant color
    // Verified by counting every pixel toward the dominant share
    #[test]
    fn test_split_has_no_dominant() {
        let image = RgbaImage::from_fn(16, 16, |x, _| {
            if x < 8 { Rgba([0, 0, 0, 255]) } else { Rgba([255, 255, 255, 255]) }
        });
        let stats = SwatchStats::analyze(&image);
        assert!(close(stats.average, [0.5, 0.5, 0.5]));
        assert!(stats.dominant_share.abs() < 1e-12);
        assert!(!stats.has_dominant());
    }

    // Tests outliers are excluded from the dominant color
    // Verified by averaging all pixels for the dominant color
    #[test]
    fn test_dominant_ignores_outliers() {
        // Top row blue, remaining 240 pixels red
        let image = RgbaImage::from_fn(16, 16, |_, y| {
            if y == 0 { Rgba([0, 0, 200, 255]) } else { Rgba([200, 0, 0, 255]) }
        });
        let stats = SwatchStats::analyze(&image);
        assert!(close(stats.dominant, [200.0 / 255.0, 0.0, 0.0]));
        assert!((stats.dominant_share - 240.0 / 256.0).abs() < 1e-12);
        assert!(stats.has_dominant());
    }

    // Tests undersized images are skipped and identical ones merged
    // Verified by keeping duplicates as separate swatches
    #[test]
    fn test_from_images_dedup_and_skip() {
        let library = SwatchLibrary::from_images(vec![
            (PathBuf::from("a.png"), solid(16, [10, 20, 30])),
            (PathBuf::from("tiny.png"), solid(8, [10, 20, 30])),
            (PathBuf::from("b.png"), solid(16, [10, 20, 30])),
            (PathBuf::from("c.png"), solid(16, [90, 20, 30])),
        ]);

        assert_eq!(library.len(), 2);
        assert_eq!(library.skipped(), 1);
        let first = library.swatches().first().expect("swatch");
        assert_eq!(first.paths, vec![PathBuf::from("a.png"), PathBuf::from("b.png")]);
        assert_eq!(first.name(), "a.png");
    }

    // Tests sources only carry a dominant color when it is representative
    // Verified by attaching dominant colors unconditionally
    #[test]
    fn test_into_sources() {
        let split = RgbaImage::from_fn(16, 16, |x, _| {
            if x < 8 { Rgba([0, 0, 0, 255]) } else { Rgba([255, 255, 255, 255]) }
        });
        let library = SwatchLibrary::new(vec![
            Swatch::new(PathBuf::from("solid.png"), solid(16, [255, 0, 0])),
            Swatch::new(PathBuf::from("split.png"), split),
        ]);

        let sources = library.into_sources();
        assert_eq!(sources.len(), 2);
        assert!(sources.first().is_some_and(|s| s.color(ColorMode::Dominant).is_some()));
        assert!(sources.last().is_some_and(|s| s.color(ColorMode::Dominant).is_none()));
    }

    // Tests directory loading reads only PNG files in path order
    // Verified by removing the sort
    #[test]
    fn test_from_directory() {
        let dir = tempfile::tempdir().expect("temp dir");
        solid(16, [0, 200, 0]).save(dir.path().join("b.png")).expect("save");
        solid(16, [200, 0, 0]).save(dir.path().join("a.png")).expect("save");
        std::fs::write(dir.path().join("notes.txt"), "not an image").expect("write");

        let library = SwatchLibrary::from_directory(dir.path()).expect("load");
        let names: Vec<String> = library.swatches().iter().map(Swatch::name).collect();
        assert_eq!(names, vec!["a.png", "b.png"]);
    }

    // Tests a missing directory is a file system error
    // Verified by returning an empty library instead
    #[test]
    fn test_missing_directory() {
        let dir = tempfile::tempdir().expect("temp dir");
        assert!(SwatchLibrary::from_directory(&dir.path().join("absent")).is_err());
    }
}
