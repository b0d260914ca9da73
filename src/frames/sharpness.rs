use image::GrayImage;

/// Variance of the Laplacian over a grayscale image.
///
/// The Laplacian responds to edges, so its variance is a cheap proxy for
/// focus: blurry frames have little high-frequency content and score low.
pub fn laplacian_variance(image: &GrayImage) -> f64 {
    let (width, height) = image.dimensions();
    if width < 3 || height < 3 {
        return 0.0;
    }

    let pixels = image.as_raw();
    let w = width as usize;
    let h = height as usize;

    let mut responses = Vec::with_capacity((w - 2) * (h - 2));
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let idx = y * w + x;
            // 4-neighbor Laplacian kernel.
            let response = pixels[idx - 1] as f64
                + pixels[idx + 1] as f64
                + pixels[idx - w] as f64
                + pixels[idx + w] as f64
                - 4.0 * pixels[idx] as f64;
            responses.push(response);
        }
    }

    let mean = responses.iter().sum::<f64>() / responses.len() as f64;
    responses.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / responses.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_image(width: u32, height: u32, value: u8) -> GrayImage {
        GrayImage::from_pixel(width, height, image::Luma([value]))
    }

    fn checkerboard(width: u32, height: u32) -> GrayImage {
        GrayImage::from_fn(width, height, |x, y| {
            if (x + y) % 2 == 0 {
                image::Luma([255])
            } else {
                image::Luma([0])
            }
        })
    }

    fn smooth_gradient(width: u32, height: u32) -> GrayImage {
        GrayImage::from_fn(width, height, |x, _| image::Luma([(x % 256) as u8]))
    }

    #[test]
    fn test_flat_image_scores_zero() {
        assert_eq!(laplacian_variance(&flat_image(32, 32, 128)), 0.0);
    }

    #[test]
    fn test_edges_score_higher_than_gradient() {
        let sharp = laplacian_variance(&checkerboard(32, 32));
        let smooth = laplacian_variance(&smooth_gradient(32, 32));
        assert!(sharp > smooth);
        assert!(sharp > 100.0, "checkerboard should clear the blur threshold, got {}", sharp);
    }

    #[test]
    fn test_tiny_image_scores_zero() {
        assert_eq!(laplacian_variance(&flat_image(2, 2, 77)), 0.0);
    }
}
