use crate::constants::{
    AVIF_ENCODER_SPEED, DEFAULT_MAX_WIDTH, DEFAULT_QUALITY, MAX_FILE_SIZE, MAX_IMAGE_DIMENSION,
    MAX_QUALITY, MIN_QUALITY, PNG_OPTIMIZATION_PRESET,
};
use crate::error::{Result, SqueezeError};
use crate::formats::{SourceFormat, TargetFormat};
use crate::utils::write_atomically;
use image::codecs::avif::AvifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageFormat, ImageReader};
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// Per-run optimization policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptimizeOptions {
    pub quality: u8,
    /// Write a sibling in `target_format` instead of re-saving in place
    pub convert_to_target_format: bool,
    pub max_width: u32,
    pub target_format: TargetFormat,
    /// Encode WebP targets losslessly; quality is then ignored for WebP
    pub lossless: bool,
}

impl Default for OptimizeOptions {
    fn default() -> Self {
        Self {
            quality: DEFAULT_QUALITY,
            convert_to_target_format: true,
            max_width: DEFAULT_MAX_WIDTH,
            target_format: TargetFormat::default(),
            lossless: false,
        }
    }
}

impl OptimizeOptions {
    pub fn new(
        quality: Option<u8>,
        convert_to_target_format: bool,
        max_width: Option<u32>,
        target_format: Option<TargetFormat>,
    ) -> Result<Self> {
        let quality = quality.unwrap_or(DEFAULT_QUALITY);
        if !(MIN_QUALITY..=MAX_QUALITY).contains(&quality) {
            return Err(SqueezeError::InvalidQuality(quality));
        }

        let max_width = max_width.unwrap_or(DEFAULT_MAX_WIDTH);
        if max_width == 0 {
            return Err(SqueezeError::InvalidMaxWidth(max_width));
        }

        Ok(Self {
            quality,
            convert_to_target_format,
            max_width,
            target_format: target_format.unwrap_or_default(),
            lossless: false,
        })
    }

    pub fn with_lossless(mut self, lossless: bool) -> Self {
        self.lossless = lossless;
        self
    }

    /// Quality handed to lossy encoders, which reject 0.
    fn encoder_quality(&self) -> u8 {
        self.quality.clamp(1, MAX_QUALITY)
    }
}

/// Outcome of one successfully optimized image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptimizedImage {
    pub source: PathBuf,
    pub output: PathBuf,
    pub original_size: u64,
    pub new_size: u64,
    pub original_dimensions: (u32, u32),
    pub dimensions: (u32, u32),
}

impl OptimizedImage {
    /// True when a sibling file was written instead of replacing the source.
    pub fn converted(&self) -> bool {
        self.source != self.output
    }

    pub fn resized(&self) -> bool {
        self.original_dimensions != self.dimensions
    }
}

/// Loads an image file and returns it along with its size on disk.
///
/// The format is sniffed from the content, so a JPEG saved as `.png` still
/// decodes. Oversized files and images are refused before they can exhaust
/// memory.
pub fn load_image_with_metadata(input_path: &Path) -> Result<(DynamicImage, u64)> {
    let file_size = fs::metadata(input_path)?.len();
    if file_size > MAX_FILE_SIZE {
        return Err(SqueezeError::FileTooLarge(file_size, MAX_FILE_SIZE));
    }

    let img = ImageReader::open(input_path)?
        .with_guessed_format()?
        .decode()?;

    let (width, height) = img.dimensions();
    if width > MAX_IMAGE_DIMENSION || height > MAX_IMAGE_DIMENSION {
        return Err(SqueezeError::InvalidDimensions(
            width,
            height,
            MAX_IMAGE_DIMENSION,
        ));
    }

    Ok((img, file_size))
}

/// Dimensions after capping `width` at `max_width`, or `None` when the image
/// already fits. Height follows the same ratio, rounded, and never drops
/// below one pixel.
pub fn scaled_dimensions(width: u32, height: u32, max_width: u32) -> Option<(u32, u32)> {
    if width <= max_width {
        return None;
    }
    let ratio = max_width as f64 / width as f64;
    let new_height = (height as f64 * ratio).round().max(1.0) as u32;
    Some((max_width, new_height))
}

/// Downsamples `img` in place when it is wider than `max_width`. Never upscales.
pub fn resize_image(img: &mut DynamicImage, max_width: u32) -> bool {
    match scaled_dimensions(img.width(), img.height(), max_width) {
        Some((w, h)) => {
            *img = img.resize_exact(w, h, FilterType::Lanczos3);
            true
        }
        None => false,
    }
}

/// Where the optimized image for `source` goes: a sibling with the target
/// extension when converting, the source itself otherwise.
pub fn output_path_for(source: &Path, options: &OptimizeOptions) -> PathBuf {
    if options.convert_to_target_format {
        source.with_extension(options.target_format.extension())
    } else {
        source.to_path_buf()
    }
}

fn to_eight_bit(img: &DynamicImage) -> DynamicImage {
    if img.color().has_alpha() {
        DynamicImage::ImageRgba8(img.to_rgba8())
    } else {
        DynamicImage::ImageRgb8(img.to_rgb8())
    }
}

/// Encodes `img` in the conversion target format.
pub fn encode_target(img: &DynamicImage, options: &OptimizeOptions) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    match options.target_format {
        TargetFormat::WebP => {
            let pixels = to_eight_bit(img);
            let encoder = webp::Encoder::from_image(&pixels)
                .map_err(|e| SqueezeError::WebPEncoding(e.to_string()))?;
            let memory = if options.lossless {
                encoder.encode_lossless()
            } else {
                encoder.encode(options.quality as f32)
            };
            buf.extend_from_slice(&memory);
        }
        TargetFormat::Avif => {
            let encoder = AvifEncoder::new_with_speed_quality(
                &mut buf,
                AVIF_ENCODER_SPEED,
                options.encoder_quality(),
            );
            to_eight_bit(img).write_with_encoder(encoder)?;
        }
    }
    Ok(buf)
}

/// Encodes `img` back into its own format for an in-place save.
///
/// PNG goes through oxipng's lossless optimizer and ignores quality; JPEG
/// uses the configured quality.
pub fn encode_in_place(
    img: &DynamicImage,
    format: SourceFormat,
    options: &OptimizeOptions,
) -> Result<Vec<u8>> {
    match format {
        SourceFormat::Png => {
            let mut raw = Vec::new();
            img.write_to(&mut Cursor::new(&mut raw), ImageFormat::Png)?;

            let oxipng_options = oxipng::Options::from_preset(PNG_OPTIMIZATION_PRESET);
            oxipng::optimize_from_memory(&raw, &oxipng_options)
                .map_err(|e| SqueezeError::PngOptimization(e.to_string()))
        }
        SourceFormat::Jpeg => {
            let mut buf = Vec::new();
            let encoder = JpegEncoder::new_with_quality(&mut buf, options.encoder_quality());
            DynamicImage::ImageRgb8(img.to_rgb8()).write_with_encoder(encoder)?;
            Ok(buf)
        }
    }
}

/// Load, downsample and re-encode a single image.
///
/// # Arguments
/// * `input_path` - Image to optimize; must carry a `.jpg`, `.jpeg` or `.png` name
/// * `options` - Quality, width cap and conversion policy
///
/// # Returns
/// * `Ok(OptimizedImage)` - Paths, sizes and dimensions before and after
/// * `Err(SqueezeError)` - If loading, encoding or writing fails
///
/// When converting, the source file is left untouched and a sibling is
/// written next to it.
pub fn optimize_image(input_path: &Path, options: &OptimizeOptions) -> Result<OptimizedImage> {
    let file_name = input_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let source_format = SourceFormat::from_file_name(&file_name)
        .ok_or_else(|| SqueezeError::UnsupportedFormat(file_name.clone()))?;

    let (mut img, original_size) = load_image_with_metadata(input_path)?;
    let original_dimensions = img.dimensions();

    resize_image(&mut img, options.max_width);

    let output = output_path_for(input_path, options);
    let bytes = if options.convert_to_target_format {
        encode_target(&img, options)?
    } else {
        encode_in_place(&img, source_format, options)?
    };
    write_atomically(&output, &bytes, input_path)?;

    let new_size = fs::metadata(&output)?.len();

    Ok(OptimizedImage {
        source: input_path.to_path_buf(),
        output,
        original_size,
        new_size,
        original_dimensions,
        dimensions: img.dimensions(),
    })
}
