//! Synthetic image, detection and upload builders for testing.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use visa_qa_core::domain::{Detection, FaceBox, FileAttributes, Landmarks, Point, Upload};

/// Background level of [`SyntheticFrameBuilder::portrait`].
pub const PORTRAIT_BACKGROUND: u8 = 235;

/// Builder for creating synthetic test images.
///
/// Provides convenience methods for generating images with specific
/// characteristics (compliant portrait, flat, shadowed, transparent, ...).
pub struct SyntheticFrameBuilder;

impl SyntheticFrameBuilder {
    /// Uniform gray RGB image.
    #[must_use]
    pub fn uniform(width: u32, height: u32, level: u8) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(
            width,
            height,
            Rgb([level, level, level]),
        ))
    }

    /// 600×600 light background with a darker face-sized block.
    ///
    /// Passes every photometric rule of the full preset: corners at 235,
    /// tonal range above 40% and nothing darker than luminance 30.
    #[must_use]
    pub fn portrait() -> DynamicImage {
        let bg = PORTRAIT_BACKGROUND;
        let img = RgbImage::from_fn(600, 600, |x, y| {
            if (220..380).contains(&x) && (130..450).contains(&y) {
                Rgb([120, 100, 90])
            } else {
                Rgb([bg, bg, bg])
            }
        });
        DynamicImage::ImageRgb8(img)
    }

    /// 600×600 image at `level` whose first `dark` pixels (bottom rows up) are near black.
    #[must_use]
    pub fn with_dark_pixels(level: u8, dark: u32) -> DynamicImage {
        let mut img = RgbImage::from_pixel(600, 600, Rgb([level, level, level]));
        for i in 0..dark.min(360_000) {
            img.put_pixel(i % 600, 599 - i / 600, Rgb([10, 10, 10]));
        }
        DynamicImage::ImageRgb8(img)
    }

    /// Image with a half-transparent pixel in the middle.
    #[must_use]
    pub fn with_alpha(width: u32, height: u32) -> DynamicImage {
        let mut img = RgbaImage::from_pixel(width, height, Rgba([230, 230, 230, 255]));
        img.put_pixel(width / 2, height / 2, Rgba([230, 230, 230, 128]));
        DynamicImage::ImageRgba8(img)
    }
}

/// Builder for face detections in normalized space.
///
/// Starts from a centered, level face whose seeded guide lines satisfy the
/// head-height and eye-level rules.
#[derive(Debug, Clone)]
pub struct DetectionBuilder {
    center_x: f64,
    top: f64,
    height: f64,
    eye_y: f64,
    chin_y: f64,
    tilt_degrees: f64,
    eyes: bool,
    jaw: bool,
}

impl DetectionBuilder {
    /// Centered face: box top 130, chin 470, eyes at 230.
    #[must_use]
    pub const fn centered() -> Self {
        Self {
            center_x: 300.0,
            top: 130.0,
            height: 300.0,
            eye_y: 230.0,
            chin_y: 470.0,
            tilt_degrees: 0.0,
            eyes: true,
            jaw: true,
        }
    }

    /// Moves the face horizontally.
    #[must_use]
    pub const fn center_x(mut self, x: f64) -> Self {
        self.center_x = x;
        self
    }

    /// Moves the top of the face box.
    #[must_use]
    pub const fn box_top(mut self, y: f64) -> Self {
        self.top = y;
        self
    }

    /// Moves the eye landmarks.
    #[must_use]
    pub const fn eye_y(mut self, y: f64) -> Self {
        self.eye_y = y;
        self
    }

    /// Moves the chin landmark.
    #[must_use]
    pub const fn chin_y(mut self, y: f64) -> Self {
        self.chin_y = y;
        self
    }

    /// Rolls eyes and jaw by `degrees` (positive: right side lower).
    #[must_use]
    pub const fn tilted(mut self, degrees: f64) -> Self {
        self.tilt_degrees = degrees;
        self
    }

    /// Drops both eye groups.
    #[must_use]
    pub const fn without_eyes(mut self) -> Self {
        self.eyes = false;
        self
    }

    /// Drops the jaw outline.
    #[must_use]
    pub const fn without_jaw(mut self) -> Self {
        self.jaw = false;
        self
    }

    /// Builds the detection.
    #[must_use]
    pub fn build(&self) -> Detection {
        let slope = self.tilt_degrees.to_radians().tan();
        let cx = self.center_x;
        let at = |dx: f64, y: f64| Point::new(cx + dx, y + dx * slope);

        let (left_eye, right_eye) = if self.eyes {
            (
                vec![at(-60.0, self.eye_y), at(-40.0, self.eye_y)],
                vec![at(40.0, self.eye_y), at(60.0, self.eye_y)],
            )
        } else {
            (Vec::new(), Vec::new())
        };
        let jaw_outline = if self.jaw {
            let side = self.chin_y - 170.0;
            vec![at(-100.0, side), at(0.0, self.chin_y), at(100.0, side)]
        } else {
            Vec::new()
        };

        Detection {
            bbox: FaceBox {
                x: cx - 100.0,
                y: self.top,
                width: 200.0,
                height: self.height,
            },
            landmarks: Landmarks {
                left_eye,
                right_eye,
                jaw_outline,
            },
        }
    }
}

/// Builder for in-memory uploads with explicit file attributes.
#[derive(Debug, Clone)]
pub struct UploadBuilder {
    image: DynamicImage,
    filename: String,
    byte_size: Option<u64>,
    declared_type: Option<String>,
}

impl UploadBuilder {
    /// Upload of `image` named `photo_01.jpg`, 50 KiB, declared as JPEG.
    #[must_use]
    pub fn new(image: DynamicImage) -> Self {
        Self {
            image,
            filename: "photo_01.jpg".to_string(),
            byte_size: None,
            declared_type: Some("image/jpeg".to_string()),
        }
    }

    /// Upload of a uniform 600×600 gray image.
    #[must_use]
    pub fn gray(level: u8) -> Self {
        Self::new(SyntheticFrameBuilder::uniform(600, 600, level))
    }

    /// Upload of [`SyntheticFrameBuilder::portrait`].
    #[must_use]
    pub fn portrait() -> Self {
        Self::new(SyntheticFrameBuilder::portrait())
    }

    /// Sets the file name.
    #[must_use]
    pub fn filename(mut self, name: &str) -> Self {
        self.filename = name.to_string();
        self
    }

    /// Sets the reported file size.
    #[must_use]
    pub const fn byte_size(mut self, bytes: u64) -> Self {
        self.byte_size = Some(bytes);
        self
    }

    /// Sets the declared MIME type.
    #[must_use]
    pub fn declared_type(mut self, mime: Option<&str>) -> Self {
        self.declared_type = mime.map(str::to_string);
        self
    }

    /// Builds the upload. No file bytes are attached.
    #[must_use]
    pub fn build(self) -> Upload {
        let attributes = FileAttributes {
            filename: self.filename,
            byte_size: self.byte_size.unwrap_or(50 * 1024),
            declared_type: self.declared_type,
            width: self.image.width(),
            height: self.image.height(),
        };
        Upload::from_image(attributes, &self.image, Vec::new())
    }
}

/// Encodes an image as a baseline JPEG. Alpha is dropped.
///
/// # Errors
///
/// Returns an error if encoding fails.
pub fn encode_jpeg(image: &DynamicImage) -> anyhow::Result<Vec<u8>> {
    encode(&DynamicImage::ImageRgb8(image.to_rgb8()), ImageFormat::Jpeg)
}

/// Encodes an image as PNG, keeping alpha.
///
/// # Errors
///
/// Returns an error if encoding fails.
pub fn encode_png(image: &DynamicImage) -> anyhow::Result<Vec<u8>> {
    encode(image, ImageFormat::Png)
}

fn encode(image: &DynamicImage, format: ImageFormat) -> anyhow::Result<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, format)?;
    Ok(out.into_inner())
}

/// Builder for EXIF blocks embedded into JPEG files.
#[derive(Debug, Clone, Default)]
pub struct ExifBuilder {
    date_time_original: Option<String>,
    software: Option<String>,
    orientation: Option<u16>,
    gps: Option<(f64, f64)>,
}

impl ExifBuilder {
    /// Empty EXIF block.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `DateTimeOriginal`, e.g. `"2024:01:15 10:00:00"`.
    #[must_use]
    pub fn date_time_original(mut self, value: &str) -> Self {
        self.date_time_original = Some(value.to_string());
        self
    }

    /// Sets `Software`.
    #[must_use]
    pub fn software(mut self, value: &str) -> Self {
        self.software = Some(value.to_string());
        self
    }

    /// Sets `Orientation`.
    #[must_use]
    pub const fn orientation(mut self, value: u16) -> Self {
        self.orientation = Some(value);
        self
    }

    /// Sets `GPSLatitude` and `GPSLongitude` in whole degrees.
    #[must_use]
    pub const fn gps(mut self, latitude: f64, longitude: f64) -> Self {
        self.gps = Some((latitude, longitude));
        self
    }

    /// Encodes `image` as JPEG with this EXIF block in an APP1 segment.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    pub fn jpeg(&self, image: &DynamicImage) -> anyhow::Result<Vec<u8>> {
        let jpeg = encode_jpeg(image)?;
        let tiff = self.tiff()?;

        let mut segment = b"Exif\0\0".to_vec();
        segment.extend_from_slice(&tiff);
        let len = u16::try_from(segment.len() + 2)?;

        let mut out = Vec::with_capacity(jpeg.len() + segment.len() + 4);
        out.extend_from_slice(&jpeg[..2]);
        out.extend_from_slice(&[0xFF, 0xE1]);
        out.extend_from_slice(&len.to_be_bytes());
        out.extend_from_slice(&segment);
        out.extend_from_slice(&jpeg[2..]);
        Ok(out)
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn tiff(&self) -> anyhow::Result<Vec<u8>> {
        use exif::{Field, In, Rational, Tag, Value};

        let ascii = |tag: Tag, value: &str| Field {
            tag,
            ifd_num: In::PRIMARY,
            value: Value::Ascii(vec![value.as_bytes().to_vec()]),
        };
        let degrees = |tag: Tag, value: f64| Field {
            tag,
            ifd_num: In::PRIMARY,
            value: Value::Rational(vec![
                Rational::from((value.abs() as u32, 1)),
                Rational::from((0, 1)),
                Rational::from((0, 1)),
            ]),
        };

        let mut fields = Vec::new();
        if let Some(v) = &self.date_time_original {
            fields.push(ascii(Tag::DateTimeOriginal, v));
        }
        if let Some(v) = &self.software {
            fields.push(ascii(Tag::Software, v));
        }
        if let Some(v) = self.orientation {
            fields.push(Field {
                tag: Tag::Orientation,
                ifd_num: In::PRIMARY,
                value: Value::Short(vec![v]),
            });
        }
        if let Some((lat, lon)) = self.gps {
            fields.push(degrees(Tag::GPSLatitude, lat));
            fields.push(degrees(Tag::GPSLongitude, lon));
        }

        let mut writer = exif::experimental::Writer::new();
        for field in &fields {
            writer.push_field(field);
        }
        let mut out = Cursor::new(Vec::new());
        writer.write(&mut out, false)?;
        Ok(out.into_inner())
    }
}
