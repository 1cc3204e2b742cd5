//! 支付凭证图片处理：识别格式、限制尺寸、重新编码

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilterType, PngEncoder};
use image::imageops::FilterType;
use image::{ColorType, DynamicImage, ImageEncoder, ImageFormat};

use crate::error::{AppError, AppResult};

pub const JPEG_QUALITY: u8 = 85;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProofFormat {
    Jpeg,
    Png,
}

impl ProofFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ProofFormat::Jpeg => "jpg",
            ProofFormat::Png => "png",
        }
    }

    fn image_format(&self) -> ImageFormat {
        match self {
            ProofFormat::Jpeg => ImageFormat::Jpeg,
            ProofFormat::Png => ImageFormat::Png,
        }
    }
}

/// 按文件内容（而不是客户端声明的 Content-Type）判断格式
pub fn sniff_format(bytes: &[u8]) -> AppResult<ProofFormat> {
    match image::guess_format(bytes) {
        Ok(ImageFormat::Jpeg) => Ok(ProofFormat::Jpeg),
        Ok(ImageFormat::Png) => Ok(ProofFormat::Png),
        _ => Err(AppError::ValidationError(
            "Invalid file type. Only JPEG and PNG images are allowed".to_string(),
        )),
    }
}

/// 等比缩放到最长边不超过 max_edge，已在范围内则原样返回
pub fn fit_within(width: u32, height: u32, max_edge: u32) -> (u32, u32) {
    let longest = width.max(height);
    if longest <= max_edge || longest == 0 {
        return (width, height);
    }
    let scale = f64::from(max_edge) / f64::from(longest);
    let w = ((f64::from(width) * scale).round() as u32).max(1);
    let h = ((f64::from(height) * scale).round() as u32).max(1);
    (w.min(max_edge), h.min(max_edge))
}

/// 解码、缩放并重新编码。CPU 密集，调用方放到阻塞线程池执行
pub fn compress_proof(bytes: &[u8], format: ProofFormat, max_edge: u32) -> AppResult<Vec<u8>> {
    let img = image::load_from_memory_with_format(bytes, format.image_format())
        .map_err(|e| AppError::ValidationError(format!("Unreadable image: {e}")))?;

    let (w, h) = fit_within(img.width(), img.height(), max_edge);
    let img = if (w, h) == (img.width(), img.height()) {
        img
    } else {
        img.resize_exact(w, h, FilterType::Lanczos3)
    };

    encode(&img, format)
}

fn encode(img: &DynamicImage, format: ProofFormat) -> AppResult<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());
    let result = match format {
        ProofFormat::Jpeg => {
            let rgb = img.to_rgb8();
            JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY).encode_image(&rgb)
        }
        ProofFormat::Png => {
            let rgba = img.to_rgba8();
            PngEncoder::new_with_quality(&mut out, CompressionType::Best, PngFilterType::Adaptive)
                .write_image(rgba.as_raw(), rgba.width(), rgba.height(), ColorType::Rgba8)
        }
    };
    result.map_err(|e| AppError::StorageError(format!("Failed to encode image: {e}")))?;
    Ok(out.into_inner())
}
