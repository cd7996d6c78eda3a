//! QR code composition: encode a verification URL, rasterize the symbol and
//! stamp a product thumbnail over its center.
//!
//! Overlay problems never fail a `compose` call. Whatever goes wrong while
//! loading or placing the thumbnail, the caller receives the plain QR raster,
//! byte-identical to a call made without an overlay.

use crate::core::occlusion;
use crate::core::overlay::HttpImageSource;
use crate::domain::model::QrImage;
use crate::domain::ports::ImageSource;
use crate::utils::error::{AdminError, OverlayLoadError, Result};
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use qrcode::{Color, EcLevel, QrCode};
use std::io::Cursor;
use std::ops::Range;
use std::time::Duration;

pub const DEFAULT_SIZE: u32 = 200;
pub const DEFAULT_MARGIN: u32 = 2;
pub const DEFAULT_MAX_SIZE: u32 = 4096;
pub const DEFAULT_DARK: &str = "#000000";
pub const DEFAULT_LIGHT: &str = "#FFFFFF";

/// 疊加框佔邊長的比例為 1/5
const OVERLAY_DIVISOR: u32 = 5;
const PLATE_PADDING: u32 = 2;
const PLATE_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// 疊加圖蓋住太多碼字時依序提高糾錯等級
const ESCALATION: [EcLevel; 3] = [EcLevel::M, EcLevel::Q, EcLevel::H];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrOptions {
    pub size: u32,
    pub margin: u32,
    pub dark: Rgba<u8>,
    pub light: Rgba<u8>,
    pub max_size: u32,
}

impl Default for QrOptions {
    fn default() -> Self {
        Self {
            size: DEFAULT_SIZE,
            margin: DEFAULT_MARGIN,
            dark: Rgba([0, 0, 0, 255]),
            light: Rgba([255, 255, 255, 255]),
            max_size: DEFAULT_MAX_SIZE,
        }
    }
}

impl QrOptions {
    pub fn with_size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    pub fn with_colors(mut self, dark: &str, light: &str) -> Result<Self> {
        self.dark = parse_color("qr.dark", dark)?;
        self.light = parse_color("qr.light", light)?;
        Ok(self)
    }
}

/// 解析 `#RGB`、`#RGBA`、`#RRGGBB` 或 `#RRGGBBAA`
pub fn parse_color(field_name: &str, value: &str) -> Result<Rgba<u8>> {
    let invalid = |reason: &str| AdminError::InvalidValueError {
        field: field_name.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    };

    let hex = value.trim().trim_start_matches('#');
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid("Colour must be a hex value such as #000000"));
    }

    let expanded: String = match hex.len() {
        3 | 4 => hex.chars().flat_map(|c| [c, c]).collect(),
        6 | 8 => hex.to_string(),
        _ => return Err(invalid("Colour must have 3, 4, 6 or 8 hex digits")),
    };

    let channel = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16);
    let parse = || -> std::result::Result<Rgba<u8>, std::num::ParseIntError> {
        let alpha = if expanded.len() == 8 { channel(6)? } else { 255 };
        Ok(Rgba([channel(0)?, channel(2)?, channel(4)?, alpha]))
    };
    parse().map_err(|_| invalid("Colour contains invalid hex digits"))
}

/// 模組在畫布上的位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Grid {
    modules: u32,
    scale: u32,
    offset: u32,
}

impl Grid {
    fn fit(modules: u32, options: &QrOptions) -> Result<Self> {
        let total = modules + 2 * options.margin.max(DEFAULT_MARGIN);
        if options.size < total {
            return Err(AdminError::RenderError {
                message: format!(
                    "{}px cannot hold a {}-module symbol with its quiet zone ({}px minimum)",
                    options.size, modules, total
                ),
            });
        }

        let scale = options.size / total;
        let leftover = options.size - scale * total;
        let offset = (total - modules) / 2 * scale + leftover / 2;
        Ok(Self {
            modules,
            scale,
            offset,
        })
    }

    /// 與像素區間 [start, end) 相交的模組，部分重疊也算
    fn module_span(&self, start: u32, end: u32) -> Range<usize> {
        let first = start.saturating_sub(self.offset) / self.scale;
        let last = end
            .saturating_sub(self.offset)
            .div_ceil(self.scale)
            .min(self.modules);
        first as usize..last.max(first) as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Rect {
    x: u32,
    y: u32,
    width: u32,
    height: u32,
}

impl Rect {
    fn centered(canvas: u32, side: u32) -> Self {
        let origin = (canvas - side) / 2;
        Self {
            x: origin,
            y: origin,
            width: side,
            height: side,
        }
    }

    fn grow(self, by: u32, bound: u32) -> Self {
        let x = self.x.saturating_sub(by);
        let y = self.y.saturating_sub(by);
        Self {
            x,
            y,
            width: (self.x + self.width + by).min(bound) - x,
            height: (self.y + self.height + by).min(bound) - y,
        }
    }
}

fn encode_symbol(payload: &str, level: EcLevel) -> Result<QrCode> {
    if payload.is_empty() {
        return Err(AdminError::EncodingError {
            message: "payload is empty".to_string(),
        });
    }

    QrCode::with_error_correction_level(payload.as_bytes(), level).map_err(|e| {
        AdminError::EncodingError {
            message: format!("{} ({} bytes at level {:?})", e, payload.len(), level),
        }
    })
}

fn check_canvas(options: &QrOptions) -> Result<()> {
    if options.size == 0 || options.size > options.max_size {
        return Err(AdminError::RenderError {
            message: format!(
                "size must be between 1 and {} pixels, got {}",
                options.max_size, options.size
            ),
        });
    }
    Ok(())
}

fn rasterize(code: &QrCode, options: &QrOptions) -> Result<(RgbaImage, Grid)> {
    let grid = Grid::fit(code.width() as u32, options)?;
    let mut canvas = RgbaImage::from_pixel(options.size, options.size, options.light);

    for (index, color) in code.to_colors().iter().enumerate() {
        if *color != Color::Dark {
            continue;
        }
        let x = grid.offset + (index as u32 % grid.modules) * grid.scale;
        let y = grid.offset + (index as u32 / grid.modules) * grid.scale;
        fill(&mut canvas, Rect { x, y, width: grid.scale, height: grid.scale }, options.dark);
    }

    Ok((canvas, grid))
}

fn fill(canvas: &mut RgbaImage, rect: Rect, color: Rgba<u8>) {
    for y in rect.y..rect.y + rect.height {
        for x in rect.x..rect.x + rect.width {
            canvas.put_pixel(x, y, color);
        }
    }
}

fn encode_png(canvas: &RgbaImage) -> Result<QrImage> {
    let mut png = Vec::new();
    canvas
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| AdminError::RenderError {
            message: format!("PNG encoding failed: {}", e),
        })?;
    Ok(QrImage::new(png, canvas.width(), canvas.height()))
}

#[derive(Clone)]
pub struct QrCompositor<S: ImageSource = HttpImageSource> {
    source: S,
}

impl QrCompositor<HttpImageSource> {
    pub fn new(fetch_timeout: Duration) -> Result<Self> {
        Ok(Self::with_source(HttpImageSource::new(fetch_timeout)?))
    }
}

impl<S: ImageSource> QrCompositor<S> {
    pub fn with_source(source: S) -> Self {
        Self { source }
    }

    /// 只產生 QR code，不做疊加
    pub fn compose_plain(&self, payload: &str, options: &QrOptions) -> Result<QrImage> {
        let code = encode_symbol(payload, EcLevel::M)?;
        check_canvas(options)?;
        let (canvas, _) = rasterize(&code, options)?;
        encode_png(&canvas)
    }

    pub async fn compose(
        &self,
        payload: &str,
        overlay_source: Option<&str>,
        options: &QrOptions,
    ) -> Result<QrImage> {
        let code = encode_symbol(payload, EcLevel::M)?;
        check_canvas(options)?;
        let (plain, grid) = rasterize(&code, options)?;

        let Some(source) = overlay_source.map(str::trim).filter(|s| !s.is_empty()) else {
            return encode_png(&plain);
        };

        let overlay = match self.load_overlay(source).await {
            Ok(overlay) => overlay,
            Err(e) => {
                tracing::warn!("Overlay '{}' unavailable, using plain QR code: {}", source, e);
                return encode_png(&plain);
            }
        };

        let (target, plate) = overlay_boxes(options.size);
        let Some((mut canvas, _)) = canvas_for_overlay(payload, (code, plain, grid), plate, options)
        else {
            return self.compose_plain(payload, options);
        };

        fill(&mut canvas, plate, PLATE_COLOR);
        let thumbnail = imageops::resize(
            &overlay.to_rgba8(),
            target.width,
            target.height,
            FilterType::Triangle,
        );
        imageops::overlay(&mut canvas, &thumbnail, i64::from(target.x), i64::from(target.y));

        tracing::debug!(
            "Composited {}px overlay into {}px QR code",
            target.width,
            options.size
        );
        encode_png(&canvas)
    }

    async fn load_overlay(&self, source: &str) -> std::result::Result<DynamicImage, OverlayLoadError> {
        let bytes = self.source.fetch(source).await?;
        Ok(image::load_from_memory(&bytes)?)
    }
}

/// 疊加框與外擴的白色底板
fn overlay_boxes(size: u32) -> (Rect, Rect) {
    let target = Rect::centered(size, size / OVERLAY_DIVISOR);
    (target, target.grow(PLATE_PADDING, size))
}

/// 找出底板蓋住後仍可解碼的最低糾錯等級；都不行時回傳 None
fn canvas_for_overlay(
    payload: &str,
    plain: (QrCode, RgbaImage, Grid),
    plate: Rect,
    options: &QrOptions,
) -> Option<(RgbaImage, EcLevel)> {
    let mut candidate = Some(plain);

    for level in ESCALATION {
        let (code, canvas, grid) = match candidate.take() {
            Some(existing) => existing,
            None => match encode_symbol(payload, level)
                .and_then(|code| rasterize(&code, options).map(|(canvas, grid)| (code, canvas, grid)))
            {
                Ok(raster) => raster,
                Err(e) => {
                    tracing::warn!("Cannot raise error correction to {:?}: {}", level, e);
                    return None;
                }
            },
        };

        let columns = grid.module_span(plate.x, plate.x + plate.width);
        let rows = grid.module_span(plate.y, plate.y + plate.height);
        if occlusion::survives(&code, columns, rows) {
            if level != EcLevel::M {
                tracing::debug!("Raised error correction to {:?} for overlay", level);
            }
            return Some((canvas, level));
        }
    }

    tracing::warn!("Overlay would hide too much of the symbol, using plain QR code");
    None
}
