use anyhow::{anyhow, Result};
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, ImageReader, RgbaImage};
use std::path::Path;

use crate::config::{Offset, Size};
use crate::error::CompositorError;

/// Carrega o template uma única vez; ele só é clonado, nunca alterado.
///
/// O formato vem do conteúdo do arquivo, não da extensão.
pub fn load_template(path: &Path) -> Result<RgbaImage, CompositorError> {
    let reader = ImageReader::open(path)
        .and_then(|r| r.with_guessed_format())
        .map_err(|_| CompositorError::TemplateNotFound(path.to_path_buf()))?;

    let img = reader
        .decode()
        .map_err(|e| CompositorError::TemplateUnreadable(path.to_path_buf(), e.to_string()))?;
    Ok(img.to_rgba8())
}

/// Abre o QR code e redimensiona para o tamanho exato (Lanczos3, alfa
/// pré-multiplicado para não vazar cor dos pixels transparentes).
///
/// Os erros saem achatados numa única mensagem; o erro do `image` já
/// carrega a própria causa.
pub fn prepare_qr(path: &Path, size: Size) -> Result<RgbaImage> {
    let mut qr = ImageReader::open(path)
        .and_then(|r| r.with_guessed_format())
        .map_err(|e| anyhow!("cannot open {}: {e}", path.display()))?
        .decode()
        .map_err(|e| anyhow!("cannot decode {}: {e}", path.display()))?
        .to_rgba8();

    tracing::debug!(
        from_w = qr.width(),
        from_h = qr.height(),
        to_w = size.width,
        to_h = size.height,
        "resizing QR code"
    );

    Ok(resize_premultiplied(&mut qr, size))
}

fn resize_premultiplied(img: &mut RgbaImage, size: Size) -> RgbaImage {
    premultiply(img);
    let mut resized = imageops::resize(img, size.width, size.height, FilterType::Lanczos3);
    unpremultiply(&mut resized);
    resized
}

fn premultiply(img: &mut RgbaImage) {
    for px in img.pixels_mut() {
        let a = u16::from(px.0[3]);
        for c in &mut px.0[..3] {
            *c = ((u16::from(*c) * a + 127) / 255) as u8;
        }
    }
}

fn unpremultiply(img: &mut RgbaImage) {
    for px in img.pixels_mut() {
        let a = u32::from(px.0[3]);
        for c in &mut px.0[..3] {
            *c = if a == 0 {
                0
            } else {
                ((u32::from(*c) * 255 + a / 2) / a).min(255) as u8
            };
        }
    }
}

/// Cola `overlay` sobre `base` usando o próprio alfa do overlay como máscara.
///
/// Todos os canais (inclusive o alfa) são interpolados pela máscara:
/// alfa 255 substitui o pixel, alfa 0 preserva o template.
/// O que passar da borda do template é recortado.
pub fn paste_masked(base: &mut RgbaImage, overlay: &RgbaImage, offset: Offset) {
    let (bw, bh) = base.dimensions();
    if offset.x >= bw || offset.y >= bh {
        return;
    }
    let w = overlay.width().min(bw - offset.x);
    let h = overlay.height().min(bh - offset.y);

    for y in 0..h {
        for x in 0..w {
            let src = overlay.get_pixel(x, y).0;
            let mask = u16::from(src[3]);
            let dst = base.get_pixel_mut(x + offset.x, y + offset.y);
            for c in 0..4 {
                dst.0[c] = blend_channel(dst.0[c], src[c], mask);
            }
        }
    }
}

fn blend_channel(dst: u8, src: u8, mask: u16) -> u8 {
    let v = u32::from(src) * u32::from(mask) + u32::from(dst) * u32::from(255 - mask);
    ((v + 127) / 255) as u8
}

pub fn compose_token(template: &RgbaImage, qr: &RgbaImage, offset: Offset) -> RgbaImage {
    let mut token = template.clone();
    paste_masked(&mut token, qr, offset);
    token
}

/// Salva no formato indicado pela extensão. JPEG não tem canal alfa,
/// então o token é achatado para RGB antes.
pub fn save_token(token: RgbaImage, path: &Path) -> Result<()> {
    let format = ImageFormat::from_path(path)
        .map_err(|e| anyhow!("unknown output format for {}: {e}", path.display()))?;

    let result = match format {
        ImageFormat::Jpeg => DynamicImage::ImageRgba8(token)
            .into_rgb8()
            .save_with_format(path, format),
        _ => token.save_with_format(path, format),
    };
    result.map_err(|e| anyhow!("cannot save {}: {e}", path.display()))?;

    tracing::debug!(path = %path.display(), ?format, "token saved");
    Ok(())
}
