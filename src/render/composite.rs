use crate::foundation::error::{TraitgenError, TraitgenResult};

pub type Rgba8 = [u8; 4];
pub type PremulRgba8 = [u8; 4];

/// Porter-Duff "over" on premultiplied pixels.
pub fn over(dst: PremulRgba8, src: PremulRgba8) -> PremulRgba8 {
    let sa = src[3];
    if sa == 0 {
        return dst;
    }

    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = add_sat_u8(sa, mul_div255(u16::from(dst[3]), inv));

    for i in 0..3 {
        let dc = mul_div255(u16::from(dst[i]), inv);
        out[i] = add_sat_u8(src[i], dc);
    }
    out
}

pub fn premultiply(px: Rgba8) -> PremulRgba8 {
    let a = u16::from(px[3]);
    if a == 0 {
        return [0, 0, 0, 0];
    }
    [
        mul_div255(u16::from(px[0]), a),
        mul_div255(u16::from(px[1]), a),
        mul_div255(u16::from(px[2]), a),
        px[3],
    ]
}

pub fn unpremultiply(px: PremulRgba8) -> Rgba8 {
    let a = u32::from(px[3]);
    if a == 0 {
        return [0, 0, 0, 0];
    }
    let un = |c: u8| ((u32::from(c) * 255 + a / 2) / a).min(255) as u8;
    [un(px[0]), un(px[1]), un(px[2]), px[3]]
}

/// "Over" for straight-alpha pixels. Opaque and fully transparent sources are exact.
pub fn over_straight(dst: Rgba8, src: Rgba8) -> Rgba8 {
    match src[3] {
        255 => src,
        0 => dst,
        _ => unpremultiply(over(premultiply(dst), premultiply(src))),
    }
}

pub fn over_straight_in_place(dst: &mut [u8], src: &[u8]) -> TraitgenResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(TraitgenError::render(
            "over_straight_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = over_straight([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]]);
        d.copy_from_slice(&out);
    }
    Ok(())
}

/// Collapse straight RGBA8 to opaque RGB8: alpha is dropped, or the pixels are
/// composited over `background` when one is given.
pub fn flatten_rgba8(rgba: &[u8], background: Option<[u8; 3]>) -> Vec<u8> {
    let mut out = Vec::with_capacity(rgba.len() / 4 * 3);
    for px in rgba.chunks_exact(4) {
        let px = [px[0], px[1], px[2], px[3]];
        let px = match background {
            Some([r, g, b]) => over_straight([r, g, b, 255], px),
            None => px,
        };
        out.extend_from_slice(&px[..3]);
    }
    out
}

fn mul_div255(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}

fn add_sat_u8(a: u8, b: u8) -> u8 {
    a.saturating_add(b)
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
