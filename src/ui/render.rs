// Framebuffer primitives for softbuffer (u32 per pixel, 0x00RRGGBB).

pub const BG_COLOR: [u8; 4] = [31, 31, 31, 255];

pub fn rgb(r: u8, g: u8, b: u8) -> u32 {
    (r as u32) << 16 | (g as u32) << 8 | b as u32
}

fn unpack_rgb(v: u32) -> (u8, u8, u8) {
    ((v >> 16) as u8, (v >> 8) as u8, v as u8)
}

/// Top-left corner that centers a `size` span inside `frame`. Negative when
/// the image overflows the frame.
pub fn centered_origin(frame: u32, size: u32) -> i64 {
    (frame as i64 - size as i64) / 2
}

/// Copies an RGBA image 1:1 into `dst` at (`x0`, `y0`), clipping at the frame
/// edges and blending translucent pixels over what is already there.
pub fn blit(
    dst: &mut [u32], dst_w: u32, dst_h: u32,
    src: &[u8], src_w: u32, src_h: u32,
    x0: i64, y0: i64,
) {
    if src.len() < src_w as usize * src_h as usize * 4 {
        return;
    }

    let dx_start = x0.max(0);
    let dy_start = y0.max(0);
    let dx_end = (x0 + src_w as i64).min(dst_w as i64);
    let dy_end = (y0 + src_h as i64).min(dst_h as i64);

    for dy in dy_start..dy_end {
        let sy = (dy - y0) as usize;
        for dx in dx_start..dx_end {
            let sx = (dx - x0) as usize;
            let si = (sy * src_w as usize + sx) * 4;
            let di = dy as usize * dst_w as usize + dx as usize;
            let Some(px) = dst.get_mut(di) else { continue };

            let sa = src[si + 3] as u32;
            if sa == 255 {
                *px = rgb(src[si], src[si + 1], src[si + 2]);
            } else if sa > 0 {
                let inv = 255 - sa;
                let (dr, dg, db) = unpack_rgb(*px);
                let r = ((src[si] as u32 * sa + dr as u32 * inv) / 255) as u8;
                let g = ((src[si + 1] as u32 * sa + dg as u32 * inv) / 255) as u8;
                let b = ((src[si + 2] as u32 * sa + db as u32 * inv) / 255) as u8;
                *px = rgb(r, g, b);
            }
        }
    }
}
