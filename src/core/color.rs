use std::sync::OnceLock;

static COLOR_TABLE: OnceLock<[u32; 256]> = OnceLock::new();

/// Returns the truecolor (0xRRGGBB) value for an AutoCAD color index.
/// Out-of-range indices map to index 0.
pub fn truecolor(index: i64) -> u32 {
    let table = COLOR_TABLE.get_or_init(build_table);
    if (0..256).contains(&index) {
        table[index as usize]
    } else {
        table[0]
    }
}

// Indices 0-9 and 250-255 are fixed anchors; 10-249 form the chromatic ramp:
// 24 hues in 15 degree steps, each with five value rows at full and half
// saturation.
fn build_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let anchors: [u32; 10] = [
        0x000000, 0xFF0000, 0xFFFF00, 0x00FF00, 0x00FFFF, 0x0000FF, 0xFF00FF, 0xFFFFFF, 0x808080,
        0xC0C0C0,
    ];
    table[..10].copy_from_slice(&anchors);

    const VALUE_ROWS: [u32; 5] = [255, 204, 153, 127, 76];
    for slot in 0..240 {
        let hue = (slot / 10) as f64 * 15.0;
        let shade = slot % 10;
        let value = VALUE_ROWS[shade / 2];
        let saturation = if shade % 2 == 0 { 1.0 } else { 0.5 };
        table[10 + slot] = hsv_to_truecolor(hue, saturation, value);
    }

    let grays: [u32; 6] = [0x333333, 0x505050, 0x696969, 0x828282, 0xBEBEBE, 0xFFFFFF];
    table[250..].copy_from_slice(&grays);
    table
}

fn hsv_to_truecolor(hue: f64, saturation: f64, value: u32) -> u32 {
    let v = value as f64;
    let c = v * saturation;
    let x = c * (1.0 - ((hue / 60.0) % 2.0 - 1.0).abs());
    let m = v - c;
    let (r, g, b) = match hue as u32 {
        0..=59 => (c, x, 0.0),
        60..=119 => (x, c, 0.0),
        120..=179 => (0.0, c, x),
        180..=239 => (0.0, x, c),
        240..=299 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    (((r + m) as u32) << 16) | (((g + m) as u32) << 8) | ((b + m) as u32)
}

#[cfg(test)]
mod tests {
    use super::truecolor;

    #[test]
    fn anchor_colors() {
        assert_eq!(truecolor(1), 0xFF0000);
        assert_eq!(truecolor(5), 0x0000FF);
        assert_eq!(truecolor(7), 0xFFFFFF);
        assert_eq!(truecolor(9), 0xC0C0C0);
        assert_eq!(truecolor(255), 0xFFFFFF);
    }

    #[test]
    fn chromatic_ramp_shades() {
        // First ramp group is the red hue: full, pastel, then darker rows.
        assert_eq!(truecolor(10), 0xFF0000);
        assert_eq!(truecolor(11), 0xFF7F7F);
        assert_eq!(truecolor(12), 0xCC0000);
    }

    #[test]
    fn out_of_range_maps_to_zero() {
        assert_eq!(truecolor(-4), truecolor(0));
        assert_eq!(truecolor(300), truecolor(0));
    }
}
