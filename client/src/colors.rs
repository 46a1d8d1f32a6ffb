use landgrid_shared::owner_color;

const OWNER_TINT_ALPHA: f64 = 0.18;

/// Format RGBA as a CSS color string.
pub fn rgba_css(r: u8, g: u8, b: u8, a: f64) -> String {
    format!("rgba({r},{g},{b},{a})")
}

/// Faint per-owner fill so neighbouring holdings read as distinct parcels.
pub fn owner_tint(owner: &str) -> String {
    let (r, g, b) = owner_color(owner);
    rgba_css(r, g, b, OWNER_TINT_ALPHA)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgba_css_formats_components() {
        assert_eq!(rgba_css(12, 34, 56, 0.5), "rgba(12,34,56,0.5)");
    }

    #[test]
    fn owner_tint_uses_fixed_alpha() {
        assert!(owner_tint("0xabc").ends_with(",0.18)"));
        assert_eq!(owner_tint("0xABC"), owner_tint("0xabc"));
    }
}
