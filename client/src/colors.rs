/// Format RGBA as a CSS color string.
pub fn rgba_css(r: u8, g: u8, b: u8, a: f64) -> String {
    format!("rgba({r},{g},{b},{a})")
}

pub const MAP_BACKGROUND: &str = "#f2efe9";
pub const MARKER_BORDER: &str = "#ffffff";
/// Marker border on hover, and the accent for controls.
pub const ACCENT: (u8, u8, u8) = (59, 130, 246);
pub const ACCENT_DARK: (u8, u8, u8) = (37, 99, 235);
pub const CLUSTER_RING: (u8, u8, u8) = (59, 130, 246);
pub const USER_DOT: (u8, u8, u8) = (16, 185, 129);

pub fn accent_css(a: f64) -> String {
    rgba_css(ACCENT.0, ACCENT.1, ACCENT.2, a)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgba_formats_components() {
        assert_eq!(rgba_css(59, 130, 246, 0.5), "rgba(59,130,246,0.5)");
        assert_eq!(accent_css(1.0), "rgba(59,130,246,1)");
    }
}
