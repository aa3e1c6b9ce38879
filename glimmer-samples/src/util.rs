use glimmer_impl::color::Color;

//
// Utility functions
//

/// 8-bit color literal on the tracer's 0-255 radiance scale.
pub fn rgb(r: u8, g: u8, b: u8) -> Color {
    Color(r as f64, g as f64, b as f64)
}
