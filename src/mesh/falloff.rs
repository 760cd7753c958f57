//! Log-domain fades that flatten the corridor around x = 0 and the outer edges.

/// Hermite smoothstep; degrades to a hard step when `edge0 >= edge1`
pub fn smoothstep(edge0: f32, edge1: f32, v: f32) -> f32 {
    if edge1 <= edge0 {
        return if v < edge0 { 0.0 } else { 1.0 };
    }
    let t = ((v - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Smoothstep evaluated on `ln(1 + x)` so the fade is steep near its start and
/// eases out over longer distances
pub fn log_smoothstep(edge0: f32, edge1: f32, v: f32) -> f32 {
    smoothstep(
        edge0.max(0.0).ln_1p(),
        edge1.max(0.0).ln_1p(),
        v.max(0.0).ln_1p(),
    )
}

/// 0 inside the corridor `|x| <= width / 2`, rising to 1 over `smoothness`
pub fn corridor_falloff(x: f32, corridor_width: f32, smoothness: f32) -> f32 {
    if corridor_width <= 0.0 {
        return 1.0;
    }
    let inner = corridor_width * 0.5;
    log_smoothstep(inner, inner + smoothness, x.abs())
}

/// 0 at the outer edge `|x| = half_extent`, rising to 1 over `smoothness` inward
pub fn edge_falloff(x: f32, half_extent: f32, smoothness: f32) -> f32 {
    log_smoothstep(0.0, smoothness, half_extent - x.abs())
}

/// Combined falloff: the more restrictive of corridor and edge fades
pub fn falloff(x: f32, half_extent: f32, corridor_width: f32, smoothness: f32) -> f32 {
    corridor_falloff(x, corridor_width, smoothness).min(edge_falloff(x, half_extent, smoothness))
}
