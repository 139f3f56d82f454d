//! 縮小サイズの計算

/// 幅が `max_width` を超える場合のみ、縦横比を保って幅を `max_width` に揃える
///
/// 高さは `height * max_width / width` を四捨五入（最小1px）。
pub fn target_dimensions(width: u32, height: u32, max_width: u32) -> (u32, u32) {
    if width <= max_width || width == 0 {
        return (width, height);
    }

    let scaled = (height as f64 * max_width as f64 / width as f64).round() as u32;
    (max_width, scaled.max(1))
}
