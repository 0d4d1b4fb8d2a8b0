use crate::{Color, Image};

/// Background color of the in-game tooltip, plus a per-channel tolerance.
///
/// Tooltips are found by their flat background. Compression and HDR tone
/// mapping shift the captured color slightly, so a pixel counts as tooltip
/// background when every channel is within `tolerance` of `color`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct ColorTarget {
	pub color: Color,
	pub tolerance: u8,
}

impl Default for ColorTarget {
	fn default() -> Self {
		Self::TOOLTIP
	}
}

impl ColorTarget {
	/// The stock tooltip background.
	pub const TOOLTIP: Self = Self {
		color: Color::new(249, 238, 223),
		tolerance: 40,
	};

	#[inline]
	pub fn matches(&self, color: Color) -> bool {
		color.within(self.color, self.tolerance)
	}

	/// Sample a target color from a small square centered on `(x, y)`.
	///
	/// Used for calibration: the user hovers an item so that the pointer
	/// rests on the tooltip background.
	pub fn sample(image: Image, x: u32, y: u32, tolerance: u8) -> Self {
		const HALF: u32 = 4;
		let area = image.sub_image(x.saturating_sub(HALF), y.saturating_sub(HALF), HALF * 2 + 1, HALF * 2 + 1);

		Self {
			color: area.average_color(),
			tolerance,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::OwnedImage;

	#[test]
	fn sample_averages_under_point() {
		let mut img = OwnedImage::filled(50, 50, Color::BLACK);
		img.fill_rect(10, 10, 30, 30, Color::new(200, 100, 50));

		let target = ColorTarget::sample(img.as_image(), 25, 25, 12);
		assert_eq!(target.color, Color::new(200, 100, 50));
		assert_eq!(target.tolerance, 12);
		assert!(target.matches(Color::new(210, 90, 60)));
	}

	#[test]
	fn sample_near_corner_is_clamped() {
		let img = OwnedImage::filled(3, 3, Color::WHITE);
		let target = ColorTarget::sample(img.as_image(), 0, 0, 0);
		assert_eq!(target.color, Color::WHITE);
	}
}
