use anyhow::{Context, Result};
use device_query::{DeviceQuery, DeviceState};
use xcap::image::EncodableLayout;

/// Axis-aligned rectangle in virtual-desktop coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct CaptureRegion {
	pub x: i32,
	pub y: i32,
	pub width: u32,
	pub height: u32,
}

impl CaptureRegion {
	/// A `side` x `side` box centered on `(x, y)`.
	pub fn centered(x: i32, y: i32, side: u32) -> Self {
		let half = (side / 2) as i32;
		Self {
			x: x - half,
			y: y - half,
			width: side,
			height: side,
		}
	}

	pub fn right(&self) -> i32 {
		self.x + self.width as i32
	}

	pub fn bottom(&self) -> i32 {
		self.y + self.height as i32
	}

	pub fn center(&self) -> (i32, i32) {
		(self.x + (self.width / 2) as i32, self.y + (self.height / 2) as i32)
	}

	pub fn contains(&self, x: i32, y: i32) -> bool {
		x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
	}

	/// Overlap with `other`, or `None` when they do not touch.
	pub fn intersect(&self, other: &CaptureRegion) -> Option<CaptureRegion> {
		let x1 = self.x.max(other.x);
		let y1 = self.y.max(other.y);
		let x2 = self.right().min(other.right());
		let y2 = self.bottom().min(other.bottom());
		if x2 <= x1 || y2 <= y1 {
			return None;
		}
		Some(CaptureRegion {
			x: x1,
			y: y1,
			width: (x2 - x1) as u32,
			height: (y2 - y1) as u32,
		})
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorInfo {
	pub bounds: CaptureRegion,
	pub primary: bool,
}

/// Source of screen pixels.
pub trait ScreenSampler: Send + Sync {
	fn monitors(&self) -> Result<Vec<MonitorInfo>>;

	/// Pointer position, if it can be queried.
	fn pointer(&self) -> Option<(i32, i32)>;

	/// Pixels of `region`. Fails when the region is not on any monitor.
	fn capture(&self, region: CaptureRegion) -> Result<ie::OwnedImage>;

	/// Region to capture for a scan.
	fn region(&self, full_screen: bool, search_box: u32) -> Result<CaptureRegion> {
		select_region(&self.monitors()?, self.pointer(), full_screen, search_box)
	}
}

/// Pick the monitor under the pointer (else the primary, else the first) and
/// either return it whole or a `search_box` square around the pointer,
/// clipped to that monitor.
pub fn select_region(monitors: &[MonitorInfo], pointer: Option<(i32, i32)>, full_screen: bool, search_box: u32) -> Result<CaptureRegion> {
	let monitor = pointer
		.and_then(|(x, y)| monitors.iter().find(|m| m.bounds.contains(x, y)))
		.or_else(|| monitors.iter().find(|m| m.primary))
		.or_else(|| monitors.first())
		.context("no monitors available")?;

	if full_screen {
		return Ok(monitor.bounds);
	}

	let (x, y) = pointer
		.filter(|(x, y)| monitor.bounds.contains(*x, *y))
		.unwrap_or_else(|| monitor.bounds.center());
	CaptureRegion::centered(x, y, search_box)
		.intersect(&monitor.bounds)
		.context("capture region lies off-screen")
}

/// Captures through `xcap`, with the pointer read through `device_query`.
#[derive(Debug, Default)]
pub struct XcapSampler;

fn monitor_info(monitor: &xcap::Monitor) -> Result<MonitorInfo> {
	Ok(MonitorInfo {
		bounds: CaptureRegion {
			x: monitor.x()?,
			y: monitor.y()?,
			width: monitor.width()?,
			height: monitor.height()?,
		},
		primary: monitor.is_primary().unwrap_or(false),
	})
}

impl ScreenSampler for XcapSampler {
	fn monitors(&self) -> Result<Vec<MonitorInfo>> {
		xcap::Monitor::all()
			.context("list monitors")?
			.iter()
			.map(monitor_info)
			.collect()
	}

	fn pointer(&self) -> Option<(i32, i32)> {
		Some(DeviceState::new().get_mouse().coords)
	}

	fn capture(&self, region: CaptureRegion) -> Result<ie::OwnedImage> {
		let (cx, cy) = region.center();
		let (monitor, bounds) = xcap::Monitor::all()
			.context("list monitors")?
			.into_iter()
			.find_map(|m| {
				let info = monitor_info(&m).ok()?;
				info.bounds.contains(cx, cy).then_some((m, info.bounds))
			})
			.context("capture region is not on any monitor")?;
		let region = region.intersect(&bounds).context("capture region lies off-screen")?;

		let img = monitor.capture_image().context("capture monitor")?;
		let frame = ie::OwnedImage::from_rgba(img.width() as usize, img.as_bytes());

		// The monitor image can be in physical pixels while bounds are logical.
		let sx = frame.width() as f64 / bounds.width.max(1) as f64;
		let sy = frame.height() as f64 / bounds.height.max(1) as f64;
		let x = ((region.x - bounds.x) as f64 * sx) as u32;
		let y = ((region.y - bounds.y) as f64 * sy) as u32;
		let w = (region.width as f64 * sx).round() as u32;
		let h = (region.height as f64 * sy).round() as u32;

		Ok(frame.as_image().sub_image(x, y, w, h).to_owned_image())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn monitor(x: i32, y: i32, width: u32, height: u32, primary: bool) -> MonitorInfo {
		MonitorInfo {
			bounds: CaptureRegion { x, y, width, height },
			primary,
		}
	}

	fn desk() -> Vec<MonitorInfo> {
		vec![monitor(-1920, 0, 1920, 1080, false), monitor(0, 0, 2560, 1440, true)]
	}

	#[test]
	fn pointer_box_is_clipped_to_its_monitor() {
		let region = select_region(&desk(), Some((-100, 500)), false, 1200).unwrap();
		assert_eq!(region, CaptureRegion { x: -700, y: 0, width: 700, height: 1080 });
	}

	#[test]
	fn pointer_box_inside_monitor() {
		let region = select_region(&desk(), Some((1280, 720)), false, 1200).unwrap();
		assert_eq!(region, CaptureRegion { x: 680, y: 120, width: 1200, height: 1200 });
	}

	#[test]
	fn full_screen_uses_the_pointer_monitor() {
		let region = select_region(&desk(), Some((-5, 5)), true, 1200).unwrap();
		assert_eq!(region, desk()[0].bounds);
	}

	#[test]
	fn unknown_pointer_falls_back_to_primary() {
		let region = select_region(&desk(), None, true, 1200).unwrap();
		assert_eq!(region, desk()[1].bounds);

		let region = select_region(&desk(), Some((99_999, 0)), false, 200).unwrap();
		assert_eq!(region, CaptureRegion { x: 1180, y: 620, width: 200, height: 200 });
	}

	#[test]
	fn no_monitors_is_an_error() {
		assert!(select_region(&[], Some((0, 0)), false, 1200).is_err());
	}

	#[test]
	fn intersect() {
		let a = CaptureRegion { x: 0, y: 0, width: 10, height: 10 };
		assert_eq!(a.intersect(&CaptureRegion { x: 10, y: 0, width: 5, height: 5 }), None);
		assert_eq!(
			a.intersect(&CaptureRegion { x: 5, y: -5, width: 10, height: 10 }),
			Some(CaptureRegion { x: 5, y: 0, width: 5, height: 5 })
		);
	}
}
