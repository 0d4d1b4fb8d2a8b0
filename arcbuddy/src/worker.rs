//! Single-flight background scanning.
//!
//! At most one scan runs at a time. A request made while a scan is running
//! is rejected, not queued. Each accepted request gets a one-shot channel
//! carrying its result.

use std::{
	sync::{
		Arc,
		atomic::{AtomicBool, Ordering},
		mpsc::{self, Receiver, RecvTimeoutError},
	},
	time::Duration,
};

use crate::scan::{ScanConfig, ScanError, ScanOutcome, Scanner};

pub type ScanResult = Result<ScanOutcome, ScanError>;

#[derive(Clone)]
pub struct ScanWorker {
	scanner: Arc<Scanner>,
	busy: Arc<AtomicBool>,
}

/// Clears the busy flag when the scan thread ends, however it ends.
struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
	fn drop(&mut self) {
		self.0.store(false, Ordering::Release);
	}
}

/// Handle to a scan in flight.
pub struct ScanTicket {
	rx: Receiver<ScanResult>,
	timeout: Duration,
}

impl ScanTicket {
	/// Wait for the result, giving up after the scan's timeout.
	///
	/// A timed out scan keeps running in the background and keeps the worker busy until it ends.
	pub fn wait(self) -> ScanResult {
		match self.rx.recv_timeout(self.timeout) {
			Ok(result) => result,
			Err(RecvTimeoutError::Timeout) => Err(ScanError::Timeout(self.timeout)),
			Err(RecvTimeoutError::Disconnected) => Err(ScanError::WorkerLost),
		}
	}
}

impl ScanWorker {
	pub fn new(scanner: Arc<Scanner>) -> Self {
		Self {
			scanner,
			busy: Arc::new(AtomicBool::new(false)),
		}
	}

	pub fn scanner(&self) -> &Arc<Scanner> {
		&self.scanner
	}

	pub fn is_busy(&self) -> bool {
		self.busy.load(Ordering::Acquire)
	}

	/// Start a scan on a background thread.
	pub fn request(&self, config: ScanConfig) -> Result<ScanTicket, ScanError> {
		if self
			.busy
			.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
			.is_err()
		{
			tracing::info!("scan request rejected: a scan is already running");
			return Err(ScanError::Busy);
		}
		let guard = BusyGuard(self.busy.clone());

		let (tx, rx) = mpsc::sync_channel(1);
		let scanner = self.scanner.clone();
		let timeout = config.timeout;

		// If spawning fails the closure, and with it the guard, is dropped here.
		std::thread::Builder::new()
			.name("scan".to_string())
			.spawn(move || {
				let _guard = guard;
				let result = scanner.scan(&config);
				if let Err(err) = &result {
					tracing::warn!(error = %err, "scan failed");
				}
				// The receiver may have timed out and gone away.
				let _ = tx.send(result);
			})?;

		Ok(ScanTicket { rx, timeout })
	}
}

#[cfg(test)]
mod tests {
	use std::sync::{Mutex, mpsc::Sender};

	use anyhow::Result;
	use data::{Language, progress::NoProgress};
	use ie::OwnedImage;

	use super::*;
	use crate::{
		capture::{CaptureRegion, MonitorInfo, ScreenSampler},
		scan::{
			ScanState,
			tests::{CannedOcr, StaticScreen, catalog, scan_config, tooltip_frame},
		},
	};

	/// Blocks every capture until the test sends a go-ahead.
	struct GatedScreen {
		inner: StaticScreen,
		gate: Mutex<Receiver<()>>,
	}

	impl ScreenSampler for GatedScreen {
		fn monitors(&self) -> Result<Vec<MonitorInfo>> {
			self.inner.monitors()
		}

		fn pointer(&self) -> Option<(i32, i32)> {
			self.inner.pointer()
		}

		fn capture(&self, region: CaptureRegion) -> Result<OwnedImage> {
			self.gate.lock().unwrap().recv()?;
			self.inner.capture(region)
		}
	}

	fn gated_worker() -> (ScanWorker, Sender<()>) {
		let (tx, rx) = mpsc::channel();
		let screen = GatedScreen {
			inner: StaticScreen(tooltip_frame()),
			gate: Mutex::new(rx),
		};
		let ocr = CannedOcr {
			lines: vec!["Vita", "Spray"],
			..Default::default()
		};
		let state = ScanState {
			ie: ie::Ie::with_recognizer(ocr),
			index: catalog().index(Language::English),
		};
		(ScanWorker::new(Arc::new(Scanner::new(screen, state, Box::new(NoProgress)))), tx)
	}

	#[test]
	fn second_request_is_rejected_while_busy() {
		let (worker, gate) = gated_worker();

		let ticket = worker.request(scan_config()).unwrap();
		assert!(worker.is_busy());
		assert!(matches!(worker.request(scan_config()), Err(ScanError::Busy)));

		gate.send(()).unwrap();
		assert!(matches!(ticket.wait(), Ok(ScanOutcome::Identified(_))));

		// The flag is cleared after the result is sent; wait for the thread to finish.
		while worker.is_busy() {
			std::thread::yield_now();
		}
		gate.send(()).unwrap();
		assert!(worker.request(scan_config()).unwrap().wait().is_ok());
	}

	#[test]
	fn slow_scan_times_out() {
		let (worker, gate) = gated_worker();
		let config = ScanConfig {
			timeout: Duration::from_millis(20),
			..scan_config()
		};

		let ticket = worker.request(config).unwrap();
		assert!(matches!(ticket.wait(), Err(ScanError::Timeout(_))));
		assert!(worker.is_busy());

		gate.send(()).unwrap();
		while worker.is_busy() {
			std::thread::yield_now();
		}
	}
}
