use std::io;
use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time;

use log::info;


pub trait ProgressSink {
	/// `fraction` is the overall completion in `0..=1`.
	fn report(&mut self, fraction: f64, description: &str);
}

impl<S: ProgressSink + ?Sized> ProgressSink for &mut S {
	fn report(&mut self, fraction: f64, description: &str) {
		(**self).report(fraction, description)
	}
}


pub struct NullSink;

impl ProgressSink for NullSink {
	fn report(&mut self, _fraction: f64, _description: &str) {}
}


#[derive(Debug, Clone)]
struct ProgressState {
	fraction: f64,
	description: String,
}

/// Progress shared between a loader thread and whoever polls it. The
/// fraction never decreases.
#[derive(Debug, Clone)]
pub struct SharedProgress {
	inner: Arc<Mutex<ProgressState>>,
}

impl Default for SharedProgress {
	fn default() -> Self {
		Self::new()
	}
}

impl SharedProgress {
	pub fn new() -> Self {
		Self{
			inner: Arc::new(Mutex::new(ProgressState{
				fraction: 0.0,
				description: String::new(),
			})),
		}
	}

	fn lock(&self) -> MutexGuard<'_, ProgressState> {
		match self.inner.lock() {
			Ok(g) => g,
			// a panicking loader leaves a valid (if stale) state behind
			Err(poisoned) => poisoned.into_inner(),
		}
	}

	pub fn get(&self) -> (f64, String) {
		let state = self.lock();
		(state.fraction, state.description.clone())
	}

	pub fn fraction(&self) -> f64 {
		self.lock().fraction
	}
}

impl ProgressSink for SharedProgress {
	fn report(&mut self, fraction: f64, description: &str) {
		let fraction = fraction.max(0.0).min(1.0);
		let mut state = self.lock();
		if fraction > state.fraction {
			state.fraction = fraction;
		}
		if state.description != description {
			state.description.clear();
			state.description.push_str(description);
		}
	}
}


/// Terminal progress display. Redraws a single line on a tty, otherwise logs
/// whenever the phase changes.
pub struct ProgressMeter {
	t0: time::Instant,
	tty: bool,
	last: f64,
	description: String,
}

impl ProgressMeter {
	pub fn start() -> Self {
		Self{
			t0: time::Instant::now(),
			tty: isatty::stdout_isatty(),
			last: 0.0,
			description: String::new(),
		}
	}

	pub fn finish(self) {
		let dt = (time::Instant::now() - self.t0).as_secs_f64();
		if self.tty {
			println!("{:6.0}% {:<40} [{:6.2}s]", self.last * 100.0, self.description, dt);
		} else {
			info!("{} finished after {:.2}s", self.description, dt);
		}
	}
}

impl ProgressSink for ProgressMeter {
	fn report(&mut self, fraction: f64, description: &str) {
		let changed = self.description != description;
		self.last = fraction;
		if changed {
			self.description.clear();
			self.description.push_str(description);
		}
		if self.tty {
			let dt = (time::Instant::now() - self.t0).as_secs_f64();
			print!("{:6.0}% {:<40} [{:6.2}s]\r", fraction * 100.0, description, dt);
			// nothing sensible to do if the terminal went away
			let _ = io::stdout().flush();
		} else if changed {
			info!("{:3.0}% {}", fraction * 100.0, description);
		}
	}
}


/// Maps the steps of one phase onto the `lo..=hi` slice of the overall
/// progress.
pub struct StepMeter<'s, S: ProgressSink + ?Sized> {
	sink: &'s mut S,
	description: &'s str,
	lo: f64,
	hi: f64,
	n: Option<u64>,
}

impl<'s, S: ProgressSink + ?Sized> StepMeter<'s, S> {
	pub fn new(sink: &'s mut S, description: &'s str, lo: f64, hi: f64, n: Option<u64>) -> Self {
		sink.report(lo, description);
		Self{
			sink,
			description,
			lo,
			hi,
			n,
		}
	}

	pub fn update(&mut self, inow: u64) {
		let done = match self.n {
			Some(n) if n > 0 => (inow as f64 / n as f64).min(1.0),
			_ => 0.0,
		};
		self.sink.report(self.lo + (self.hi - self.lo) * done, self.description);
	}

	pub fn finish(self) {
		self.sink.report(self.hi, self.description);
	}
}
