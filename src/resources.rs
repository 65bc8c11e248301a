//! Local copies of the source files, verified by MD5 and fetched on demand.
use std::fs;
use std::io;
use std::io::Read;
use std::path::{Path, PathBuf};

use log::{debug, error, info, warn};

use serde::{Serialize, Deserialize};

use super::error::{Error, Result};


pub static DEFAULT_BUFFER_SIZE: usize = 65536;
pub static DEFAULT_RETRY_COUNT: u32 = 3;


#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
	/// Name the rest of the program refers to the resource by.
	pub preferred_name: String,
	/// File name, for messages.
	pub name: String,
	pub local_path: PathBuf,
	#[serde(default)]
	pub remote_path: Option<String>,
	/// Expected MD5 as lowercase hex. Without one, any existing file is
	/// accepted.
	#[serde(default)]
	pub identifier: Option<String>,
}

pub fn md5_hex<R: Read>(mut r: R, buffer_size: usize) -> io::Result<String> {
	let mut context = md5::Context::new();
	let mut buffer = vec![0u8; buffer_size.max(1)];
	loop {
		let n = r.read(&mut buffer)?;
		if n == 0 {
			break;
		}
		context.consume(&buffer[..n]);
	}
	Ok(format!("{:x}", context.finalize()))
}

impl Resource {
	pub fn identifier_actual(&self, buffer_size: usize) -> io::Result<String> {
		md5_hex(fs::File::open(&self.local_path)?, buffer_size)
	}

	pub fn is_complete(&self, buffer_size: usize) -> bool {
		let expected = match self.identifier.as_ref() {
			Some(v) => v,
			None => {
				let exists = self.local_path.is_file();
				if exists {
					warn!("{} has no checksum configured, accepting it unverified", self.name);
				}
				return exists
			},
		};
		match self.identifier_actual(buffer_size) {
			Ok(actual) => {
				if actual.eq_ignore_ascii_case(expected) {
					true
				} else {
					warn!("checksum mismatch for {}: expected {}, got {}", self.name, expected, actual);
					false
				}
			},
			Err(e) if e.kind() == io::ErrorKind::NotFound => {
				info!("{} not found at {}", self.name, self.local_path.display());
				false
			},
			Err(e) => {
				error!("failed to read {}: {}", self.local_path.display(), e);
				false
			},
		}
	}

	/// Records the checksum of the local copy as the expected identifier.
	pub fn pin(&mut self, buffer_size: usize) -> io::Result<&str> {
		let actual = self.identifier_actual(buffer_size)?;
		info!("pinning {} to {}", self.name, actual);
		Ok(self.identifier.insert(actual).as_str())
	}

	/// Fetches `remote_path` into `local_path`, creating missing directories.
	/// The file is only replaced once the transfer completed.
	pub fn download(&self, client: &reqwest::blocking::Client) -> Result<()> {
		let url = match self.remote_path.as_ref() {
			Some(v) => v,
			None => return Err(Error::ResourceUnavailable(self.name.clone())),
		};
		info!("downloading {} from {}", self.name, url);
		if let Some(dir) = self.local_path.parent() {
			if !dir.as_os_str().is_empty() {
				fs::create_dir_all(dir)?;
			}
		}
		let partial = partial_path(&self.local_path);
		let mut response = client.get(url.as_str()).send()?.error_for_status()?;
		{
			let mut f = fs::File::create(&partial)?;
			let n = response.copy_to(&mut f)?;
			debug!("received {} bytes for {}", n, self.name);
		}
		fs::rename(&partial, &self.local_path)?;
		Ok(())
	}
}

fn partial_path(p: &Path) -> PathBuf {
	let mut name = p.file_name().map(|n| n.to_os_string()).unwrap_or_default();
	name.push(".part");
	p.with_file_name(name)
}


#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceConfig {
	#[serde(default = "default_buffer_size")]
	pub buffer_size: usize,
	#[serde(default = "default_retry_count")]
	pub retry_count: u32,
	pub resources: Vec<Resource>,
}

fn default_buffer_size() -> usize {
	DEFAULT_BUFFER_SIZE
}

fn default_retry_count() -> u32 {
	DEFAULT_RETRY_COUNT
}

impl ResourceConfig {
	pub fn get(&self, preferred_name: &str) -> Result<&Resource> {
		self.resources.iter()
			.find(|r| r.preferred_name == preferred_name)
			.ok_or_else(|| Error::UnknownResource(preferred_name.into()))
	}

	pub fn get_mut(&mut self, preferred_name: &str) -> Result<&mut Resource> {
		self.resources.iter_mut()
			.find(|r| r.preferred_name == preferred_name)
			.ok_or_else(|| Error::UnknownResource(preferred_name.into()))
	}

	/// Pins every resource without an identifier to its local copy and
	/// returns the new `(preferred_name, identifier)` pairs.
	pub fn pin_missing(&mut self) -> Result<Vec<(String, String)>> {
		let buffer_size = self.buffer_size;
		let mut pinned = Vec::new();
		for resource in self.resources.iter_mut().filter(|r| r.identifier.is_none()) {
			let identifier = resource.pin(buffer_size)?.to_string();
			pinned.push((resource.preferred_name.clone(), identifier));
		}
		Ok(pinned)
	}
}


/// Makes sure a complete copy of `resource` exists locally, downloading it up
/// to `retry_count` times.
pub fn init_resource(resource: &Resource, config: &ResourceConfig, client: &reqwest::blocking::Client) -> Result<()> {
	if resource.is_complete(config.buffer_size) {
		debug!("{} is complete", resource.name);
		return Ok(())
	}
	if resource.remote_path.is_none() {
		error!("{} is missing or corrupt and has no remote location", resource.name);
		return Err(Error::ResourceUnavailable(resource.name.clone()))
	}
	for i in 0..config.retry_count {
		match resource.download(client) {
			Ok(()) => {
				if resource.is_complete(config.buffer_size) {
					return Ok(())
				}
			},
			Err(e) => warn!("failed to download {}: {}", resource.name, e),
		}
		error!("failed to download {} {} times, retrying ...", resource.name, i + 1);
	}
	Err(Error::ResourceUnavailable(resource.name.clone()))
}

pub fn init_resources(config: &ResourceConfig) -> Result<()> {
	let client = reqwest::blocking::Client::new();
	for resource in config.resources.iter() {
		init_resource(resource, config, &client)?;
	}
	info!("all {} resources are available", config.resources.len());
	Ok(())
}
