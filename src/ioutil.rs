use std::io;
use std::io::Read;
use std::fs;
use std::path::Path;

use flate2;


pub fn magic_open<P: AsRef<Path>>(path: P) -> io::Result<Box<dyn Read + Send>> {
	let path = path.as_ref();
	match path.extension() {
		Some(x) if x == "gz" => {
			Ok(Box::new(flate2::read::GzDecoder::new(fs::File::open(path)?)))
		},
		_ => Ok(Box::new(fs::File::open(path)?)),
	}
}

/// Opens a CSV source for positional access. Rows may have differing
/// lengths; layout checks are up to the caller.
pub fn csv_reader<R: Read>(r: R) -> csv::Reader<R> {
	csv::ReaderBuilder::new()
		.has_headers(true)
		.flexible(true)
		.from_reader(r)
}

/// Uncompressed size of a file, for progress reporting. Compressed files give
/// no hint since the reader's byte position counts decompressed bytes.
pub fn size_hint<P: AsRef<Path>>(path: P) -> Option<u64> {
	let path = path.as_ref();
	match path.extension() {
		Some(x) if x == "gz" => None,
		_ => fs::metadata(path).ok().map(|m| m.len()),
	}
}
