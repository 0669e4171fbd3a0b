use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;

/// Open a text input, transparently decompressing it when the file name ends
/// in `.gz`. The file handle is owned by the returned reader and closed when
/// it is dropped.
pub fn open_text<P: AsRef<Path>>(path: P) -> std::io::Result<Box<dyn BufRead + Send>> {
    let path = path.as_ref();
    let f = File::open(path)?;

    let is_gz = path
        .extension()
        .map(|ext| ext == "gz")
        .unwrap_or(false);

    let reader: Box<dyn BufRead + Send> = if is_gz {
        Box::new(BufReader::new(MultiGzDecoder::new(f)))
    } else {
        Box::new(BufReader::new(f))
    };
    Ok(reader)
}
