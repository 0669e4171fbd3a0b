//src/harvest.rs

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{Error, Result};

/// Where the download list is written unless told otherwise.
pub const DEFAULT_DOWNLOAD_LIST: &str = "tmp_download.dat";

/// Builds a retrieval URL as `<base_url><id><suffix>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlTemplate {
    pub base_url: String,
    pub suffix: String,
}

impl Default for UrlTemplate {
    fn default() -> Self {
        Self {
            base_url: "http://www.uniprot.org/uniprot/".to_string(),
            suffix: ".fasta".to_string(),
        }
    }
}

impl UrlTemplate {
    pub fn url_for(&self, id: &str) -> String {
        format!("{}{}{}", self.base_url, id, self.suffix)
    }
}

/// Pull sequence database ids out of a pairwise-alignment hit list.
///
/// The text is split at the first blank line. The first line of the second
/// paragraph is a column header; every following line is a hit whose label
/// looks like `sp|<id>|...`.
pub fn hit_identifiers(text: &str) -> Result<Vec<String>> {
    // `lines` also drops the `\r` of CRLF endings
    let mut lines = text.lines().enumerate();
    if !lines.by_ref().any(|(_, line)| line.is_empty()) {
        return Err(Error::format(1, "expected a blank line before the hit list", ""));
    }
    // column header
    lines.next();

    let mut ids = Vec::new();
    for (i, line) in lines {
        if line.is_empty() {
            break;
        }
        if line.trim().is_empty() {
            continue;
        }
        let id = line
            .split('|')
            .nth(1)
            .ok_or_else(|| Error::format(i + 1, "hit has no `|` delimited id", line))?;
        ids.push(id.to_string());
    }
    Ok(ids)
}

/// Write one URL per id.
pub fn write_download_list<W: Write>(
    writer: &mut W,
    ids: &[String],
    template: &UrlTemplate,
) -> Result<()> {
    for id in ids {
        writeln!(writer, "{}", template.url_for(id))?;
    }
    Ok(())
}

pub fn write_download_list_file<P: AsRef<Path>>(
    path: P,
    ids: &[String],
    template: &UrlTemplate,
) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_download_list(&mut writer, ids, template)?;
    writer.flush()?;
    Ok(())
}
