//! Splits an order spreadsheet into one workbook per location, zipped.

use std::collections::HashSet;
use std::io::{Cursor, Write};
use std::path::PathBuf;

use chrono::Local;
use log::{debug, info};
use sanitize_filename::sanitize;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::spreadsheet::Sheet;
use crate::db::AppState;
use crate::error::KioskResult;

pub const LOCATION_COLUMN: &str = "Location";
const UNASSIGNED_LOCATION: &str = "Unassigned";

/// Groups rows by their exact `Location` text, in order of first appearance.
/// Each group keeps the full header row.
pub fn split_by_location(sheet: &Sheet) -> KioskResult<Vec<(String, Sheet)>> {
    let column = sheet.require_column(LOCATION_COLUMN)?;

    let mut groups: Vec<(String, Sheet)> = Vec::new();
    for (index, row) in sheet.rows.iter().enumerate() {
        let location = sheet.cell(index, column).to_string();
        let location = if location.trim().is_empty() {
            UNASSIGNED_LOCATION.to_string()
        } else {
            location
        };

        match groups.iter_mut().find(|(name, _)| *name == location) {
            Some((_, group)) => group.push_row(row.clone()),
            None => {
                let mut group = Sheet::new(sheet.headers.clone());
                group.push_row(row.clone());
                groups.push((location, group));
            }
        }
    }
    Ok(groups)
}

fn location_stem(location: &str) -> String {
    let safe = sanitize(location.trim());
    let safe = safe.trim();
    if safe.is_empty() {
        UNASSIGNED_LOCATION.to_string()
    } else {
        safe.to_string()
    }
}

pub fn location_file_name(location: &str) -> String {
    format!("{}_records.xlsx", location_stem(location))
}

/// Archive entry names for each location, in order. Locations that sanitize
/// to a name already taken get a ` (n)` suffix.
pub fn location_entry_names<'a, I>(locations: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut taken = HashSet::new();
    let mut names = Vec::new();
    for location in locations {
        let stem = location_stem(location);
        let mut name = format!("{}_records.xlsx", stem);
        let mut copy = 2;
        while !taken.insert(name.to_lowercase()) {
            name = format!("{}_records ({}).xlsx", stem, copy);
            copy += 1;
        }
        names.push(name);
    }
    names
}

/// Builds the zip archive in memory, one `{location}_records.xlsx` per group.
pub fn build_location_archive(groups: &[(String, Sheet)]) -> KioskResult<Vec<u8>> {
    let mut archive = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let names = location_entry_names(groups.iter().map(|(location, _)| location.as_str()));
    for ((location, sheet), name) in groups.iter().zip(names) {
        debug!("Adding '{}' for location '{}'", name, location);
        archive.start_file(name, options)?;
        archive.write_all(&sheet.to_xlsx_bytes()?)?;
    }
    Ok(archive.finish()?.into_inner())
}

#[derive(Debug, Clone)]
pub struct SplitArchive {
    pub filename: String,
    pub path: PathBuf,
    pub locations: Vec<String>,
}

pub async fn split_upload(state: &AppState, upload: Vec<u8>) -> KioskResult<SplitArchive> {
    let (locations, archive) = tokio::task::spawn_blocking(move || -> KioskResult<_> {
        let sheet = Sheet::read_xlsx(&upload)?;
        let groups = split_by_location(&sheet)?;
        let locations: Vec<String> = groups.iter().map(|(location, _)| location.clone()).collect();
        Ok((locations, build_location_archive(&groups)?))
    })
    .await??;

    let export_dir = state.config.export_dir.clone();
    tokio::fs::create_dir_all(&export_dir).await?;
    let filename = format!("split_records_{}.zip", Local::now().format("%Y%m%d_%H%M%S"));
    let path = export_dir.join(&filename);
    tokio::fs::write(&path, archive).await?;

    info!(
        "Split spreadsheet into {} location files at {}",
        locations.len(),
        path.display()
    );
    Ok(SplitArchive {
        filename,
        path,
        locations,
    })
}
