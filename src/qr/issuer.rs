use std::fs::{self, OpenOptions};
use std::io::{self, Cursor, Write};
use std::path::{Path, PathBuf};

use image::{imageops, DynamicImage, GrayImage, ImageFormat, Luma};
use lazy_static::lazy_static;
use log::{debug, info, warn};
use qrcode::{EcLevel, QrCode};
use regex::Regex;
use tokio::sync::Mutex;

use crate::error::{KioskError, KioskResult};

const MODULE_PIXELS: u32 = 10;
const BORDER_MODULES: u32 = 2;
const MAX_CREATE_ATTEMPTS: usize = 16;

lazy_static! {
    static ref QR_FILE_NAME: Regex =
        Regex::new(r"^Kiosk_QR\((\d+)\)\.png$").expect("QR file name pattern is valid");
}

pub fn qr_file_name(serial: u64) -> String {
    format!("Kiosk_QR({}).png", serial)
}

pub fn parse_qr_serial(file_name: &str) -> Option<u64> {
    QR_FILE_NAME
        .captures(file_name)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// `max(existing serial) + 1`, or 1 for an empty or missing directory.
pub fn next_serial_in(dir: &Path) -> io::Result<u64> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(1),
        Err(e) => return Err(e),
    };

    let mut max = 0;
    for entry in entries {
        let name = entry?.file_name();
        if let Some(serial) = name.to_str().and_then(parse_qr_serial) {
            max = max.max(serial);
        }
    }
    Ok(max + 1)
}

pub fn render_qr_png(data: &str) -> KioskResult<Vec<u8>> {
    let code = QrCode::with_error_correction_level(data.as_bytes(), EcLevel::L)
        .map_err(|e| KioskError::Qr(e.to_string()))?;
    let symbol = code
        .render::<Luma<u8>>()
        .quiet_zone(false)
        .module_dimensions(MODULE_PIXELS, MODULE_PIXELS)
        .build();

    let border = BORDER_MODULES * MODULE_PIXELS;
    let mut image = GrayImage::from_pixel(
        symbol.width() + 2 * border,
        symbol.height() + 2 * border,
        Luma([255]),
    );
    imageops::replace(&mut image, &symbol, i64::from(border), i64::from(border));

    let mut png = Vec::new();
    DynamicImage::ImageLuma8(image)
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| KioskError::Qr(e.to_string()))?;
    Ok(png)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedQr {
    pub serial: u64,
    pub path: PathBuf,
}

/// Writes QR images under sequential `Kiosk_QR(n).png` names.
pub struct QrIssuer {
    dir: PathBuf,
    assign: Mutex<()>,
}

impl QrIssuer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            assign: Mutex::new(()),
        }
    }

    pub async fn issue(&self, data: &str) -> KioskResult<IssuedQr> {
        if data.trim().is_empty() {
            return Err(KioskError::Validation("QR data cannot be empty".to_string()));
        }

        let owned = data.to_string();
        let png = tokio::task::spawn_blocking(move || render_qr_png(&owned)).await??;

        // Scan and exclusive create happen under one lock; the create_new
        // check also covers writers in other processes.
        let _guard = self.assign.lock().await;
        let dir = self.dir.clone();
        let issued = tokio::task::spawn_blocking(move || write_next(&dir, &png)).await??;
        info!("Issued QR code {} at {}", issued.serial, issued.path.display());
        Ok(issued)
    }
}

fn write_next(dir: &Path, png: &[u8]) -> KioskResult<IssuedQr> {
    claim_next(dir, |file| file.write_all(png))
}

/// Claims the next free serial with an exclusive create and fills the file
/// with `write`. A failed write removes the file so the serial stays free.
pub(crate) fn claim_next<F>(dir: &Path, mut write: F) -> KioskResult<IssuedQr>
where
    F: FnMut(&mut fs::File) -> io::Result<()>,
{
    fs::create_dir_all(dir)?;
    for _ in 0..MAX_CREATE_ATTEMPTS {
        let serial = next_serial_in(dir)?;
        let path = dir.join(qr_file_name(serial));
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                if let Err(e) = write(&mut file) {
                    drop(file);
                    if let Err(remove) = fs::remove_file(&path) {
                        warn!("Could not remove partial {}: {}", path.display(), remove);
                    }
                    return Err(e.into());
                }
                return Ok(IssuedQr { serial, path });
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                debug!("{} appeared concurrently, rescanning", path.display());
            }
            Err(e) => return Err(e.into()),
        }
    }
    Err(KioskError::Internal(format!(
        "could not claim a QR serial in {}",
        dir.display()
    )))
}
