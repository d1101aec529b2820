use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::ThumbnailError;
use crate::header::{
    BuildHeader, HEADER_LEN, parse_header, payload_start, peek_image_header_offset,
};
use crate::thumbnail::{THUMBNAIL_HEIGHT, THUMBNAIL_WIDTH, ThumbnailImage, decode_thumbnail};

/// Header-and-image file inside a build folder.
pub const RECORD_FILE_NAME: &str = "fromsoftware.txt";
/// PNG placeholder the game writes next to the record; only checked for presence.
pub const THUMBNAIL_MARKER_NAME: &str = "__thumbnail.png";
pub const BUILD_FOLDER_EXTENSION: &str = "mcd";

#[derive(Debug, Clone)]
pub struct BuildRecord {
    pub path: PathBuf,
    pub header: BuildHeader,
    pub image: ThumbnailImage,
}

impl BuildRecord {
    /// Read the header and decode the thumbnail of a record file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ThumbnailError> {
        let path = path.as_ref();
        let mut file = File::open(path).map_err(|err| ThumbnailError::unavailable(path, err))?;
        let window = read_header_window(&mut file, path)?;
        let header = parse_header(&window)?;
        let len = file_len(&file, path)?;
        let payload = read_payload(&mut file, path, header.payload_start(), len)?;

        Ok(BuildRecord {
            path: path.to_path_buf(),
            image: decode_thumbnail(&payload, THUMBNAIL_WIDTH, THUMBNAIL_HEIGHT),
            header,
        })
    }
}

/// Read and validate just the 64-byte header of a record file.
pub fn read_build_header(path: impl AsRef<Path>) -> Result<BuildHeader, ThumbnailError> {
    let path = path.as_ref();
    let mut file = File::open(path).map_err(|err| ThumbnailError::unavailable(path, err))?;
    let window = read_header_window(&mut file, path)?;
    parse_header(&window)
}

/// Decode the thumbnail of a record file without validating its timestamp.
pub fn load_thumbnail(path: impl AsRef<Path>) -> Result<ThumbnailImage, ThumbnailError> {
    let path = path.as_ref();
    let mut file = File::open(path).map_err(|err| ThumbnailError::unavailable(path, err))?;
    let window = read_header_window(&mut file, path)?;
    let offset = peek_image_header_offset(&window)?;
    let len = file_len(&file, path)?;
    let payload = read_payload(&mut file, path, payload_start(offset), len)?;
    Ok(decode_thumbnail(&payload, THUMBNAIL_WIDTH, THUMBNAIL_HEIGHT))
}

fn read_header_window<R: Read>(reader: &mut R, path: &Path) -> Result<Vec<u8>, ThumbnailError> {
    let mut window = Vec::with_capacity(HEADER_LEN);
    reader
        .take(HEADER_LEN as u64)
        .read_to_end(&mut window)
        .map_err(|err| ThumbnailError::unavailable(path, err))?;
    if window.len() < HEADER_LEN {
        return Err(ThumbnailError::TruncatedHeader {
            actual: window.len(),
        });
    }
    Ok(window)
}

fn file_len(file: &File, path: &Path) -> Result<u64, ThumbnailError> {
    file.metadata()
        .map(|metadata| metadata.len())
        .map_err(|err| ThumbnailError::unavailable(path, err))
}

/// One bounded read of everything from `start` up to the source length `len`.
///
/// A start past the end yields an empty payload, which decodes as a fully
/// transparent image. Fewer bytes than `len - start` is `TruncatedPayload`.
fn read_payload<R: Read + Seek>(
    reader: &mut R,
    path: &Path,
    start: u64,
    len: u64,
) -> Result<Vec<u8>, ThumbnailError> {
    if start >= len {
        log::debug!(
            "{}: payload starts at {start} but file is {len} bytes",
            path.display()
        );
        return Ok(Vec::new());
    }

    let expected = usize::try_from(len - start).map_err(|_| {
        ThumbnailError::unavailable(
            path,
            io::Error::new(io::ErrorKind::InvalidData, "payload does not fit in memory"),
        )
    })?;
    reader
        .seek(SeekFrom::Start(start))
        .map_err(|err| ThumbnailError::unavailable(path, err))?;

    let mut payload = Vec::with_capacity(expected);
    reader
        .take(expected as u64)
        .read_to_end(&mut payload)
        .map_err(|err| ThumbnailError::unavailable(path, err))?;
    if payload.len() != expected {
        return Err(ThumbnailError::TruncatedPayload {
            expected,
            actual: payload.len(),
        });
    }
    Ok(payload)
}

/// Result of loading one build folder during a scan.
#[derive(Debug)]
pub struct ScannedBuild {
    pub folder: PathBuf,
    pub record: Result<BuildRecord, ThumbnailError>,
}

/// Load every `*.mcd` build folder directly under `root`.
///
/// Folders missing either marker file are ignored. A record that fails to
/// load is reported in its [`ScannedBuild`] and does not stop the scan. A
/// missing root yields no builds.
pub fn scan_build_folders(root: impl AsRef<Path>) -> Vec<ScannedBuild> {
    let root = root.as_ref();
    if !root.is_dir() {
        log::debug!("build root {} does not exist", root.display());
        return Vec::new();
    }

    let mut folders: Vec<PathBuf> = WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|res| res.ok())
        .filter(|entry| entry.file_type().is_dir())
        .map(|entry| entry.into_path())
        .filter(|path| is_build_folder(path))
        .collect();
    folders.sort();

    folders
        .into_iter()
        .map(|folder| {
            let record = BuildRecord::open(folder.join(RECORD_FILE_NAME));
            if let Err(err) = &record {
                log::warn!("skipping build {}: {err}", folder.display());
            }
            ScannedBuild { folder, record }
        })
        .collect()
}

fn is_build_folder(path: &Path) -> bool {
    let has_extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(BUILD_FOLDER_EXTENSION))
        .unwrap_or(false);
    has_extension
        && path.join(RECORD_FILE_NAME).is_file()
        && path.join(THUMBNAIL_MARKER_NAME).is_file()
}
