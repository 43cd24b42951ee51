//! Shared test fixtures and helpers.

#![allow(dead_code)]

use std::cell::Cell;
use std::io::{Cursor, Read, Write};
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

use slidekit::hosted::HostedRuntime;

/// Create a temporary sandbox with an empty `data/` directory inside.
pub fn temp_data_dir() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().expect("failed to create temp dir");
    let data_dir = tmp.path().join("data");
    std::fs::create_dir_all(&data_dir).unwrap();
    (tmp, data_dir)
}

/// A hosted runtime rooted in a temp directory.
///
/// `mount_drive` succeeds (and creates `<root>/content/drive/MyDrive`) only
/// when `drive_available` is set. Mount attempts are counted.
pub struct FakeHosted {
    pub root: PathBuf,
    pub drive_available: bool,
    pub mount_calls: Cell<usize>,
}

impl FakeHosted {
    pub fn new(root: &Path, drive_available: bool) -> Self {
        Self {
            root: root.to_path_buf(),
            drive_available,
            mount_calls: Cell::new(0),
        }
    }
}

impl HostedRuntime for FakeHosted {
    fn is_hosted(&self) -> bool {
        true
    }

    fn mount_drive(&self, mount_point: &Path) -> anyhow::Result<()> {
        self.mount_calls.set(self.mount_calls.get() + 1);
        if !self.drive_available {
            anyhow::bail!("no drive in this runtime");
        }
        std::fs::create_dir_all(mount_point.join("MyDrive"))?;
        Ok(())
    }

    fn hosted_root(&self) -> PathBuf {
        self.root.join("content")
    }

    fn drive_mount_point(&self) -> PathBuf {
        self.root.join("content").join("drive")
    }
}

/// Build an in-memory zip from (name, bytes) pairs. Names ending in '/' become directories.
pub fn zip_bytes(entries: &[(&str, Vec<u8>)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Stored);
    for (name, data) in entries {
        if name.ends_with('/') {
            writer.add_directory(*name, options).unwrap();
        } else {
            writer.start_file(*name, options).unwrap();
            writer.write_all(data).unwrap();
        }
    }
    writer.finish().unwrap().into_inner()
}

/// A tiny valid PNG.
pub fn png_bytes() -> Vec<u8> {
    let img = image::RgbImage::from_pixel(2, 2, image::Rgb([10, 20, 30]));
    let mut out = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut out, image::ImageOutputFormat::Png)
        .unwrap();
    out.into_inner()
}

/// Write a stock library with the four catalog images at distinct sizes.
pub fn write_stock_library(dir: &Path) {
    std::fs::create_dir_all(dir).unwrap();
    let sizes = [
        ("astronaut.png", 40, 30),
        ("coffee.png", 36, 24),
        ("camera.png", 20, 20),
        ("chelsea.png", 18, 12),
    ];
    for (name, w, h) in sizes {
        image::RgbImage::from_pixel(w, h, image::Rgb([120, 60, 90]))
            .save(dir.join(name))
            .unwrap();
    }
}

/// An address nothing listens on.
pub const UNREACHABLE_URL: &str = "http://127.0.0.1:1/unreachable.bin";

/// An HTTP server that announces `declared` bytes, sends `body`, then hangs up.
pub struct TruncatingServer {
    pub url: String,
    pub hits: Arc<AtomicUsize>,
}

impl TruncatingServer {
    pub fn start(declared: usize, body: &'static [u8]) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        std::thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { continue };
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match stream.read(&mut buf) {
                        Ok(0) | Err(_) => break,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }
                counter.fetch_add(1, Ordering::SeqCst);
                let head = format!(
                    "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    declared
                );
                let _ = stream.write_all(head.as_bytes());
                let _ = stream.write_all(body);
                let _ = stream.flush();
            }
        });
        Self {
            url: format!("http://{}/slide.svs", addr),
            hits,
        }
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}
