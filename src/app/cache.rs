use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use image::{imageops::FilterType, DynamicImage, GenericImageView};
use reqwest::blocking::Client;
use tracing::warn;

const POSTER_RETENTION_DAYS: u64 = 14;
const POSTER_RETENTION_SECS: u64 = POSTER_RETENTION_DAYS * 24 * 60 * 60;

/// `<data_dir>/posters`, created on demand. Old files are pruned once per call.
pub fn poster_cache_dir(data_dir: &Path) -> PathBuf {
    let dir = data_dir.join("posters");
    if let Err(e) = fs::create_dir_all(&dir) {
        warn!("failed to create poster cache dir {}: {e}", dir.display());
        return dir;
    }
    match prune_poster_cache_in_dir(&dir) {
        Ok(0) => {}
        Ok(n) => tracing::debug!("pruned {n} stale posters"),
        Err(err) => warn!("poster cache prune failed: {err}"),
    }
    dir
}

pub fn prune_poster_cache_in_dir(dir: &Path) -> std::io::Result<usize> {
    let cutoff = SystemTime::now()
        .checked_sub(Duration::from_secs(POSTER_RETENTION_SECS))
        .unwrap_or(SystemTime::UNIX_EPOCH);
    let mut removed = 0usize;
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let path = entry.path();
        let is_image = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| matches!(e.to_ascii_lowercase().as_str(), "png" | "jpg" | "jpeg" | "webp"))
            .unwrap_or(false);
        if !is_image {
            continue;
        }
        let modified = entry.metadata()?.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        if modified < cutoff {
            let _ = fs::remove_file(&path);
            removed += 1;
        }
    }
    Ok(removed)
}

pub fn url_to_cache_key(url: &str) -> String {
    format!("{:x}", md5::compute(url.as_bytes()))
}

/// Return (width, height, RGBA8 bytes) for a cached poster.
pub fn load_rgba(path: &Path) -> Result<(u32, u32, Vec<u8>), String> {
    let img = image::open(path).map_err(|e| format!("decode {}: {e}", path.display()))?;
    let (w, h) = img.dimensions();
    Ok((w, h, img.to_rgba8().into_raw()))
}

/// Download an image, shrink it to `max_width` (keeping aspect) and store it as
/// `<dir>/<key>.jpg`. Returns the cached path without touching the network
/// when it already exists.
pub fn download_and_store_resized_with_client(
    client: &Client,
    url: &str,
    dir: &Path,
    key: &str,
    max_width: u32,
    quality: u8,
) -> Result<PathBuf, String> {
    let dest = dir.join(format!("{key}.jpg"));
    if dest.exists() {
        return Ok(dest);
    }

    let bytes = client
        .get(url)
        .send()
        .and_then(|r| r.error_for_status())
        .and_then(|r| r.bytes())
        .map_err(|e| format!("download bytes: {e}"))?;

    let img = image::load_from_memory(&bytes).map_err(|e| format!("decode poster: {e}"))?;
    let out = shrink_to_width(img, max_width);

    let mut jpeg_bytes: Vec<u8> = Vec::new();
    {
        let mut encoder =
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut jpeg_bytes, quality);
        // jpeg has no alpha channel
        encoder
            .encode_image(&out.to_rgb8())
            .map_err(|e| format!("jpeg encode: {e}"))?;
    }

    let _ = fs::create_dir_all(dir);
    let tmp = dest.with_extension("jpg.part");
    {
        let mut f = fs::File::create(&tmp).map_err(|e| format!("create tmp: {e}"))?;
        f.write_all(&jpeg_bytes).map_err(|e| format!("write: {e}"))?;
    }
    fs::rename(&tmp, &dest).map_err(|e| format!("rename: {e}"))?;
    Ok(dest)
}

fn shrink_to_width(img: DynamicImage, max_width: u32) -> DynamicImage {
    let (w, h) = img.dimensions();
    if w <= max_width {
        return img;
    }
    let new_h = ((h as f32) * (max_width as f32 / w as f32)).round().max(1.0) as u32;
    img.resize_exact(max_width, new_h, FilterType::CatmullRom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_key_is_stable_md5() {
        let a = url_to_cache_key("https://m.media-amazon.com/images/M/x.jpg");
        assert_eq!(a, url_to_cache_key("https://m.media-amazon.com/images/M/x.jpg"));
        assert_eq!(a.len(), 32);
        assert_ne!(a, url_to_cache_key("https://m.media-amazon.com/images/M/y.jpg"));
    }

    #[test]
    fn prune_keeps_fresh_files_and_ignores_others() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("fresh.jpg"), b"x").unwrap();
        fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        assert_eq!(prune_poster_cache_in_dir(dir.path()).unwrap(), 0);
        assert!(dir.path().join("fresh.jpg").exists());
        assert!(dir.path().join("notes.txt").exists());
    }

    #[test]
    fn shrink_keeps_aspect() {
        let img = DynamicImage::new_rgb8(600, 900);
        let out = shrink_to_width(img, 300);
        assert_eq!(out.dimensions(), (300, 450));

        let small = DynamicImage::new_rgb8(100, 150);
        assert_eq!(shrink_to_width(small, 300).dimensions(), (100, 150));
    }

    #[test]
    fn cached_poster_is_reused_and_decodable() {
        let dir = tempfile::tempdir().unwrap();
        let key = url_to_cache_key("https://example.invalid/p.jpg");
        let path = dir.path().join(format!("{key}.jpg"));
        DynamicImage::new_rgb8(20, 30).save(&path).unwrap();

        let client = Client::new();
        let got = download_and_store_resized_with_client(
            &client,
            "https://example.invalid/p.jpg",
            dir.path(),
            &key,
            320,
            75,
        )
        .unwrap();
        assert_eq!(got, path);

        let (w, h, bytes) = load_rgba(&got).unwrap();
        assert_eq!((w, h), (20, 30));
        assert_eq!(bytes.len(), 20 * 30 * 4);
    }
}
