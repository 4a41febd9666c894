//! Fixture helpers shared by the integration tests

use std::fs;
use std::path::Path;

/// Write a minimal extension under `<root>/_extensions/<rel>`
pub fn seed_extension(root: &Path, rel: &str, version: &str) {
    let dir = root.join("_extensions").join(rel);
    fs::create_dir_all(&dir).expect("create extension dir");
    fs::write(
        dir.join("_extension.yml"),
        format!(
            "title: Fixture\nversion: {version}\ncontributes:\n  shortcodes:\n    - fixture.lua\n"
        ),
    )
    .expect("write manifest");
    fs::write(dir.join("fixture.lua"), "-- fixture").expect("write shortcode");
}

/// Build an in-memory gzipped tarball from `(path, content)` pairs
pub fn build_tarball(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut builder = tar::Builder::new(flate2::write::GzEncoder::new(
        Vec::new(),
        flate2::Compression::default(),
    ));
    for (path, content) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, path, content.as_bytes())
            .expect("append tar entry");
    }
    builder
        .into_inner()
        .expect("finish tar")
        .finish()
        .expect("finish gzip")
}
