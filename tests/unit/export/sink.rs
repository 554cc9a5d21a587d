use super::*;
use crate::foundation::core::Rgba8;

fn temp_dir(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "sketchbook_sink_{tag}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

#[test]
fn in_memory_clones_share_exports() {
    let handle = InMemoryExportSink::new();
    let mut sink = handle.clone();
    assert!(handle.is_empty());

    let img = RasterImage::filled(2, 2, Rgba8::BLACK).unwrap();
    sink.export(3, &img).unwrap();

    let exports = handle.exports();
    assert_eq!(exports.len(), 1);
    assert_eq!(exports[0].page_index, 3);
    assert_eq!(exports[0].image, img);
}

#[test]
fn directory_sink_writes_sequenced_pngs() {
    let dir = temp_dir("dir");
    let mut sink = DirectoryExportSink::new(&dir).unwrap();
    let img = RasterImage::filled(3, 2, Rgba8::new(255, 0, 0, 128)).unwrap();

    sink.export(0, &img).unwrap();
    sink.export(0, &img).unwrap();

    let first = dir.join("page-001-0001.png");
    let second = dir.join("page-001-0002.png");
    assert!(first.exists());
    assert!(second.exists());

    let back = image::open(&first).unwrap().to_rgba8();
    assert_eq!(back.dimensions(), (3, 2));
    let px = back.get_pixel(0, 0).0;
    assert_eq!(px[3], 128);
    assert!(px[0] >= 254);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn null_sink_accepts_everything() {
    let img = RasterImage::transparent(1, 1).unwrap();
    assert!(NullExportSink.export(0, &img).is_ok());
}
