mod common;

use common::{at, write_encrypted_pdf, write_pdf};
use pdftxt_core::{BackendError, ExtractionBackend, PageRasterizer};
use pdftxt_mupdf::{LayoutBackend, MupdfBackend, MupdfRasterizer};

#[test]
fn mupdf_reads_each_page() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("two.pdf");
    write_pdf(
        &pdf,
        &[vec![at(72, 700, "First page")], vec![at(72, 700, "Second page")]],
    );

    let pages = MupdfBackend::new().extract_pages(&pdf).unwrap();
    assert_eq!(pages.len(), 2);
    assert!(pages[0].contains("First page"));
    assert!(pages[1].contains("Second page"));
}

#[test]
fn blank_page_gets_marker() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("gap.pdf");
    write_pdf(&pdf, &[vec![at(72, 700, "Cover")], vec![]]);

    let text = MupdfBackend::new().extract_text(&pdf).unwrap();
    assert!(text.contains("Cover"));
    assert!(text.contains("[Page 2: no extractable text - may be image-based]"));
}

#[test]
fn all_blank_is_no_text() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("blank.pdf");
    write_pdf(&pdf, &[vec![], vec![]]);

    assert!(matches!(
        MupdfBackend::new().extract_text(&pdf),
        Err(BackendError::NoText)
    ));
}

#[test]
fn password_protected_pdf_is_encrypted() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("locked.pdf");
    write_encrypted_pdf(&pdf, &[vec![at(72, 700, "Secret")]], "hunter2");

    assert!(matches!(
        MupdfBackend::new().extract_pages(&pdf),
        Err(BackendError::Encrypted)
    ));
    assert!(matches!(
        LayoutBackend::new().extract_pages(&pdf),
        Err(BackendError::Encrypted)
    ));
}

#[test]
fn document_without_pages_is_no_pages() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("empty.pdf");
    write_pdf(&pdf, &[]);

    assert!(matches!(
        MupdfBackend::new().extract_pages(&pdf),
        Err(BackendError::NoPages)
    ));
    assert!(matches!(
        LayoutBackend::new().extract_pages(&pdf),
        Err(BackendError::NoPages)
    ));
}

#[test]
fn garbage_file_fails_to_open() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("junk.pdf");
    std::fs::write(&pdf, b"not a pdf at all").unwrap();

    assert!(MupdfBackend::new().extract_pages(&pdf).is_err());
}

#[test]
fn layout_joins_cells_on_one_baseline() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("table.pdf");
    write_pdf(
        &pdf,
        &[vec![
            at(72, 700, "Item"),
            at(300, 700, "Qty"),
            at(72, 680, "Apples"),
            at(300, 680, "42"),
        ]],
    );

    let pages = LayoutBackend::new().extract_pages(&pdf).unwrap();
    let rows: Vec<Vec<&str>> = pages[0]
        .lines()
        .map(|l| l.split_whitespace().collect())
        .collect();
    assert_eq!(rows, vec![vec!["Item", "Qty"], vec!["Apples", "42"]]);
}

#[test]
fn rasterizer_writes_one_image_per_page() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("scan.pdf");
    write_pdf(&pdf, &[vec![at(72, 700, "A")], vec![]]);
    let out = tempfile::tempdir().unwrap();

    let images = MupdfRasterizer::new().rasterize(&pdf, 72, out.path()).unwrap();
    assert_eq!(images.len(), 2);
    for image in images {
        assert!(image.is_file());
        assert_eq!(image.extension().unwrap(), "png");
    }
}
