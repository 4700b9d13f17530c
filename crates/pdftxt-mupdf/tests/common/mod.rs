//! Builds small single-font PDFs with lopdf for backend tests.

use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{Document, EncryptionState, EncryptionVersion, Object, Permissions, Stream, dictionary};

/// One piece of text placed at `(x, y)` in PDF user space (origin bottom-left).
pub struct Placed<'a> {
    pub x: i64,
    pub y: i64,
    pub text: &'a str,
}

pub fn at(x: i64, y: i64, text: &str) -> Placed<'_> {
    Placed { x, y, text }
}

/// Write a PDF with one page per entry of `pages`. An empty entry is a blank page.
pub fn write_pdf(path: &Path, pages: &[Vec<Placed<'_>>]) {
    build_pdf(pages).save(path).unwrap();
}

/// Like [`write_pdf`], but encrypted so it cannot be opened without `user_password`.
pub fn write_encrypted_pdf(path: &Path, pages: &[Vec<Placed<'_>>], user_password: &str) {
    let mut doc = build_pdf(pages);
    doc.trailer.set(
        "ID",
        vec![
            Object::string_literal("pdftxt-fixture-1"),
            Object::string_literal("pdftxt-fixture-1"),
        ],
    );
    let state = EncryptionState::try_from(EncryptionVersion::V2 {
        document: &doc,
        owner_password: "owner",
        user_password,
        key_length: 128,
        permissions: Permissions::default(),
    })
    .unwrap();
    doc.encrypt(&state).unwrap();
    doc.save(path).unwrap();
}

fn build_pdf(pages: &[Vec<Placed<'_>>]) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids = Vec::new();
    for placed in pages {
        let mut operations = Vec::new();
        for item in placed {
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new("Tf", vec!["F1".into(), 12.into()]));
            operations.push(Operation::new("Td", vec![item.x.into(), item.y.into()]));
            operations.push(Operation::new(
                "Tj",
                vec![Object::string_literal(item.text)],
            ));
            operations.push(Operation::new("ET", vec![]));
        }
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    let pages_dict = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => count,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}
