//! Decoding tests against PDFs built in memory.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use unquiz::{DecodeOptions, Error, PageSource, PdfDecoder, Unquiz};

fn zero() -> Object {
    Object::Integer(0)
}

fn text(x: i64, y: i64, line: &str) -> Vec<Operation> {
    vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), Object::Integer(12)]),
        Operation::new("Td", vec![x.into(), y.into()]),
        Operation::new("Tj", vec![Object::string_literal(line)]),
        Operation::new("ET", vec![]),
    ]
}

fn image(name: &str, x: i64, y: i64, size: i64) -> Vec<Operation> {
    vec![
        Operation::new("q", vec![]),
        Operation::new(
            "cm",
            vec![size.into(), zero(), zero(), size.into(), x.into(), y.into()],
        ),
        Operation::new("Do", vec![name.into()]),
        Operation::new("Q", vec![]),
    ]
}

fn image_stream(color_space: &str, samples: Vec<u8>) -> Stream {
    Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => 2,
            "Height" => 2,
            "ColorSpace" => color_space,
            "BitsPerComponent" => 8,
        },
        samples,
    )
}

/// A 2x2 RGB image.
fn rgb_image() -> Stream {
    image_stream(
        "DeviceRGB",
        vec![255, 0, 0, 0, 255, 0, 0, 0, 255, 255, 255, 255],
    )
}

/// One page drawing `operations` with `images` as named XObjects.
fn build(images: Vec<(&str, Stream)>, operations: Vec<Operation>) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let mut xobjects = lopdf::Dictionary::new();
    for (name, stream) in images {
        xobjects.set(name, doc.add_object(stream));
    }
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
        "XObject" => xobjects,
    });

    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "Resources" => resources_id,
            "MediaBox" => vec![zero(), zero(), Object::Integer(612), Object::Integer(792)],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

/// One page: question 1, a 2x2 RGB image, then question 2.
fn build_pdf() -> Vec<u8> {
    let mut operations = text(72, 700, "1. Which shape is shown?");
    operations.extend(text(72, 680, "[A] Square [B] Circle"));
    operations.extend(image("Im1", 72, 560, 100));
    operations.extend(text(72, 520, "Answer: B"));
    operations.extend(text(72, 480, "2. What is 2 + 2?"));
    operations.extend(text(72, 460, "[A] 3 [B] 4"));
    operations.extend(text(72, 440, "Answer: B"));
    build(vec![("Im1", rgb_image())], operations)
}

#[test]
fn test_decode_text_and_image() {
    let decoder = PdfDecoder::from_bytes(&build_pdf(), DecodeOptions::default()).unwrap();
    assert_eq!(decoder.page_count(), 1);
    assert_eq!(decoder.header().version, "1.5");

    let page = decoder.decode_page(1).unwrap();
    assert!(page.raw_text.starts_with("1. Which shape is shown?\n"));
    assert!(page.raw_text.contains("2. What is 2 + 2?"));

    assert_eq!(page.raw_images.len(), 1);
    let image = &page.raw_images[0];
    assert_eq!(image.source_index, 1);
    assert!(image.bytes.starts_with(b"\x89PNG"));
    assert_eq!(image.anchor, page.raw_text.find("Answer: B"));
}

#[test]
fn test_text_only_skips_images() {
    let options = DecodeOptions::new().text_only();
    let decoder = PdfDecoder::from_bytes(&build_pdf(), options).unwrap();
    let pages = decoder.pages().unwrap();
    assert_eq!(pages.len(), 1);
    assert!(pages[0].raw_images.is_empty());
}

#[test]
fn test_skipped_image_keeps_numbering() {
    let mut operations = text(72, 700, "1. Which one?");
    operations.extend(image("Im1", 72, 560, 100));
    operations.extend(image("Im2", 72, 420, 100));
    operations.extend(text(72, 380, "[A] x [B] y"));
    let cmyk = image_stream("DeviceCMYK", vec![0; 16]);
    let pdf = build(vec![("Im1", cmyk), ("Im2", rgb_image())], operations);

    let decoder = PdfDecoder::from_bytes(&pdf, DecodeOptions::default()).unwrap();
    let page = decoder.decode_page(1).unwrap();
    assert_eq!(page.raw_images.len(), 1);
    assert_eq!(page.raw_images[0].source_index, 2);
    assert_eq!(page.raw_images[0].archive_name(1), "page1_image2.png");
}

#[test]
fn test_page_out_of_range() {
    let decoder = PdfDecoder::from_bytes(&build_pdf(), DecodeOptions::default()).unwrap();
    assert!(decoder.decode_page(2).is_err());
}

#[test]
fn test_not_a_pdf() {
    let result = PdfDecoder::from_bytes(b"PK\x03\x04 not a pdf", DecodeOptions::default());
    assert!(matches!(result, Err(Error::UnknownFormat)));
}

#[test]
fn test_decoded_pdf_to_questions() {
    let decoder = PdfDecoder::from_bytes(&build_pdf(), DecodeOptions::default()).unwrap();
    let extraction = Unquiz::new()
        .extract_source("built.pdf", &decoder, |_| {})
        .unwrap();

    assert_eq!(extraction.questions.len(), 2);
    let q1 = &extraction.questions[0];
    assert_eq!(q1.text, "Which shape is shown?");
    assert_eq!(q1.options.len(), 2);
    assert_eq!(q1.question_image.as_deref(), Some("page1_question1.png"));
    assert_eq!(extraction.report.pages[0].images, vec!["page1_image1.png"]);
    assert_eq!(extraction.summary().total_images_extracted, 1);
}

#[test]
fn test_written_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("built.pdf");
    std::fs::write(&pdf, build_pdf()).unwrap();

    let out = dir.path().join("out");
    let extraction = Unquiz::new().extract_to(&pdf, &out).unwrap();

    assert_eq!(extraction.report.pdf_info.filename, "built.pdf");
    assert!(out.join("images").join("page1_image1.png").is_file());
    assert!(out.join("images").join("page1_question1.png").is_file());
    assert!(out.join("complete_extraction.json").is_file());
}
