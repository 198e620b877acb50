//! End-to-end tests for structuring and writing extractions.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use unquiz::structure::QuestionPipeline;
use unquiz::{
    DirectorySink, Extraction, Label, MemorySink, MemorySource, NoticeKind, OutputOptions,
    PageExtraction, RawImage, StructureOptions, Unquiz,
};

fn exam_pages() -> Vec<PageExtraction> {
    vec![
        PageExtraction::new(
            1,
            "Section 1: Logical Reasoning\n\
             1. Which number comes next: 2, 4, 8, ?\n\
             [A] 10\n[B] 12\n[C] 16\n[D] 18\n\
             Answer: C\n\
             2. Find the odd one out.\n\
             [A] Cat\n[B] Dog\n[C] Car\n[D] Cow\n\
             Answer: C\n\
             3. Which figure completes the",
        )
        .with_image(RawImage::new(vec![1, 2, 3], 1).with_anchor(160)),
        PageExtraction::new(
            2,
            "pattern shown above?\n\
             (A) Square\n(B) Circle\n(C) Triangle\n(D) Star\n\
             Answer: B\n\
             4. What is 12 x 3?\n\
             A. 36\nB. 33\nC. 39\nD. 30\n\
             Answer: A",
        ),
    ]
}

fn extract(pages: Vec<PageExtraction>) -> Extraction {
    QuestionPipeline::new(StructureOptions::default()).run("exam.pdf", pages.len(), pages)
}

fn written(extraction: &mut Extraction) -> MemorySink {
    let mut sink = MemorySink::new();
    extraction
        .write_to(&mut sink, &OutputOptions::default())
        .unwrap();
    sink
}

#[test]
fn test_question_continues_across_pages() {
    let extraction = extract(exam_pages());
    let q3 = extraction
        .questions
        .iter()
        .find(|q| q.number == 3)
        .unwrap();

    assert_eq!(q3.text, "Which figure completes the pattern shown above?");
    assert_eq!(q3.options.len(), 4);
    assert_eq!(q3.answer, Some(Label::B));
    assert_eq!(q3.page, 1);
}

#[test]
fn test_numbers_sorted_and_unique() {
    let extraction = extract(exam_pages());
    let numbers: Vec<u32> = extraction.questions.iter().map(|q| q.number).collect();
    assert_eq!(numbers, vec![1, 2, 3, 4]);
    assert_eq!(extraction.summary().total_questions_found, 4);
    assert_eq!(extraction.summary().pages_processed, 2);
}

#[test]
fn test_at_most_four_options() {
    let pages = vec![PageExtraction::new(
        1,
        "1. Pick one\n[A] a\n[B] b\n[C] c\n[D] d\n(E) e\nAnswer: A",
    )];
    let extraction = extract(pages);
    assert!(extraction.questions.iter().all(|q| q.options.len() <= 4));
}

#[test]
fn test_output_is_deterministic() {
    let first = written(&mut extract(exam_pages()));
    let second = written(&mut extract(exam_pages()));
    assert_eq!(first.json, second.json);
    assert_eq!(first.images, second.images);
}

/// Every file under `dir`, keyed by relative path.
fn snapshot(dir: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    let mut files = BTreeMap::new();
    for sub in [dir.to_path_buf(), dir.join("images")] {
        for entry in fs::read_dir(&sub).unwrap() {
            let path = entry.unwrap().path();
            if path.is_file() {
                let relative = path.strip_prefix(dir).unwrap().to_path_buf();
                files.insert(relative, fs::read(&path).unwrap());
            }
        }
    }
    files
}

#[test]
fn test_output_on_disk_is_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");

    let mut runs = Vec::new();
    for _ in 0..2 {
        if out.exists() {
            fs::remove_dir_all(&out).unwrap();
        }
        let mut sink = DirectorySink::create(&out).unwrap();
        extract(exam_pages())
            .write_to(&mut sink, &OutputOptions::default())
            .unwrap();
        runs.push(snapshot(&out));
    }

    assert!(runs[0].contains_key(Path::new("structured_questions.json")));
    assert!(runs[0].contains_key(Path::new("images/page1_image1.png")));
    assert_eq!(runs[0], runs[1]);
}

#[test]
fn test_question_image_is_written_twice() {
    let mut extraction = extract(exam_pages());
    let sink = written(&mut extraction);

    let names: BTreeSet<&str> = sink.images.keys().map(String::as_str).collect();
    assert!(names.contains("page1_image1.png"));

    let with_image: Vec<_> = extraction
        .questions
        .iter()
        .filter(|q| q.has_images())
        .collect();
    assert_eq!(with_image.len(), 1);
    for name in with_image[0].image_refs() {
        assert!(names.contains(name), "missing {}", name);
    }
}

#[test]
fn test_every_referenced_file_exists_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let mut extraction = extract(exam_pages());
    let mut sink = DirectorySink::create(dir.path()).unwrap();
    extraction
        .write_to(&mut sink, &OutputOptions::default())
        .unwrap();

    assert!(dir.path().join("structured_questions.json").is_file());
    assert!(dir.path().join("complete_extraction.json").is_file());

    for question in &extraction.questions {
        for name in question.image_refs() {
            assert!(dir.path().join("images").join(name).is_file(), "{}", name);
        }
    }
    for page in &extraction.report.pages {
        for name in page.images.iter().chain(&page.unassociated_images) {
            assert!(dir.path().join("images").join(name).is_file(), "{}", name);
        }
    }
}

#[test]
fn test_structured_questions_json_shape() {
    let mut extraction = extract(exam_pages());
    let sink = written(&mut extraction);

    let json: serde_json::Value =
        serde_json::from_str(&sink.json["structured_questions.json"]).unwrap();
    let first = &json[0];
    assert_eq!(first["question_number"], 1);
    assert_eq!(first["answer"], "C");
    assert_eq!(first["options"][0], "[A] 10");

    let report: serde_json::Value =
        serde_json::from_str(&sink.json["complete_extraction.json"]).unwrap();
    assert_eq!(report["pdf_info"]["filename"], "exam.pdf");
    assert_eq!(report["pdf_info"]["total_pages"], 2);
    assert_eq!(report["pages"].as_array().unwrap().len(), 2);
}

#[test]
fn test_failed_image_write_is_reported() {
    let mut extraction = extract(exam_pages());
    let mut sink = MemorySink::new().fail_on("page1_image1.png");
    extraction
        .write_to(&mut sink, &OutputOptions::default())
        .unwrap();

    assert!(extraction
        .notices
        .iter()
        .any(|n| matches!(n.kind, NoticeKind::ImageWriteFailed { .. })));
    assert!(extraction
        .report
        .pages
        .iter()
        .all(|p| !p.images.iter().any(|name| name == "page1_image1.png")));
}

#[test]
fn test_duplicate_numbers_keep_later_copy() {
    let pages = vec![
        PageExtraction::new(1, "1. First copy\n[A] x\n[B] y\nAnswer: A"),
        PageExtraction::new(2, "1. Second copy\n[A] x\n[B] y\nAnswer: B"),
    ];
    let extraction = QuestionPipeline::new(StructureOptions::new().any_numbering()).run(
        "dup.pdf",
        2,
        pages,
    );

    assert_eq!(extraction.questions.len(), 1);
    assert_eq!(extraction.questions[0].text, "Second copy");
    assert!(extraction
        .notices
        .iter()
        .any(|n| matches!(n.kind, NoticeKind::DuplicateQuestion { .. })));
}

#[test]
fn test_builder_writes_directory() {
    let dir = tempfile::tempdir().unwrap();
    let source = MemorySource::new(exam_pages());
    let builder = Unquiz::new().compact();

    let mut extraction = builder.extract_source("exam.pdf", &source, |_| {}).unwrap();
    builder.write(&mut extraction, dir.path()).unwrap();

    let json = fs::read_to_string(dir.path().join("structured_questions.json")).unwrap();
    assert!(!json.contains('\n'));
}
