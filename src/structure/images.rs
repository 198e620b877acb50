//! Assigning page images to questions and option slots.
//!
//! Images are walked in reading order (by text anchor, then by their order
//! on the page). Each one belongs to the last question that starts before
//! its anchor. The first image of a question illustrates the question
//! itself; later ones illustrate options.

use std::ops::Range;

use crate::model::{Notice, NoticeKind, Partial, Question, RawImage};

/// A `(filename, bytes)` pair for the output sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageOutput {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// A question together with the byte range of its chunk in the page text.
#[derive(Debug, Clone)]
pub struct PlacedQuestion {
    pub span: Range<usize>,
    pub question: Question,
}

/// What the associator produced for one page.
#[derive(Debug, Clone, Default)]
pub struct Association {
    /// Archive filenames, in page order
    pub archive: Vec<String>,

    /// Archive and role-assigned copies to persist
    pub outputs: Vec<ImageOutput>,

    /// Images no question could take
    pub unassociated: Vec<String>,
}

/// Maps raw images to question and option slots.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageAssociator;

impl ImageAssociator {
    pub fn new() -> Self {
        Self
    }

    /// Assign `images` on page `page_index`.
    ///
    /// `placed` must be ordered by span start. `carried` is the open question
    /// from the previous page; it takes images that precede the first
    /// question on this page.
    pub fn associate(
        &self,
        page_index: u32,
        images: Vec<RawImage>,
        text_len: usize,
        mut carried: Option<&mut Question>,
        placed: &mut [PlacedQuestion],
    ) -> Partial<Association> {
        let mut association = Association {
            archive: images.iter().map(|i| i.archive_name(page_index)).collect(),
            ..Association::default()
        };
        let mut notices = Vec::new();

        let mut ordered = images;
        ordered.sort_by_key(|image| (image.anchor.unwrap_or(text_len), image.source_index));

        let mut option_index = 0usize;
        for image in ordered {
            let archive_name = image.archive_name(page_index);
            let anchor = image.anchor.unwrap_or(text_len);
            let owner_slot = placed.partition_point(|p| p.span.start < anchor);

            let owner = match owner_slot.checked_sub(1) {
                Some(i) => Some(&mut placed[i].question),
                None => carried.as_deref_mut(),
            };

            match owner {
                Some(question) => match assign(page_index, question, &mut option_index) {
                    Ok(role_name) => association.outputs.push(ImageOutput {
                        filename: role_name,
                        bytes: image.bytes.clone(),
                    }),
                    Err(()) => {
                        notices.push(
                            Notice::new(NoticeKind::OptionImageOverflow {
                                filename: archive_name.clone(),
                            })
                            .on_page(page_index)
                            .for_question(question.number),
                        );
                        association.unassociated.push(archive_name.clone());
                    }
                },
                None => {
                    notices.push(
                        Notice::new(NoticeKind::UnassociatedImage {
                            filename: archive_name.clone(),
                        })
                        .on_page(page_index),
                    );
                    association.unassociated.push(archive_name.clone());
                }
            }

            association.outputs.push(ImageOutput {
                filename: archive_name,
                bytes: image.bytes,
            });
        }

        Partial::with_notices(association, notices)
    }
}

/// Give `question` its next image slot and return the role filename.
fn assign(page_index: u32, question: &mut Question, option_index: &mut usize) -> Result<String, ()> {
    if question.question_image.is_none() {
        let name = format!("page{}_question{}.png", page_index, question.number);
        question.question_image = Some(name.clone());
        return Ok(name);
    }
    if !question.has_option_image_room() {
        return Err(());
    }
    let name = format!("page{}_option{}.png", page_index, option_index);
    *option_index += 1;
    question.option_images.push(name.clone());
    Ok(name)
}
