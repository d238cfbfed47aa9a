use bantay_common::types::{PostCategory, PostStatus, PublicPostInput, MAX_POST_IMAGE_BYTES};
use bantay_common::FieldErrors;

use crate::fields::{Checker, Presence::*};
use crate::{Mode, RawRecord};

pub fn validate_post(record: &RawRecord, _mode: &Mode) -> Result<PublicPostInput, FieldErrors> {
    let mut c = Checker::new(record);

    let title = c.string("title", Required, 255);
    let content = c.string("content", Required, 65_535);
    let category = c.choice::<PostCategory>("category", Optional);
    let status = c.choice::<PostStatus>("status", Required);
    let published_at = c.date("published_at", Optional);

    let (Some(title), Some(content), Some(status)) = (title, content, status) else {
        return Err(c.into_errors());
    };
    if c.has_errors() {
        return Err(c.into_errors());
    }

    if status == PostStatus::Scheduled && published_at.is_none() {
        c.fail("published_at", "required_if", &[]);
        return Err(c.into_errors());
    }

    Ok(PublicPostInput {
        title,
        content,
        category,
        status,
        published_at,
    })
}

/// Accepted post image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
    Webp,
}

impl ImageKind {
    pub fn ext(&self) -> &'static str {
        match self {
            ImageKind::Jpeg => "jpg",
            ImageKind::Png => "png",
            ImageKind::Webp => "webp",
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            ImageKind::Jpeg => "image/jpeg",
            ImageKind::Png => "image/png",
            ImageKind::Webp => "image/webp",
        }
    }

    fn from_mime(mime: &str) -> Option<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Some(ImageKind::Jpeg),
            "image/png" => Some(ImageKind::Png),
            "image/webp" => Some(ImageKind::Webp),
            _ => None,
        }
    }

    fn from_file_name(name: &str) -> Option<Self> {
        let (_, ext) = name.rsplit_once('.')?;
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(ImageKind::Jpeg),
            "png" => Some(ImageKind::Png),
            "webp" => Some(ImageKind::Webp),
            _ => None,
        }
    }
}

/// Checks an uploaded post image. The declared content type decides the
/// format; the file name extension is consulted only when the client sent a
/// generic or empty type.
pub fn validate_post_image(
    content_type: Option<&str>,
    file_name: Option<&str>,
    size: usize,
) -> Result<ImageKind, FieldErrors> {
    let mut errors = FieldErrors::new();

    let kind = match content_type.filter(|t| !t.trim().is_empty()) {
        Some(t) if t.trim().eq_ignore_ascii_case("application/octet-stream") => {
            file_name.and_then(ImageKind::from_file_name)
        }
        Some(t) => ImageKind::from_mime(t),
        None => file_name.and_then(ImageKind::from_file_name),
    };

    let Some(kind) = kind else {
        errors.add("image", crate::messages::message("image.mimes", &[]));
        return Err(errors);
    };
    if size > MAX_POST_IMAGE_BYTES {
        let max_kb = (MAX_POST_IMAGE_BYTES / 1024).to_string();
        errors.add("image", crate::messages::message("image.max", &[("max", &max_kb)]));
        return Err(errors);
    }
    Ok(kind)
}
