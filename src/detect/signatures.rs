//! Builtin signature predicates and the caps they announce.
//!
//! Each predicate inspects only the prebuffered header sample it is
//! given. Ordering matters and is fixed in [`default_detectors`]:
//! container-sensitive checks (calendar, mbox, eml) run before generic
//! document checks, OOXML before plain ZIP, and the text-density
//! heuristic runs last because almost anything printable satisfies it.

use crate::caps::{Caps, ParamValue};
use crate::detect::Detector;
use once_cell::sync::Lazy;
use regex::Regex;

/// Bytes of the sample the text-density heuristic examines.
pub const PREVIEW_LEN: usize = 2048;

/// Minimum fraction of printable bytes for the text-document fallback.
pub const TEXT_DENSITY_THRESHOLD: f64 = 0.85;

/// Postmark line at the top of an mbox file: `From sender@host <date ending in a year>`.
static MBOX_FROM_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^From \S+ .+\d{4}$").expect("mbox postmark regex is valid")
});

// ============================================================================
// Caps constructors
// ============================================================================

/// Caps for generic documents (PDF, office files, rich text).
pub fn document_caps() -> Caps {
    Caps::new("document", "document")
        .with_param("description", "formatted document")
        .with_param("extensions", ParamValue::list(["pdf", "doc", "docx", "odt", "rtf"]))
        .with_uri("urn:typeflow:caps:document")
        .with_broader(["urn:typeflow:category:content"])
}

/// Caps for raster images.
pub fn image_caps() -> Caps {
    Caps::new("image", "image-photo")
        .with_param("description", "raster image")
        .with_param("extensions", ParamValue::list(["png", "jpg", "jpeg", "gif"]))
        .with_uri("urn:typeflow:caps:image-photo")
        .with_broader(["urn:typeflow:category:content"])
}

/// Caps for video containers.
pub fn video_caps() -> Caps {
    Caps::new("video", "video")
        .with_param("description", "video container")
        .with_param("extensions", ParamValue::list(["mp4", "m4v", "mov"]))
        .with_uri("urn:typeflow:caps:video")
        .with_broader(["urn:typeflow:category:content"])
}

/// Caps for a single mail message (RFC 822 / eml).
pub fn mail_caps() -> Caps {
    Caps::new("mail", "mail")
        .with_param("description", "mail message")
        .with_param("extensions", ParamValue::list(["eml"]))
        .with_uri("urn:typeflow:caps:mail")
        .with_broader(["urn:typeflow:category:content"])
}

/// Caps for a mailbox container holding many messages.
pub fn mbox_caps() -> Caps {
    Caps::new("mail", "mbox")
        .with_param("description", "mailbox container")
        .with_param("extensions", ParamValue::list(["mbox"]))
        .with_uri("urn:typeflow:caps:mbox")
        .with_broader(["urn:typeflow:category:content"])
}

/// Caps for calendar data (iCalendar).
pub fn calendar_caps() -> Caps {
    Caps::new("calendar", "calendar")
        .with_param("description", "calendar data")
        .with_param("extensions", ParamValue::list(["ics", "ifb"]))
        .with_uri("urn:typeflow:caps:calendar")
        .with_broader(["urn:typeflow:category:content"])
}

/// Caps for opaque binary files (archives, executables).
pub fn binary_caps() -> Caps {
    Caps::new("application", "binary-file")
        .with_param("description", "opaque binary file")
        .with_param("extensions", ParamValue::list(["zip", "bin", "so", "elf"]))
        .with_uri("urn:typeflow:caps:binary-file")
        .with_broader(["urn:typeflow:category:content"])
}

/// Caps for plain text with no stronger signature.
pub fn text_caps() -> Caps {
    Caps::new("text/plain", "plain-text")
        .with_param("description", "plain text")
        .with_param("extensions", ParamValue::list(["txt", "text", "md"]))
        .with_uri("urn:typeflow:caps:plain-text")
        .with_broader(["urn:typeflow:category:content"])
}

// ============================================================================
// Predicates
// ============================================================================

fn first_line(data: &[u8]) -> &[u8] {
    let end = data.iter().position(|&b| b == b'\n').unwrap_or(data.len());
    let line = &data[..end];
    line.strip_suffix(b"\r").unwrap_or(line)
}

fn contains_ignore_case(data: &[u8], needle: &[u8]) -> bool {
    data.windows(needle.len()).any(|w| w.eq_ignore_ascii_case(needle))
}

fn preview_window(data: &[u8]) -> &[u8] {
    &data[..data.len().min(PREVIEW_LEN)]
}

pub(crate) fn is_calendar(data: &[u8]) -> bool {
    let window = preview_window(data);
    contains_ignore_case(window, b"BEGIN:VCALENDAR")
        && contains_ignore_case(window, b"END:VCALENDAR")
}

pub(crate) fn is_mbox(data: &[u8]) -> bool {
    let Ok(line) = std::str::from_utf8(first_line(data)) else {
        return false;
    };
    MBOX_FROM_LINE.is_match(line.trim_end())
}

pub(crate) fn is_eml(data: &[u8]) -> bool {
    // Header-only evidence: From and Subject fields anywhere in the
    // header block, with no mbox postmark line (checked earlier).
    let window = preview_window(data);
    contains_ignore_case(window, b"from:") && contains_ignore_case(window, b"subject:")
}

pub(crate) fn is_pdf(data: &[u8]) -> bool {
    data.starts_with(b"%PDF-")
}

pub(crate) fn is_png(data: &[u8]) -> bool {
    data.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A])
}

pub(crate) fn is_jpeg(data: &[u8]) -> bool {
    data.starts_with(&[0xFF, 0xD8, 0xFF])
}

pub(crate) fn is_gif(data: &[u8]) -> bool {
    data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a")
}

pub(crate) fn is_mp4(data: &[u8]) -> bool {
    data.len() >= 12 && &data[4..8] == b"ftyp"
}

pub(crate) fn is_zip(data: &[u8]) -> bool {
    data.starts_with(b"PK\x03\x04")
}

pub(crate) fn is_ooxml(data: &[u8]) -> bool {
    if !is_zip(data) {
        return false;
    }
    // Office files are ZIP containers whose early entries name the package
    // layout. The sample is small, so a linear scan is fine.
    const MARKERS: [&[u8]; 4] = [b"[Content_Types].xml", b"word/", b"ppt/", b"xl/"];
    MARKERS
        .iter()
        .any(|marker| data.windows(marker.len()).any(|w| w == *marker))
}

pub(crate) fn is_elf(data: &[u8]) -> bool {
    data.starts_with(b"\x7fELF")
}

pub(crate) fn is_text_document(data: &[u8]) -> bool {
    if data.is_empty() {
        return false;
    }
    let sample = preview_window(data);
    // Calendar payloads are printable too; an opening marker anywhere in
    // the window reserves the sample for the calendar check.
    if contains_ignore_case(sample, b"BEGIN:VCALENDAR") {
        return false;
    }
    let printable = sample
        .iter()
        .filter(|&&b| b == b'\t' || b == b'\n' || b == b'\r' || (0x20..0x7F).contains(&b))
        .count();
    printable as f64 / sample.len() as f64 >= TEXT_DENSITY_THRESHOLD
}

// ============================================================================
// Default chain
// ============================================================================

/// The builtin detector chain, in evaluation order.
pub fn default_detectors() -> Vec<Detector> {
    vec![
        Detector::new("calendar", calendar_caps(), |d| Ok(is_calendar(d))),
        Detector::new("mbox", mbox_caps(), |d| Ok(is_mbox(d))),
        Detector::new("eml", mail_caps(), |d| Ok(is_eml(d))),
        Detector::new("pdf", document_caps(), |d| Ok(is_pdf(d))),
        Detector::new("ooxml-zip", document_caps(), |d| Ok(is_ooxml(d))),
        Detector::new("mp4", video_caps(), |d| Ok(is_mp4(d))),
        Detector::new("png", image_caps(), |d| Ok(is_png(d))),
        Detector::new("jpeg", image_caps(), |d| Ok(is_jpeg(d))),
        Detector::new("gif", image_caps(), |d| Ok(is_gif(d))),
        Detector::new("zip", binary_caps(), |d| Ok(is_zip(d))),
        Detector::new("elf", binary_caps(), |d| Ok(is_elf(d))),
        Detector::new("text-document", text_caps(), |d| Ok(is_text_document(d))),
    ]
}
