//! Integration tests for the typeflow pipeline system.

use std::io::Write;
use std::sync::atomic::Ordering;

use tempfile::NamedTempFile;
use typeflow::caps::Caps;
use typeflow::classify::{Classify, ClassifyError, ClassifyRequest};
use typeflow::elements::testing::{ProbeSink, StaticSrc};
use typeflow::elements::{
    CapsFilter, CollectSink, NegotiationPolicy, PassThrough, PrebufferSrc,
};
use typeflow::payload::Payload;
use typeflow::pipeline::Pipeline;
use typeflow::Error;

fn temp_file_with(content: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content).unwrap();
    file.flush().unwrap();
    file
}

fn run_detection(content: &[u8]) -> String {
    let file = temp_file_with(content);
    let mut pipeline = Pipeline::new();
    let src = pipeline.add(PrebufferSrc::new(file.path().to_string_lossy().to_string()));
    let sink = pipeline.add(CollectSink::new());
    pipeline.link_many(&[src, sink]).unwrap();
    match pipeline.run().unwrap() {
        Some(Payload::Text(text)) => text,
        other => panic!("expected text output, got {other:?}"),
    }
}

/// A PDF file flows source -> passthrough -> sink and comes out as a
/// document summary resolved from the header.
#[test]
fn test_pdf_detection_end_to_end() {
    let file = temp_file_with(b"%PDF-1.7\n%\xE2\xE3\xCF\xD3\n1 0 obj\n");
    let mid_elem = PassThrough::new();
    let mid_counter = mid_elem.counter();

    let mut pipeline = Pipeline::new();
    let src = pipeline.add(PrebufferSrc::new(file.path().to_string_lossy().to_string()));
    let mid = pipeline.add(mid_elem);
    let sink = pipeline.add(CollectSink::new());
    pipeline.link_many(&[src, mid, sink]).unwrap();

    let output = pipeline.run().unwrap().unwrap();
    let Payload::Text(summary) = output else {
        panic!("expected text output");
    };
    let parsed: serde_json::Value = serde_json::from_str(&summary).unwrap();
    assert_eq!(parsed["name"], "document");
    assert_eq!(parsed["type-source"], "header");
    assert_eq!(parsed["source"], "header");
    assert_eq!(mid_counter.load(Ordering::Relaxed), 1);
}

#[test]
fn test_png_detection() {
    let mut png = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    png.extend_from_slice(&[0, 0, 0, 13]);
    png.extend_from_slice(b"IHDR");
    let summary = run_detection(&png);
    let parsed: serde_json::Value = serde_json::from_str(&summary).unwrap();
    assert_eq!(parsed["name"], "image-photo");
    assert_eq!(parsed["media_type"], "image");
}

/// An OOXML document is reported as a document, while a plain ZIP with
/// no package markers stays a binary file.
#[test]
fn test_ooxml_wins_over_plain_zip() {
    let mut docx = b"PK\x03\x04\x14\x00\x06\x00".to_vec();
    docx.extend_from_slice(b"[Content_Types].xml");
    let parsed: serde_json::Value = serde_json::from_str(&run_detection(&docx)).unwrap();
    assert_eq!(parsed["name"], "document");

    let zip = b"PK\x03\x04\x14\x00\x06\x00notes.txt";
    let parsed: serde_json::Value = serde_json::from_str(&run_detection(zip)).unwrap();
    assert_eq!(parsed["name"], "binary-file");
}

/// A mailbox container is distinguished from a single message.
#[test]
fn test_mbox_vs_single_message() {
    let mbox = b"From alice@example.org Sat Jan  3 01:05:34 1996\nFrom: alice@example.org\nSubject: hi\n";
    let parsed: serde_json::Value = serde_json::from_str(&run_detection(mbox)).unwrap();
    assert_eq!(parsed["name"], "mbox");

    let eml = b"From: alice@example.org\nTo: bob@example.com\nSubject: hi\n";
    let parsed: serde_json::Value = serde_json::from_str(&run_detection(eml)).unwrap();
    assert_eq!(parsed["name"], "mail");
}

#[test]
fn test_calendar_detection() {
    let ics = b"BEGIN:VCALENDAR\r\nVERSION:2.0\r\nBEGIN:VEVENT\r\nEND:VEVENT\r\nEND:VCALENDAR\r\n";
    let parsed: serde_json::Value = serde_json::from_str(&run_detection(ics)).unwrap();
    assert_eq!(parsed["name"], "calendar");
}

/// A large printable file with no signature falls through to the
/// text-density heuristic.
#[test]
fn test_large_text_file_detected_as_text() {
    let prose = "All work and no play makes for dense prose in every line.\n".repeat(200);
    assert!(prose.len() > 10_000);
    let parsed: serde_json::Value = serde_json::from_str(&run_detection(prose.as_bytes())).unwrap();
    assert_eq!(parsed["name"], "plain-text");
    assert_eq!(parsed["source"], "header");
}

/// High-entropy noise with no classifier configured exhausts detection.
#[test]
fn test_noise_without_classifier_exhausts_detection() {
    let noise: Vec<u8> = (0..512u32).map(|i| (i.wrapping_mul(197) as u8) | 0x80).collect();
    let file = temp_file_with(&noise);
    let mut pipeline = Pipeline::new();
    let src = pipeline.add(PrebufferSrc::new(file.path().to_string_lossy().to_string()));
    let sink = pipeline.add(CollectSink::new());
    pipeline.link_many(&[src, sink]).unwrap();
    assert!(matches!(pipeline.run(), Err(Error::DetectionExhausted)));
}

struct FixedClassifier {
    result: Result<Caps, fn() -> ClassifyError>,
}

impl Classify for FixedClassifier {
    fn classify(&self, request: &ClassifyRequest<'_>) -> Result<Caps, ClassifyError> {
        assert!(!request.header_hex.is_empty());
        match &self.result {
            Ok(caps) => Ok(caps.clone()),
            Err(make) => Err(make()),
        }
    }
}

/// When no detector matches, the classifier names the type and the
/// summary records the classifier as the type source.
#[test]
fn test_classifier_fallback_names_type() {
    let noise: Vec<u8> = (0..512u32).map(|i| (i.wrapping_mul(197) as u8) | 0x80).collect();
    let file = temp_file_with(&noise);

    let classifier = FixedClassifier {
        result: Ok(Caps::new("application/x-custom", "custom-blob")),
    };
    let mut pipeline = Pipeline::new();
    let src = pipeline.add(
        PrebufferSrc::new(file.path().to_string_lossy().to_string()).with_classifier(classifier),
    );
    let sink = pipeline.add(CollectSink::new());
    pipeline.link_many(&[src, sink]).unwrap();

    let Some(Payload::Text(summary)) = pipeline.run().unwrap() else {
        panic!("expected text output");
    };
    let parsed: serde_json::Value = serde_json::from_str(&summary).unwrap();
    assert_eq!(parsed["name"], "custom-blob");
    assert_eq!(parsed["source"], "classifier");
}

/// Classifier failures surface distinctly, not as detection misses.
#[test]
fn test_classifier_errors_surface() {
    let noise: Vec<u8> = (0..512u32).map(|i| (i.wrapping_mul(197) as u8) | 0x80).collect();

    let unavailable = FixedClassifier {
        result: Err(|| ClassifyError::Unavailable("connection refused".to_string())),
    };
    let file = temp_file_with(&noise);
    let mut pipeline = Pipeline::new();
    let src = pipeline.add(
        PrebufferSrc::new(file.path().to_string_lossy().to_string()).with_classifier(unavailable),
    );
    let sink = pipeline.add(CollectSink::new());
    pipeline.link_many(&[src, sink]).unwrap();
    assert!(matches!(pipeline.run(), Err(Error::ClassifierUnavailable(_))));

    let malformed = FixedClassifier {
        result: Err(|| ClassifyError::Malformed("no JSON object".to_string())),
    };
    let file = temp_file_with(&noise);
    let mut pipeline = Pipeline::new();
    let src = pipeline.add(
        PrebufferSrc::new(file.path().to_string_lossy().to_string()).with_classifier(malformed),
    );
    let sink = pipeline.add(CollectSink::new());
    pipeline.link_many(&[src, sink]).unwrap();
    assert!(matches!(pipeline.run(), Err(Error::ClassifierMalformed(_))));
}

/// The prebuffer limit bounds both what is read and what is pushed.
#[test]
fn test_prebuffer_limits_read_and_push() {
    let mut content = b"%PDF-1.7\n".to_vec();
    content.extend(std::iter::repeat(b'x').take(100_000));
    let file = temp_file_with(&content);

    let mut pipeline = Pipeline::new();
    let src = pipeline.add(
        PrebufferSrc::new(file.path().to_string_lossy().to_string()).with_prebuffer_bytes(16),
    );
    let (probe, received) = ProbeSink::new("probe");
    let sink = pipeline.add(probe);
    pipeline.link_many(&[src, sink]).unwrap();
    pipeline.run().unwrap();

    let received = received.lock().unwrap();
    let Payload::Record(record) = &received[0] else {
        panic!("expected record payload");
    };
    assert_eq!(record.get_bytes("data").unwrap().len(), 16);
}

#[test]
fn test_missing_file_is_reported() {
    let mut pipeline = Pipeline::new();
    let src = pipeline.add(PrebufferSrc::new("file:///nonexistent/path/data.bin"));
    let sink = pipeline.add(CollectSink::new());
    pipeline.link_many(&[src, sink]).unwrap();
    assert!(matches!(
        pipeline.run(),
        Err(Error::MissingResource { uri }) if uri.contains("nonexistent")
    ));
}

/// An unreadable location surfaces as a missing resource, not a raw I/O
/// error.
#[cfg(unix)]
#[test]
fn test_unreadable_resource_is_missing() {
    let dir = tempfile::tempdir().unwrap();
    let link = dir.path().join("report.pdf");
    std::os::unix::fs::symlink(dir.path().join("gone.bin"), &link).unwrap();

    let mut pipeline = Pipeline::new();
    let src = pipeline.add(PrebufferSrc::new(link.to_string_lossy().to_string()));
    let sink = pipeline.add(CollectSink::new());
    pipeline.link_many(&[src, sink]).unwrap();
    assert!(matches!(pipeline.run(), Err(Error::MissingResource { .. })));
}

/// Source that broadcasts a single custom event from its src pads.
struct EventEmitter {
    event: typeflow::event::Event,
}

impl typeflow::element::Element for EventEmitter {
    fn name(&self) -> &str {
        "event-emitter"
    }

    fn element_type(&self) -> typeflow::element::ElementType {
        typeflow::element::ElementType::Source
    }

    fn process(
        &mut self,
        ctx: &mut typeflow::element::ExecCtx<'_>,
        id: typeflow::element::ElementId,
    ) -> typeflow::Result<()> {
        ctx.send_event(id, &self.event)
    }
}

/// A custom event nobody recognizes fails loudly instead of vanishing.
#[test]
fn test_unknown_custom_event_is_unhandled() {
    use typeflow::event::Event;

    let mut pipeline = Pipeline::new();
    let src = pipeline.add(EventEmitter {
        event: Event::Custom {
            name: "flush".to_string(),
            payload: None,
        },
    });
    let (probe, _) = ProbeSink::new("probe");
    let sink = pipeline.add(probe);
    pipeline.link_many(&[src, sink]).unwrap();

    assert!(matches!(
        pipeline.run(),
        Err(Error::UnhandledEvent { name }) if name == "flush"
    ));
}

/// A custom event named "caps" whose payload is not a caps value is a
/// caps error, not an unhandled event.
#[test]
fn test_custom_caps_event_without_caps_payload() {
    use typeflow::event::Event;

    let mut pipeline = Pipeline::new();
    let src = pipeline.add(EventEmitter {
        event: Event::Custom {
            name: "caps".to_string(),
            payload: Some(Payload::Text("document".to_string())),
        },
    });
    let (probe, _) = ProbeSink::new("probe");
    let sink = pipeline.add(probe);
    pipeline.link_many(&[src, sink]).unwrap();

    assert!(matches!(pipeline.run(), Err(Error::CapsType(_))));
}

/// A strict caps filter that refuses the announced type aborts the run.
#[test]
fn test_strict_filter_rejects_run() {
    let file = temp_file_with(b"%PDF-1.7\nrest");
    let mut pipeline = Pipeline::new();
    let src = pipeline.add(PrebufferSrc::new(file.path().to_string_lossy().to_string()));
    let filter = pipeline.add(CapsFilter::new(["image-photo"]));
    let sink = pipeline.add(CollectSink::new());
    pipeline.link_many(&[src, filter, sink]).unwrap();
    assert!(matches!(pipeline.run(), Err(Error::Negotiation { .. })));
}

/// A permissive filter records the refusal but lets the exact payload
/// through unchanged.
#[test]
fn test_permissive_filter_forwards_payload() {
    let caps = Caps::new("document", "document");
    let payload = Payload::Text("hello".to_string());

    let mut pipeline = Pipeline::new();
    let src = pipeline.add(
        StaticSrc::new("src")
            .with_caps(caps)
            .with_payload(payload.clone()),
    );
    let filter =
        pipeline.add(CapsFilter::new(["image-photo"]).with_policy(NegotiationPolicy::Permissive));
    let (probe, received) = ProbeSink::new("probe");
    let sink = pipeline.add(probe);
    pipeline.link_many(&[src, filter, sink]).unwrap();

    pipeline.run().unwrap();
    assert_eq!(received.lock().unwrap().as_slice(), &[payload]);
}

/// An accepting filter forwards both the caps event and the buffer.
#[test]
fn test_accepting_filter_passes_caps_through() {
    let file = temp_file_with(b"GIF89a\x01\x00\x01\x00");
    let mut pipeline = Pipeline::new();
    let src = pipeline.add(PrebufferSrc::new(file.path().to_string_lossy().to_string()));
    let filter = pipeline.add(CapsFilter::new(["image-photo", "document"]));
    let sink = pipeline.add(CollectSink::new());
    pipeline.link_many(&[src, filter, sink]).unwrap();

    let Some(Payload::Text(summary)) = pipeline.run().unwrap() else {
        panic!("expected text output");
    };
    let parsed: serde_json::Value = serde_json::from_str(&summary).unwrap();
    assert_eq!(parsed["name"], "image-photo");
}

/// Every pushed payload is delivered exactly once and verbatim.
#[test]
fn test_exact_delivery_through_chain() {
    let payloads = vec![
        Payload::Text("one".to_string()),
        Payload::Uri("file:///tmp/two".to_string()),
        Payload::Bytes(bytes::Bytes::from_static(b"three")),
    ];

    let mut src = StaticSrc::new("src").with_caps(Caps::new("text/plain", "plain-text"));
    for payload in &payloads {
        src = src.with_payload(payload.clone());
    }

    let mut pipeline = Pipeline::new();
    let src = pipeline.add(src);
    let mid = pipeline.add(PassThrough::new());
    let (probe, received) = ProbeSink::new("probe");
    let sink = pipeline.add(probe);
    pipeline.link_many(&[src, mid, sink]).unwrap();

    pipeline.run().unwrap();
    assert_eq!(received.lock().unwrap().as_slice(), payloads.as_slice());
}

/// Buffers delivered to the collecting sink without negotiated caps are
/// a caps error.
#[test]
fn test_sink_requires_negotiated_caps() {
    let mut pipeline = Pipeline::new();
    let src = pipeline.add(StaticSrc::new("src").with_payload(Payload::Text("x".to_string())));
    let sink = pipeline.add(CollectSink::new());
    pipeline.link_many(&[src, sink]).unwrap();
    assert!(matches!(pipeline.run(), Err(Error::CapsType(_))));
}

/// A URI source hands the location reference downstream without reading
/// it, announcing caps when they are known up front.
#[test]
fn test_uri_source_defers_reading() {
    use typeflow::elements::UriSrc;

    let (probe, received) = ProbeSink::new("probe");
    let mut pipeline = Pipeline::from_elements(vec![
        Box::new(
            UriSrc::new("file:///archive/report.pdf")
                .with_caps(Caps::new("document", "document")),
        ),
        Box::new(probe),
    ])
    .unwrap();

    pipeline.run().unwrap();
    assert_eq!(
        received.lock().unwrap().as_slice(),
        &[Payload::Uri("file:///archive/report.pdf".to_string())]
    );
}

/// Linking is single-use and direction-checked at construction time.
#[test]
fn test_link_errors() {
    use typeflow::element::PadDirection;
    use typeflow::error::LinkError;

    let mut pipeline = Pipeline::new();
    let a = pipeline.add(StaticSrc::new("a"));
    let b = pipeline.add(StaticSrc::new("b"));
    let (probe, _) = ProbeSink::new("c");
    let c = pipeline.add(probe);

    let pa = pipeline.request_pad(a, PadDirection::Src, None).unwrap();
    let pb = pipeline.request_pad(b, PadDirection::Src, None).unwrap();
    let pc = pipeline.request_pad(c, PadDirection::Sink, None).unwrap();

    assert!(matches!(
        pipeline.link(pa, pb),
        Err(Error::Link(LinkError::SameDirection { .. }))
    ));
    pipeline.link(pa, pc).unwrap();
    assert!(matches!(
        pipeline.link(pb, pc),
        Err(Error::Link(LinkError::AlreadyLinked { .. }))
    ));
}
