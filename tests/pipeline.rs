//! # Pipeline Tests
//!
//! Message → template → markup → actions → sink, end to end.

use chrono::{NaiveDate, NaiveDateTime};
use image::{GrayImage, Luma};
use pretty_assertions::assert_eq;

use missive::action::{self, Operation, PrinterAction};
use missive::message::Message;
use missive::printer::{EscPosPrinter, PrinterConfig};
use missive::sink::{RecordingSink, SinkCall};
use missive::style::{Align, Font, Style};
use missive::template::{self, RenderOptions, TemplateRegistry};

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn received() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, 1)
        .unwrap()
        .and_hms_opt(10, 0, 0)
        .unwrap()
}

fn replay(actions: &[PrinterAction]) -> RecordingSink {
    let mut sink = RecordingSink::new();
    action::replay(actions, &mut sink).unwrap();
    sink
}

fn styles(sink: &RecordingSink) -> Vec<Style> {
    sink.calls
        .iter()
        .filter_map(|call| match call {
            SinkCall::SetStyle(style) => Some(*style),
            _ => None,
        })
        .collect()
}

fn url_options() -> RenderOptions {
    RenderOptions {
        show_qr: true,
        reference_urls: true,
        datetime_format: "%H:%M".into(),
        ..RenderOptions::default()
    }
}

// ============================================================================
// MARKUP THROUGH THE ENGINE
// ============================================================================

#[test]
fn test_nested_tags_restore_every_frame() {
    let mut message = Message::new("<center><b>x</b><u1>y</u1></center>z");
    let sink = replay(&template::build_actions(&mut message, "{text}", &RenderOptions::default()));

    let center = Style {
        align: Align::Center,
        ..Style::DEFAULT
    };
    assert_eq!(
        styles(&sink),
        vec![
            center,
            Style { bold: true, ..center },
            center,
            Style { underline: 1, ..center },
            center,
            Style::DEFAULT,
        ]
    );
    assert_eq!(sink.printed_text(), "xy\nz");
}

#[test]
fn test_escaped_brackets_print_literally() {
    let mut message = Message::new(r"\<b\>text\</b\>");
    let actions = template::build_actions(&mut message, "{text}", &RenderOptions::default());
    assert_eq!(
        actions.into_iter().map(|a| a.operation).collect::<Vec<_>>(),
        vec![Operation::EmitText("<b>text</b>".into())]
    );
}

#[test]
fn test_rendering_is_deterministic() {
    let template = "{sender}: {text}\n{qr_codes}";
    let make = || {
        Message::new("<h1>Hi</h1> http://a.com <code>x</code>")
            .with_sender("Alice")
            .with_received(received())
    };

    let mut first = make();
    let mut second = make();
    first.dt_printed = Some(received());
    second.dt_printed = Some(received());

    assert_eq!(
        template::build_actions(&mut first, template, &url_options()),
        template::build_actions(&mut second, template, &url_options())
    );
}

// ============================================================================
// DEFAULT TEMPLATE
// ============================================================================

#[test]
fn test_default_template_with_urls() {
    let registry = TemplateRegistry::builtin();
    let mut message = Message::new("hello http://a.com")
        .with_sender("Bob")
        .with_received(received());

    let actions =
        template::message_actions(&mut message, registry.get("default").unwrap(), &url_options());
    let sink = replay(&actions);

    assert_eq!(sink.printed_text(), "Bob\n10:00\nhello [1]\n[1] http://a.com");
    assert!(sink.calls.contains(&SinkCall::Qr("http://a.com".into())));
    assert_eq!(sink.calls.last(), Some(&SinkCall::Cut));
    assert!(styles(&sink).contains(&Style {
        font: Font::B,
        ..Style::DEFAULT
    }));

    assert_eq!(message.text, "hello [1]");
    assert!(message.dt_printed.is_some());
}

#[test]
fn test_duplicate_urls_share_one_reference() {
    let mut message = Message::new("see http://a.com and http://a.com again and http://b.com");
    let sink = replay(&template::build_actions(
        &mut message,
        "{text}\n{qr_codes}",
        &url_options(),
    ));

    assert_eq!(message.text, "see [1] and [1] again and [2]");
    let qrs: Vec<_> = sink
        .calls
        .iter()
        .filter(|call| matches!(call, SinkCall::Qr(_)))
        .collect();
    assert_eq!(
        qrs,
        vec![
            &SinkCall::Qr("http://a.com".into()),
            &SinkCall::Qr("http://b.com".into())
        ]
    );
}

#[test]
fn test_custom_template_only_when_allowed() {
    let mut message = Message::new("body");
    message.custom_template = Some("X{text}".into());

    let denied = replay(&template::build_actions(
        &mut message.clone(),
        "{text}",
        &RenderOptions::default(),
    ));
    assert_eq!(denied.printed_text(), "body");

    let options = RenderOptions {
        allow_custom_template: true,
        ..RenderOptions::default()
    };
    let allowed = replay(&template::build_actions(&mut message, "{text}", &options));
    assert_eq!(allowed.printed_text(), "Xbody");
}

#[test]
fn test_image_precedes_text() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("photo.png");
    GrayImage::from_pixel(8, 8, Luma([0])).save(&path).unwrap();

    let mut message = Message::new("caption").with_image(&path);
    let actions = template::build_actions(&mut message, "{image}{text}", &RenderOptions::default());

    assert!(actions.iter().any(|a| matches!(a.operation, Operation::Sleep(_))));
    let sink = replay(&actions);
    assert_eq!(
        sink.calls,
        vec![SinkCall::Image(path), SinkCall::Text("caption".into())]
    );
}

// ============================================================================
// ESC/POS OUTPUT
// ============================================================================

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|window| window == needle)
}

#[test]
fn test_escpos_bytes_for_message() {
    let mut message = Message::new("<b>hi</b> http://a.com").with_sender("Bob");
    let actions = template::message_actions(&mut message, "{text}\n{qr_codes}", &url_options());

    let mut printer = EscPosPrinter::open(Vec::new(), PrinterConfig::TM_T88III, 6).unwrap();
    action::replay(&actions, &mut printer).unwrap();
    let bytes = printer.into_inner();

    // ESC @, ESC t 19
    assert_eq!(&bytes[..5], &[0x1B, 0x40, 0x1B, 0x74, 19]);
    // ESC E 1 ... "hi" ... ESC E 0
    assert!(contains(&bytes, &[0x1B, 0x45, 1]));
    assert!(contains(&bytes, b"hi"));
    assert!(contains(&bytes, b" [1]\n"));
    // QR store command carries the URL
    assert!(contains(&bytes, b"\x31\x50\x30http://a.com"));
    assert!(contains(&bytes, b"[1] http://a.com\n\x1D\x56\x41\x03"));
    assert!(bytes.ends_with(&[0x1D, 0x56, 0x41, 0x03]));
}
