//! # Template Engine
//!
//! Turns a [`Message`] plus a template string into printer actions.
//!
//! ## Placeholders
//!
//! | Placeholder | Kind | Expands to |
//! |-------------|------|------------|
//! | `{sender}` | scalar | Sender name, or `Unknown` |
//! | `{sent}` | scalar | `dt_sent` formatted, or `Unknown` |
//! | `{received}` | scalar | `dt_received` formatted, or `Unknown` |
//! | `{printed}` | scalar | `dt_printed` formatted, or `Unknown` |
//! | `{text}` | structural | The message body, parsed as markup |
//! | `{image}` | structural | Image followed by a cool-down pause |
//! | `{qr_codes}` | structural | One QR code plus label per distinct URL |
//!
//! Scalars are substituted into the template string first. The result is
//! then split on `{...}` and each piece is processed in order. Any other
//! `{...}` produces nothing. Literal pieces between placeholders are markup
//! too.
//!
//! ## URL References
//!
//! With `reference_urls` on, each distinct URL in the body is numbered in
//! first-seen order and every occurrence is replaced by `[n]`:
//!
//! ```text
//! see http://a.com and http://a.com again and http://b.com
//! see [1] and [1] again and [2]
//! ```

pub mod registry;

use std::fmt::Write as _;
use std::sync::LazyLock;
use std::time::Duration;

use chrono::{Local, NaiveDateTime};
use regex::{Captures, Regex};

use crate::action::{Operation, PrinterAction};
use crate::markup::{self, Node};
use crate::message::{Message, UNKNOWN};
use crate::style::Style;

pub use registry::TemplateRegistry;

/// Format used for `{sent}`, `{received}` and `{printed}` unless configured.
pub const DEFAULT_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://\S+").expect("valid URL regex"));

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[^}]+\}").expect("valid placeholder regex"));

/// Rendering behaviour taken from the printer configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    /// Emit a QR code for every URL at `{qr_codes}`.
    pub show_qr: bool,
    /// Replace URLs in the body with `[n]` references.
    pub reference_urls: bool,
    /// Honour `Message::custom_template`.
    pub allow_custom_template: bool,
    /// Cut after every message, whatever the message asks for.
    pub always_cut: bool,
    /// Pause after an image so the print head can cool down.
    pub image_cooldown: Duration,
    /// Frame styled nodes are rendered under and restored to.
    pub base_style: Style,
    /// strftime format for timestamp placeholders.
    pub datetime_format: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            show_qr: false,
            reference_urls: false,
            allow_custom_template: false,
            always_cut: false,
            image_cooldown: Duration::ZERO,
            base_style: Style::DEFAULT,
            datetime_format: DEFAULT_DATETIME_FORMAT.to_string(),
        }
    }
}

/// Distinct URLs in first-seen order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UrlIndex {
    urls: Vec<String>,
}

impl UrlIndex {
    /// Collect the URLs found in `text`.
    pub fn scan(text: &str) -> Self {
        let mut index = Self::default();
        for m in URL_RE.find_iter(text) {
            if index.position(m.as_str()).is_none() {
                index.urls.push(m.as_str().to_string());
            }
        }
        index
    }

    /// 1-based reference number of `url`.
    pub fn position(&self, url: &str) -> Option<usize> {
        self.urls.iter().position(|u| u == url).map(|i| i + 1)
    }

    /// `(reference, url)` pairs in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.urls.iter().enumerate().map(|(i, url)| (i + 1, url.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    /// Replace every URL token in `text` by its `[n]` reference.
    ///
    /// Tokens are matched whole, so a URL that is a prefix of another one
    /// never rewrites part of the longer URL.
    pub fn replace_with_references(&self, text: &str) -> String {
        URL_RE
            .replace_all(text, |caps: &Captures| match self.position(&caps[0]) {
                Some(n) => format!("[{}]", n),
                None => caps[0].to_string(),
            })
            .into_owned()
    }
}

/// Build the actions printing `message` with `template`.
///
/// Sets `dt_printed` if it is still empty and, with `reference_urls` on,
/// rewrites `message.text` with URL references.
pub fn build_actions(
    message: &mut Message,
    template: &str,
    options: &RenderOptions,
) -> Vec<PrinterAction> {
    let template = match &message.custom_template {
        Some(custom) if options.allow_custom_template => custom.clone(),
        _ => template.to_string(),
    };

    if message.dt_printed.is_none() {
        message.dt_printed = Some(Local::now().naive_local());
    }

    let urls = if options.show_qr || options.reference_urls {
        UrlIndex::scan(&message.text)
    } else {
        UrlIndex::default()
    };
    if options.reference_urls && !urls.is_empty() {
        message.text = urls.replace_with_references(&message.text);
    }

    let template = substitute_scalars(&template, message, &options.datetime_format);

    let mut out = ActionWriter::new(&options.base_style);
    let mut last = 0;
    for placeholder in PLACEHOLDER_RE.find_iter(&template) {
        out.push_markup(&template[last..placeholder.start()]);
        last = placeholder.end();

        match placeholder.as_str() {
            "{text}" => out.push_markup(&message.text),
            "{image}" => {
                if let Some(path) = &message.image_path {
                    out.push(PrinterAction::new("image", Operation::EmitImage(path.clone())));
                    out.push(PrinterAction::new(
                        "cool-down",
                        Operation::Sleep(options.image_cooldown),
                    ));
                }
            }
            "{qr_codes}" => {
                if options.show_qr {
                    for (n, url) in urls.iter() {
                        out.push(PrinterAction::new("qr", Operation::EmitQr(url.to_string())));
                        let label = if options.reference_urls {
                            format!("[{}] {}", n, url)
                        } else {
                            url.to_string()
                        };
                        out.push(PrinterAction::new("qr label", Operation::EmitText(label)));
                    }
                }
            }
            _ => {}
        }
    }
    out.push_markup(&template[last..]);

    out.actions
}

/// [`build_actions`] followed by a cut when the message or the printer asks
/// for one.
pub fn message_actions(
    message: &mut Message,
    template: &str,
    options: &RenderOptions,
) -> Vec<PrinterAction> {
    let mut actions = build_actions(message, template, options);
    if options.always_cut || message.cut {
        actions.push(PrinterAction::new("cut", Operation::Cut));
    }
    actions
}

fn substitute_scalars(template: &str, message: &Message, datetime_format: &str) -> String {
    let fmt = |dt: Option<NaiveDateTime>| match dt {
        Some(dt) => format_datetime(&dt, datetime_format),
        None => UNKNOWN.to_string(),
    };

    template
        .replace("{sender}", message.sender_or_unknown())
        .replace("{sent}", &fmt(message.dt_sent))
        .replace("{received}", &fmt(message.dt_received))
        .replace("{printed}", &fmt(message.dt_printed))
}

/// Format with `format`, falling back to the default format when `format`
/// is not a valid strftime string.
fn format_datetime(dt: &NaiveDateTime, format: &str) -> String {
    let mut out = String::new();
    if write!(out, "{}", dt.format(format)).is_ok() {
        return out;
    }
    dt.format(DEFAULT_DATETIME_FORMAT).to_string()
}

/// Accumulates actions, dropping the newline that would otherwise follow an
/// alignment block twice.
struct ActionWriter<'a> {
    base: &'a Style,
    actions: Vec<PrinterAction>,
    strip_leading_newline: bool,
}

impl<'a> ActionWriter<'a> {
    fn new(base: &'a Style) -> Self {
        Self {
            base,
            actions: Vec::new(),
            strip_leading_newline: false,
        }
    }

    fn push(&mut self, action: PrinterAction) {
        self.actions.push(action);
    }

    fn push_markup(&mut self, src: &str) {
        for node in markup::parse(src) {
            self.push_node(&node);
        }
    }

    fn push_node(&mut self, node: &Node) {
        match node {
            Node::Text(text) => {
                let text = match text.strip_prefix('\n') {
                    Some(rest) if self.strip_leading_newline => rest,
                    _ => text.as_str(),
                };
                self.strip_leading_newline = false;
                if !text.is_empty() {
                    self.actions.push(PrinterAction::text(text));
                }
            }
            Node::Styled(styled) => {
                let (actions, _) = markup::render(node, self.base);
                self.actions.extend(actions);
                if styled.tag.overrides.sets_align() {
                    self.strip_leading_newline = true;
                }
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
