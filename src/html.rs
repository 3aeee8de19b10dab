//! Minimal HTML building blocks for GitHub comment bodies.
//!
//! Element helpers take already-rendered children; only [`escape`] touches
//! text, so callers escape user-provided strings themselves.

/// Render `<name attrs>children</name>`.
#[must_use]
pub fn element(name: &str, attrs: &[(&str, &str)], children: &[&str]) -> String {
    let mut out = String::new();
    out.push('<');
    out.push_str(name);
    for (key, value) in attrs {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        out.push_str(&escape(value));
        out.push('"');
    }
    out.push('>');
    for child in children {
        out.push_str(child);
    }
    out.push_str("</");
    out.push_str(name);
    out.push('>');
    out
}

macro_rules! simple_tag {
    ($($name:ident),* $(,)?) => {
        $(
            #[must_use]
            pub fn $name(children: &[&str]) -> String {
                element(stringify!($name), &[], children)
            }
        )*
    };
}

simple_tag!(table, tbody, tr, th, td, b, details, summary, small);

/// A hyperlink.
#[must_use]
pub fn a(href: &str, text: &str) -> String {
    element("a", &[("href", href)], &[text])
}

/// Escape text for use in element content or attribute values.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
