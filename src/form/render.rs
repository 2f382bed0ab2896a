use std::borrow::Cow;
use std::fmt::{self, Write};

use super::{FieldDescriptor, FieldId, FieldKind};

pub(super) fn subheading(out: &mut impl Write, text: &str) -> fmt::Result {
    writeln!(out, "<h2 class=\"subheading\">{}</h2>", escape(text))
}

pub(super) fn field(out: &mut impl Write, id: FieldId, field: &FieldDescriptor) -> fmt::Result {
    writeln!(out, "<div class=\"field-group\">")?;
    writeln!(
        out,
        "<label class=\"field-label\" for=\"{}\">{}</label>",
        id,
        escape(&field.prompt)
    )?;

    match field.kind {
        FieldKind::Text => input(out, "text", id, &field.text_default)?,
        FieldKind::ColorPicker => input(out, "color", id, &field.text_default)?,
        FieldKind::Dropdown | FieldKind::RangeDropdown => {
            writeln!(out, "<select id=\"{}\">", id)?;
            for choice in field.choices() {
                writeln!(
                    out,
                    "<option value=\"{}\"{}>{}</option>",
                    escape(&choice.value),
                    if choice.selected { " selected" } else { "" },
                    escape(&choice.label)
                )?;
            }
            writeln!(out, "</select>")?;
        }
    }

    writeln!(out, "</div>")
}

fn input(out: &mut impl Write, kind: &str, id: FieldId, value: &str) -> fmt::Result {
    writeln!(
        out,
        "<input type=\"{}\" id=\"{}\" value=\"{}\">",
        kind,
        id,
        escape(value)
    )
}

/// Escapes text for use in HTML content and quoted attributes.
pub fn escape(text: &str) -> Cow<'_, str> {
    if !text.contains(|c: char| matches!(c, '&' | '<' | '>' | '"' | '\'')) {
        return Cow::Borrowed(text);
    }

    let mut escaped = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::compute_field_ids;

    fn render(descriptor: &FieldDescriptor) -> String {
        let mut out = String::new();
        field(&mut out, compute_field_ids(1)[0], descriptor).unwrap();
        out
    }

    #[test]
    fn text_input_markup() {
        let html = render(&FieldDescriptor::text("SSID", "home"));
        assert_eq!(
            html,
            "<div class=\"field-group\">\n\
             <label class=\"field-label\" for=\"x11\">SSID</label>\n\
             <input type=\"text\" id=\"x11\" value=\"home\">\n\
             </div>\n"
        );
    }

    #[test]
    fn color_input_carries_hex_default() {
        let html = render(&FieldDescriptor::color("LED", 0x1F));
        assert!(html.contains("<input type=\"color\" id=\"x11\" value=\"#00001F\">"));
    }

    #[test]
    fn dropdown_marks_default_selected() {
        let html = render(&FieldDescriptor::dropdown("Pick", "A, B, C", 1, false));
        assert!(html.contains("<select id=\"x11\">"));
        assert!(html.contains("<option value=\"0\">A</option>"));
        assert!(html.contains("<option value=\"1\" selected>B</option>"));
        assert!(html.contains("<option value=\"2\">C</option>"));

        let html = render(&FieldDescriptor::dropdown("Pick", "A, B, C", 1, true));
        assert!(html.contains("<option value=\"B\" selected>B</option>"));
    }

    #[test]
    fn range_dropdown_markup() {
        let html = render(&FieldDescriptor::range("Hour", 0, 23, 9));
        assert_eq!(html.matches("<option ").count(), 24);
        assert!(html.contains("<option value=\"9\" selected>9</option>"));
        assert!(html.contains("<option value=\"23\">23</option>"));
    }

    #[test]
    fn markup_is_escaped() {
        let html = render(&FieldDescriptor::text("<b>Name</b>", "O'Neil & \"Co\""));
        assert!(html.contains("&lt;b&gt;Name&lt;/b&gt;"));
        assert!(html.contains("value=\"O&#39;Neil &amp; &quot;Co&quot;\""));
        assert_eq!(escape("plain"), Cow::Borrowed("plain"));
    }
}
