//! Form description.
//!
//! Every `add_*` call builds one [`FieldDescriptor`], renders it straight into
//! the page buffer and forgets it. Fields are numbered by [`FieldIds`], the same
//! sequence the client script uses to read the values back.

mod field;
mod render;

pub use field::{color_hex, parse_options, Choice, FieldDescriptor, FieldKind};
pub use render::escape;

use std::fmt;

/// Upper bound on options in a comma separated dropdown.
pub const MAX_FIELD_OPTIONS: usize = 20;

/// Counter value before the first field of a page. Ids are pre-incremented,
/// so the first field is `x11`.
pub const START_FIELD_TAG: u32 = 10;

/// DOM id of a rendered field, displayed as `x<tag>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldId(u32);

impl FieldId {
    pub fn tag(&self) -> u32 {
        self.0
    }

    /// Whether a submitted segment tag such as `x12` names this field.
    pub fn matches(&self, tag: &str) -> bool {
        tag.strip_prefix('x')
            .and_then(|n| n.parse::<u32>().ok())
            .is_some_and(|n| n == self.0)
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{}", self.0)
    }
}

/// The field numbering of one page, starting over at [`START_FIELD_TAG`].
#[derive(Debug, Clone)]
pub struct FieldIds {
    tag: u32,
}

impl FieldIds {
    pub fn new() -> Self {
        Self {
            tag: START_FIELD_TAG,
        }
    }
}

impl Default for FieldIds {
    fn default() -> Self {
        Self::new()
    }
}

impl Iterator for FieldIds {
    type Item = FieldId;

    fn next(&mut self) -> Option<FieldId> {
        self.tag = self.tag.checked_add(1)?;
        Some(FieldId(self.tag))
    }
}

/// Ids of the first `field_count` fields of a page.
///
/// Both the markup and the embedded script derive their ids from here, which is
/// what lets a later submission be matched to the page without a session token.
pub fn compute_field_ids(field_count: usize) -> Vec<FieldId> {
    FieldIds::new().take(field_count).collect()
}

/// Render context handed to the form builder callback for one page.
pub struct Form<'a> {
    out: &'a mut String,
    ids: FieldIds,
    field_count: usize,
}

impl<'a> Form<'a> {
    pub fn new(out: &'a mut String) -> Self {
        Self {
            out,
            ids: FieldIds::new(),
            field_count: 0,
        }
    }

    /// Number of fields rendered so far on this page.
    pub fn field_count(&self) -> usize {
        self.field_count
    }

    pub fn add_subheading(&mut self, text: &str) {
        if let Err(e) = render::subheading(self.out, text) {
            log::error!("Failed to render subheading {:?}: {}", text, e);
        }
    }

    pub fn add_text(&mut self, prompt: &str, default: &str) {
        self.push(FieldDescriptor::text(prompt, default));
    }

    /// `options` is comma separated. The field submits the option text when
    /// `return_text` is set, its zero-based position otherwise.
    pub fn add_dropdown(
        &mut self,
        prompt: &str,
        options: &str,
        default_index: usize,
        return_text: bool,
    ) {
        self.push(FieldDescriptor::dropdown(
            prompt,
            options,
            default_index,
            return_text,
        ));
    }

    /// One option per integer in `min..=max`.
    pub fn add_dropdown_range(&mut self, prompt: &str, min: i32, max: i32, default: i32) {
        self.push(FieldDescriptor::range(prompt, min, max, default));
    }

    /// `color` is `0xRRGGBB`; the submitted value comes back as its decimal string.
    pub fn add_color_picker(&mut self, prompt: &str, color: u32) {
        self.push(FieldDescriptor::color(prompt, color));
    }

    fn push(&mut self, field: FieldDescriptor) {
        if field.prompt.is_empty() {
            log::debug!("Skipping {:?} field without prompt", field.kind);
            return;
        }

        let Some(id) = self.ids.next() else {
            log::error!("Field id space exhausted, dropping {:?}", field.prompt);
            return;
        };
        self.field_count += 1;

        if let Err(e) = render::field(self.out, id, &field) {
            log::error!("Failed to render field {}: {}", id, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered_ids(page: &str) -> Vec<String> {
        page.match_indices("id=\"x")
            .map(|(at, _)| {
                let rest = &page[at + 4..];
                rest[..rest.find('"').unwrap()].to_string()
            })
            .collect()
    }

    #[test]
    fn ids_start_after_start_tag() {
        let ids = compute_field_ids(3);
        let names: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
        assert_eq!(names, ["x11", "x12", "x13"]);
        assert!(compute_field_ids(0).is_empty());
    }

    #[test]
    fn each_call_renders_one_container_with_contiguous_ids() {
        let mut page = String::new();
        let mut form = Form::new(&mut page);
        form.add_text("SSID", "home");
        form.add_subheading("Clock");
        form.add_dropdown("Zone", "UTC, CET", 0, true);
        form.add_dropdown_range("Hour", 0, 23, 7);
        form.add_color_picker("LED", 0xFF0000);
        assert_eq!(form.field_count(), 4);

        assert_eq!(page.matches("<div class=\"field-group\">").count(), 4);
        let expected: Vec<String> = compute_field_ids(4).iter().map(|id| id.to_string()).collect();
        assert_eq!(rendered_ids(&page), expected);
    }

    #[test]
    fn empty_prompt_is_a_no_op() {
        let mut page = String::new();
        let mut form = Form::new(&mut page);
        form.add_text("", "ignored");
        form.add_dropdown("", "A,B", 0, false);
        form.add_dropdown_range("", 0, 3, 1);
        form.add_color_picker("", 0x123456);
        assert_eq!(form.field_count(), 0);
        assert!(page.is_empty());

        let mut form = Form::new(&mut page);
        form.add_text("", "ignored");
        form.add_text("Name", "");
        assert_eq!(form.field_count(), 1);
        assert_eq!(rendered_ids(&page), ["x11"]);
    }

    #[test]
    fn subheading_takes_no_id() {
        let mut page = String::new();
        let mut form = Form::new(&mut page);
        form.add_subheading("WiFi");
        assert_eq!(form.field_count(), 0);
        assert_eq!(page, "<h2 class=\"subheading\">WiFi</h2>\n");
    }

    #[test]
    fn field_id_matches_segment_tag() {
        let id = compute_field_ids(2)[1];
        assert_eq!(id.tag(), 12);
        assert!(id.matches("x12"));
        assert!(!id.matches("x11"));
        assert!(!id.matches("12"));
        assert!(!id.matches("xx"));
    }
}
