use super::MAX_FIELD_OPTIONS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Dropdown,
    RangeDropdown,
    ColorPicker,
}

/// Description of a single field, alive only between its `add_*` call and
/// the moment it is rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub prompt: String,
    pub kind: FieldKind,
    /// Text and color fields.
    pub text_default: String,
    /// Dropdown options, at most [`MAX_FIELD_OPTIONS`].
    pub options: Vec<String>,
    /// Selected index for dropdowns, selected value for ranges, RGB for colors.
    pub numeric_default: i64,
    pub range_min: i32,
    pub range_max: i32,
    pub return_text: bool,
}

/// One `<option>` of a select field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl FieldDescriptor {
    fn blank(prompt: &str, kind: FieldKind) -> Self {
        Self {
            prompt: prompt.to_string(),
            kind,
            text_default: String::new(),
            options: Vec::new(),
            numeric_default: 0,
            range_min: 0,
            range_max: 0,
            return_text: false,
        }
    }

    pub fn text(prompt: &str, default: &str) -> Self {
        Self {
            text_default: default.to_string(),
            ..Self::blank(prompt, FieldKind::Text)
        }
    }

    pub fn dropdown(prompt: &str, options: &str, default_index: usize, return_text: bool) -> Self {
        Self {
            options: parse_options(options),
            numeric_default: i64::try_from(default_index).unwrap_or(i64::MAX),
            return_text,
            ..Self::blank(prompt, FieldKind::Dropdown)
        }
    }

    pub fn range(prompt: &str, min: i32, max: i32, default: i32) -> Self {
        Self {
            numeric_default: default.into(),
            range_min: min,
            range_max: max,
            ..Self::blank(prompt, FieldKind::RangeDropdown)
        }
    }

    pub fn color(prompt: &str, color: u32) -> Self {
        Self {
            text_default: color_hex(color),
            numeric_default: color.into(),
            ..Self::blank(prompt, FieldKind::ColorPicker)
        }
    }

    /// Options of a select field in display order. Empty for text and color fields.
    pub fn choices(&self) -> Vec<Choice> {
        match self.kind {
            FieldKind::Dropdown => self
                .options
                .iter()
                .enumerate()
                .map(|(index, option)| Choice {
                    value: if self.return_text {
                        option.clone()
                    } else {
                        index.to_string()
                    },
                    label: option.clone(),
                    selected: i64::try_from(index).is_ok_and(|i| i == self.numeric_default),
                })
                .collect(),
            FieldKind::RangeDropdown => (self.range_min..=self.range_max)
                .map(|n| Choice {
                    value: n.to_string(),
                    label: n.to_string(),
                    selected: i64::from(n) == self.numeric_default,
                })
                .collect(),
            FieldKind::Text | FieldKind::ColorPicker => Vec::new(),
        }
    }
}

/// Splits a comma separated option list, trimming each entry.
///
/// The list ends at the first empty entry. Entries past [`MAX_FIELD_OPTIONS`]
/// are dropped with a warning.
pub fn parse_options(csv: &str) -> Vec<String> {
    let mut options = Vec::new();
    for option in csv.split(',').map(str::trim) {
        if option.is_empty() {
            break;
        }
        if options.len() == MAX_FIELD_OPTIONS {
            log::warn!(
                "Dropdown has more than {} options, dropping from {:?}",
                MAX_FIELD_OPTIONS,
                option
            );
            break;
        }
        options.push(option.to_string());
    }
    options
}

/// `0x1F` -> `#00001F`
pub fn color_hex(color: u32) -> String {
    format!("#{:06X}", color)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_are_trimmed() {
        assert_eq!(parse_options("A, B ,C"), ["A", "B", "C"]);
        assert_eq!(parse_options(" only "), ["only"]);
        assert!(parse_options("").is_empty());
    }

    #[test]
    fn options_end_at_first_empty_entry() {
        assert_eq!(parse_options("A,,B"), ["A"]);
        assert_eq!(parse_options("A,B,"), ["A", "B"]);
    }

    #[test]
    fn options_are_truncated_at_bound() {
        let csv = (0..30).map(|n| n.to_string()).collect::<Vec<_>>().join(",");
        let options = parse_options(&csv);
        assert_eq!(options.len(), MAX_FIELD_OPTIONS);
        assert_eq!(options.last().map(String::as_str), Some("19"));
    }

    #[test]
    fn color_hex_is_padded_upper_case() {
        assert_eq!(color_hex(0x1F), "#00001F");
        assert_eq!(color_hex(0xff8000), "#FF8000");
        assert_eq!(color_hex(0), "#000000");
    }

    #[test]
    fn dropdown_submits_index_or_text() {
        let by_index = FieldDescriptor::dropdown("Pick", "A, B, C", 1, false);
        let choices = by_index.choices();
        assert_eq!(choices.len(), 3);
        let selected: Vec<&Choice> = choices.iter().filter(|c| c.selected).collect();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].label, "B");
        assert_eq!(selected[0].value, "1");

        let by_text = FieldDescriptor::dropdown("Pick", "A, B, C", 1, true);
        let choices = by_text.choices();
        assert_eq!(choices[1].value, "B");
        assert!(choices[1].selected);
        assert!(!choices[0].selected && !choices[2].selected);
    }

    #[test]
    fn range_dropdown_lists_every_value() {
        let hours = FieldDescriptor::range("Hour", 0, 23, 9);
        let choices = hours.choices();
        assert_eq!(choices.len(), 24);
        assert!(choices.iter().all(|c| c.value == c.label));
        let selected: Vec<&str> = choices
            .iter()
            .filter(|c| c.selected)
            .map(|c| c.value.as_str())
            .collect();
        assert_eq!(selected, ["9"]);
    }

    #[test]
    fn empty_range_has_no_choices() {
        assert!(FieldDescriptor::range("Bad", 5, 1, 3).choices().is_empty());
    }

    #[test]
    fn color_descriptor_keeps_hex_default() {
        let led = FieldDescriptor::color("LED", 0x1F);
        assert_eq!(led.kind, FieldKind::ColorPicker);
        assert_eq!(led.text_default, "#00001F");
        assert_eq!(led.numeric_default, 31);
        assert!(led.choices().is_empty());
    }
}
