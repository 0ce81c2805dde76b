//! Highlighted view of a REANA workflow specification.
//!
//! The specification is walked as a [`Value`] tree rather than re-tokenized
//! from text. Output matches `serde_json::to_string_pretty` row for row, with
//! the top-level REANA sections (`inputs`, `workflow`, `outputs`, ...) and the
//! workflow engine type called out.

use ratatui::style::Style;
use ratatui::text::{Line, Span};
use serde_json::Value;

use crate::ui::theme::Theme;

const INDENT: &str = "  ";

/// Top-level keys of a `reana.yaml` specification.
const SECTION_KEYS: [&str; 5] = ["version", "inputs", "workflow", "outputs", "workspace"];

/// One highlighted row per line of the pretty-printed specification.
pub fn specification_lines(specification: &Value, theme: &dyn Theme) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    SpecWriter { theme, lines: &mut lines }.value(Vec::new(), specification, &[], false);
    lines
}

struct SpecWriter<'a> {
    theme: &'a dyn Theme,
    lines: &'a mut Vec<Line<'static>>,
}

impl SpecWriter<'_> {
    /// Emit `value` starting on a row that already holds `lead` (indent and
    /// key). `path` holds the keys leading to `value`.
    fn value(&mut self, mut lead: Vec<Span<'static>>, value: &Value, path: &[&str], comma: bool) {
        let depth = path.len();
        match value {
            Value::Object(map) if !map.is_empty() => {
                lead.push(self.punct("{"));
                self.lines.push(Line::from(lead));
                let last = map.len() - 1;
                for (index, (key, child)) in map.iter().enumerate() {
                    let mut child_path = path.to_vec();
                    child_path.push(key.as_str());
                    let row = vec![
                        indent(depth + 1),
                        Span::styled(quoted(key), self.key_style(&child_path)),
                        self.punct(": "),
                    ];
                    self.value(row, child, &child_path, index < last);
                }
                self.close(depth, "}", comma);
            }
            Value::Array(items) if !items.is_empty() => {
                lead.push(self.punct("["));
                self.lines.push(Line::from(lead));
                let last = items.len() - 1;
                for (index, item) in items.iter().enumerate() {
                    // Array items keep the parent's key for styling purposes.
                    let mut item_path = path.to_vec();
                    item_path.push("");
                    self.value(vec![indent(depth + 1)], item, &item_path, index < last);
                }
                self.close(depth, "]", comma);
            }
            scalar => {
                lead.push(self.scalar(scalar, path));
                if comma {
                    lead.push(self.punct(","));
                }
                self.lines.push(Line::from(lead));
            }
        }
    }

    fn close(&mut self, depth: usize, bracket: &'static str, comma: bool) {
        let mut row = vec![indent(depth), self.punct(bracket)];
        if comma {
            row.push(self.punct(","));
        }
        self.lines.push(Line::from(row));
    }

    fn scalar(&self, value: &Value, path: &[&str]) -> Span<'static> {
        match value {
            Value::String(text) if is_engine_type(path) => {
                Span::styled(quoted(text), self.theme.accent_emphasis_style())
            }
            Value::String(text) => Span::styled(quoted(text), self.theme.status_success()),
            Value::Number(number) => Span::styled(number.to_string(), self.theme.status_warning()),
            Value::Bool(flag) => Span::styled(flag.to_string(), self.theme.accent_primary_style()),
            Value::Null => Span::styled("null", self.theme.text_muted_style()),
            Value::Object(_) => self.punct("{}"),
            Value::Array(_) => self.punct("[]"),
        }
    }

    fn key_style(&self, path: &[&str]) -> Style {
        match path {
            [section] if SECTION_KEYS.contains(section) => {
                self.theme.accent_emphasis_style()
            }
            _ => self.theme.accent_primary_style(),
        }
    }

    fn punct(&self, text: &'static str) -> Span<'static> {
        Span::styled(text, self.theme.text_secondary_style())
    }
}

/// `workflow.type` names the engine (serial, cwl, yadage, snakemake).
fn is_engine_type(path: &[&str]) -> bool {
    matches!(path, ["workflow", "type"])
}

fn indent(depth: usize) -> Span<'static> {
    Span::raw(INDENT.repeat(depth))
}

fn quoted(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| format!("\"{text}\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::theme::NordTheme;
    use serde_json::json;

    fn specification() -> Value {
        json!({
            "version": "0.9.3",
            "inputs": {
                "files": ["code/gendata.C", "code/fitdata.C"],
                "parameters": {"events": 20000, "data": "results/data.root"}
            },
            "workflow": {
                "type": "serial",
                "specification": {"steps": [{"environment": "reanahub/reana-env-root6:6.18.04", "commands": []}]}
            },
            "outputs": {"files": ["results/plot.png"]},
            "workspace": {"retention_days": null, "quiet": false}
        })
    }

    fn text(lines: &[Line<'_>]) -> String {
        lines.iter().map(Line::to_string).collect::<Vec<_>>().join("\n")
    }

    #[test]
    fn rows_match_pretty_printed_json() {
        let theme = NordTheme::new();
        let value = specification();
        let expected = serde_json::to_string_pretty(&value).expect("pretty");
        assert_eq!(text(&specification_lines(&value, &theme)), expected);
    }

    #[test]
    fn sections_and_engine_type_are_emphasized() {
        let theme = NordTheme::new();
        let lines = specification_lines(&specification(), &theme);
        let emphasis = theme.accent_emphasis_style();
        let styled = |needle: &str| {
            lines
                .iter()
                .flat_map(|line| line.spans.iter())
                .find(|span| span.content == needle)
                .map(|span| span.style)
        };

        assert_eq!(styled("\"workflow\""), Some(emphasis));
        assert_eq!(styled("\"serial\""), Some(emphasis));
        // Keys below the top level are plain keys.
        let nested_files = lines
            .iter()
            .flat_map(|line| line.spans.iter())
            .filter(|span| span.content == "\"files\"")
            .all(|span| span.style == theme.accent_primary_style());
        assert!(nested_files);
        assert_eq!(styled("20000"), Some(theme.status_warning()));
    }

    #[test]
    fn strings_are_escaped_and_empty_containers_stay_inline() {
        let theme = NordTheme::new();
        let value = json!({"inputs": {"note": "say \"hi\"", "files": [], "options": {}}});
        let rendered = text(&specification_lines(&value, &theme));
        assert!(rendered.contains(r#""note": "say \"hi\"","#));
        assert!(rendered.contains(r#""files": [],"#));
        assert!(rendered.contains(r#""options": {}"#));
    }

    #[test]
    fn scalar_specification_is_a_single_row() {
        let theme = NordTheme::new();
        assert_eq!(specification_lines(&Value::Null, &theme).len(), 1);
    }
}
