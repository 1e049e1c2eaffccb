//! HTML projection of page descriptions.
//!
//! Every string that can originate from a signature, an input value or a
//! submission is escaped.

use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};
use std::fmt::Write;

use annotate_core::{ControlKind, FieldControl, FormView, Page, PageBody};

const CARD: &str = "max-w-2xl mx-auto p-8 bg-white rounded-lg shadow-lg";
const LABEL: &str = "block text-gray-700 text-sm font-bold mb-2";
const TEXTAREA: &str = "shadow appearance-none border rounded w-full py-2 px-3 text-gray-700 leading-tight focus:outline-none focus:shadow-outline";
const BUTTON: &str = "bg-blue-500 hover:bg-blue-700 text-white font-bold py-2 px-4 rounded focus:outline-none focus:shadow-outline";

/// CSS class on inline field errors.
pub const ERROR_CLASS: &str = "text-red-500 text-xs italic mt-1";

/// Render a complete HTML document.
pub fn render_document(page: &Page) -> String {
    let mut out = String::with_capacity(2048);
    out.push_str("<!doctype html>\n<html><head><meta charset=\"utf-8\">");
    let _ = write!(out, "<title>{}</title>", text(&page.title));
    out.push_str("<script src=\"https://cdn.tailwindcss.com\"></script></head>");
    out.push_str("<body class=\"bg-gray-100\">");

    match &page.body {
        PageBody::Waiting { message } => {
            let _ = write!(
                out,
                "<div class=\"{} text-center\"><p class=\"text-lg text-gray-700\">{}</p></div>",
                CARD,
                text(message)
            );
        }
        PageBody::Form(view) => render_form(&mut out, view),
    }

    out.push_str("</body></html>\n");
    out
}

fn render_form(out: &mut String, view: &FormView) {
    let _ = write!(out, "<div class=\"{}\">", CARD);
    let _ = write!(
        out,
        "<h1 class=\"text-4xl font-bold mb-8\">{}</h1>",
        text(&view.heading)
    );

    if let Some(instructions) = &view.instructions {
        let _ = write!(out, "<p class=\"text-gray-700 mb-4\">{}</p>", text(instructions));
    }

    out.push_str("<div class=\"mb-8\"><h2 class=\"text-2xl font-bold mb-4\">Inputs</h2>");
    for input in &view.inputs {
        let _ = write!(
            out,
            "<h3 class=\"text-xl font-semibold mt-4\">{}</h3><p class=\"text-gray-700 whitespace-pre-wrap\">{}</p>",
            text(&input.label),
            text(&input.value)
        );
    }
    out.push_str("</div>");

    let _ = write!(out, "<p class=\"text-gray-700 mb-4\">{}</p>", text(&view.prompt));
    let _ = write!(out, "<form method=\"post\" action=\"{}\">", attr(&view.submit_target));
    for control in &view.controls {
        render_control(out, control);
    }
    let _ = write!(out, "<input type=\"submit\" value=\"Submit\" class=\"{}\">", BUTTON);
    out.push_str("</form></div>");
}

fn render_control(out: &mut String, control: &FieldControl) {
    let name = attr(&control.name);

    match &control.kind {
        ControlKind::Radio { options } => {
            let _ = write!(
                out,
                "<label class=\"{}\">{} <span class=\"font-normal\">({})</span></label>",
                LABEL,
                text(&control.label),
                text(&control.hint)
            );
            for (i, option) in options.iter().enumerate() {
                let checked = if option.selected { " checked" } else { "" };
                let _ = write!(
                    out,
                    "<input type=\"radio\" id=\"{name}_{i}\" name=\"{name}\" value=\"{}\"{checked} class=\"mr-2\"><label for=\"{name}_{i}\" class=\"mr-4\">{}</label>",
                    attr(&option.value),
                    text(&option.value),
                );
            }
        }
        ControlKind::TextArea { value } => {
            let _ = write!(
                out,
                "<label for=\"{name}\" class=\"{}\">{} <span class=\"font-normal\">({})</span></label><textarea id=\"{name}\" name=\"{name}\" class=\"{}\">\n{}</textarea>",
                LABEL,
                text(&control.label),
                text(&control.hint),
                TEXTAREA,
                text(value),
            );
        }
    }

    if let Some(error) = &control.error {
        let _ = write!(out, "<p class=\"{}\">{}</p>", ERROR_CLASS, text(error));
    }
    out.push_str("<br>");
}

#[cfg(test)]
mod tests {
    use super::*;
    use annotate_core::{FieldControl, FormRenderer, InputDisplay, RadioOption};

    fn page_with(controls: Vec<FieldControl>) -> Page {
        FormRenderer::default().render(
            None,
            vec![InputDisplay {
                name: "input_field".to_string(),
                label: "input_field".to_string(),
                value: "<b>test_input</b>".to_string(),
            }],
            controls,
        )
    }

    #[test]
    fn test_waiting_document() {
        let html = render_document(&FormRenderer::default().waiting());
        assert!(html.contains("Waiting for next request"));
        assert!(!html.contains("<form"));
    }

    #[test]
    fn test_inputs_escaped() {
        let html = render_document(&page_with(vec![]));
        assert!(html.contains("&lt;b&gt;test_input&lt;/b&gt;"));
        assert!(!html.contains("<b>test_input"));
    }

    #[test]
    fn test_radio_checked_and_error() {
        let html = render_document(&page_with(vec![FieldControl {
            name: "rating".to_string(),
            label: "rating".to_string(),
            hint: "Choice".to_string(),
            kind: ControlKind::Radio {
                options: vec![
                    RadioOption { value: "A".to_string(), selected: false },
                    RadioOption { value: "B".to_string(), selected: true },
                ],
            },
            error: Some("must be one of: A, B".to_string()),
        }]));

        assert_eq!(html.matches("type=\"radio\"").count(), 2);
        assert!(html.contains("value=\"B\" checked"));
        assert!(!html.contains("value=\"A\" checked"));
        assert!(html.contains(ERROR_CLASS));
        assert!(html.contains("must be one of: A, B"));
    }

    #[test]
    fn test_textarea_prefilled() {
        let html = render_document(&page_with(vec![FieldControl {
            name: "note".to_string(),
            label: "note".to_string(),
            hint: "Text".to_string(),
            kind: ControlKind::TextArea {
                value: "filled_value".to_string(),
            },
            error: None,
        }]));

        assert!(html.contains(">\nfilled_value</textarea>"));
        assert!(!html.contains(ERROR_CLASS));
    }

    #[test]
    fn test_textarea_keeps_leading_newline() {
        let html = render_document(&page_with(vec![FieldControl {
            name: "note".to_string(),
            label: "note".to_string(),
            hint: "Text".to_string(),
            kind: ControlKind::TextArea {
                value: "\nsecond line".to_string(),
            },
            error: None,
        }]));

        // Parsers drop one newline after the opening tag, the value keeps its own.
        assert!(html.contains(">\n\nsecond line</textarea>"));
    }
}
