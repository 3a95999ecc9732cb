use crate::args::OutputFormat;
use crate::driver::CheckOutcome;
use serde_json::json;

pub struct Reporter {
    format: OutputFormat,
    print_types: bool,
}

impl Reporter {
    pub fn new(format: OutputFormat, print_types: bool) -> Self {
        Reporter { format, print_types }
    }

    pub fn render(&self, outcome: &CheckOutcome) -> String {
        match self.format {
            OutputFormat::Text => self.render_text(outcome),
            OutputFormat::Json => self.render_json(outcome),
        }
    }

    fn render_text(&self, outcome: &CheckOutcome) -> String {
        let mut out = String::new();
        for diagnostic in &outcome.diagnostics {
            out.push_str(&diagnostic.to_string());
            out.push('\n');
        }
        if self.print_types {
            for function in &outcome.functions {
                out.push_str(&format!("{}: {}\n", function.path, function.returns));
            }
        }
        match outcome.diagnostics.len() {
            0 => {}
            1 => out.push_str("\nFound 1 error.\n"),
            n => out.push_str(&format!("\nFound {n} errors.\n")),
        }
        out
    }

    fn render_json(&self, outcome: &CheckOutcome) -> String {
        let mut value = json!({ "diagnostics": outcome.diagnostics });
        if self.print_types {
            value["functions"] = json!(outcome.functions);
        }
        let mut out = value.to_string();
        out.push('\n');
        out
    }
}

#[cfg(test)]
#[path = "../tests/report_tests.rs"]
mod tests;
