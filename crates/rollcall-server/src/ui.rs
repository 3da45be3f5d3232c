//! Presentation seams used by the controllers, with terminal
//! implementations for the CLI.

use std::collections::HashMap;
use std::io::{self, BufRead, Write};
use std::time::Duration;

use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub label: &'static str,
}

/// A form to render: a title, an optional notice line above the
/// fields, and the fields in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Form {
    pub title: &'static str,
    pub notice: Option<String>,
    pub fields: Vec<Field>,
}

impl Form {
    pub fn new(title: &'static str) -> Self {
        Self {
            title,
            notice: None,
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, name: &'static str, label: &'static str) -> Self {
        self.fields.push(Field { name, label });
        self
    }

    pub fn notice(mut self, notice: impl Into<String>) -> Self {
        self.notice = Some(notice.into());
        self
    }
}

/// Values keyed by field name. Absent fields read as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldValues(HashMap<String, String>);

impl FieldValues {
    pub fn get(&self, name: &str) -> &str {
        self.0.get(name).map(String::as_str).unwrap_or("")
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FieldValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Renders forms and status messages to whoever is at the keyboard.
pub trait FormRenderer {
    /// Show `form` and return what was entered, or `None` once the user
    /// has walked away (input closed).
    fn collect(&mut self, form: &Form) -> Option<FieldValues>;

    /// A one-off status message: title plus description.
    fn notify(&mut self, title: &str, description: &str);
}

pub trait Navigator {
    /// Leave the current screen for `path` after `delay`.
    fn navigate(&mut self, path: &str, delay: Duration);
}

/// Line-oriented prompts over any reader/writer pair.
pub struct TerminalForms<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> TerminalForms<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn prompt(&mut self, form: &Form) -> io::Result<Option<FieldValues>> {
        writeln!(self.output, "== {} ==", form.title)?;
        if let Some(notice) = &form.notice {
            writeln!(self.output, "{notice}")?;
        }

        let mut values = FieldValues::default();
        for field in &form.fields {
            write!(self.output, "{}: ", field.label)?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            values.insert(field.name, line.trim_end_matches(['\r', '\n']));
        }
        Ok(Some(values))
    }
}

impl<R: BufRead, W: Write> FormRenderer for TerminalForms<R, W> {
    fn collect(&mut self, form: &Form) -> Option<FieldValues> {
        match self.prompt(form) {
            Ok(values) => values,
            Err(e) => {
                warn!(error = %e, "Terminal input failed");
                None
            }
        }
    }

    fn notify(&mut self, title: &str, description: &str) {
        if let Err(e) = writeln!(self.output, "[{title}] {description}") {
            warn!(error = %e, "Terminal output failed");
        }
    }
}

/// Announces the redirect and waits it out.
pub struct TerminalNavigator<W> {
    output: W,
}

impl<W: Write> TerminalNavigator<W> {
    pub fn new(output: W) -> Self {
        Self { output }
    }
}

impl<W: Write> Navigator for TerminalNavigator<W> {
    fn navigate(&mut self, path: &str, delay: Duration) {
        if let Err(e) = writeln!(
            self.output,
            "Returning to {path} in {}s...",
            delay.as_secs()
        ) {
            warn!(error = %e, path = %path, "Terminal output failed");
        }
        std::thread::sleep(delay);
    }
}
