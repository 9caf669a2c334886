//! Form components for maud templates.
//!
//! This module provides reusable form components that match the styles
//! defined in `static/css/style.css`.

use maud::{html, Markup, Render};

/// A form container element.
#[derive(Debug)]
pub struct Form<'a> {
    /// Form action URL
    pub action: &'a str,
    /// HTTP method ("get" or "post")
    pub method: &'a str,
    /// Form content (inputs, buttons, etc.)
    pub content: Markup,
    /// Optional CSS class
    pub class: Option<&'a str>,
    /// Optional form ID
    pub id: Option<&'a str>,
}

impl<'a> Form<'a> {
    /// Create a new form with the given action and method.
    #[must_use]
    pub fn new(action: &'a str, method: &'a str, content: Markup) -> Self {
        Self {
            action,
            method,
            content,
            class: None,
            id: None,
        }
    }

    /// Create a POST form.
    #[must_use]
    pub fn post(action: &'a str, content: Markup) -> Self {
        Self::new(action, "post", content)
    }

    /// Create a GET form.
    #[must_use]
    pub fn get(action: &'a str, content: Markup) -> Self {
        Self::new(action, "get", content)
    }

    /// Set the CSS class.
    #[must_use]
    pub fn class(mut self, class: &'a str) -> Self {
        self.class = Some(class);
        self
    }

    /// Set the form ID.
    #[must_use]
    pub fn id(mut self, id: &'a str) -> Self {
        self.id = Some(id);
        self
    }
}

impl Render for Form<'_> {
    fn render(&self) -> Markup {
        html! {
            form action=(self.action) method=(self.method) class=[self.class] id=[self.id] {
                (self.content)
            }
        }
    }
}

/// An input element.
#[derive(Debug, Clone)]
pub struct Input<'a> {
    /// Input name attribute
    pub name: &'a str,
    /// Input type ("text", "password", "number", "hidden", etc.)
    pub r#type: &'a str,
    /// Current value
    pub value: Option<&'a str>,
    /// Placeholder text
    pub placeholder: Option<&'a str>,
    /// Whether the field is required
    pub required: bool,
    /// Optional ID attribute
    pub id: Option<&'a str>,
    /// Optional CSS class
    pub class: Option<&'a str>,
    /// Autocomplete attribute
    pub autocomplete: Option<&'a str>,
    /// Minimum value (for number inputs)
    pub min: Option<&'a str>,
    /// Step value (for number inputs)
    pub step: Option<&'a str>,
}

impl<'a> Input<'a> {
    /// Create a new input with the given name and type.
    #[must_use]
    pub fn new(name: &'a str, r#type: &'a str) -> Self {
        Self {
            name,
            r#type,
            value: None,
            placeholder: None,
            required: false,
            id: None,
            class: None,
            autocomplete: None,
            min: None,
            step: None,
        }
    }

    /// Create a text input.
    #[must_use]
    pub fn text(name: &'a str) -> Self {
        Self::new(name, "text")
    }

    /// Create a password input.
    #[must_use]
    pub fn password(name: &'a str) -> Self {
        Self::new(name, "password")
    }

    /// Create a number input.
    #[must_use]
    pub fn number(name: &'a str) -> Self {
        Self::new(name, "number")
    }

    /// Create a hidden input with a value.
    #[must_use]
    pub fn hidden(name: &'a str, value: &'a str) -> Self {
        let mut input = Self::new(name, "hidden");
        input.value = Some(value);
        input
    }

    /// Set the current value.
    #[must_use]
    pub fn value(mut self, value: &'a str) -> Self {
        self.value = Some(value);
        self
    }

    /// Set the placeholder text.
    #[must_use]
    pub fn placeholder(mut self, placeholder: &'a str) -> Self {
        self.placeholder = Some(placeholder);
        self
    }

    /// Mark the field as required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set the ID attribute.
    #[must_use]
    pub fn id(mut self, id: &'a str) -> Self {
        self.id = Some(id);
        self
    }

    /// Set the CSS class.
    #[must_use]
    pub fn class(mut self, class: &'a str) -> Self {
        self.class = Some(class);
        self
    }

    /// Set the autocomplete attribute.
    #[must_use]
    pub fn autocomplete(mut self, autocomplete: &'a str) -> Self {
        self.autocomplete = Some(autocomplete);
        self
    }

    /// Set min and step for number inputs.
    #[must_use]
    pub fn numeric_bounds(mut self, min: &'a str, step: &'a str) -> Self {
        self.min = Some(min);
        self.step = Some(step);
        self
    }
}

impl Render for Input<'_> {
    fn render(&self) -> Markup {
        html! {
            input
                type=(self.r#type)
                name=(self.name)
                value=[self.value]
                placeholder=[self.placeholder]
                required[self.required]
                id=[self.id]
                class=[self.class]
                autocomplete=[self.autocomplete]
                min=[self.min]
                step=[self.step];
        }
    }
}

/// A textarea element.
#[derive(Debug, Clone)]
pub struct TextArea<'a> {
    pub name: &'a str,
    pub value: Option<&'a str>,
    pub placeholder: Option<&'a str>,
    pub required: bool,
    pub rows: u32,
    pub id: Option<&'a str>,
}

impl<'a> TextArea<'a> {
    #[must_use]
    pub fn new(name: &'a str) -> Self {
        Self {
            name,
            value: None,
            placeholder: None,
            required: false,
            rows: 6,
            id: None,
        }
    }

    /// Set the current value.
    #[must_use]
    pub fn value(mut self, value: &'a str) -> Self {
        self.value = Some(value);
        self
    }

    /// Set the placeholder text.
    #[must_use]
    pub fn placeholder(mut self, placeholder: &'a str) -> Self {
        self.placeholder = Some(placeholder);
        self
    }

    /// Mark the field as required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set the number of visible rows.
    #[must_use]
    pub fn rows(mut self, rows: u32) -> Self {
        self.rows = rows;
        self
    }

    /// Set the ID attribute.
    #[must_use]
    pub fn id(mut self, id: &'a str) -> Self {
        self.id = Some(id);
        self
    }
}

impl Render for TextArea<'_> {
    fn render(&self) -> Markup {
        html! {
            textarea
                name=(self.name)
                placeholder=[self.placeholder]
                required[self.required]
                rows=(self.rows)
                id=[self.id]
            {
                (self.value.unwrap_or(""))
            }
        }
    }
}

/// An option inside a [`Select`].
#[derive(Debug, Clone)]
pub struct SelectOption<'a> {
    pub value: &'a str,
    pub label: &'a str,
    pub selected: bool,
}

impl<'a> SelectOption<'a> {
    #[must_use]
    pub const fn new(value: &'a str, label: &'a str) -> Self {
        Self {
            value,
            label,
            selected: false,
        }
    }

    /// Mark this option as selected.
    #[must_use]
    pub const fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }
}

/// A select element.
#[derive(Debug, Clone)]
pub struct Select<'a> {
    pub name: &'a str,
    pub options: Vec<SelectOption<'a>>,
    pub id: Option<&'a str>,
    /// Submit the enclosing form when the selection changes.
    pub submit_on_change: bool,
}

impl<'a> Select<'a> {
    #[must_use]
    pub fn new(name: &'a str, options: Vec<SelectOption<'a>>) -> Self {
        Self {
            name,
            options,
            id: None,
            submit_on_change: false,
        }
    }

    /// Set the ID attribute.
    #[must_use]
    pub fn id(mut self, id: &'a str) -> Self {
        self.id = Some(id);
        self
    }

    /// Submit the enclosing form when the selection changes.
    #[must_use]
    pub fn submit_on_change(mut self) -> Self {
        self.submit_on_change = true;
        self
    }
}

impl Render for Select<'_> {
    fn render(&self) -> Markup {
        html! {
            select
                name=(self.name)
                id=[self.id]
                onchange=[self.submit_on_change.then_some("this.form.submit()")]
            {
                @for option in &self.options {
                    option value=(option.value) selected[option.selected] {
                        (option.label)
                    }
                }
            }
        }
    }
}

/// A label element.
#[derive(Debug, Clone)]
pub struct Label<'a> {
    pub for_id: &'a str,
    pub text: &'a str,
}

impl<'a> Label<'a> {
    #[must_use]
    pub const fn new(for_id: &'a str, text: &'a str) -> Self {
        Self { for_id, text }
    }
}

impl Render for Label<'_> {
    fn render(&self) -> Markup {
        html! {
            label for=(self.for_id) { (self.text) }
        }
    }
}

/// A labelled form group wrapping a control.
#[derive(Debug)]
pub struct FormGroup<'a> {
    pub label: Label<'a>,
    pub control: Markup,
    pub help: Option<&'a str>,
}

impl<'a> FormGroup<'a> {
    #[must_use]
    pub fn new(label: Label<'a>, control: Markup) -> Self {
        Self {
            label,
            control,
            help: None,
        }
    }

    /// Add help text under the control.
    #[must_use]
    pub fn help(mut self, help: &'a str) -> Self {
        self.help = Some(help);
        self
    }
}

impl Render for FormGroup<'_> {
    fn render(&self) -> Markup {
        html! {
            div class="form-group" {
                (self.label)
                (self.control)
                @if let Some(help) = self.help {
                    small class="form-help" { (help) }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_attributes() {
        let html = Input::text("title")
            .placeholder("Thread title")
            .required()
            .render()
            .into_string();
        assert!(html.contains("name=\"title\""));
        assert!(html.contains("placeholder=\"Thread title\""));
        assert!(html.contains("required"));
    }

    #[test]
    fn test_number_input_bounds() {
        let html = Input::number("price")
            .numeric_bounds("0.01", "0.01")
            .render()
            .into_string();
        assert!(html.contains("type=\"number\""));
        assert!(html.contains("min=\"0.01\""));
        assert!(html.contains("step=\"0.01\""));
    }

    #[test]
    fn test_select_marks_selected_option() {
        let select = Select::new(
            "sort",
            vec![
                SelectOption::new("newest", "Newest"),
                SelectOption::new("oldest", "Oldest").selected(true),
            ],
        );
        let html = select.render().into_string();
        assert!(html.contains("value=\"oldest\" selected"));
        assert!(!html.contains("value=\"newest\" selected"));
    }

    #[test]
    fn test_textarea_escapes_value() {
        let html = TextArea::new("content")
            .value("<script>alert(1)</script>")
            .render()
            .into_string();
        assert!(!html.contains("<script>alert"));
        assert!(html.contains("&lt;script&gt;"));
    }
}
