// src/autofill/headless.rs
//! In-memory form document built from an HTML string, so the matcher can run
//! without a browser. Mutations and dispatched events are recorded.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use std::collections::HashMap;

use super::document::{
    ControlKind, ControlRef, DocumentMutation, DocumentQuery, FormEvent, Label, SelectOption,
};
use crate::extractors::text::clean_text;

// --- CSS Selectors (Lazy Static) ---
static CONTROL_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("input, textarea, select").expect("Failed to compile CONTROL_SELECTOR"));
static TEXT_CONTROL_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("input, textarea").expect("Failed to compile TEXT_CONTROL_SELECTOR"));
static LABEL_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("label").expect("Failed to compile LABEL_SELECTOR"));
static OPTION_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("option").expect("Failed to compile OPTION_SELECTOR"));

#[derive(Debug, Clone)]
struct Control {
    kind: ControlKind,
    /// Attribute names are lowercase, as the HTML parser emits them.
    attributes: Vec<(String, String)>,
    value: String,
    checked: bool,
    wrapping_label: Option<String>,
    options: Vec<SelectOption>,
}

impl Control {
    fn attr(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        self.attributes
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// One dispatched notification, in dispatch order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RecordedEvent {
    pub target: ControlRef,
    #[serde(flatten)]
    pub event: FormEvent,
}

/// Serializable view of a control after a fill pass.
#[derive(Debug, Clone, Serialize)]
pub struct ControlState {
    pub control: ControlRef,
    pub kind: ControlKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub value: String,
    pub checked: bool,
    pub events: Vec<&'static str>,
}

#[derive(Debug, Clone, Default)]
pub struct HeadlessDocument {
    controls: Vec<Control>,
    labels: Vec<Label>,
    focused: Option<ControlRef>,
    events: Vec<RecordedEvent>,
}

impl HeadlessDocument {
    /// Indexes every input, textarea, select and label in document order.
    pub fn parse(html: &str) -> Self {
        let document = Html::parse_document(html);

        let mut index = HashMap::new();
        let mut controls = Vec::new();
        for element in document.select(&CONTROL_SELECTOR) {
            index.insert(element.id(), ControlRef(controls.len()));
            controls.push(read_control(element));
        }

        let labels: Vec<Label> = document
            .select(&LABEL_SELECTOR)
            .map(|label| Label {
                text: element_text(label),
                for_id: label.value().attr("for").map(str::trim).filter(|id| !id.is_empty()).map(String::from),
                nested_control: label
                    .select(&TEXT_CONTROL_SELECTOR)
                    .next()
                    .and_then(|nested| index.get(&nested.id()).copied()),
            })
            .collect();

        tracing::debug!("Indexed {} controls and {} labels", controls.len(), labels.len());
        Self { controls, labels, focused: None, events: Vec::new() }
    }

    fn control(&self, control: ControlRef) -> Option<&Control> {
        self.controls.get(control.0)
    }

    pub fn focused(&self) -> Option<ControlRef> {
        self.focused
    }

    /// Every dispatched notification, in dispatch order.
    pub fn events(&self) -> &[RecordedEvent] {
        &self.events
    }

    pub fn events_for(&self, control: ControlRef) -> impl Iterator<Item = FormEvent> + '_ {
        self.events.iter().filter(move |e| e.target == control).map(|e| e.event)
    }

    fn position(&self, predicate: impl Fn(&Control) -> bool) -> Option<ControlRef> {
        self.controls.iter().position(predicate).map(ControlRef)
    }

    /// Controls that received at least one event, in document order.
    pub fn touched_controls(&self) -> Vec<ControlState> {
        let mut touched: Vec<ControlRef> = self.events.iter().map(|e| e.target).collect();
        touched.sort();
        touched.dedup();
        touched
            .into_iter()
            .filter_map(|control| {
                let state = self.control(control)?;
                Some(ControlState {
                    control,
                    kind: state.kind,
                    name: state.attr("name").map(String::from),
                    id: state.attr("id").map(String::from),
                    value: state.value.clone(),
                    checked: state.checked,
                    events: self.events_for(control).map(|e| e.kind.name()).collect(),
                })
            })
            .collect()
    }
}

fn element_text(element: ElementRef<'_>) -> String {
    clean_text(&element.text().collect::<Vec<_>>().join(" "))
}

fn read_control(element: ElementRef<'_>) -> Control {
    let el = element.value();
    let kind = match el.name() {
        "textarea" => ControlKind::Textarea,
        "select" => ControlKind::Select,
        _ => ControlKind::Input,
    };

    let attributes = el
        .attrs()
        .map(|(key, value)| (key.to_ascii_lowercase(), value.to_string()))
        .collect();

    let options: Vec<SelectOption> = if kind == ControlKind::Select {
        element
            .select(&OPTION_SELECTOR)
            .map(|option| {
                let text = element_text(option);
                SelectOption {
                    // An option without a value attribute submits its text
                    value: option.value().attr("value").map(String::from).unwrap_or_else(|| text.clone()),
                    text,
                }
            })
            .collect()
    } else {
        Vec::new()
    };

    let value = match kind {
        ControlKind::Textarea => element.text().collect::<String>(),
        ControlKind::Select => element
            .select(&OPTION_SELECTOR)
            .position(|option| option.value().attr("selected").is_some())
            .or(if options.is_empty() { None } else { Some(0) })
            .map(|i| options[i].value.clone())
            .unwrap_or_default(),
        ControlKind::Input => el.attr("value").unwrap_or_default().to_string(),
    };

    let wrapping_label = element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|ancestor| ancestor.value().name() == "label")
        .map(element_text);

    Control {
        kind,
        attributes,
        value,
        checked: el.attr("checked").is_some(),
        wrapping_label,
        options,
    }
}

#[cfg(test)]
impl HeadlessDocument {
    pub fn value(&self, control: ControlRef) -> &str {
        self.control(control).map(|c| c.value.as_str()).unwrap_or_default()
    }

    pub fn is_checked(&self, control: ControlRef) -> bool {
        self.control(control).is_some_and(|c| c.checked)
    }

    /// First control whose `name` attribute equals `name` exactly.
    pub fn control_by_name(&self, name: &str) -> Option<ControlRef> {
        self.position(|c| c.attr("name") == Some(name))
    }

    /// Control within a named group (radio buttons) carrying `value`.
    pub fn control_by_value(&self, name: &str, value: &str) -> Option<ControlRef> {
        self.position(|c| c.attr("name") == Some(name) && c.attr("value") == Some(value))
    }
}

impl DocumentQuery for HeadlessDocument {
    fn find_by_attribute(&self, kinds: &[ControlKind], attrs: &[&str], pattern: &str) -> Vec<ControlRef> {
        let pattern = pattern.to_lowercase();
        self.controls
            .iter()
            .enumerate()
            .filter(|(_, control)| kinds.contains(&control.kind))
            .filter(|(_, control)| {
                attrs
                    .iter()
                    .filter_map(|attr| control.attr(attr))
                    .any(|value| value.to_lowercase().contains(&pattern))
            })
            .map(|(i, _)| ControlRef(i))
            .collect()
    }

    fn labels(&self) -> Vec<Label> {
        self.labels.clone()
    }

    fn control_by_id(&self, id: &str) -> Option<ControlRef> {
        self.position(|c| c.attr("id") == Some(id))
    }

    fn kind(&self, control: ControlRef) -> ControlKind {
        self.control(control).map(|c| c.kind).unwrap_or(ControlKind::Input)
    }

    fn attribute(&self, control: ControlRef, attr: &str) -> Option<String> {
        self.control(control)?.attr(attr).map(String::from)
    }

    fn options(&self, select: ControlRef) -> Vec<SelectOption> {
        self.control(select).map(|c| c.options.clone()).unwrap_or_default()
    }

    fn label_text(&self, control: ControlRef) -> Option<String> {
        let state = self.control(control)?;
        if let Some(text) = &state.wrapping_label {
            return Some(text.clone());
        }
        let id = state.attr("id")?;
        self.labels
            .iter()
            .find(|label| label.for_id.as_deref() == Some(id))
            .map(|label| label.text.clone())
    }
}

impl DocumentMutation for HeadlessDocument {
    fn focus(&mut self, control: ControlRef) {
        self.focused = Some(control);
    }

    fn set_value(&mut self, control: ControlRef, value: &str) {
        if let Some(state) = self.controls.get_mut(control.0) {
            state.value = value.to_string();
        }
    }

    fn set_checked(&mut self, control: ControlRef, checked: bool) {
        let Some(state) = self.controls.get(control.0) else {
            return;
        };
        // Checking a radio unchecks the rest of its group
        let is_radio = state.attr("type").is_some_and(|t| t.eq_ignore_ascii_case("radio"));
        let group = state.attr("name").map(String::from);
        if checked && is_radio && group.is_some() {
            for other in self.controls.iter_mut() {
                if other.kind == ControlKind::Input && other.attr("name").map(String::from) == group {
                    other.checked = false;
                }
            }
        }
        if let Some(state) = self.controls.get_mut(control.0) {
            state.checked = checked;
        }
    }

    fn dispatch(&mut self, control: ControlRef, event: FormEvent) {
        tracing::trace!("Dispatching {} on {:?}", event.kind.name(), control);
        self.events.push(RecordedEvent { target: control, event });
    }
}
