//! Projection of a document's IEDs into dialog list items.

use std::collections::HashMap;

use xmltree::Element;

use crate::domain::document::{SclDocument, attribute};
use crate::domain::model::{IedHandle, ListItem};

const PART_SEPARATOR: &str = " - ";
const HEADLINE_SEPARATOR: &str = " — ";

/// The two descriptive lines shown beneath an IED name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IedDescription {
    pub first_line: String,
    pub second_line: String,
}

/// Describe an IED from its manufacturer, type, and version attributes.
///
/// Absent attributes are left out of the joins; present but empty ones still take their slot.
pub fn describe_ied(ied: &Element) -> IedDescription {
    let get = |name: &str| attribute(ied, name);

    let first_line = [get("manufacturer"), get("type")]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(PART_SEPARATOR);

    let schema_parts: Vec<&str> = [
        get("originalSclVersion"),
        get("originalSclRevision"),
        get("originalSclRelease"),
    ]
    .into_iter()
    .flatten()
    .collect();
    let schema_information = (!schema_parts.is_empty()).then(|| schema_parts.concat());

    let second_line = [
        get("desc").map(str::to_owned),
        get("configVersion").map(str::to_owned),
        schema_information,
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(PART_SEPARATOR);

    IedDescription {
        first_line,
        second_line,
    }
}

/// Build one unselected list item per IED, in document order.
pub fn project_items(doc: Option<&SclDocument>) -> Vec<ListItem> {
    let Some(doc) = doc else {
        return Vec::new();
    };

    let mut seen: HashMap<&str, usize> = HashMap::new();
    doc.ieds()
        .into_iter()
        .map(|(_, ied)| {
            let name = attribute(ied, "name").unwrap_or_default();
            let occurrence = seen.entry(name).or_default();
            let handle = IedHandle::nth(name, *occurrence);
            *occurrence += 1;
            let IedDescription {
                first_line,
                second_line,
            } = describe_ied(ied);
            ListItem {
                headline: format!("{name}{HEADLINE_SEPARATOR}{first_line}"),
                supporting_text: second_line,
                ied: handle,
                selected: false,
            }
        })
        .collect()
}
