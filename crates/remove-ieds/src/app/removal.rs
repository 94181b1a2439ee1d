//! Computes the edit that removes one IED and everything that refers to it.

use crate::domain::document::{NodePath, SclDocument, attribute};
use crate::domain::edit::{Edit, EditEvent};
use crate::domain::model::IedHandle;

/// Elements that reference an IED through an `iedName` attribute and go away with it.
const REFERENCING_ELEMENTS: &[&str] = &["ConnectedAP", "ExtRef", "ClientLN", "KDC"];

/// `iedName` value of a logical node that is not allocated to any IED.
const UNALLOCATED: &str = "None";

/// Build the compound edit removing `ied` from `doc`.
///
/// Besides the `IED` element itself the event removes communication access points, inputs,
/// report clients, GOOSE/SV subscriber entries, and key distribution references naming the IED,
/// and releases `LNode` allocations to it. An IED without a name is removed on its own since
/// nothing can refer to it. Returns `None` when the IED is not in the document.
pub fn remove_ied(doc: &SclDocument, ied: &IedHandle) -> Option<EditEvent> {
    let name = ied.name();
    let (ied_path, _) = doc.nth_ied(name, ied.occurrence())?;

    let mut removals: Vec<NodePath> = vec![ied_path.clone()];
    let mut updates = Vec::new();

    let candidates = if name.is_empty() {
        Vec::new()
    } else {
        doc.elements()
    };
    for (path, element) in candidates {
        if path.is_within(&ied_path) {
            continue;
        }

        let element_name = element.name.as_str();
        if REFERENCING_ELEMENTS.contains(&element_name)
            && attribute(element, "iedName") == Some(name)
        {
            removals.push(path);
        } else if element_name == "IEDName"
            && element
                .get_text()
                .is_some_and(|text| text.trim() == name)
        {
            removals.push(path);
        } else if element_name == "LNode" && attribute(element, "iedName") == Some(name) {
            updates.push(Edit::update(
                path.clone(),
                "LNode",
                "iedName",
                Some(UNALLOCATED.to_owned()),
            ));
            if attribute(element, "ldInst").is_some() {
                updates.push(Edit::update(path, "LNode", "ldInst", None));
            }
        }
    }

    removals.sort();
    let mut edits: Vec<Edit> = Vec::with_capacity(removals.len() + updates.len());
    let mut kept: Vec<&NodePath> = Vec::new();
    for path in &removals {
        if kept.iter().any(|ancestor| path.is_within(ancestor)) {
            continue;
        }
        kept.push(path);
    }
    for path in kept {
        let element = doc.get(path).map(|el| el.name.clone()).unwrap_or_default();
        edits.push(Edit::remove(path.clone(), element));
    }
    // Updates below a removed element would be wasted work.
    let updates: Vec<Edit> = updates
        .into_iter()
        .filter(|update| {
            !edits
                .iter()
                .any(|removal| update.path().is_within(removal.path()))
        })
        .collect();
    edits.extend(updates);

    Some(EditEvent::new(format!("Remove IED {}", ied.label()), edits))
}
