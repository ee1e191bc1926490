//! Facet policy for the feature view.
//!
//! Everything here is a pure function of a [`Record`]: which facets are
//! present, which of them are follow-up searches, and what the image
//! section should show. The TUI and the CLI both render from these rows.

use crate::{Person, Record};

/// A facet bound to a follow-up lookup: activating it searches
/// `field = value`. `display` is what the user sees, which can differ from
/// the search value (medium searches lowercased but displays as returned).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchLink {
    pub field: String,
    pub value: String,
    pub display: String,
}

impl SearchLink {
    fn new(field: &str, value: &str) -> Self {
        Self {
            field: field.to_string(),
            value: value.to_string(),
            display: value.to_string(),
        }
    }
}

/// One row of the feature view's fact list.
#[derive(Debug, Clone)]
pub struct FacetRow {
    pub label: String,
    pub text: String,
    pub link: Option<SearchLink>,
}

impl FacetRow {
    fn fact(label: &str, text: &str) -> Self {
        Self {
            label: label.to_string(),
            text: text.to_string(),
            link: None,
        }
    }

    fn linked(label: &str, text: &str, link: SearchLink) -> Self {
        Self {
            label: label.to_string(),
            text: text.to_string(),
            link: Some(link),
        }
    }
}

/// Presence test for scalar facets. Deliberately explicit rather than
/// falsy-based: an empty or whitespace-only string is absent.
pub fn is_present(value: Option<&str>) -> bool {
    value.is_some_and(|s| !s.trim().is_empty())
}

fn person_line(person: &Person) -> Option<FacetRow> {
    let name = person.displayname.as_deref().filter(|s| is_present(Some(s)))?;
    // The row shows the alphabetized name when the record carries one; the
    // search target is always the display name.
    let shown = person
        .alphasort
        .as_deref()
        .filter(|s| is_present(Some(s)))
        .unwrap_or(name);
    let text = match person.displaydate.as_deref().filter(|s| is_present(Some(s))) {
        Some(date) => format!("{} ({})", shown, date),
        None => format!("{} (unknown)", shown),
    };
    Some(FacetRow::linked("Person", &text, SearchLink::new("Person", name)))
}

/// The ordered fact list for a record. Absent facets produce no row at all.
pub fn facet_rows(record: &Record) -> Vec<FacetRow> {
    let mut rows = Vec::new();

    if let Some(v) = record.description.as_deref().filter(|s| is_present(Some(s))) {
        rows.push(FacetRow::fact("Description", v));
    }
    if let Some(v) = record.culture.as_deref().filter(|s| is_present(Some(s))) {
        rows.push(FacetRow::linked("Culture", v, SearchLink::new("Culture", v)));
    }
    if let Some(v) = record.style.as_deref().filter(|s| is_present(Some(s))) {
        rows.push(FacetRow::fact("Style", v));
    }
    if let Some(v) = record.technique.as_deref().filter(|s| is_present(Some(s))) {
        rows.push(FacetRow::linked("Technique", v, SearchLink::new("Technique", v)));
    }
    if let Some(v) = record.medium.as_deref().filter(|s| is_present(Some(s))) {
        // Medium searches with the lowercased value but displays as returned.
        let link = SearchLink {
            field: "Medium".to_string(),
            value: v.to_lowercase(),
            display: v.to_string(),
        };
        rows.push(FacetRow::linked("Medium", v, link));
    }
    if let Some(v) = record.dimensions.as_deref().filter(|s| is_present(Some(s))) {
        rows.push(FacetRow::fact("Dimensions", v));
    }
    rows.extend(record.people.iter().filter_map(person_line));
    if let Some(v) = record.department.as_deref().filter(|s| is_present(Some(s))) {
        rows.push(FacetRow::fact("Department", v));
    }
    if let Some(v) = record.division.as_deref().filter(|s| is_present(Some(s))) {
        rows.push(FacetRow::fact("Division", v));
    }
    if let Some(v) = record.contact.as_deref().filter(|s| is_present(Some(s))) {
        rows.push(FacetRow::fact("Contact", v));
    }
    if let Some(v) = record.creditline.as_deref().filter(|s| is_present(Some(s))) {
        rows.push(FacetRow::fact("Credit line", v));
    }

    rows
}

/// Just the activatable links, in fact-list order. The feature pane's link
/// cursor indexes into this.
pub fn search_links(record: &Record) -> Vec<SearchLink> {
    facet_rows(record)
        .into_iter()
        .filter_map(|row| row.link)
        .collect()
}

/// An image entry the UI can show: source URL plus a label.
#[derive(Debug, Clone)]
pub struct ImageEntry {
    pub url: String,
    pub label: String,
}

/// Images with a usable source, in order. An empty result means the UI
/// renders the explicit "Nothing to display" marker.
pub fn image_entries(record: &Record) -> Vec<ImageEntry> {
    record
        .images
        .iter()
        .filter_map(|img| {
            let url = img.baseimageurl.as_deref().filter(|s| is_present(Some(s)))?;
            let label = img
                .alttext
                .as_deref()
                .filter(|s| is_present(Some(s)))
                .unwrap_or(record.display_title());
            Some(ImageEntry {
                url: url.to_string(),
                label: label.to_string(),
            })
        })
        .collect()
}
