// ABOUTME: Technical specifications section: one labelled row per spec such as runtime or sound mix.
// ABOUTME: Absent section gives an empty collection; there is no metadata fallback.

use crate::dom::{Document, DomNode};
use crate::extractors::non_empty;
use crate::model::{Collection, TechnicalSpec};

const SPEC_ROWS: &str = r#"section[data-testid="TechSpecs"] li.ipc-metadata-list__item"#;

pub fn technical_specs(doc: &Document) -> Collection<TechnicalSpec> {
    doc.find(SPEC_ROWS)
        .iter()
        .filter_map(|row| {
            let name = row
                .find_one(".ipc-metadata-list-item__label")
                .and_then(|label| non_empty(&label.text()))?;

            // Multi-valued rows list each value separately.
            let values: Vec<String> = row
                .find(".ipc-metadata-list-item__list-content-item")
                .iter()
                .filter_map(|item| non_empty(&item.text()))
                .collect();
            let value = if values.is_empty() {
                row.find_one(".ipc-metadata-list-item__content-container")
                    .and_then(|content| non_empty(&content.text()))?
            } else {
                values.join(", ")
            };

            Some(TechnicalSpec { name, value })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn rows_with_single_and_multiple_values() {
        let doc = Document::parse(
            r#"<section data-testid="TechSpecs"><ul>
                <li class="ipc-metadata-list__item">
                    <span class="ipc-metadata-list-item__label">Runtime</span>
                    <div class="ipc-metadata-list-item__content-container">2 hours 49 minutes</div>
                </li>
                <li class="ipc-metadata-list__item">
                    <span class="ipc-metadata-list-item__label">Sound mix</span>
                    <div class="ipc-metadata-list-item__content-container">
                        <ul><li><a class="ipc-metadata-list-item__list-content-item">Dolby Digital</a></li>
                        <li><a class="ipc-metadata-list-item__list-content-item">DTS</a></li></ul>
                    </div>
                </li>
                <li class="ipc-metadata-list__item"><span class="ipc-metadata-list-item__label">Empty</span></li>
            </ul></section>"#,
        );

        let specs: Vec<(String, String)> = technical_specs(&doc)
            .into_iter()
            .map(|(_, spec)| (spec.name, spec.value))
            .collect();
        assert_eq!(
            specs,
            vec![
                ("Runtime".to_string(), "2 hours 49 minutes".to_string()),
                ("Sound mix".to_string(), "Dolby Digital, DTS".to_string()),
            ]
        );
    }

    #[test]
    fn missing_section_is_empty() {
        let doc = Document::parse("<html><body></body></html>");
        assert!(technical_specs(&doc).is_empty());
    }
}
