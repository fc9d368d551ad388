//! x-ui subscription page extractor.
//!
//! The page embeds its usage data as attributes of a single element:
//!
//! ```html
//! <template id="subscription-data"
//!   data-sid="uk2jf33cdnzjn2dg"
//!   data-downloadbyte="6150124543"
//!   data-uploadbyte="267143927"
//!   data-totalbyte="536870912000"
//!   data-expire="1769184000"></template>
//! ```

use scraper::{ElementRef, Html};

use super::{ExtractError, Extractor, Field};
use crate::record::ExtractedRecord;

const TEMPLATE_ID: &str = "subscription-data";

/// Reads `template#subscription-data` with an HTML5 parser.
#[derive(Debug, Default, Clone, Copy)]
pub struct TemplateExtractor;

impl TemplateExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Extractor for TemplateExtractor {
    fn extract(&self, body: &[u8]) -> Result<ExtractedRecord, ExtractError> {
        let text = String::from_utf8_lossy(body);
        let doc = Html::parse_document(&text);

        let template = find_template(&doc).ok_or(ExtractError::TemplateNotFound)?;

        let sid = match template.value().attr("data-sid") {
            Some(s) if !s.is_empty() => s.to_owned(),
            _ => return Err(ExtractError::MissingSid),
        };

        let downloaded = int_attr(template, Field::Downloaded)?;
        let uploaded = int_attr(template, Field::Uploaded)?;
        let quota = int_attr(template, Field::Quota)?;
        let expiry = int_attr(template, Field::Expiry)?;

        let invalid = |field, value| ExtractError::Invalid {
            sid: sid.clone(),
            field,
            value,
        };
        if quota <= 0 {
            return Err(invalid(Field::Quota, quota));
        }
        if expiry <= 0 {
            return Err(invalid(Field::Expiry, expiry));
        }
        if downloaded < 0 {
            return Err(invalid(Field::Downloaded, downloaded));
        }
        if uploaded < 0 {
            return Err(invalid(Field::Uploaded, uploaded));
        }
        if downloaded.checked_add(uploaded).is_none() {
            return Err(invalid(Field::Uploaded, uploaded));
        }

        Ok(ExtractedRecord {
            sid,
            downloaded,
            uploaded,
            quota,
            expiry,
        })
    }
}

/// First `<template id="subscription-data">` in document order.
fn find_template(doc: &Html) -> Option<ElementRef<'_>> {
    doc.root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .find(|el| {
            let v = el.value();
            v.name() == "template" && v.attr("id") == Some(TEMPLATE_ID)
        })
}

fn int_attr(el: ElementRef<'_>, field: Field) -> Result<i64, ExtractError> {
    let raw = el
        .value()
        .attr(field.attr())
        .ok_or(ExtractError::MissingField(field))?;
    raw.parse::<i64>()
        .map_err(|_| ExtractError::NotAnInteger {
            field,
            value: raw.to_owned(),
        })
}
