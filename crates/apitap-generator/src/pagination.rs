//! Pagination detection (SPEC_FULL §C.5).

use apitap_skillfile::{PaginationSpec, PaginationStyle};
use serde_json::Value;
use std::collections::BTreeMap;

const OFFSET_PARAMS: &[&str] = &["offset"];
const PAGE_PARAMS: &[&str] = &["page", "page_number", "pagenum"];
const CURSOR_PARAMS: &[&str] = &["cursor", "next_token", "after", "page_token"];

const CURSOR_RESPONSE_FIELDS: &[&str] = &["next_cursor", "nextCursor", "next_token", "nextPageToken"];
const COUNT_RESPONSE_FIELDS: &[&str] = &["has_more", "hasMore", "total", "total_count", "totalCount"];

pub fn detect(query_params: &BTreeMap<String, String>, response_body: Option<&Value>) -> Option<PaginationSpec> {
    let (style, param_name) = query_params.keys().find_map(|name| {
        let lower = name.to_lowercase();
        if CURSOR_PARAMS.contains(&lower.as_str()) {
            Some((PaginationStyle::Cursor, name.clone()))
        } else if PAGE_PARAMS.contains(&lower.as_str()) {
            Some((PaginationStyle::Page, name.clone()))
        } else if OFFSET_PARAMS.contains(&lower.as_str()) {
            Some((PaginationStyle::Offset, name.clone()))
        } else {
            None
        }
    })?;

    let response_field = response_body
        .and_then(|body| body.as_object())
        .and_then(|obj| {
            CURSOR_RESPONSE_FIELDS
                .iter()
                .chain(COUNT_RESPONSE_FIELDS)
                .find(|field| obj.contains_key(**field))
        })
        .map(|s| s.to_string());

    Some(PaginationSpec { style, param_name, response_field })
}
