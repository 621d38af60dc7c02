#![allow(dead_code)]

use lopdf::content::Content;
use lopdf::Document;
use serde_json::{json, Value};

/// Minimal control-implementation entry as the upstream API returns it.
pub fn control(identifier: &str, score: Value) -> Value {
    json!({
        "control": {
            "identifier": identifier,
            "name": format!("Control {}", identifier),
            "description": "Ensure the thing is done",
            "orgGroupName": "Acme Holdings"
        },
        "effectivenessInfo": {"name": "Effective"},
        "attributes": {
            "AttributeFormulaValue.value1_2": [{"value": score}]
        }
    })
}

pub fn controls(prefix: usize, count: usize) -> Vec<Value> {
    (1..=count)
        .map(|i| control(&format!("{}.{}", prefix, i), json!("10")))
        .collect()
}

pub fn page_body(content: Vec<Value>, total_pages: u64) -> Value {
    json!({
        "content": content,
        "totalPages": total_pages,
        "number": 0
    })
}

pub fn filter_body(org_id: &str) -> Value {
    json!({
        "filters": [
            {"field": "organizationId", "operator": "EQUAL_TO", "value": org_id}
        ]
    })
}

/// Text shown by each page's `Tj` operators, page by page.
pub fn pdf_page_texts(pdf: &[u8]) -> Vec<Vec<String>> {
    let doc = Document::load_mem(pdf).expect("valid pdf");
    doc.get_pages()
        .values()
        .map(|page_id| {
            let raw = doc.get_page_content(*page_id).expect("page content");
            Content::decode(&raw)
                .expect("decodable content")
                .operations
                .iter()
                .filter(|op| op.operator == "Tj")
                .map(|op| {
                    String::from_utf8_lossy(op.operands[0].as_str().expect("string operand"))
                        .to_string()
                })
                .collect()
        })
        .collect()
}
