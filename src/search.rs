//! Global keyword search across every collection.
//!
//! Case-insensitive substring match over a small fixed set of fields per
//! collection. There is deliberately no ranking here: relevance scoring
//! belongs to the presentation layer, not the core.

use serde_json::Value;

use crate::store::{Collection, Store};

/// One search hit: the collection it came from and the matching record.
#[derive(Debug, Clone, Copy)]
pub struct SearchHit<'a> {
    pub collection: Collection,
    pub record: &'a Value,
}

/// Fields inspected per collection.
fn searched_fields(collection: Collection) -> &'static [&'static str] {
    match collection {
        Collection::CodeDocs => &["filename", "summary"],
        Collection::QueryLibrary => &["query_text", "category"],
        Collection::ErrorLogs => &["filename", "summary"],
        Collection::SopLibrary => &["title", "category"],
        Collection::Flows => &["title", "source"],
        _ => &["title", "category"],
    }
}

/// Search every collection for `keyword`, in collection order.
pub fn global_search<'a>(store: &'a Store, keyword: &str) -> Vec<SearchHit<'a>> {
    let needle = keyword.to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    let mut hits = Vec::new();
    for collection in Collection::ALL {
        let fields = searched_fields(collection);
        for record in store.select(collection) {
            let matched = fields.iter().any(|field| {
                record
                    .get(field)
                    .and_then(Value::as_str)
                    .is_some_and(|v| v.to_lowercase().contains(&needle))
            });
            if matched {
                hits.push(SearchHit { collection, record });
            }
        }
    }
    hits
}
