pub mod blocks;
pub mod entry;
pub mod locate;
pub mod sections;

use crate::document::Document;
use entry::EntryRecord;
use locate::{HeadingIndex, Located, Match};

/// What resolving one roster name produced.
#[derive(Debug, Clone)]
pub enum Outcome {
    Resolved(EntryRecord),
    NotFound,
    Empty(Match),
}

/// Three-pass pipeline: heading index → located entry → extracted sections.
pub fn process_entry(doc: &Document, index: &HeadingIndex, name: &str) -> Outcome {
    match index.locate(name) {
        Located::NotFound => Outcome::NotFound,
        Located::Found(m) => match EntryRecord::collect(doc, name, m.clone()) {
            Some(record) => Outcome::Resolved(record),
            None => Outcome::Empty(m),
        },
    }
}
