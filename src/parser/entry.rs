use super::locate::{Match, MatchKind};
use super::sections::{self, SectionLabel};
use crate::document::Document;

/// Extracted documentation for one roster name.
#[derive(Debug, Clone)]
pub struct EntryRecord {
    pub name: String,
    pub matched: Match,
    pub sections: Vec<(SectionLabel, String)>,
}

impl EntryRecord {
    /// Run every section extraction for a located heading. `None` when no
    /// section produced any text.
    pub fn collect(doc: &Document, name: &str, matched: Match) -> Option<Self> {
        let sections: Vec<_> = SectionLabel::ALL
            .iter()
            .filter_map(|&label| {
                sections::extract_section(doc, matched.heading, label).map(|text| (label, text))
            })
            .collect();

        if sections.is_empty() {
            return None;
        }
        Some(EntryRecord {
            name: name.to_string(),
            matched,
            sections,
        })
    }

    pub fn labels(&self) -> Vec<SectionLabel> {
        self.sections.iter().map(|(label, _)| *label).collect()
    }

    /// Label the entry was found under, when it differs from its name.
    pub fn alias(&self) -> Option<&str> {
        match self.matched.kind {
            MatchKind::Prefix => Some(&self.matched.label),
            MatchKind::Exact => None,
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for (label, text) in &self.sections {
            out.push_str(&format!("### {}\n\n{}\n\n", label, text));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::locate::HeadingIndex;

    fn record(html: &str, name: &str) -> Option<EntryRecord> {
        let doc = Document::parse(html);
        let m = HeadingIndex::build(&doc).locate(name).into_match()?;
        EntryRecord::collect(&doc, name, m)
    }

    #[test]
    fn renders_abs_entry() {
        let html = r#"<section>
            <p class="rubric"><code class="docutils literal"><span class="pre">abs</span></code></p>
            <p class="rubric">Description</p>
            <p>Computes absolute value.</p>
            <p class="rubric">Syntax</p>
            <div class="highlight-text notranslate"><div class="highlight"><pre>abs.type d, a;</pre><button class="copybtn">Copy</button></div></div>
        </section>"#;
        let r = record(html, "abs").unwrap();
        assert_eq!(
            r.render(),
            "### Description\n\nComputes absolute value.\n\n### Syntax\n\n```\nabs.type d, a;\n```\n\n"
        );
        assert_eq!(r.alias(), None);
    }

    #[test]
    fn sections_follow_fixed_order() {
        let html = r#"<section>
            <p class="rubric"><code>neg</code></p>
            <p class="rubric">Examples</p><pre>neg.s32 r0, r0;</pre>
            <p class="rubric">Syntax</p><pre>neg.type d, a;</pre>
            <p class="rubric">Description</p><p>Negate.</p>
        </section>"#;
        let r = record(html, "neg").unwrap();
        assert_eq!(
            r.labels(),
            [SectionLabel::Description, SectionLabel::Syntax, SectionLabel::Examples]
        );
        assert!(r.render().starts_with("### Description\n\nNegate.\n\n### Syntax"));
    }

    #[test]
    fn empty_section_header_is_omitted() {
        let html = r#"<section>
            <p class="rubric"><code>trap</code></p>
            <p class="rubric">Description</p>
            <p class="rubric">Syntax</p><pre>trap;</pre>
        </section>"#;
        let r = record(html, "trap").unwrap();
        assert_eq!(r.render(), "### Syntax\n\n```\ntrap;\n```\n\n");
    }

    #[test]
    fn heading_without_sections_yields_nothing() {
        let html = r#"<section><p class="rubric"><code>exit</code></p><p>Terminate.</p></section>"#;
        assert!(record(html, "exit").is_none());
    }

    #[test]
    fn prefix_match_reports_alias() {
        let html = r#"<section>
            <p class="rubric"><code>elect.sync</code></p>
            <p class="rubric">Syntax</p><pre>elect.sync d|p, membermask;</pre>
        </section>"#;
        let r = record(html, "elect").unwrap();
        assert_eq!(r.name, "elect");
        assert_eq!(r.alias(), Some("elect.sync"));
    }
}
