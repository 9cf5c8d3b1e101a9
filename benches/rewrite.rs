//! This bench test rewrites the longest chapter in the catalog (Psalm 119,
//! 176 verses) with footnotes, as fetched from the converter.

#![allow(missing_docs)]

use std::fmt::Write;

use bible_vault::{
    storage::rewrite, Catalog, Exclusions, Namer, Navigation, RunConfig, Settings, Version,
};
use criterion::{criterion_group, criterion_main, Criterion};

fn raw_chapter(verses: usize) -> String {
    let mut raw = String::from("# Psalm 119\n\n## Aleph\n");
    for verse in 1..=verses {
        writeln!(
            raw,
            "###### {verse} Blessed are the undefiled in the way, who walk in the law of the LORD."
        )
        .unwrap();
    }
    raw.push_str("\n### Footnotes\n");
    for note in 0..20 {
        writeln!(raw, "{note}. a footnote").unwrap();
    }
    raw
}

fn rewrite_chapter(c: &mut Criterion) {
    let catalog = Catalog::bible();
    let config = RunConfig::new(
        Version::new("kjv").unwrap(),
        Settings::default(),
        Exclusions::default(),
    )
    .unwrap();
    let namer = Namer::new(&catalog, &config);
    let psalms = catalog.section("Psalms").unwrap();
    let navigation = Navigation::new(&namer, psalms, 119).to_string();
    let raw = raw_chapter(176);

    c.bench_function("rewrite psalm 119", |b| {
        b.iter(|| rewrite(std::hint::black_box(&raw), &navigation));
    });
}

criterion_group!(benches, rewrite_chapter);
criterion_main!(benches);
