use quire::{DocNode, Document};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Deterministic filler text of roughly `words` words.
pub fn lorem(words: usize) -> String {
    const BANK: [&str; 8] = [
        "river", "ledger", "carbon", "window", "harbor", "signal", "meadow", "copper",
    ];
    (0..words)
        .map(|i| BANK[i % BANK.len()])
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn paragraphs(count: usize, words_each: usize) -> Document {
    Document::new(
        (0..count)
            .map(|_| DocNode::paragraph(lorem(words_each)))
            .collect(),
    )
}

/// A mixed document drawn from a seeded generator, covering the full node
/// vocabulary with occasional forced breaks.
pub fn random_document(seed: u64, blocks: usize) -> Document {
    let mut rng = StdRng::seed_from_u64(seed);
    let children = (0..blocks)
        .map(|_| match rng.random_range(0..10u8) {
            0 => DocNode::heading(rng.random_range(1..=6), lorem(rng.random_range(1..8))),
            1 => DocNode::code_block(lorem(rng.random_range(2..30)).replace(' ', "\n")),
            2 => DocNode::blockquote(vec![
                DocNode::paragraph(lorem(rng.random_range(3..40))),
                DocNode::paragraph(lorem(rng.random_range(3..40))),
            ]),
            3 => DocNode::bullet_list(
                (0..rng.random_range(1..8usize))
                    .map(|_| DocNode::list_item(vec![DocNode::paragraph(lorem(4))]))
                    .collect(),
            ),
            4 => DocNode::table(rng.random_range(1..40), rng.random_range(1..5)),
            5 => DocNode::image(if rng.random_bool(0.5) {
                Some(rng.random_range(50.0..900.0))
            } else {
                None
            }),
            6 => DocNode::HorizontalRule,
            7 => DocNode::PageBreak,
            _ => DocNode::paragraph(lorem(rng.random_range(1..120))),
        })
        .collect();
    Document::new(children)
}
