mod common;

use common::fixtures::*;
use common::{TestResult, harness};
use quire::{DocNode, Document, MappedRange, Measurer, PageComputer, PaginationConfig};
use std::cell::RefCell;
use std::rc::Rc;

fn fresh_computer() -> PageComputer {
    let config = PaginationConfig::default();
    let dims = config.derive_dimensions().unwrap();
    let measurer = Rc::new(RefCell::new(Measurer::new(&config, dims.clone())));
    let mut computer = PageComputer::new(&config, dims);
    computer.attach_measurer(measurer);
    computer
}

#[test]
fn compute_from_zero_equals_a_full_pass() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let computer = fresh_computer();
    let doc = random_document(11, 50);
    let full = computer.compute(&doc)?;
    let incremental = computer.compute_from(&doc, &full, 0)?;
    assert!(incremental.same_pages(&full));
    assert_eq!(incremental, full);
    Ok(())
}

#[test]
fn incremental_matches_full_at_arbitrary_change_points() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    for seed in 0..6u64 {
        let computer = fresh_computer();
        let doc = random_document(seed, 60);
        let full = computer.compute(&doc)?;

        let mut probes: Vec<usize> = full
            .pages
            .iter()
            .flat_map(|page| [page.start_pos, page.end_pos, page.end_pos.saturating_sub(1)])
            .collect();
        probes.extend([0, 1, doc.content_size(), doc.content_size() + 50]);

        for from in probes {
            let incremental = computer.compute_from(&doc, &full, from)?;
            assert!(
                incremental.same_pages(&full),
                "seed {seed}, from {from}: {} vs {} pages",
                incremental.page_count(),
                full.page_count()
            );
        }
    }
    Ok(())
}

#[test]
fn engine_insertion_converges_with_a_fresh_compute() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let base: Vec<DocNode> = (0..40)
        .map(|i| DocNode::paragraph(format!("{} {}", lorem(30), i)))
        .collect();
    let before = Document::new(base.clone());

    let mut edited = base;
    edited.insert(20, DocNode::paragraph(lorem(90)));
    let after = Document::new(edited);

    let insert_pos = after
        .blocks()
        .nth(20)
        .map(|(pos, _)| pos)
        .expect("document has 41 blocks");
    let inserted_size = after.children[20].size();

    let h = harness();
    h.engine.set_document(Rc::new(before));
    h.engine.request_immediate_reflow();

    h.engine.set_document(Rc::new(after.clone()));
    h.engine.handle_change_set(&[MappedRange {
        from_old: insert_pos,
        to_old: insert_pos,
        from_new: insert_pos,
        to_new: insert_pos + inserted_size,
    }]);
    h.scheduler.advance_ms(300);

    let incremental = h.engine.get_model().expect("pass ran");
    let fresh = harness();
    fresh.engine.set_document(Rc::new(after));
    fresh.engine.request_immediate_reflow();
    let scratch = fresh.engine.get_model().expect("pass ran");

    assert!(incremental.same_pages(&scratch));
    Ok(())
}

#[test]
fn a_sequence_of_edits_converges() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut blocks: Vec<DocNode> = (0..30).map(|_| DocNode::paragraph(lorem(40))).collect();
    let h = harness();
    h.engine.set_document(Rc::new(Document::new(blocks.clone())));
    h.engine.request_immediate_reflow();

    // Insert, delete, then replace, each reported through the change set.
    let edits: [(usize, Option<DocNode>); 3] = [
        (5, Some(DocNode::table(12, 3))),
        (12, None),
        (0, Some(DocNode::heading(1, lorem(6)))),
    ];
    for (index, replacement) in edits {
        let old_doc = Document::new(blocks.clone());
        let at = old_doc
            .blocks()
            .nth(index)
            .map(|(pos, _)| pos)
            .unwrap_or(1);
        let old_size = blocks[index].size();
        match replacement {
            Some(node) => {
                let new_size = node.size();
                blocks[index] = node;
                h.engine.set_document(Rc::new(Document::new(blocks.clone())));
                h.engine.handle_change_set(&[MappedRange {
                    from_old: at,
                    to_old: at + old_size,
                    from_new: at,
                    to_new: at + new_size,
                }]);
            }
            None => {
                blocks.remove(index);
                h.engine.set_document(Rc::new(Document::new(blocks.clone())));
                h.engine.handle_change_set(&[MappedRange {
                    from_old: at,
                    to_old: at + old_size,
                    from_new: at,
                    to_new: at,
                }]);
            }
        }
        h.scheduler.advance_ms(300);
    }

    let converged = h.engine.get_model().expect("passes ran");
    let fresh = harness();
    fresh
        .engine
        .set_document(Rc::new(Document::new(blocks.clone())));
    fresh.engine.request_immediate_reflow();
    let scratch = fresh.engine.get_model().expect("pass ran");

    assert!(converged.same_pages(&scratch));
    Ok(())
}

#[test]
fn force_full_reflow_equals_a_scratch_compute() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let doc = random_document(42, 70);
    let h = harness();
    h.engine.set_document(Rc::new(doc.clone()));
    h.engine.request_immediate_reflow();
    // Dirty the cache with an unrelated invalidation, then force.
    h.engine.handle_change_set(&[MappedRange {
        from_old: 3,
        to_old: 9,
        from_new: 3,
        to_new: 9,
    }]);
    h.engine.force_full_reflow();

    let forced = h.engine.get_model().expect("pass ran");
    let computer = fresh_computer();
    let scratch = computer.compute(&doc)?;
    assert!(forced.same_pages(&scratch));
    assert_eq!(forced.pages, scratch.pages);
    Ok(())
}

#[test]
fn edits_before_the_last_page_keep_leading_pages_identical() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let computer = fresh_computer();
    let doc = Document::new((0..60).map(|_| DocNode::paragraph(lorem(50))).collect());
    let full = computer.compute(&doc)?;
    assert!(full.page_count() >= 3, "fixture must span several pages");

    let from = full.pages[2].start_pos + 1;
    let incremental = computer.compute_from(&doc, &full, from)?;
    assert_eq!(incremental.pages[..2], full.pages[..2]);
    assert!(incremental.same_pages(&full));
    Ok(())
}
