// SPDX-License-Identifier: Apache-2.0

use lazyjson::{extract, load, ChunkReader, EventKind, Map, Parser, Path, PathItem, Value};
use quickcheck::{Arbitrary, Gen, QuickCheck, TestResult};

/// A document the grammar can express: finite numbers, and strings without
/// quotes, backslashes or control characters.
#[derive(Debug, Clone)]
struct Doc(Value);

fn plain_string(g: &mut Gen) -> String {
    String::arbitrary(g)
        .chars()
        .filter(|c| !matches!(c, '"' | '\\') && !c.is_control())
        .collect()
}

fn finite(g: &mut Gen) -> f64 {
    let mut n = f64::arbitrary(g);
    while !n.is_finite() {
        n = f64::arbitrary(g);
    }
    n
}

impl Arbitrary for Doc {
    fn arbitrary(g: &mut Gen) -> Self {
        fn gen_val(g: &mut Gen, depth: usize) -> Value {
            let kinds = if depth == 0 { 3 } else { 5 };
            match usize::arbitrary(g) % kinds {
                0 => Value::Null,
                1 => Value::Number(finite(g)),
                2 => Value::from(plain_string(g).as_str()),
                3 => {
                    let len = usize::arbitrary(g) % 4;
                    Value::Array((0..len).map(|_| gen_val(g, depth - 1)).collect())
                }
                _ => {
                    let len = usize::arbitrary(g) % 4;
                    let mut map = Map::new();
                    for _ in 0..len {
                        map.insert(plain_string(g).into(), gen_val(g, depth - 1));
                    }
                    Value::Object(map)
                }
            }
        }

        let depth = usize::arbitrary(g) % 4;
        Doc(gen_val(g, depth))
    }
}

/// Paths to every scalar in `value`.
fn scalar_paths(value: &Value, prefix: &mut Path, out: &mut Vec<(Path, Value)>) {
    match value {
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                prefix.push(PathItem::Index(i));
                scalar_paths(item, prefix, out);
                prefix.pop();
            }
        }
        Value::Object(map) => {
            for (key, item) in map {
                prefix.push(PathItem::Key(key.clone()));
                scalar_paths(item, prefix, out);
                prefix.pop();
            }
        }
        scalar => out.push((prefix.clone(), scalar.clone())),
    }
}

#[test]
fn load_reads_back_rendered_plain_documents() {
    fn prop(doc: Doc, chunk: usize) -> bool {
        let text = doc.0.to_string();
        let chunk = 1 + chunk % 32;
        load(ChunkReader::new(text.as_bytes(), chunk)) == Ok(doc.0)
    }

    QuickCheck::new()
        .tests(500)
        .quickcheck(prop as fn(Doc, usize) -> bool);
}

#[test]
fn events_nest_and_balance() {
    fn prop(doc: Doc) -> bool {
        let text = doc.0.to_string();
        let mut parser = Parser::new(ChunkReader::new(text.as_bytes(), 5));
        let mut depth = 0i64;
        loop {
            match parser.next_event().map(|event| event.kind()) {
                Ok(EventKind::ObjectOpen | EventKind::ArrayOpen) => depth += 1,
                Ok(EventKind::ObjectClose | EventKind::ArrayClose) => {
                    depth -= 1;
                    if depth < 0 {
                        return false;
                    }
                }
                Ok(EventKind::EndOfInput) => break,
                Ok(_) => {}
                Err(_) => return false,
            }
        }
        depth == 0 && parser.next_event().map(|event| event.kind()) == Ok(EventKind::EndOfInput)
    }

    QuickCheck::new()
        .tests(500)
        .quickcheck(prop as fn(Doc) -> bool);
}

#[test]
fn extraction_finds_every_scalar_deterministically() {
    fn prop(doc: Doc) -> TestResult {
        let mut expected = Vec::new();
        scalar_paths(&doc.0, &mut Vec::new(), &mut expected);
        if expected.is_empty() {
            return TestResult::discard();
        }
        let text = doc.0.to_string();
        let paths: Vec<Path> = expected.iter().map(|(p, _)| p.clone()).collect();
        let run = |chunk| {
            extract(ChunkReader::new(text.as_bytes(), chunk), paths.clone())
                .collect::<Result<Vec<_>, _>>()
        };
        let first = run(1);
        let second = run(7);
        // Object members come back in key order, matching document order
        TestResult::from_bool(first == second && first == Ok(expected))
    }

    QuickCheck::new()
        .tests(300)
        .quickcheck(prop as fn(Doc) -> TestResult);
}
