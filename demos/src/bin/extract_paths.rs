// SPDX-License-Identifier: Apache-2.0

// Prints the scalars found at the given paths of a JSON document on stdin.
//
//   echo '{"a": [1, {"b": 2}]}' | extract_paths a.1.b a.0

use std::env;
use std::io;

use lazyjson::{extract, IoReader, Path, PathItem};

/// `a.1.b` -> `["a", 1, "b"]`. Segments that parse as integers are indices.
fn parse_path(spec: &str) -> Path {
    if spec.is_empty() {
        return Path::new();
    }
    spec.split('.')
        .map(|segment| match segment.parse::<usize>() {
            Ok(index) => PathItem::Index(index),
            Err(_) => PathItem::from(segment),
        })
        .collect()
}

fn main() {
    env_logger::init();

    let args: Vec<_> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} path [path ...] < file.json", args[0]);
        std::process::exit(1);
    }
    let paths: Vec<Path> = args[1..].iter().map(|arg| parse_path(arg)).collect();
    log::info!("extracting {} paths", paths.len());

    let stdin = io::stdin();
    for found in extract(IoReader::new(stdin.lock()), paths) {
        match found {
            Ok((path, value)) => println!("{path:?} = {value}"),
            Err(e) => {
                eprintln!("Error: JSON parsing failed: {}", e);
                std::process::exit(1);
            }
        }
    }
}
