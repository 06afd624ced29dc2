// SPDX-License-Identifier: Apache-2.0

// Decodes UTF-8 from stdin and writes the text to stdout.
//
//   decode_utf8 [strict|replace|ignore] < file.txt

use std::env;
use std::io::{self, Write};

use lazyjson::{ErrorPolicy, IoReader, Utf8Decoder};

fn main() {
    env_logger::init();

    let args: Vec<_> = env::args().collect();
    let policy = match args.get(1).map(String::as_str) {
        None | Some("strict") => ErrorPolicy::Strict,
        Some("replace") => ErrorPolicy::Replace,
        Some("ignore") => ErrorPolicy::Ignore,
        Some(other) => {
            eprintln!("Usage: {} [strict|replace|ignore] < file.txt", args[0]);
            eprintln!("Error: unknown policy '{}'", other);
            std::process::exit(1);
        }
    };
    log::info!("decoding with {policy:?}");

    let stdin = io::stdin();
    let mut decoder = Utf8Decoder::with_policy(IoReader::new(stdin.lock()), policy);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    loop {
        match decoder.read(1024) {
            Ok(text) if text.is_empty() => break,
            Ok(text) => {
                if let Err(e) = out.write_all(text.as_bytes()) {
                    eprintln!("Error: Unable to write output: {}", e);
                    std::process::exit(1);
                }
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    }
    log::debug!("decoded {} bytes", decoder.position());
}
