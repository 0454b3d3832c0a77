use std::{env, fs, process};

use known_headers::gen::emit;

fn main() {
    let artifact = emit::render();
    match env::args().nth(1) {
        Some(path) => {
            if let Err(e) = fs::write(&path, &artifact) {
                eprintln!("failed to write {path}: {e}");
                process::exit(1);
            }
        }
        None => print!("{artifact}"),
    }
}
