// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
#[allow(dead_code)]
pub fn generate_config(sections: usize, keys_per_section: usize) -> String {
    let mut content = String::from("; generated\nname = bench\n\n");

    for section in 0..sections {
        content.push_str(&format!("[section{section}]\n"));
        for key in 0..keys_per_section {
            match key % 4 {
                0 => content.push_str(&format!("key{key} = value {key}\n")),
                1 => content.push_str(&format!("key{key}=value{key} ; trailing comment\n")),
                2 => content.push_str(&format!("key{key} = /* empty */\n")),
                _ => content.push_str(&format!("key{key}\n")),
            }
        }
        content.push('\n');
    }

    content
}

#[allow(dead_code)]
pub fn generate_broken_config(lines: usize) -> String {
    let mut content = String::new();
    for line in 0..lines {
        if line % 10 == 0 {
            content.push_str(&format!("[unterminated{line}\n"));
        } else {
            content.push_str(&format!("key{line} = value\n"));
        }
    }
    content
}
