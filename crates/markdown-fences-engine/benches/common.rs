// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
#[allow(dead_code)]
pub fn generate_transcript(turns: usize) -> String {
    let turn = "## Assistant\n\nHere is the patch:\n\n```diff\n ## Usage\n ```bash\n-cargo run\n+cargo run --release\n ```\n```\n\nAnd a sample README:\n\n```markdown\n# Title\n\n```rust\nfn main() {}\n```\n```\n\n```python\nprint(\"done\")\n```\n\n";
    turn.repeat(turns)
}

/// A stream cut off mid-block, the shape seen on every chunk while streaming.
#[allow(dead_code)]
pub fn generate_partial_stream(turns: usize) -> String {
    let mut content = generate_transcript(turns);
    content.push_str("````markdown\n# Draft\n\n```bash\ncargo build\n```\n");
    content
}
