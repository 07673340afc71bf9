use std::path::Path;

/// Turn a listing filename into a display title.
///
/// `the-brave-little-toaster.mp3` becomes `The Brave Little Toaster`. Only the
/// first character of each word is touched; the rest keeps its case.
pub fn title_from_filename(name: &str) -> String {
    let stem = Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(name);

    stem.replace(['-', '_'], " ")
        .split(' ')
        .map(capitalize)
        .collect::<Vec<String>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
