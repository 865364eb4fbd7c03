// Spoken-input normalizer
//
// Turns a dictated phrase such as "go to example dot com slash login" into URL
// candidates. The output is untrusted: it goes through the same validator as
// typed input.

use crate::scan::validator;

/// Leading phrases people say before the address itself
const LEAD_INS: [&str; 7] = [
    "please ", "go to ", "navigate to ", "open ", "scan ", "check ", "visit ",
];

/// Spoken words and the characters they stand for
const REPLACEMENTS: [(&str, &str); 10] = [
    (" colon slash slash ", "://"),
    (" colon ", ":"),
    (" forward slash ", "/"),
    (" slash ", "/"),
    (" dot ", "."),
    (" period ", "."),
    (" dash ", "-"),
    (" hyphen ", "-"),
    (" underscore ", "_"),
    (" question mark ", "?"),
];

/// Rewrite spoken words into URL characters and drop the remaining whitespace.
pub fn rewrite(transcript: &str) -> String {
    let mut text = transcript.trim().to_lowercase();

    loop {
        let stripped = LEAD_INS
            .iter()
            .find_map(|lead| text.strip_prefix(lead).map(str::to_string));
        match stripped {
            Some(rest) => text = rest,
            None => break,
        }
    }

    // Pad so that words at either end match the space-delimited patterns
    let mut padded = format!(" {} ", text);
    for (word, symbol) in REPLACEMENTS {
        // Replace repeatedly: "a dot b dot c" shares the spaces between matches
        while padded.contains(word) {
            padded = padded.replace(word, &format!(" {} ", symbol));
        }
    }

    padded
        .split_whitespace()
        .collect::<String>()
        .trim_end_matches(['.', '/'])
        .to_string()
}

/// Candidates in the order they are tried
pub fn candidates(transcript: &str) -> Vec<String> {
    let rewritten = rewrite(transcript);
    if rewritten.is_empty() {
        return Vec::new();
    }

    if rewritten.contains("://") {
        return vec![rewritten];
    }

    let mut out = vec![format!("https://{}", rewritten)];
    if !rewritten.contains('.') {
        out.push(format!("https://{}.com", rewritten));
    }
    out
}

/// First candidate that passes URL validation, if any
pub fn normalize_spoken_url(transcript: &str) -> Option<String> {
    candidates(transcript)
        .into_iter()
        .find(|candidate| validator::validate(candidate))
}
