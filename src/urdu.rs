//! Roman→Urdu transliteration for name and fee item fields.
//!
//! The office staff type Urdu phonetically on a Latin keyboard, so text
//! fields are transliterated on submission. Two-letter digraphs take
//! precedence over single letters, capital letters select the shifted
//! variants, and anything outside the maps (digits, punctuation, text that
//! is already Urdu) passes through unchanged.

/// Digraphs checked before single letters, case-insensitively.
fn digraph(pair: &str) -> Option<&'static str> {
    match pair {
        "kh" => Some("خ"),
        "gh" => Some("غ"),
        "ch" => Some("چ"),
        "sh" => Some("ش"),
        "ph" => Some("ف"),
        "zh" => Some("ژ"),
        "aa" => Some("ا"),
        "ee" => Some("ی"),
        "oo" => Some("و"),
        _ => None,
    }
}

/// Shifted (capital letter) variants.
fn shifted(letter: char) -> Option<&'static str> {
    match letter {
        'A' => Some("آ"),
        'B' => Some("بھ"),
        'C' => Some("ث"),
        'D' => Some("ڈ"),
        'E' => Some("ع"),
        'F' => Some("ڈ"),
        'G' => Some("غ"),
        'H' => Some("ح"),
        'I' => Some("ئ"),
        'J' => Some("ض"),
        'K' => Some("خ"),
        'L' => Some("ڵ"),
        'M' => Some("ں"),
        'N' => Some("ں"),
        'O' => Some("ۃ"),
        'P' => Some("ُ"),
        'Q' => Some("ق"),
        'R' => Some("ڑ"),
        'S' => Some("ص"),
        'T' => Some("ٹ"),
        'U' => Some("ء"),
        'V' => Some("ظ"),
        'W' => Some("ؤ"),
        'X' => Some("ژ"),
        'Y' => Some("ۓ"),
        'Z' => Some("ذ"),
        _ => None,
    }
}

fn base(letter: char) -> Option<&'static str> {
    match letter {
        'a' => Some("ا"),
        'b' => Some("ب"),
        'c' => Some("چ"),
        'd' => Some("د"),
        'e' => Some("ع"),
        'f' => Some("ف"),
        'g' => Some("گ"),
        'h' => Some("ھ"),
        'i' => Some("ی"),
        'j' => Some("ج"),
        'k' => Some("ک"),
        'l' => Some("ل"),
        'm' => Some("م"),
        'n' => Some("ن"),
        'o' => Some("ہ"),
        'p' => Some("پ"),
        'q' => Some("ق"),
        'r' => Some("ر"),
        's' => Some("س"),
        't' => Some("ت"),
        'u' => Some("ئ"),
        'v' => Some("ط"),
        'w' => Some("و"),
        'x' => Some("ش"),
        'y' => Some("ے"),
        'z' => Some("ز"),
        _ => None,
    }
}

/// Transliterate phonetic Latin text to Urdu script.
pub fn transliterate(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    let mut output = String::with_capacity(value.len());
    let mut i = 0;

    while i < chars.len() {
        if i + 1 < chars.len() {
            let pair: String = chars[i..i + 2]
                .iter()
                .flat_map(|c| c.to_lowercase())
                .collect();

            if let Some(mapped) = digraph(&pair) {
                output.push_str(mapped);
                i += 2;
                continue;
            }
        }

        let letter = chars[i];
        if let Some(mapped) = shifted(letter) {
            output.push_str(mapped);
        } else if let Some(mapped) = base(letter.to_ascii_lowercase()) {
            output.push_str(mapped);
        } else {
            output.push(letter);
        }
        i += 1;
    }

    output
}
