//! Tone-number to tone-mark conversion for pinyin answers.
//!
//! Learners type tones as trailing digits (`hao3`) while stored answers use
//! marks (`hǎo`). [`normalize`] rewrites the former into the latter so the
//! two can be compared.

/// Marked forms for tones 1 through 4.
const TONE_MARKS: [(char, [char; 4]); 6] = [
    ('a', ['ā', 'á', 'ǎ', 'à']),
    ('o', ['ō', 'ó', 'ǒ', 'ò']),
    ('e', ['ē', 'é', 'ě', 'è']),
    ('i', ['ī', 'í', 'ǐ', 'ì']),
    ('u', ['ū', 'ú', 'ǔ', 'ù']),
    ('ü', ['ǖ', 'ǘ', 'ǚ', 'ǜ']),
];

/// Neutral tone, written without a mark.
const NEUTRAL_TONE: u32 = 5;

/// Convert numbered-tone pinyin to tone-marked pinyin.
///
/// Input is lower-cased and split on whitespace; groups are rejoined with a
/// single space. Within a group every run of letters followed by a digit
/// 1-5 gets its tone vowel marked and the digit dropped. Runs without a
/// digit, runs with no vowel to mark, and any other characters are kept
/// as they are.
///
/// ```
/// use vocab_core::pinyin::normalize;
///
/// assert_eq!(normalize("ni3 hao3"), "nǐ hǎo");
/// assert_eq!(normalize("LV4"), "lǜ");
/// ```
pub fn normalize(input: &str) -> String {
    input
        .to_lowercase()
        .split_whitespace()
        .map(normalize_group)
        .collect::<Vec<_>>()
        .join(" ")
}

fn normalize_group(group: &str) -> String {
    let mut output = String::with_capacity(group.len());
    let mut chars = group.chars().peekable();

    while let Some(&c) = chars.peek() {
        if !is_syllable_letter(c) {
            output.push(c);
            chars.next();
            continue;
        }

        let mut letters = String::new();
        while let Some(&c) = chars.peek() {
            if !is_syllable_letter(c) {
                break;
            }
            letters.push(c);
            chars.next();
        }

        let tone = chars
            .peek()
            .and_then(|c| c.to_digit(10))
            .filter(|digit| (1..=NEUTRAL_TONE).contains(digit));

        match tone {
            Some(tone) => {
                chars.next();
                match mark_syllable(&letters, tone) {
                    Some(marked) => output.push_str(&marked),
                    None => {
                        output.push_str(&letters);
                        output.push_str(&tone.to_string());
                    }
                }
            }
            None => output.push_str(&letters),
        }
    }

    output
}

/// Letters that can form a syllable, `v` standing in for `ü`.
fn is_syllable_letter(c: char) -> bool {
    c.is_ascii_lowercase() || c == 'ü'
}

/// Mark the tone vowel of `letters`, or `None` if it has no vowel.
fn mark_syllable(letters: &str, tone: u32) -> Option<String> {
    let index = tone_vowel_index(letters)?;
    let vowel = letters[index..].chars().next()?;
    let marked = tone_mark(to_umlaut(vowel), tone)?;

    let mut syllable = String::with_capacity(letters.len() + 2);
    syllable.extend(letters[..index].chars().map(to_umlaut));
    syllable.push(marked);
    syllable.extend(letters[index + vowel.len_utf8()..].chars().map(to_umlaut));
    Some(syllable)
}

/// Byte index of the vowel that carries the tone.
///
/// Precedence: `a`, `o`, `e`, the `u` of `iu`, `i`, `u`, then `ü`/`v`.
fn tone_vowel_index(letters: &str) -> Option<usize> {
    letters
        .find('a')
        .or_else(|| letters.find('o'))
        .or_else(|| letters.find('e'))
        .or_else(|| letters.find("iu").map(|index| index + 1))
        .or_else(|| letters.find('i'))
        .or_else(|| letters.find('u'))
        .or_else(|| letters.find(|c| c == 'ü' || c == 'v'))
}

fn to_umlaut(c: char) -> char {
    if c == 'v' {
        'ü'
    } else {
        c
    }
}

fn tone_mark(vowel: char, tone: u32) -> Option<char> {
    if tone == NEUTRAL_TONE {
        return Some(vowel);
    }
    let marks = TONE_MARKS
        .iter()
        .find(|(plain, _)| *plain == vowel)
        .map(|(_, marks)| marks)?;
    let slot = usize::try_from(tone.checked_sub(1)?).ok()?;
    marks.get(slot).copied()
}
