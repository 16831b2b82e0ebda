//! Note names ("C4", "Eb2", "F#3") to MIDI numbers and back.

const SHARP_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Parse `<letter>[#|b]<octave>` into a MIDI note number, C4 being 60.
///
/// Returns `None` for malformed names or notes outside `0..=127`.
pub fn parse_note_name(name: &str) -> Option<u8> {
    let mut chars = name.chars();
    let base: i32 = match chars.next()? {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => return None,
    };
    let rest = chars.as_str();
    let (accidental, octave) = if let Some(o) = rest.strip_prefix('#') {
        (1, o)
    } else if let Some(o) = rest.strip_prefix('b') {
        (-1, o)
    } else {
        (0, rest)
    };
    let octave: i32 = octave.parse().ok()?;

    let midi = (octave + 1) * 12 + base + accidental;
    u8::try_from(midi).ok().filter(|m| *m <= 127)
}

/// Canonical sharp spelling of a MIDI note, e.g. 61 → "C#4".
pub fn note_name(midi: u8) -> String {
    let octave = midi as i32 / 12 - 1;
    format!("{}{octave}", SHARP_NAMES[midi as usize % 12])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn middle_c_and_concert_a() {
        assert_eq!(parse_note_name("C4"), Some(60));
        assert_eq!(parse_note_name("A4"), Some(69));
    }

    #[test]
    fn voice_registers() {
        assert_eq!(parse_note_name("C2"), Some(36));
        assert_eq!(parse_note_name("A2"), Some(45));
        assert_eq!(parse_note_name("C3"), Some(48));
        assert_eq!(parse_note_name("C5"), Some(72));
    }

    #[test]
    fn accidentals() {
        assert_eq!(parse_note_name("Eb2"), Some(39));
        assert_eq!(parse_note_name("F#3"), Some(54));
        assert_eq!(parse_note_name("Bb3"), Some(58));
    }

    #[test]
    fn range_limits() {
        assert_eq!(parse_note_name("C-1"), Some(0));
        assert_eq!(parse_note_name("G9"), Some(127));
        assert_eq!(parse_note_name("G#9"), None);
        assert_eq!(parse_note_name("Cb-1"), None);
    }

    #[test]
    fn malformed_names() {
        assert_eq!(parse_note_name(""), None);
        assert_eq!(parse_note_name("X4"), None);
        assert_eq!(parse_note_name("C"), None);
        assert_eq!(parse_note_name("c4"), None);
    }

    #[test]
    fn names_from_midi() {
        assert_eq!(note_name(60), "C4");
        assert_eq!(note_name(61), "C#4");
        assert_eq!(note_name(0), "C-1");
        assert_eq!(note_name(127), "G9");
    }
}
