//! Movetext construction for the persisted `pgn` column.
//!
//! The game record stores plain movetext ("1. e4 e5 2. Nf3"), appended one
//! ply at a time as moves are applied.

/// Append one SAN token to existing movetext.
///
/// `plies_before` is the number of plies already recorded; an even count
/// means the new ply is a white move and opens a numbered move pair.
pub fn append_san(pgn: &str, plies_before: u32, san: &str) -> String {
    let mut out = String::with_capacity(pgn.len() + san.len() + 8);
    out.push_str(pgn);
    if !out.is_empty() {
        out.push(' ');
    }
    if plies_before % 2 == 0 {
        out.push_str(&format!("{}. ", plies_before / 2 + 1));
    }
    out.push_str(san);
    out
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn builds_numbered_pairs() {
        let pgn = append_san("", 0, "e4");
        assert_eq!(pgn, "1. e4");
        let pgn = append_san(&pgn, 1, "e5");
        assert_eq!(pgn, "1. e4 e5");
        let pgn = append_san(&pgn, 2, "Nf3");
        assert_eq!(pgn, "1. e4 e5 2. Nf3");
        let pgn = append_san(&pgn, 3, "Nc6");
        assert_eq!(pgn, "1. e4 e5 2. Nf3 Nc6");
    }

    #[test]
    fn black_ply_never_opens_a_pair() {
        // Resuming mid-game on a black ply must not emit a move number.
        let pgn = append_san("1. d4", 1, "d5");
        assert_eq!(pgn, "1. d4 d5");
    }

    proptest! {
        #[test]
        fn move_number_tokens_match_ply_count(plies in 1u32..60) {
            let mut pgn = String::new();
            for ply in 0..plies {
                pgn = append_san(&pgn, ply, "e4");
            }
            let numbers = pgn.split_whitespace().filter(|t| t.ends_with('.')).count();
            prop_assert_eq!(numbers as u32, plies.div_ceil(2));
        }
    }
}
