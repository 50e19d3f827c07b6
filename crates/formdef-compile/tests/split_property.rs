//! Property tests for the bracket-aware splitter.

use formdef_compile::split_outcome;
use proptest::prelude::*;

proptest! {
    // Joining atoms with the delimiter and splitting again restores
    // the atoms.
    #[test]
    fn joined_atoms_round_trip(atoms in prop::collection::vec("[a-z0-9]{1,8}", 1..6)) {
        let input = atoms.join(",");
        let outcome = split_outcome(&input, &[","], None);
        prop_assert!(outcome.balanced);
        prop_assert_eq!(outcome.parts, atoms);
    }

    // A delimiter inside a paired group never splits.
    #[test]
    fn grouped_content_never_splits(
        inner in "[a-z0-9, ]{0,20}",
        wrap in 0usize..3,
    ) {
        let wrapped = match wrap {
            0 => format!("({inner})"),
            1 => format!("[{inner}]"),
            _ => format!("{{{inner}}}"),
        };
        let outcome = split_outcome(&wrapped, &[","], None);
        prop_assert!(outcome.balanced);
        prop_assert_eq!(outcome.parts.len(), 1);
    }

    // Quoted spans protect their content the same way.
    #[test]
    fn quoted_content_never_splits(inner in "[a-z0-9, ]{0,20}") {
        let wrapped = format!("\"{inner}\"");
        let outcome = split_outcome(&wrapped, &[","], None);
        prop_assert!(outcome.balanced);
        prop_assert_eq!(outcome.parts.len(), 1);
    }

    // Splitting never loses non-delimiter characters.
    #[test]
    fn parts_preserve_content(atoms in prop::collection::vec("[a-z0-9]{1,8}", 1..6)) {
        let input = atoms.join(",");
        let outcome = split_outcome(&input, &[","], None);
        let rejoined = outcome.parts.join("");
        let expected: String = input.chars().filter(|ch| *ch != ',').collect();
        prop_assert_eq!(rejoined, expected);
    }

    // A split limit caps the number of parts.
    #[test]
    fn limit_caps_parts(atoms in prop::collection::vec("[a-z0-9]{1,8}", 2..6)) {
        let input = atoms.join(",");
        let outcome = split_outcome(&input, &[","], Some(1));
        prop_assert_eq!(outcome.parts.len(), 2);
        prop_assert_eq!(outcome.parts[0].clone(), atoms[0].clone());
    }
}
