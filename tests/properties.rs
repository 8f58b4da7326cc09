use nmea_cksum::checksum::checksum;
use nmea_cksum::{Config, annotate, verify_checksum};
use proptest::prelude::*;

// printable ASCII without '#', '$' and '*'
const BODY: &str = "[ -\"%-)+-~]{0,60}";
const PREFIX: &str = "[0-9]{2}:[0-9]{2}:[0-9]{2}\\.[0-9]{3};[A-Z];";

fn validate(input: &str) -> String {
    String::from_utf8(annotate(Config::default(), input.as_bytes()).unwrap()).unwrap()
}

fn append(input: &str) -> String {
    let out = annotate(Config::default().append(true), input.as_bytes()).unwrap();
    String::from_utf8(out).unwrap()
}

fn sentence() -> impl Strategy<Value = (String, String)> {
    (prop_oneof![Just(String::new()), PREFIX], "[$!]", BODY)
        .prop_map(|(prefix, start, body)| (format!("{prefix}{start}{body}"), body))
}

fn logged_lines() -> impl Strategy<Value = Vec<(String, String)>> {
    prop::collection::vec(
        (PREFIX, "[$!]", BODY)
            .prop_map(|(prefix, start, body)| (format!("{prefix}{start}{body}"), body)),
        1..8,
    )
}

proptest! {
    #[test]
    fn valid_sentence_passes_unchanged((head, body) in sentence()) {
        let line = format!("{head}*{:02X}\n", checksum(body.as_bytes()));
        prop_assert_eq!(validate(&line), line);
    }

    #[test]
    fn valid_log_passes_unchanged(lines in logged_lines()) {
        let input: String = lines
            .iter()
            .map(|(head, body)| format!("{head}*{:02X}\r\n", checksum(body.as_bytes())))
            .collect();
        prop_assert_eq!(validate(&input), input);
    }

    #[test]
    fn wrong_checksum_reports_residual((head, body) in sentence(), delta in 1u8..) {
        let transmitted = checksum(body.as_bytes()) ^ delta;
        let line = format!("{head}*{transmitted:02X}\n");
        prop_assert_eq!(
            validate(&line),
            format!("{head}*{transmitted:02X} # checksum error, residual: {delta:02X}\n")
        );
    }

    #[test]
    fn missing_checksum_is_marked((head, body) in sentence()) {
        let line = format!("{head}\n");
        prop_assert_eq!(validate(&line), format!("{head}##\n"));
        prop_assert_eq!(
            append(&line),
            format!("{head}*{:02X}\n", checksum(body.as_bytes()))
        );
    }

    #[test]
    fn append_is_idempotent_on_valid_input(lines in logged_lines()) {
        let input: String = lines
            .iter()
            .map(|(head, body)| format!("{head}*{:02X}\n", checksum(body.as_bytes())))
            .collect();
        prop_assert_eq!(append(&input), input);
    }

    #[test]
    fn appended_checksums_validate(lines in logged_lines()) {
        let input: String = lines.iter().map(|(head, _)| format!("{head}\n")).collect();
        let repaired = append(&input);
        prop_assert!(!repaired.contains('#'));
        prop_assert_eq!(validate(&repaired), repaired.clone());
        for line in repaired.lines() {
            prop_assert!(verify_checksum(line).unwrap());
        }
    }

    #[test]
    fn garbage_before_first_line_is_silent(
        // cannot start a line, so the whole prefix stays out of sync
        garbage in "([^0-9$!\r\n][^\r\n]{0,39})?",
        prefix in PREFIX,
        body in BODY,
    ) {
        let line = format!("{prefix}${body}*{:02X}\n", checksum(body.as_bytes()));
        let input = format!("{garbage}\n{line}");
        prop_assert_eq!(validate(&input), line);
    }
}
