pub mod charcode;
pub mod checksum;
pub mod classifier;
pub mod config;
pub mod sentence;

pub use classifier::{Classifier, Marker, State, Stats};
pub use config::Config;

/// Run `input` through a fresh classifier and return the annotated bytes.
pub fn annotate(config: Config, input: &[u8]) -> anyhow::Result<Vec<u8>> {
    let mut out = Vec::with_capacity(input.len());
    Classifier::new(config).run(input, &mut out, std::io::sink())?;
    Ok(out)
}

/// Checks the checksum of one complete logger line or bare sentence.
pub fn verify_checksum(s: &str) -> anyhow::Result<bool> {
    let line = sentence::LogLine::parse(s)?;
    line.checksum_ok()
        .ok_or_else(|| anyhow::anyhow!("no checksum in '{}'", s.trim_end()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annotate_matches_run() {
        let input = b"00:00:34.597;I;$POSMACC,16644,-200,2024*47\n00:00:34.598;B;$GPVTG\n";
        let mut out = Vec::new();
        Classifier::default()
            .run(&input[..], &mut out, std::io::sink())
            .unwrap();
        assert_eq!(annotate(Config::default(), input).unwrap(), out);
    }

    #[test]
    fn test_verifier_agrees_with_classifier_on_signed_checksum() {
        assert!(verify_checksum("$*+0").is_err());
        let out = annotate(Config::default(), b"$*+0\n").unwrap();
        assert!(String::from_utf8(out).unwrap().contains(" # checksum error"));
    }

    #[test]
    fn test_verify_checksum() {
        assert!(verify_checksum("00:00:34.596;I;$POSMVCC,5143,4943*5E").unwrap());
        assert!(!verify_checksum("$*46").unwrap());
        assert!(verify_checksum("$GPVTG,,T,247.3,M,0.0,N").is_err());
        assert!(verify_checksum("GPVTG*07").is_err());
    }
}
