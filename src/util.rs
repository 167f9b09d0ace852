use crate::ChordSpacing;
use log::{info, warn};
use std::ops::RangeInclusive;

/// Tempo range the player accepts from the command line.
pub const TEMPO_RANGE: RangeInclusive<f64> = 60.0..=200.0;

pub fn parse_spacing(input: &str) -> ChordSpacing {
    match input.to_lowercase().as_str() {
        "b" | "beat" | "one-beat" => ChordSpacing::OneBeat,
        "r" | "reciprocal" | "literal" => ChordSpacing::Reciprocal,
        other => {
            info!("Unknown spacing '{}', defaulting to `beat`..!", other);
            ChordSpacing::OneBeat
        }
    }
}

/// Pull `tempo_bpm` into [`TEMPO_RANGE`]. A NaN tempo lands on the default of 120.
pub fn clamp_tempo(tempo_bpm: f64) -> f64 {
    if tempo_bpm.is_nan() {
        warn!("Tempo is not a number, using 120 bpm..!");
        return 120.0;
    }

    let clamped = tempo_bpm.clamp(*TEMPO_RANGE.start(), *TEMPO_RANGE.end());
    if clamped != tempo_bpm {
        warn!(
            "Tempo {} bpm is outside {:?}, clamping to {} bpm..!",
            tempo_bpm, TEMPO_RANGE, clamped
        );
    }

    clamped
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn spacing_names() {
        assert_eq!(parse_spacing("beat"), ChordSpacing::OneBeat);
        assert_eq!(parse_spacing("B"), ChordSpacing::OneBeat);
        assert_eq!(parse_spacing("Reciprocal"), ChordSpacing::Reciprocal);
        assert_eq!(parse_spacing("literal"), ChordSpacing::Reciprocal);
        assert_eq!(parse_spacing("whatever"), ChordSpacing::OneBeat);
    }

    #[test]
    fn tempo_is_clamped() {
        env_logger::try_init().unwrap_or(());

        assert_eq!(clamp_tempo(120.0), 120.0);
        assert_eq!(clamp_tempo(60.0), 60.0);
        assert_eq!(clamp_tempo(200.0), 200.0);
        assert_eq!(clamp_tempo(0.0), 60.0);
        assert_eq!(clamp_tempo(-30.0), 60.0);
        assert_eq!(clamp_tempo(999.0), 200.0);
        assert_eq!(clamp_tempo(f64::INFINITY), 200.0);
        assert_eq!(clamp_tempo(f64::NAN), 120.0);
    }
}
