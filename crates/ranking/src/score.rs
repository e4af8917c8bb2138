use share_protocol::{AppTarget, SourceType};

/// Base score for batches without an origin app (targets supplied by the caller).
pub const CALLER_TARGET_SCORE_BOOST: f32 = 900.0;
/// Multiplier applied to shortcut suggestions.
pub const SHORTCUT_TARGET_SCORE_BOOST: f32 = 90.0;

/// Per-source base score multipliers.
///
/// The boosts split suggestions into four bands:
/// 1. caller-supplied targets
/// 2. shortcuts ranked by the prediction service
/// 3. shortcuts from the shortcut manager, scaled by the origin app's score
/// 4. legacy direct share targets
pub struct ScoreModel;

impl ScoreModel {
    #[must_use]
    pub fn base_score(origin: Option<&AppTarget>, source_type: SourceType) -> f32 {
        let Some(origin) = origin else {
            return CALLER_TARGET_SCORE_BOOST;
        };

        match source_type {
            SourceType::ShortcutFromPrediction => SHORTCUT_TARGET_SCORE_BOOST,
            SourceType::ShortcutFromManager => origin.score * SHORTCUT_TARGET_SCORE_BOOST,
            SourceType::LegacyService | SourceType::Caller => origin.score,
        }
    }
}
