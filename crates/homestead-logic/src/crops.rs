//! Crop growth — stages, watering speed-up, harvest yields.
//!
//! A crop sits on a tilled tile and climbs through growth stages on the
//! server tick. Watering the tile multiplies growth speed until the next
//! stage is reached. Blueberries regrow after harvest; the others are
//! pulled out whole.

use crate::constants::{crop_kinds, items};

/// Growth multiplier while the crop's tile is watered.
pub const WATERED_GROWTH_FACTOR: f64 = 1.5;

/// Static description of one crop species.
#[derive(Debug, Clone, Copy)]
pub struct CropSpec {
    pub kind: u8,
    /// Stage index at which the crop is harvestable.
    pub mature_stage: u8,
    /// Sim-seconds of growth per stage (unwatered).
    pub secs_per_stage: f64,
    pub yield_item: u16,
    pub yield_count: u32,
    /// Stage the crop drops back to after harvest; `None` means the crop
    /// is removed entirely.
    pub regrow_stage: Option<u8>,
}

const SPECS: [CropSpec; 3] = [
    CropSpec {
        kind: crop_kinds::PARSNIP,
        mature_stage: 4,
        secs_per_stage: 60.0,
        yield_item: items::PARSNIP,
        yield_count: 1,
        regrow_stage: None,
    },
    CropSpec {
        kind: crop_kinds::POTATO,
        mature_stage: 5,
        secs_per_stage: 90.0,
        yield_item: items::POTATO,
        yield_count: 2,
        regrow_stage: None,
    },
    CropSpec {
        kind: crop_kinds::BLUEBERRY,
        mature_stage: 6,
        secs_per_stage: 120.0,
        yield_item: items::BLUEBERRY,
        yield_count: 3,
        regrow_stage: Some(4),
    },
];

/// Look up the spec for a crop kind.
pub fn spec(kind: u8) -> Option<&'static CropSpec> {
    SPECS.iter().find(|s| s.kind == kind)
}

pub fn is_mature(kind: u8, stage: u8) -> bool {
    spec(kind).is_some_and(|s| stage >= s.mature_stage)
}

/// Advance `(stage, progress)` by `dt_secs`. Progress counts seconds into
/// the current stage; overflow carries into later stages. Mature crops
/// stop growing.
pub fn advance_growth(kind: u8, stage: u8, progress: f64, dt_secs: f64, watered: bool) -> (u8, f64) {
    let Some(spec) = spec(kind) else {
        return (stage, progress);
    };
    if stage >= spec.mature_stage {
        return (stage, 0.0);
    }
    let rate = if watered { WATERED_GROWTH_FACTOR } else { 1.0 };
    let mut stage = stage;
    let mut progress = progress + dt_secs * rate;
    while progress >= spec.secs_per_stage && stage < spec.mature_stage {
        progress -= spec.secs_per_stage;
        stage += 1;
    }
    if stage >= spec.mature_stage {
        progress = 0.0;
    }
    (stage, progress)
}

/// Item and count a mature crop yields.
pub fn harvest_yield(kind: u8) -> Option<(u16, u32)> {
    spec(kind).map(|s| (s.yield_item, s.yield_count))
}

/// Stage the crop returns to after harvest, or `None` to remove it.
pub fn after_harvest(kind: u8) -> Option<u8> {
    spec(kind).and_then(|s| s.regrow_stage)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_specs_resolve() {
        for kind in [crop_kinds::PARSNIP, crop_kinds::POTATO, crop_kinds::BLUEBERRY] {
            assert!(spec(kind).is_some(), "kind {kind}");
        }
        assert!(spec(99).is_none());
    }

    #[test]
    fn test_growth_advances_stage_on_overflow() {
        let s = spec(crop_kinds::PARSNIP).unwrap();
        let (stage, progress) =
            advance_growth(crop_kinds::PARSNIP, 0, 0.0, s.secs_per_stage + 5.0, false);
        assert_eq!(stage, 1);
        assert!((progress - 5.0).abs() < 0.001);
    }

    #[test]
    fn test_growth_carries_across_multiple_stages() {
        let s = spec(crop_kinds::PARSNIP).unwrap();
        let (stage, _) =
            advance_growth(crop_kinds::PARSNIP, 0, 0.0, s.secs_per_stage * 2.5, false);
        assert_eq!(stage, 2);
    }

    #[test]
    fn test_watered_grows_faster() {
        let dry = advance_growth(crop_kinds::POTATO, 0, 0.0, 100.0, false);
        let wet = advance_growth(crop_kinds::POTATO, 0, 0.0, 100.0, true);
        let dry_total = dry.0 as f64 * 90.0 + dry.1;
        let wet_total = wet.0 as f64 * 90.0 + wet.1;
        assert!((wet_total - dry_total * WATERED_GROWTH_FACTOR).abs() < 0.001);
    }

    #[test]
    fn test_mature_crop_stops_growing() {
        let s = spec(crop_kinds::PARSNIP).unwrap();
        let (stage, progress) = advance_growth(
            crop_kinds::PARSNIP,
            s.mature_stage,
            12.0,
            1_000_000.0,
            true,
        );
        assert_eq!(stage, s.mature_stage);
        assert_eq!(progress, 0.0);
        assert!(is_mature(crop_kinds::PARSNIP, stage));
    }

    #[test]
    fn test_growth_clamps_at_maturity() {
        let s = spec(crop_kinds::PARSNIP).unwrap();
        let (stage, progress) = advance_growth(
            crop_kinds::PARSNIP,
            0,
            0.0,
            s.secs_per_stage * 1000.0,
            false,
        );
        assert_eq!(stage, s.mature_stage);
        assert_eq!(progress, 0.0);
    }

    #[test]
    fn test_unknown_kind_is_inert() {
        assert_eq!(advance_growth(99, 2, 7.0, 50.0, true), (2, 7.0));
        assert!(harvest_yield(99).is_none());
    }

    #[test]
    fn test_harvest_yields() {
        assert_eq!(harvest_yield(crop_kinds::PARSNIP), Some((items::PARSNIP, 1)));
        assert_eq!(
            harvest_yield(crop_kinds::BLUEBERRY),
            Some((items::BLUEBERRY, 3))
        );
    }

    #[test]
    fn test_only_blueberry_regrows() {
        assert_eq!(after_harvest(crop_kinds::PARSNIP), None);
        assert_eq!(after_harvest(crop_kinds::POTATO), None);
        let regrow = after_harvest(crop_kinds::BLUEBERRY).unwrap();
        assert!(!is_mature(crop_kinds::BLUEBERRY, regrow));
    }
}
