//! Traversal costs: [`CostModel`], [`CostMode`], [`CostSnapshot`].

use std::collections::HashMap;

use tilenav_core::TileClass;

/// Cost of entering any cell with no applicable override.
pub const DEFAULT_COST: u32 = 1;

// ---------------------------------------------------------------------------
// CostMode
// ---------------------------------------------------------------------------

/// Selects which cost regime [`CostModel::cost_of`] consults.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CostMode {
    /// Every traversable cell costs [`DEFAULT_COST`].
    #[default]
    Default,
    /// Overrides apply; unmapped classes fall back to [`DEFAULT_COST`].
    Weighted,
}

// ---------------------------------------------------------------------------
// CostError
// ---------------------------------------------------------------------------

/// Rejected cost-table mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CostError {
    /// Traversal costs must be at least 1.
    #[error("invalid traversal cost: must be at least 1")]
    InvalidCost,
}

// ---------------------------------------------------------------------------
// CostModel
// ---------------------------------------------------------------------------

/// Per-class traversal cost overrides plus the active [`CostMode`].
///
/// The override table and the mode are independent: toggling the mode never
/// touches the table, it only changes which regime [`cost_of`](Self::cost_of)
/// consults. The model itself is a plain value owned by whichever component
/// issues planning requests; a planning call captures a frozen
/// [`CostSnapshot`] via [`snapshot`](Self::snapshot), so mutating the model
/// never disturbs an in-flight search.
#[derive(Debug, Clone, Default)]
pub struct CostModel {
    overrides: HashMap<TileClass, u32>,
    mode: CostMode,
}

impl CostModel {
    /// An empty model in [`CostMode::Default`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the traversal cost override for `class`.
    ///
    /// Fails with [`CostError::InvalidCost`] for a zero cost, leaving the
    /// prior table unchanged.
    pub fn set_override(&mut self, class: TileClass, cost: u32) -> Result<(), CostError> {
        if cost < DEFAULT_COST {
            return Err(CostError::InvalidCost);
        }
        let _ = self.overrides.insert(class, cost);
        Ok(())
    }

    /// Bulk-load overrides from the nullable per-class cost property the map
    /// collaborator exposes. `None` entries are skipped; a zero cost rejects
    /// the whole batch, leaving the prior table unchanged.
    pub fn seed_overrides<I>(&mut self, properties: I) -> Result<(), CostError>
    where
        I: IntoIterator<Item = (TileClass, Option<u32>)>,
    {
        let mut staged = Vec::new();
        for (class, cost) in properties {
            match cost {
                Some(0) => return Err(CostError::InvalidCost),
                Some(cost) => staged.push((class, cost)),
                None => {}
            }
        }
        self.overrides.extend(staged);
        Ok(())
    }

    /// Drop every override, independent of the mode toggle.
    pub fn clear_overrides(&mut self) {
        self.overrides.clear();
    }

    /// Switch the active cost regime. Does not mutate the table.
    pub fn set_mode(&mut self, mode: CostMode) {
        self.mode = mode;
    }

    /// The active cost regime.
    pub fn mode(&self) -> CostMode {
        self.mode
    }

    /// Cost of entering a cell of the given class. Never fails: unmapped
    /// classes and classless cells cost [`DEFAULT_COST`], and in
    /// [`CostMode::Default`] everything does.
    pub fn cost_of(&self, class: Option<TileClass>) -> u32 {
        match self.mode {
            CostMode::Default => DEFAULT_COST,
            CostMode::Weighted => class
                .and_then(|c| self.overrides.get(&c).copied())
                .unwrap_or(DEFAULT_COST),
        }
    }

    /// A frozen copy of the active regime for one planning call.
    pub fn snapshot(&self) -> CostSnapshot {
        let costs = match self.mode {
            CostMode::Default => HashMap::new(),
            CostMode::Weighted => self.overrides.clone(),
        };
        CostSnapshot { costs }
    }
}

// ---------------------------------------------------------------------------
// CostSnapshot
// ---------------------------------------------------------------------------

/// An immutable copy of a [`CostModel`]'s active regime, captured at request
/// time. Concurrent mode toggles or override edits never reach a snapshot.
#[derive(Debug, Clone, Default)]
pub struct CostSnapshot {
    costs: HashMap<TileClass, u32>,
}

impl CostSnapshot {
    /// A snapshot where every cell costs [`DEFAULT_COST`].
    pub fn uniform() -> Self {
        Self::default()
    }

    /// Cost of entering a cell of the given class.
    pub fn cost_of(&self, class: Option<TileClass>) -> u32 {
        class
            .and_then(|c| self.costs.get(&c).copied())
            .unwrap_or(DEFAULT_COST)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRASS: TileClass = TileClass::new(1);
    const MUD: TileClass = TileClass::new(2);

    #[test]
    fn zero_cost_is_rejected_and_table_unchanged() {
        let mut model = CostModel::new();
        model.set_override(MUD, 5).unwrap();

        assert_eq!(model.set_override(MUD, 0), Err(CostError::InvalidCost));

        model.set_mode(CostMode::Weighted);
        assert_eq!(model.cost_of(Some(MUD)), 5);
    }

    #[test]
    fn default_mode_ignores_overrides() {
        let mut model = CostModel::new();
        model.set_override(MUD, 5).unwrap();

        assert_eq!(model.cost_of(Some(MUD)), 1);
        model.set_mode(CostMode::Weighted);
        assert_eq!(model.cost_of(Some(MUD)), 5);
    }

    #[test]
    fn unmapped_and_classless_fall_back_to_default() {
        let mut model = CostModel::new();
        model.set_mode(CostMode::Weighted);
        model.set_override(MUD, 5).unwrap();

        assert_eq!(model.cost_of(Some(GRASS)), 1);
        assert_eq!(model.cost_of(None), 1);
    }

    #[test]
    fn toggling_mode_preserves_the_table() {
        let mut model = CostModel::new();
        model.set_override(MUD, 9).unwrap();
        model.set_mode(CostMode::Weighted);
        model.set_mode(CostMode::Default);
        model.set_mode(CostMode::Weighted);
        assert_eq!(model.cost_of(Some(MUD)), 9);
    }

    #[test]
    fn seed_skips_missing_properties() {
        let mut model = CostModel::new();
        model
            .seed_overrides([(GRASS, Some(2)), (MUD, None)])
            .unwrap();
        model.set_mode(CostMode::Weighted);
        assert_eq!(model.cost_of(Some(GRASS)), 2);
        assert_eq!(model.cost_of(Some(MUD)), 1);
    }

    #[test]
    fn seed_rejects_zero_atomically() {
        let mut model = CostModel::new();
        model.set_override(MUD, 5).unwrap();

        let err = model.seed_overrides([(GRASS, Some(2)), (MUD, Some(0))]);
        assert_eq!(err, Err(CostError::InvalidCost));

        model.set_mode(CostMode::Weighted);
        assert_eq!(model.cost_of(Some(GRASS)), 1);
        assert_eq!(model.cost_of(Some(MUD)), 5);
    }

    #[test]
    fn snapshot_is_isolated_from_later_mutation() {
        let mut model = CostModel::new();
        model.set_mode(CostMode::Weighted);
        model.set_override(MUD, 5).unwrap();

        let snap = model.snapshot();
        model.clear_overrides();
        model.set_mode(CostMode::Default);

        assert_eq!(snap.cost_of(Some(MUD)), 5);
        assert_eq!(model.cost_of(Some(MUD)), 1);
    }

    #[test]
    fn default_mode_snapshot_is_uniform() {
        let mut model = CostModel::new();
        model.set_override(MUD, 5).unwrap();

        let snap = model.snapshot();
        assert_eq!(snap.cost_of(Some(MUD)), 1);
    }

    #[test]
    fn clear_then_reseed_restores_prior_behavior() {
        let mut model = CostModel::new();
        model.set_mode(CostMode::Weighted);
        model.set_override(GRASS, 2).unwrap();
        model.set_override(MUD, 5).unwrap();
        let before = model.snapshot();

        model.clear_overrides();
        model.set_override(GRASS, 2).unwrap();
        model.set_override(MUD, 5).unwrap();
        let after = model.snapshot();

        assert_eq!(before.cost_of(Some(GRASS)), after.cost_of(Some(GRASS)));
        assert_eq!(before.cost_of(Some(MUD)), after.cost_of(Some(MUD)));
    }
}
