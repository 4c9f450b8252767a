//! Selection store
//!
//! Holds one selection per visualization mode. Gesture surfaces re-emit the
//! same selection on every pointer-move tick, so updates only count as a
//! change when the set of file identifiers actually differs, independent of
//! the order the surface reported them in.

use serde::Serialize;
use sonomap_common::events::{Dimensionality, SelectionMode};
use std::collections::BTreeSet;

/// Unordered set of file identifiers (iterates in sorted order)
pub type FileSet = BTreeSet<String>;

/// A real selection change, as produced by one of the gesture modes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionChange {
    pub mode: SelectionMode,
    pub files: FileSet,
}

/// Selections produced by the angle-sweep (3D) and box/lasso (2D) gestures
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionStore {
    angle: FileSet,
    planar: FileSet,
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the angle-range selection if its contents differ
    pub fn update_angle_selection<I, S>(&mut self, files: I) -> Option<SelectionChange>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.update(SelectionMode::AngleRange, files)
    }

    /// Replace the planar selection if its contents differ
    pub fn update_planar_selection<I, S>(&mut self, files: I) -> Option<SelectionChange>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.update(SelectionMode::Planar, files)
    }

    fn update<I, S>(&mut self, mode: SelectionMode, files: I) -> Option<SelectionChange>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let files: FileSet = files.into_iter().map(Into::into).collect();
        let slot = match mode {
            SelectionMode::AngleRange => &mut self.angle,
            SelectionMode::Planar => &mut self.planar,
        };

        if *slot == files {
            return None;
        }

        *slot = files.clone();
        Some(SelectionChange { mode, files })
    }

    /// Selection currently stored for `mode`
    pub fn get(&self, mode: SelectionMode) -> &FileSet {
        match mode {
            SelectionMode::AngleRange => &self.angle,
            SelectionMode::Planar => &self.planar,
        }
    }

    /// The authoritative selection for the current dimensionality
    pub fn active(&self, dims: Dimensionality) -> &FileSet {
        self.get(SelectionMode::for_dimensionality(dims))
    }

    /// Empty both selections; returns true if anything was cleared
    pub fn clear(&mut self) -> bool {
        let had_any = !self.angle.is_empty() || !self.planar.is_empty();
        self.angle.clear();
        self.planar.clear();
        had_any
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reordered_selection_is_not_a_change() {
        let mut store = SelectionStore::new();

        let first = store.update_planar_selection(["a.wav", "b.wav"]);
        assert!(first.is_some());

        let second = store.update_planar_selection(["b.wav", "a.wav"]);
        assert!(second.is_none());
        assert_eq!(store.get(SelectionMode::Planar).len(), 2);
    }

    #[test]
    fn test_change_carries_mode_and_files() {
        let mut store = SelectionStore::new();
        let change = store.update_angle_selection(["z.wav", "y.wav"]).unwrap();

        assert_eq!(change.mode, SelectionMode::AngleRange);
        let files: Vec<&str> = change.files.iter().map(String::as_str).collect();
        assert_eq!(files, vec!["y.wav", "z.wav"]);
    }

    #[test]
    fn test_modes_are_independent() {
        let mut store = SelectionStore::new();
        store.update_angle_selection(["a.wav"]);
        store.update_planar_selection(["b.wav"]);

        assert!(store.active(Dimensionality::Three).contains("a.wav"));
        assert!(store.active(Dimensionality::Two).contains("b.wav"));

        // Same contents in the other mode is still a change for that mode
        assert!(store.update_planar_selection(["a.wav"]).is_some());
    }

    #[test]
    fn test_empty_initial_update_is_noop() {
        let mut store = SelectionStore::new();
        assert!(store.update_planar_selection(Vec::<String>::new()).is_none());
    }

    #[test]
    fn test_clearing_to_empty_is_a_change() {
        let mut store = SelectionStore::new();
        store.update_planar_selection(["a.wav"]);
        let change = store.update_planar_selection(Vec::<String>::new()).unwrap();
        assert!(change.files.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut store = SelectionStore::new();
        assert!(!store.clear());

        store.update_angle_selection(["a.wav"]);
        assert!(store.clear());
        assert!(store.get(SelectionMode::AngleRange).is_empty());
    }
}
