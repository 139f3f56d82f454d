//! 運転者・車両の選択状態
//!
//! 車両の選択は、現在選択中の運転者に割り当てられた車両一覧（最後に読み込んだもの）
//! の範囲でのみ有効。運転者が変わると車両選択と割当一覧はクリアされる。

use crate::error::ValidationError;
use fleetcheck_common::{Driver, RecordId, Vehicle};
use std::collections::HashMap;

/// IDで引けるレコード
pub trait Keyed {
    fn record_id(&self) -> &RecordId;
}

impl Keyed for Driver {
    fn record_id(&self) -> &RecordId {
        &self.id
    }
}

impl Keyed for Vehicle {
    fn record_id(&self) -> &RecordId {
        &self.id
    }
}

/// ピッカー用の一覧（表示順 + ID索引）
#[derive(Debug, Clone)]
pub struct Roster<T> {
    entries: Vec<T>,
    index: HashMap<RecordId, usize>,
}

impl<T> Default for Roster<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T: Keyed> Roster<T> {
    /// 重複IDは先勝ち
    pub fn new(items: Vec<T>) -> Self {
        let mut roster = Self::default();
        for item in items {
            if roster.index.contains_key(item.record_id()) {
                continue;
            }
            roster.index.insert(item.record_id().clone(), roster.entries.len());
            roster.entries.push(item);
        }
        roster
    }

    pub fn get(&self, id: &RecordId) -> Option<&T> {
        self.index.get(id).map(|&i| &self.entries[i])
    }

    pub fn contains(&self, id: &RecordId) -> bool {
        self.index.contains_key(id)
    }

    pub fn entries(&self) -> &[T] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// 割当一覧の読み込み結果
#[derive(Debug, Clone, PartialEq)]
pub enum AssignmentLoad {
    /// 既に別の運転者が選択されている（古いレスポンス）ため破棄
    Stale,
    /// 割当なし
    Empty,
    /// 1台のみのため自動選択
    AutoSelected(Vehicle),
    /// 複数台から選択が必要
    Choices(usize),
}

#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    driver: Option<Driver>,
    vehicle: Option<Vehicle>,
    assignments: Roster<Vehicle>,
    /// 割当一覧を読み込み済みの運転者（読み込み失敗時は None のまま）
    loaded_for: Option<RecordId>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn driver(&self) -> Option<&Driver> {
        self.driver.as_ref()
    }

    pub fn vehicle(&self) -> Option<&Vehicle> {
        self.vehicle.as_ref()
    }

    pub fn assignments(&self) -> &Roster<Vehicle> {
        &self.assignments
    }

    /// 現在の運転者の割当一覧が読み込み済みか
    pub fn assignments_loaded(&self) -> bool {
        match (&self.driver, &self.loaded_for) {
            (Some(driver), Some(loaded)) => &driver.id == loaded,
            _ => false,
        }
    }

    /// 運転者を選択
    ///
    /// 別の運転者または未選択に変わった場合、車両選択と割当一覧をクリアして `true` を返す。
    /// 呼び出し側は `true` のとき割当一覧を再読み込みする。
    pub fn select_identity(&mut self, driver: Option<Driver>) -> bool {
        let same = match (&self.driver, &driver) {
            (Some(current), Some(next)) => current.id == next.id,
            (None, None) => true,
            _ => false,
        };

        self.driver = driver;
        if !same {
            self.vehicle = None;
            self.assignments = Roster::default();
            self.loaded_for = None;
        }
        !same
    }

    /// 運転者の割当車両一覧を反映
    pub fn load_assignments(&mut self, driver_id: &RecordId, vehicles: Vec<Vehicle>) -> AssignmentLoad {
        if self.driver.as_ref().map(|d| &d.id) != Some(driver_id) {
            tracing::debug!(driver = %driver_id, "stale assignment load ignored");
            return AssignmentLoad::Stale;
        }

        self.assignments = Roster::new(vehicles);
        self.loaded_for = Some(driver_id.clone());
        if let Some(current) = &self.vehicle {
            if !self.assignments.contains(&current.id) {
                self.vehicle = None;
            }
        }

        match self.assignments.entries() {
            [] => AssignmentLoad::Empty,
            [only] => {
                let only = only.clone();
                self.vehicle = Some(only.clone());
                AssignmentLoad::AutoSelected(only)
            }
            many => AssignmentLoad::Choices(many.len()),
        }
    }

    /// 車両を選択（割当一覧に含まれる車両のみ）
    pub fn select_asset(&mut self, vehicle: Option<Vehicle>) -> Result<(), ValidationError> {
        match vehicle {
            None => {
                self.vehicle = None;
                Ok(())
            }
            Some(v) => {
                if self.driver.is_none() {
                    return Err(ValidationError::MissingDriver);
                }
                if !self.assignments.contains(&v.id) {
                    return Err(ValidationError::VehicleNotAssigned(v.id.to_string()));
                }
                self.vehicle = Some(v);
                Ok(())
            }
        }
    }

    /// 割当一覧からIDで車両を選択
    pub fn select_asset_by_id(&mut self, id: &RecordId) -> Result<(), ValidationError> {
        let vehicle = self
            .assignments
            .get(id)
            .cloned()
            .ok_or_else(|| ValidationError::VehicleNotAssigned(id.to_string()))?;
        self.select_asset(Some(vehicle))
    }

    pub fn is_ready_for_submission(&self) -> bool {
        self.driver.is_some() && self.vehicle.is_some()
    }

    pub fn clear(&mut self) {
        self.driver = None;
        self.vehicle = None;
        self.assignments = Roster::default();
        self.loaded_for = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn driver(id: &str) -> Driver {
        Driver {
            id: RecordId::new(id),
            display_name: format!("Driver {}", id),
            code: format!("DRV-{}", id),
            active: true,
        }
    }

    fn vehicle(id: &str) -> Vehicle {
        Vehicle {
            id: RecordId::new(id),
            code: format!("VAN-{}", id),
            plate_number: format!("PL {}", id),
            location: "Jeddah".to_string(),
            status: "active".to_string(),
        }
    }

    #[test]
    fn test_roster_lookup_and_order() {
        let roster = Roster::new(vec![vehicle("b"), vehicle("a"), vehicle("b")]);
        assert_eq!(roster.len(), 2);
        assert_eq!(roster.entries()[0].id, RecordId::new("b"));
        assert_eq!(roster.get(&RecordId::new("a")).unwrap().code, "VAN-a");
        assert!(roster.get(&RecordId::new("zzz")).is_none());
    }

    #[test]
    fn test_changing_driver_clears_vehicle() {
        let mut state = SelectionState::new();
        state.select_identity(Some(driver("x")));
        state.load_assignments(&RecordId::new("x"), vec![vehicle("1"), vehicle("2")]);
        state.select_asset_by_id(&RecordId::new("2")).unwrap();
        assert!(state.is_ready_for_submission());

        assert!(state.select_identity(Some(driver("y"))));
        assert!(state.vehicle().is_none());
        assert!(state.assignments().is_empty());
        assert!(!state.is_ready_for_submission());
    }

    #[test]
    fn test_reselecting_same_driver_keeps_vehicle() {
        let mut state = SelectionState::new();
        state.select_identity(Some(driver("x")));
        state.load_assignments(&RecordId::new("x"), vec![vehicle("1"), vehicle("2")]);
        state.select_asset_by_id(&RecordId::new("1")).unwrap();

        assert!(!state.select_identity(Some(driver("x"))));
        assert_eq!(state.vehicle().unwrap().id, RecordId::new("1"));
    }

    #[test]
    fn test_clearing_driver_clears_vehicle() {
        let mut state = SelectionState::new();
        state.select_identity(Some(driver("x")));
        state.load_assignments(&RecordId::new("x"), vec![vehicle("1")]);

        assert!(state.select_identity(None));
        assert!(state.driver().is_none());
        assert!(state.vehicle().is_none());
    }

    #[test]
    fn test_single_assignment_auto_selected() {
        let mut state = SelectionState::new();
        state.select_identity(Some(driver("x")));
        let load = state.load_assignments(&RecordId::new("x"), vec![vehicle("only")]);

        assert_eq!(load, AssignmentLoad::AutoSelected(vehicle("only")));
        assert!(state.is_ready_for_submission());
    }

    #[test]
    fn test_load_results() {
        let mut state = SelectionState::new();
        state.select_identity(Some(driver("x")));
        assert_eq!(state.load_assignments(&RecordId::new("x"), vec![]), AssignmentLoad::Empty);
        assert_eq!(
            state.load_assignments(&RecordId::new("x"), vec![vehicle("1"), vehicle("2")]),
            AssignmentLoad::Choices(2)
        );
        assert!(state.vehicle().is_none());
    }

    #[test]
    fn test_stale_load_is_ignored() {
        let mut state = SelectionState::new();
        state.select_identity(Some(driver("x")));
        state.select_identity(Some(driver("y")));

        let load = state.load_assignments(&RecordId::new("x"), vec![vehicle("1")]);
        assert_eq!(load, AssignmentLoad::Stale);
        assert!(state.assignments().is_empty());
        assert!(state.vehicle().is_none());
    }

    #[test]
    fn test_unassigned_vehicle_rejected() {
        let mut state = SelectionState::new();
        state.select_identity(Some(driver("x")));
        state.load_assignments(&RecordId::new("x"), vec![vehicle("1"), vehicle("2")]);

        let err = state.select_asset(Some(vehicle("9"))).unwrap_err();
        assert_eq!(err, ValidationError::VehicleNotAssigned("9".into()));
        assert!(state.vehicle().is_none());
    }

    #[test]
    fn test_vehicle_without_driver_rejected() {
        let mut state = SelectionState::new();
        let err = state.select_asset(Some(vehicle("1"))).unwrap_err();
        assert_eq!(err, ValidationError::MissingDriver);
    }

    #[test]
    fn test_assignments_loaded_tracks_current_driver() {
        let mut state = SelectionState::new();
        assert!(!state.assignments_loaded());

        state.select_identity(Some(driver("x")));
        assert!(!state.assignments_loaded());

        // 空の一覧でも読み込み済み
        state.load_assignments(&RecordId::new("x"), vec![]);
        assert!(state.assignments_loaded());

        state.select_identity(Some(driver("y")));
        assert!(!state.assignments_loaded());

        state.load_assignments(&RecordId::new("y"), vec![vehicle("1")]);
        state.clear();
        assert!(!state.assignments_loaded());
    }

    #[test]
    fn test_reload_drops_vehicle_no_longer_assigned() {
        let mut state = SelectionState::new();
        state.select_identity(Some(driver("x")));
        state.load_assignments(&RecordId::new("x"), vec![vehicle("1"), vehicle("2")]);
        state.select_asset_by_id(&RecordId::new("2")).unwrap();

        state.load_assignments(&RecordId::new("x"), vec![vehicle("1"), vehicle("3")]);
        assert!(state.vehicle().is_none());
    }
}
