//! 写真スロットストア
//!
//! 4方向（front/back/right/left）それぞれに最大1枚の圧縮済み写真を保持する。
//! 同じスロットへの書き込みは常に丸ごと置き換え（後勝ち）。

use fleetcheck_common::{CapturedPhoto, InspectionPhotos, PhotoSlot};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhotoSlotStore {
    slots: [Option<CapturedPhoto>; 4],
}

impl PhotoSlotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 既存の写真を置き換える
    pub fn set(&mut self, slot: PhotoSlot, photo: CapturedPhoto) {
        self.slots[slot.index()] = Some(photo);
    }

    pub fn get(&self, slot: PhotoSlot) -> Option<&CapturedPhoto> {
        self.slots[slot.index()].as_ref()
    }

    pub fn clear(&mut self, slot: PhotoSlot) {
        self.slots[slot.index()] = None;
    }

    pub fn clear_all(&mut self) {
        self.slots = Default::default();
    }

    /// 4スロットすべてが埋まっているか
    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    pub fn filled_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// 未撮影のスロット（表示順）
    pub fn missing(&self) -> Vec<PhotoSlot> {
        PhotoSlot::ALL
            .iter()
            .copied()
            .filter(|slot| self.get(*slot).is_none())
            .collect()
    }

    /// 全スロットが揃っている場合のみ送信用の写真セットを返す
    pub fn snapshot(&self) -> Option<InspectionPhotos> {
        Some(InspectionPhotos {
            front: self.get(PhotoSlot::Front)?.clone(),
            back: self.get(PhotoSlot::Back)?.clone(),
            right: self.get(PhotoSlot::Right)?.clone(),
            left: self.get(PhotoSlot::Left)?.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photo(name: &str) -> CapturedPhoto {
        CapturedPhoto {
            encoded_image: format!("data:image/jpeg;base64,{}", name),
            original_filename: name.to_string(),
            original_byte_size: 10,
        }
    }

    #[test]
    fn test_new_store_is_empty() {
        let store = PhotoSlotStore::new();
        assert!(store.is_empty());
        assert!(!store.is_complete());
        assert_eq!(store.missing(), PhotoSlot::ALL.to_vec());
        assert!(store.snapshot().is_none());
    }

    #[test]
    fn test_reupload_replaces_photo() {
        let mut store = PhotoSlotStore::new();
        store.set(PhotoSlot::Front, photo("first.jpg"));
        store.set(PhotoSlot::Front, photo("second.jpg"));

        assert_eq!(store.filled_count(), 1);
        assert_eq!(store.get(PhotoSlot::Front).unwrap().original_filename, "second.jpg");
    }

    #[test]
    fn test_complete_only_with_all_four() {
        let mut store = PhotoSlotStore::new();
        for slot in [PhotoSlot::Front, PhotoSlot::Back, PhotoSlot::Right] {
            store.set(slot, photo(slot.as_str()));
            assert!(!store.is_complete());
        }
        assert_eq!(store.missing(), vec![PhotoSlot::Left]);

        store.set(PhotoSlot::Left, photo("left"));
        assert!(store.is_complete());

        let snapshot = store.snapshot().expect("揃っているはず");
        assert_eq!(snapshot.left.original_filename, "left");
        assert_eq!(snapshot.get(PhotoSlot::Back).original_filename, "back");
    }

    #[test]
    fn test_clear_and_clear_all() {
        let mut store = PhotoSlotStore::new();
        for slot in PhotoSlot::ALL {
            store.set(slot, photo(slot.as_str()));
        }

        store.clear(PhotoSlot::Right);
        assert!(!store.is_complete());
        assert_eq!(store.missing(), vec![PhotoSlot::Right]);

        store.clear_all();
        assert!(store.is_empty());
    }
}
