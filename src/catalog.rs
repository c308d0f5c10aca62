use crate::data::{Room, RoomId};
use log::info;
use std::collections::HashSet;
use thiserror::Error;

/// Catalog rejection reasons. All of these are fatal: a run never starts with
/// a malformed catalog.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("room with empty id")]
    EmptyId,
    #[error("duplicate room id: {0}")]
    DuplicateId(RoomId),
    #[error("room {0} has zero capacity")]
    ZeroCapacity(RoomId),
}

/// An immutable-for-the-run snapshot of the room catalog.
///
/// Rooms keep their input order; `candidates_for` relies on that order to
/// break capacity ties, which keeps allocation output reproducible.
#[derive(Debug, Clone)]
pub struct Catalog {
    rooms: Vec<Room>,
}

impl Catalog {
    /// Validates and adopts a room list. Fails fast on the first empty id,
    /// duplicate id, or zero-capacity room.
    pub fn load(rooms: Vec<Room>) -> Result<Self, CatalogError> {
        let mut seen: HashSet<&str> = HashSet::new();
        for room in &rooms {
            if room.id.is_empty() {
                return Err(CatalogError::EmptyId);
            }
            if !seen.insert(&room.id) {
                return Err(CatalogError::DuplicateId(room.id.clone()));
            }
            if room.capacity == 0 {
                return Err(CatalogError::ZeroCapacity(room.id.clone()));
            }
        }
        info!("Loaded catalog with {} rooms", rooms.len());
        Ok(Self { rooms })
    }

    /// Rooms that can seat `min_size` attendees, ascending by capacity.
    /// The sort is stable, so equal-capacity rooms stay in catalog order and
    /// the first fit is always the smallest sufficient room.
    pub fn candidates_for(&self, min_size: u32) -> Vec<&Room> {
        let mut candidates: Vec<&Room> = self
            .rooms
            .iter()
            .filter(|room| room.capacity >= min_size)
            .collect();
        candidates.sort_by_key(|room| room.capacity);
        candidates
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room(id: &str, capacity: u32) -> Room {
        Room {
            id: id.to_string(),
            description: String::new(),
            category: "Sala de Aula".to_string(),
            capacity,
            features: vec![],
        }
    }

    #[test]
    fn test_load_accepts_valid_catalog() {
        let catalog = Catalog::load(vec![room("A101", 30), room("B201", 50)]).unwrap();
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_load_rejects_duplicate_id() {
        let err = Catalog::load(vec![room("A101", 30), room("A101", 50)]).unwrap_err();
        assert_eq!(err, CatalogError::DuplicateId("A101".to_string()));
    }

    #[test]
    fn test_load_rejects_zero_capacity() {
        let err = Catalog::load(vec![room("A101", 0)]).unwrap_err();
        assert_eq!(err, CatalogError::ZeroCapacity("A101".to_string()));
    }

    #[test]
    fn test_load_rejects_empty_id() {
        let err = Catalog::load(vec![room("", 30)]).unwrap_err();
        assert_eq!(err, CatalogError::EmptyId);
    }

    #[test]
    fn test_candidates_sorted_ascending_by_capacity() {
        let catalog =
            Catalog::load(vec![room("big", 100), room("small", 20), room("mid", 40)]).unwrap();

        let ids: Vec<&str> = catalog
            .candidates_for(10)
            .iter()
            .map(|r| r.id.as_str())
            .collect();
        assert_eq!(ids, vec!["small", "mid", "big"]);
    }

    #[test]
    fn test_candidates_filter_by_min_size() {
        let catalog =
            Catalog::load(vec![room("big", 100), room("small", 20), room("mid", 40)]).unwrap();

        let ids: Vec<&str> = catalog
            .candidates_for(30)
            .iter()
            .map(|r| r.id.as_str())
            .collect();
        assert_eq!(ids, vec!["mid", "big"]);
    }

    #[test]
    fn test_candidates_capacity_ties_keep_catalog_order() {
        let catalog = Catalog::load(vec![
            room("first", 30),
            room("second", 30),
            room("third", 30),
        ])
        .unwrap();

        let ids: Vec<&str> = catalog
            .candidates_for(30)
            .iter()
            .map(|r| r.id.as_str())
            .collect();
        assert_eq!(ids, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_feature_text_joins_features_and_category() {
        let mut lab = room("L1", 25);
        lab.category = "Laboratório".to_string();
        lab.features = vec!["Projetor".to_string(), "Computadores".to_string()];
        assert_eq!(lab.feature_text(), "Projetor, Computadores Laboratório");
    }
}
