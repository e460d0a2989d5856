use crate::model::SuiteId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub number: String,
    pub beds: u32,
}

/// A housing unit built of rooms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suite {
    pub id: SuiteId,
    pub building: String,
    pub number: String,
    pub rooms: Vec<Room>,
    pub active: bool,
}

impl Suite {
    /// Total beds across the suite's rooms.
    pub fn size(&self) -> u32 {
        self.rooms.iter().map(|room| room.beds).sum()
    }
}

/// Payload for adding a suite to the housing stock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteCreate {
    pub building: String,
    pub number: String,
    pub rooms: Vec<Room>,
}

impl SuiteCreate {
    /// A suite of `size` single rooms.
    pub fn singles(building: impl Into<String>, number: impl Into<String>, size: u32) -> Self {
        let number = number.into();
        let rooms = (1..=size)
            .map(|i| Room {
                number: format!("{number}-{i}"),
                beds: 1,
            })
            .collect();
        Self {
            building: building.into(),
            number,
            rooms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_singles_number_rooms_for_any_size() {
        let params = SuiteCreate::singles("Hall", "12", 300);
        assert_eq!(params.rooms.len(), 300);
        assert_eq!(params.rooms[0].number, "12-1");
        assert_eq!(params.rooms[299].number, "12-300");
        assert!(params.rooms.iter().all(|r| r.beds == 1));
    }
}
