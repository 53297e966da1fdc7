//! Confirmed selections arranged into a day-by-day plan.

use std::collections::BTreeMap;

use super::{Note, Place, PlaceId};

/// Largest accepted day index (zero based).
pub const DAY_INDEX_MAX: u32 = 365;

/// Validation errors for selection placements.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionValidationError {
    #[error("dayIndex must be between 0 and {max}")]
    DayIndexOutOfRange { max: u32 },
    #[error("orderInDay must not be negative")]
    NegativeOrder,
}

/// Where a confirmed place sits in the plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionPlacement {
    pub place_id: PlaceId,
    pub day_index: u32,
    pub order_in_day: u32,
    pub note: Option<Note>,
}

impl SelectionPlacement {
    /// Validate raw indices as received from a client.
    ///
    /// # Examples
    /// ```
    /// use tripboard::domain::{PlaceId, SelectionPlacement};
    ///
    /// let place = PlaceId::random();
    /// assert!(SelectionPlacement::new(place, 0, 0, None).is_ok());
    /// assert!(SelectionPlacement::new(place, 366, 0, None).is_err());
    /// assert!(SelectionPlacement::new(place, 0, -1, None).is_err());
    /// ```
    pub fn new(
        place_id: PlaceId,
        day_index: i64,
        order_in_day: i64,
        note: Option<Note>,
    ) -> Result<Self, SelectionValidationError> {
        let day_index = u32::try_from(day_index)
            .ok()
            .filter(|day| *day <= DAY_INDEX_MAX)
            .ok_or(SelectionValidationError::DayIndexOutOfRange { max: DAY_INDEX_MAX })?;
        let order_in_day =
            u32::try_from(order_in_day).map_err(|_| SelectionValidationError::NegativeOrder)?;
        Ok(Self {
            place_id,
            day_index,
            order_in_day,
            note,
        })
    }
}

/// A persisted selection joined with its place.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub place: Place,
    pub day_index: u32,
    pub order_in_day: u32,
    pub note: Option<Note>,
}

/// Selections of one day in display order.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionDay {
    pub day_index: u32,
    pub items: Vec<Selection>,
}

/// Selections grouped by day.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionBoard {
    pub days: Vec<SelectionDay>,
}

impl SelectionBoard {
    /// Group selections by ascending day, then ascending order within the
    /// day, breaking ties by place name.
    pub fn from_selections(selections: Vec<Selection>) -> Self {
        let mut grouped: BTreeMap<u32, Vec<Selection>> = BTreeMap::new();
        for selection in selections {
            grouped
                .entry(selection.day_index)
                .or_default()
                .push(selection);
        }
        let days = grouped
            .into_iter()
            .map(|(day_index, mut items)| {
                items.sort_by(|a, b| {
                    a.order_in_day
                        .cmp(&b.order_in_day)
                        .then_with(|| a.place.name.cmp(&b.place.name))
                });
                SelectionDay { day_index, items }
            })
            .collect();
        Self { days }
    }

    /// Whether the place appears anywhere on the board.
    pub fn contains(&self, place_id: PlaceId) -> bool {
        self.days
            .iter()
            .any(|day| day.items.iter().any(|item| item.place.id == place_id))
    }
}
