//! Delivery slot index and the shopper's date/time selection.

use compact_str::CompactString;
use serde::Serialize;
use shopfront_sdk::objects::{CustomerRole, DeliverySlot};
use time::Date;

use crate::errors::ValidationIssue;

/// Available delivery slots of one session, ordered by date.
#[derive(Debug, Clone, Default)]
pub struct DeliverySlotSelector {
    slots: Vec<DeliverySlot>,
}

impl DeliverySlotSelector {
    pub fn new(slots: Vec<DeliverySlot>) -> Self {
        let mut slots: Vec<_> = slots.into_iter().filter(|s| s.is_available).collect();
        slots.sort_by(|a, b| a.date.cmp(&b.date));
        Self { slots }
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Dates with at least one available slot, each once, in calendar order.
    pub fn dates(&self) -> Vec<Date> {
        let mut dates: Vec<Date> = self.slots.iter().map(|s| s.date).collect();
        dates.dedup();
        dates
    }

    pub fn slots_for(&self, date: Date) -> impl Iterator<Item = &DeliverySlot> {
        self.slots.iter().filter(move |s| s.date == date)
    }

    /// The available slot matching `date` and `time_slot`, if any.
    pub fn resolve(&self, date: Date, time_slot: &str) -> Option<&DeliverySlot> {
        self.slots_for(date).find(|s| s.time_slot.as_str() == time_slot)
    }

    fn has_date(&self, date: Date) -> bool {
        self.slots_for(date).next().is_some()
    }
}

/// Progress of the date/time pick.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum SlotSelection {
    #[default]
    NoDateSelected,
    #[serde(rename_all = "camelCase")]
    DateSelected { date: Date },
    #[serde(rename_all = "camelCase")]
    TimeSelected {
        date: Date,
        time_slot: CompactString,
        slot_id: String,
        at_capacity: bool,
    },
}

/// A complete date and time pick, ready to go on an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChosenSlot {
    pub date: Date,
    pub time_slot: CompactString,
    pub slot_id: String,
    pub at_capacity: bool,
}

impl SlotSelection {
    pub fn date(&self) -> Option<Date> {
        match self {
            SlotSelection::NoDateSelected => None,
            SlotSelection::DateSelected { date } | SlotSelection::TimeSelected { date, .. } => {
                Some(*date)
            }
        }
    }

    pub fn time_slot(&self) -> Option<&str> {
        match self {
            SlotSelection::TimeSelected { time_slot, .. } => Some(time_slot.as_str()),
            _ => None,
        }
    }

    pub fn is_at_capacity(&self) -> bool {
        matches!(self, SlotSelection::TimeSelected { at_capacity: true, .. })
    }

    /// Pick a date. A different date drops the time; the same date keeps it.
    pub fn select_date(
        &mut self,
        slots: &DeliverySlotSelector,
        date: Date,
    ) -> Result<(), ValidationIssue> {
        if !slots.has_date(date) {
            return Err(ValidationIssue::UnknownDate(date));
        }
        if self.date() != Some(date) {
            *self = SlotSelection::DateSelected { date };
        }
        Ok(())
    }

    /// Pick a time on the selected date.
    pub fn select_time(
        &mut self,
        slots: &DeliverySlotSelector,
        time_slot: &str,
    ) -> Result<(), ValidationIssue> {
        let date = self.date().ok_or(ValidationIssue::MissingDate)?;
        let slot = slots
            .resolve(date, time_slot)
            .ok_or_else(|| ValidationIssue::UnknownTimeSlot {
                date,
                time_slot: time_slot.to_string(),
            })?;

        *self = SlotSelection::TimeSelected {
            date,
            time_slot: slot.time_slot.clone(),
            slot_id: slot.id.clone(),
            at_capacity: slot.is_at_capacity(),
        };
        Ok(())
    }

    pub fn chosen(&self) -> Result<ChosenSlot, ValidationIssue> {
        match self {
            SlotSelection::NoDateSelected => Err(ValidationIssue::MissingDate),
            SlotSelection::DateSelected { .. } => Err(ValidationIssue::MissingTime),
            SlotSelection::TimeSelected {
                date,
                time_slot,
                slot_id,
                at_capacity,
            } => Ok(ChosenSlot {
                date: *date,
                time_slot: time_slot.clone(),
                slot_id: slot_id.clone(),
                at_capacity: *at_capacity,
            }),
        }
    }
}

/// Shown instead of the slot picker when nothing can be booked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotSetupPrompt {
    /// Whether the caller may go and create slots.
    pub can_configure: bool,
}

pub fn slot_setup_prompt(
    slots: &DeliverySlotSelector,
    role: CustomerRole,
) -> Option<SlotSetupPrompt> {
    slots.is_empty().then_some(SlotSetupPrompt {
        can_configure: role == CustomerRole::Admin,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::slot;
    use time::macros::date;

    fn selector() -> DeliverySlotSelector {
        let mut closed = slot("s4", date!(2025 - 01 - 14), "09:00-12:00", 0, 10);
        closed.is_available = false;
        DeliverySlotSelector::new(vec![
            slot("s3", date!(2025 - 01 - 16), "09:00-12:00", 0, 10),
            slot("s1", date!(2025 - 01 - 15), "09:00-12:00", 2, 10),
            slot("s2", date!(2025 - 01 - 15), "14:00-17:00", 10, 10),
            closed,
        ])
    }

    #[test]
    fn test_dates_are_unique_sorted_and_available() {
        assert_eq!(
            selector().dates(),
            vec![date!(2025 - 01 - 15), date!(2025 - 01 - 16)]
        );
    }

    #[test]
    fn test_resolve_and_capacity() {
        let slots = selector();
        assert_eq!(slots.slots_for(date!(2025 - 01 - 15)).count(), 2);
        let full = slots.resolve(date!(2025 - 01 - 15), "14:00-17:00").unwrap();
        assert!(full.is_at_capacity());
        assert!(slots.resolve(date!(2025 - 01 - 14), "09:00-12:00").is_none());
    }

    #[test]
    fn test_changing_date_resets_time() {
        let slots = selector();
        let mut selection = SlotSelection::default();
        selection.select_date(&slots, date!(2025 - 01 - 15)).unwrap();
        selection.select_time(&slots, "09:00-12:00").unwrap();
        assert_eq!(selection.time_slot(), Some("09:00-12:00"));

        selection.select_date(&slots, date!(2025 - 01 - 15)).unwrap();
        assert_eq!(selection.time_slot(), Some("09:00-12:00"));

        selection.select_date(&slots, date!(2025 - 01 - 16)).unwrap();
        assert_eq!(selection.time_slot(), None);
        assert_eq!(selection.chosen(), Err(ValidationIssue::MissingTime));
    }

    #[test]
    fn test_time_must_exist_on_selected_date() {
        let slots = selector();
        let mut selection = SlotSelection::default();
        assert_eq!(
            selection.select_time(&slots, "09:00-12:00"),
            Err(ValidationIssue::MissingDate)
        );

        selection.select_date(&slots, date!(2025 - 01 - 16)).unwrap();
        assert!(matches!(
            selection.select_time(&slots, "14:00-17:00"),
            Err(ValidationIssue::UnknownTimeSlot { .. })
        ));
        assert!(matches!(
            selection.select_date(&slots, date!(2025 - 01 - 14)),
            Err(ValidationIssue::UnknownDate(_))
        ));
    }

    #[test]
    fn test_full_slot_marks_selection() {
        let slots = selector();
        let mut selection = SlotSelection::default();
        selection.select_date(&slots, date!(2025 - 01 - 15)).unwrap();
        selection.select_time(&slots, "14:00-17:00").unwrap();
        assert!(selection.is_at_capacity());
        assert_eq!(selection.chosen().unwrap().slot_id, "s2");
    }

    #[test]
    fn test_setup_prompt_only_without_slots() {
        let empty = DeliverySlotSelector::new(Vec::new());
        assert_eq!(
            slot_setup_prompt(&empty, CustomerRole::Admin),
            Some(SlotSetupPrompt { can_configure: true })
        );
        assert_eq!(
            slot_setup_prompt(&empty, CustomerRole::Customer),
            Some(SlotSetupPrompt { can_configure: false })
        );
        assert_eq!(slot_setup_prompt(&selector(), CustomerRole::Customer), None);
    }
}
