//! Keyboard-driven drag and drop.
//!
//! A drag carries the id of the dragged item in a transfer payload. The
//! source is marked "in transit" for presentation only. Every target
//! accepts a hover; a drop reads the payload and reports what should move
//! where, leaving the mutation to the caller.

use crate::model::Day;

/// Drop target on the board grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellTarget {
    pub day: Day,
    pub team: String,
}

/// The payload carried by a drag, keyed by format like a browser's
/// `DataTransfer`. Only `text/plain` is used.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataTransfer {
    text: Option<String>,
}

impl DataTransfer {
    pub fn set_data(&mut self, value: &str) {
        self.text = Some(value.to_string());
    }

    /// The stored id, `None` when missing or empty
    pub fn get_data(&self) -> Option<&str> {
        self.text.as_deref().filter(|s| !s.is_empty())
    }

    pub fn clear(&mut self) {
        self.text = None;
    }
}

/// Result of a drop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropOutcome<T> {
    pub item_id: String,
    pub target: T,
}

/// One drag at a time over targets of type `T`
#[derive(Debug, Clone)]
pub struct DragController<T> {
    transfer: DataTransfer,
    in_transit: Option<String>,
    hover: Option<T>,
}

impl<T> Default for DragController<T> {
    fn default() -> Self {
        DragController {
            transfer: DataTransfer::default(),
            in_transit: None,
            hover: None,
        }
    }
}

impl<T: Clone> DragController<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pick up an item. A drag already in progress is replaced.
    pub fn drag_start(&mut self, item_id: &str) {
        tracing::debug!(item = item_id, "drag start");
        self.transfer.set_data(item_id);
        self.in_transit = Some(item_id.to_string());
    }

    /// Hover a target. Every target accepts.
    pub fn drag_over(&mut self, target: T) -> bool {
        self.hover = Some(target);
        true
    }

    /// Drop on `target`. `None` when nothing is being dragged.
    pub fn drop(&mut self, target: T) -> Option<DropOutcome<T>> {
        let Some(item_id) = self.transfer.get_data().map(String::from) else {
            tracing::debug!("drop without payload ignored");
            return None;
        };
        Some(DropOutcome { item_id, target })
    }

    /// Clear the transit marker and payload, whether or not a drop fired
    pub fn drag_end(&mut self) {
        self.transfer.clear();
        self.in_transit = None;
        self.hover = None;
    }

    pub fn is_dragging(&self) -> bool {
        self.transfer.get_data().is_some()
    }

    /// Whether `item_id` is the item being dragged
    pub fn in_transit(&self, item_id: &str) -> bool {
        self.in_transit.as_deref() == Some(item_id)
    }

    pub fn dragged(&self) -> Option<&str> {
        self.in_transit.as_deref()
    }

    pub fn hover(&self) -> Option<&T> {
        self.hover.as_ref()
    }

    /// Start a scoped drop: `drag_end` runs when the guard goes out of scope
    pub fn guard(&mut self) -> DragGuard<'_, T> {
        DragGuard { controller: self }
    }
}

/// Runs `drag_end` on drop, so cleanup happens on every exit path
pub struct DragGuard<'a, T: Clone> {
    controller: &'a mut DragController<T>,
}

impl<T: Clone> DragGuard<'_, T> {
    pub fn drop_on(&mut self, target: T) -> Option<DropOutcome<T>> {
        self.controller.drop(target)
    }
}

impl<T: Clone> Drop for DragGuard<'_, T> {
    fn drop(&mut self) {
        self.controller.drag_end();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Task;
    use crate::ops::tasks::{MoveTask, apply_move};
    use crate::model::TimeBlock;

    fn cell(day: Day, team: &str) -> CellTarget {
        CellTarget {
            day,
            team: team.to_string(),
        }
    }

    fn task() -> Task {
        Task {
            id: "t1".into(),
            title: "Client Support".into(),
            description: None,
            assignee_id: None,
            assignee: "Sarah Chen".into(),
            day: Day::Mon,
            time_block: TimeBlock::WholeDay,
            team: "Design".into(),
            color: "#FF2D55".into(),
        }
    }

    #[test]
    fn drop_moves_task_to_target_cell() {
        let mut drag = DragController::new();
        drag.drag_start("t1");
        assert!(drag.in_transit("t1"));
        assert!(drag.drag_over(cell(Day::Wed, "Development")));

        let out = drag.drop(cell(Day::Wed, "Development")).unwrap();
        let mut t = task();
        let mv = MoveTask {
            task_id: out.item_id,
            day: out.target.day,
            team: out.target.team,
        };
        apply_move(&mut t, &mv);
        assert_eq!(t.day, Day::Wed);
        assert_eq!(t.team, "Development");
    }

    #[test]
    fn drop_without_payload_is_a_no_op() {
        let mut drag: DragController<CellTarget> = DragController::new();
        assert!(drag.drop(cell(Day::Mon, "Design")).is_none());
        drag.drag_start("");
        assert!(drag.drop(cell(Day::Mon, "Design")).is_none());
    }

    #[test]
    fn drag_end_cleans_up_without_drop() {
        let mut drag = DragController::new();
        drag.drag_start("t1");
        drag.drag_over(cell(Day::Tue, "Design"));
        drag.drag_end();
        assert!(!drag.is_dragging());
        assert!(!drag.in_transit("t1"));
        assert!(drag.hover().is_none());
    }

    #[test]
    fn guard_cleans_up_after_drop() {
        let mut drag = DragController::new();
        drag.drag_start("t1");
        {
            let mut guard = drag.guard();
            assert!(guard.drop_on(cell(Day::Fri, "Design")).is_some());
        }
        assert!(!drag.is_dragging());
        assert!(drag.dragged().is_none());
    }

    #[test]
    fn every_target_accepts() {
        let mut drag = DragController::new();
        assert!(drag.drag_over("Unassigned".to_string()));
        assert_eq!(drag.hover().map(String::as_str), Some("Unassigned"));
    }
}
