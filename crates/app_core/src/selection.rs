//! Selection transitions over the ordered items of the active list
//!
//! A [`Selection`] has a focused primary item, a set of co-selected
//! additional items and the item touched last (the far end of a range).
//! Directional moves treat the list as a grid with `column_count` columns.

use crate::error::{AppError, Result};
use app_db::Selection;
use ipc_proto::ImageUid;
use serde::{Deserialize, Serialize};

/// Grid movement direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Target index for a move from `current`.
///
/// Left/Right stop at the ends of the list and return `None` there.
/// Up/Down always return an index, clamped to the list bounds.
pub fn find_index_in_direction(
    current: usize,
    len: usize,
    column_count: usize,
    direction: Direction,
) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let column_count = column_count.max(1);
    let last = len - 1;

    match direction {
        Direction::Right => (current < last).then(|| current + 1),
        Direction::Left => (current > 0).then(|| current - 1),
        Direction::Down => Some((current + column_count).min(last)),
        Direction::Up => Some(current.saturating_sub(column_count)),
    }
}

fn position(items: &[ImageUid], uid: &str) -> Option<usize> {
    items.iter().position(|i| i == uid)
}

/// Focus `uid`. Additional selection is dropped when the primary changes.
pub fn select_primary(selection: &mut Selection, uid: Option<&str>) {
    if selection.primary.as_deref() != uid {
        selection.additional.clear();
    }
    selection.primary = uid.map(str::to_string);
    selection.last_touched = selection.primary.clone();
}

/// Focus `uid`, swapping it with the primary if it is already co-selected
pub fn select_primary_preserving_additional_if_possible(selection: &mut Selection, uid: &str) {
    if selection.primary.as_deref() == Some(uid) {
        return;
    }

    if selection.additional.remove(uid) {
        if let Some(old) = selection.primary.take() {
            selection.additional.insert(old);
        }
        selection.primary = Some(uid.to_string());
        selection.last_touched = Some(uid.to_string());
    } else {
        select_primary(selection, Some(uid));
    }
}

/// Ctrl/Cmd-click semantics
pub fn toggle_additional_selection(selection: &mut Selection, uid: &str) {
    selection.last_touched = Some(uid.to_string());

    if selection.primary.as_deref() == Some(uid) {
        // First in order, so the choice is deterministic.
        selection.primary = selection.additional.pop_first();
    } else if selection.primary.is_none() {
        selection.additional.remove(uid);
        selection.primary = Some(uid.to_string());
    } else if !selection.additional.remove(uid) {
        selection.additional.insert(uid.to_string());
    }
}

/// Shift-click semantics: select everything between primary and `uid`.
///
/// Both ends must be in `items`; otherwise nothing changes and an
/// [`AppError::Inconsistency`] is returned.
pub fn select_range(selection: &mut Selection, items: &[ImageUid], uid: &str) -> Result<()> {
    let Some(primary) = selection.primary.as_deref() else {
        return Ok(());
    };

    let primary_index = position(items, primary).ok_or_else(|| {
        AppError::Inconsistency("primary selection has to be in the current list".into())
    })?;
    let target_index = position(items, uid).ok_or_else(|| {
        AppError::Inconsistency("target selection has to be in the current list".into())
    })?;

    let (lo, hi) = (primary_index.min(target_index), primary_index.max(target_index));
    selection.additional = (lo..=hi)
        .filter(|i| *i != primary_index)
        .map(|i| items[i].clone())
        .collect();
    selection.last_touched = Some(uid.to_string());

    Ok(())
}

/// Move focus; always collapses the additional selection
pub fn move_primary_selection(
    selection: &mut Selection,
    items: &[ImageUid],
    column_count: usize,
    direction: Direction,
) {
    let Some(current) = selection.primary.as_deref().and_then(|p| position(items, p)) else {
        return;
    };

    if let Some(target) = find_index_in_direction(current, items.len(), column_count, direction) {
        let uid = items[target].clone();
        select_primary(selection, Some(&uid));
    }
}

/// Shift+arrow semantics: grow or shrink the range anchored at the primary
pub fn move_additional_selection(
    selection: &mut Selection,
    items: &[ImageUid],
    column_count: usize,
    direction: Direction,
) {
    let Some(primary_index) = selection.primary.as_deref().and_then(|p| position(items, p)) else {
        return;
    };
    let pivot_index = selection
        .last_touched
        .as_deref()
        .and_then(|uid| position(items, uid))
        .unwrap_or(primary_index);

    let Some(target_index) =
        find_index_in_direction(pivot_index, items.len(), column_count, direction)
    else {
        return;
    };

    let lo = primary_index.min(pivot_index).min(target_index);
    let hi = primary_index.max(pivot_index).max(target_index);
    let range_lo = primary_index.min(target_index);
    let range_hi = primary_index.max(target_index);

    for i in (lo..=hi).filter(|i| *i != primary_index) {
        if (range_lo..=range_hi).contains(&i) {
            selection.additional.insert(items[i].clone());
        } else {
            selection.additional.remove(&items[i]);
        }
    }

    selection.last_touched = Some(items[target_index].clone());
}

/// Select every item; the primary defaults to the first one
pub fn select_all(selection: &mut Selection, items: &[ImageUid]) {
    if selection.primary.is_none() {
        selection.primary = items.first().cloned();
    }

    let Some(primary) = selection.primary.clone() else {
        return;
    };
    selection
        .additional
        .extend(items.iter().filter(|uid| **uid != primary).cloned());
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn items(s: &str) -> Vec<ImageUid> {
        s.chars().map(|c| c.to_string()).collect()
    }

    fn sel(primary: Option<&str>, last_touched: Option<&str>, additional: &[&str]) -> Selection {
        Selection {
            primary: primary.map(str::to_string),
            last_touched: last_touched.map(str::to_string),
            additional: additional.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn set(uids: &[&str]) -> BTreeSet<ImageUid> {
        uids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_direction_rule() {
        assert_eq!(find_index_in_direction(0, 9, 3, Direction::Left), None);
        assert_eq!(find_index_in_direction(8, 9, 3, Direction::Right), None);
        assert_eq!(find_index_in_direction(4, 9, 3, Direction::Right), Some(5));
        assert_eq!(find_index_in_direction(4, 9, 3, Direction::Left), Some(3));
        assert_eq!(find_index_in_direction(0, 9, 3, Direction::Up), Some(0));
        assert_eq!(find_index_in_direction(7, 9, 3, Direction::Down), Some(8));
        assert_eq!(find_index_in_direction(1, 9, 3, Direction::Down), Some(4));
        assert_eq!(find_index_in_direction(0, 0, 3, Direction::Down), None);
    }

    #[test]
    fn test_select_primary_clears_additional_on_change() {
        let mut s = sel(Some("a"), Some("c"), &["b", "c"]);
        select_primary(&mut s, Some("a"));
        assert_eq!(s, sel(Some("a"), Some("a"), &["b", "c"]));

        select_primary(&mut s, Some("d"));
        assert_eq!(s, sel(Some("d"), Some("d"), &[]));

        select_primary(&mut s, None);
        assert_eq!(s, sel(None, None, &[]));
    }

    #[test]
    fn test_select_primary_preserving_swaps() {
        let mut s = sel(Some("a"), Some("a"), &["b", "c"]);
        select_primary_preserving_additional_if_possible(&mut s, "b");
        assert_eq!(s, sel(Some("b"), Some("b"), &["a", "c"]));

        select_primary_preserving_additional_if_possible(&mut s, "z");
        assert_eq!(s, sel(Some("z"), Some("z"), &[]));
    }

    #[test]
    fn test_toggle_on_primary_promotes_additional() {
        let mut s = sel(Some("a"), None, &["b", "c"]);
        toggle_additional_selection(&mut s, "a");

        let primary = s.primary.clone().unwrap();
        assert!(primary == "b" || primary == "c");
        assert!(!s.additional.contains(&primary));
        assert_eq!(s.additional.len(), 1);
        assert_eq!(s.last_touched.as_deref(), Some("a"));
    }

    #[test]
    fn test_toggle_sole_primary_clears() {
        let mut s = sel(Some("a"), None, &[]);
        toggle_additional_selection(&mut s, "a");
        assert_eq!(s, sel(None, Some("a"), &[]));
    }

    #[test]
    fn test_toggle_without_primary_promotes() {
        let mut s = sel(None, None, &[]);
        toggle_additional_selection(&mut s, "b");
        assert_eq!(s, sel(Some("b"), Some("b"), &[]));
    }

    #[test]
    fn test_toggle_flips_membership() {
        let mut s = sel(Some("a"), None, &[]);
        toggle_additional_selection(&mut s, "b");
        assert_eq!(s.additional, set(&["b"]));
        toggle_additional_selection(&mut s, "b");
        assert!(s.additional.is_empty());
    }

    #[test]
    fn test_select_range_without_primary_is_noop() {
        let mut s = sel(None, None, &[]);
        assert!(select_range(&mut s, &[], "a").is_ok());
        assert_eq!(s, sel(None, None, &[]));
    }

    #[test]
    fn test_select_range_primary_missing() {
        let mut s = sel(Some("a"), None, &[]);
        let err = select_range(&mut s, &[], "b").unwrap_err();
        assert!(err.to_string().contains("primary selection has to be in the current list"));
        assert!(err.is_contract_violation());
    }

    #[test]
    fn test_select_range_target_missing_leaves_selection() {
        let mut s = sel(Some("a"), None, &["x"]);
        let err = select_range(&mut s, &items("a"), "b").unwrap_err();
        assert!(err.to_string().contains("target selection has to be in the current list"));
        assert_eq!(s, sel(Some("a"), None, &["x"]));
    }

    #[test]
    fn test_select_range_to_primary_clears() {
        let mut s = sel(Some("a"), None, &["b"]);
        select_range(&mut s, &items("ab"), "a").unwrap();
        assert_eq!(s, sel(Some("a"), Some("a"), &[]));
    }

    #[test]
    fn test_select_range_both_directions() {
        let list = items("abcde");

        let mut s = sel(Some("c"), None, &[]);
        select_range(&mut s, &list, "a").unwrap();
        assert_eq!(s, sel(Some("c"), Some("a"), &["a", "b"]));

        let mut s = sel(Some("c"), None, &[]);
        select_range(&mut s, &list, "e").unwrap();
        assert_eq!(s, sel(Some("c"), Some("e"), &["d", "e"]));
    }

    #[test]
    fn test_move_primary_left_at_start_is_noop() {
        let list = items("abcdefghi");
        let mut s = sel(Some("a"), Some("c"), &["b"]);
        move_primary_selection(&mut s, &list, 3, Direction::Left);
        assert_eq!(s, sel(Some("a"), Some("c"), &["b"]));
    }

    #[test]
    fn test_move_primary_up_at_start_clamps() {
        let list = items("abcdefghi");
        let mut s = sel(Some("a"), Some("c"), &["b"]);
        move_primary_selection(&mut s, &list, 3, Direction::Up);
        // Self-move: primary unchanged, so additional survives.
        assert_eq!(s, sel(Some("a"), Some("a"), &["b"]));
    }

    #[test]
    fn test_move_primary_down_collapses_additional() {
        let list = items("abcdefghi");
        let mut s = sel(Some("b"), None, &["c"]);
        move_primary_selection(&mut s, &list, 3, Direction::Down);
        assert_eq!(s, sel(Some("e"), Some("e"), &[]));
    }

    #[test]
    fn test_move_primary_ignores_missing_primary() {
        let list = items("abc");
        let mut s = sel(Some("z"), None, &[]);
        move_primary_selection(&mut s, &list, 1, Direction::Right);
        assert_eq!(s, sel(Some("z"), None, &[]));
    }

    #[test]
    fn test_move_additional_up_from_first_row() {
        let list = items("abcdefghi");
        let mut s = sel(Some("a"), None, &[]);
        move_additional_selection(&mut s, &list, 3, Direction::Up);
        assert_eq!(s, sel(Some("a"), Some("a"), &[]));
    }

    #[test]
    fn test_move_additional_down_then_up() {
        let list = items("abcdefghi");
        let mut s = sel(Some("e"), Some("e"), &[]);

        move_additional_selection(&mut s, &list, 3, Direction::Down);
        assert_eq!(s, sel(Some("e"), Some("h"), &["f", "g", "h"]));

        move_additional_selection(&mut s, &list, 3, Direction::Up);
        assert_eq!(s, sel(Some("e"), Some("e"), &[]));
    }

    #[test]
    fn test_move_additional_crosses_primary() {
        let list = items("abcdefghi");
        let mut s = sel(Some("e"), Some("e"), &[]);

        move_additional_selection(&mut s, &list, 3, Direction::Right);
        assert_eq!(s.additional, set(&["f"]));

        move_additional_selection(&mut s, &list, 3, Direction::Up);
        // Pivot f (5) moves to c (2): range is c..e.
        assert_eq!(s, sel(Some("e"), Some("c"), &["c", "d"]));
    }

    #[test]
    fn test_move_additional_expand_retract_each_axis() {
        let list = items("abcdefghi");
        for (there, back) in [
            (Direction::Left, Direction::Right),
            (Direction::Right, Direction::Left),
            (Direction::Up, Direction::Down),
            (Direction::Down, Direction::Up),
        ] {
            let mut s = sel(Some("e"), Some("e"), &[]);
            move_additional_selection(&mut s, &list, 3, there);
            assert!(!s.additional.is_empty());
            move_additional_selection(&mut s, &list, 3, back);
            assert_eq!(s, sel(Some("e"), Some("e"), &[]), "{:?}/{:?}", there, back);
        }
    }

    #[test]
    fn test_move_additional_right_at_end_is_noop() {
        let list = items("abc");
        let mut s = sel(Some("a"), Some("c"), &["b", "c"]);
        move_additional_selection(&mut s, &list, 1, Direction::Right);
        assert_eq!(s, sel(Some("a"), Some("c"), &["b", "c"]));
    }

    #[test]
    fn test_select_all() {
        let list = items("abc");
        let mut s = sel(None, None, &[]);
        select_all(&mut s, &list);
        assert_eq!(s, sel(Some("a"), None, &["b", "c"]));

        let mut s = sel(Some("b"), Some("b"), &[]);
        select_all(&mut s, &list);
        assert_eq!(s, sel(Some("b"), Some("b"), &["a", "c"]));

        let mut s = sel(None, None, &[]);
        select_all(&mut s, &[]);
        assert_eq!(s, sel(None, None, &[]));
    }
}
