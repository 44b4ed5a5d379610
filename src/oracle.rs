//! Independently structured reference solver, used to cross-validate the
//! extended-state searches.
//!
//! Any legal journey either never enters the threat zone, or at some point
//! captures the bishop — and a capture happens on exactly one square, so
//! such a journey splits into a threat-avoiding leg to the bishop and an
//! unrestricted leg from it. Three plain square-graph BFS calls therefore
//! suffice. Asymptotically no better than the single search, but built
//! from different pieces so a shared bug is unlikely.

use std::collections::{HashSet, VecDeque};

use crate::board::{Board, Square, ThreatMask};
use crate::instance::Instance;

/// Plain BFS on squares. When `threat` is given, moves into the zone are
/// rejected (the bishop is treated as alive for the whole journey); when it
/// is `None` the board is unrestricted.
pub fn restricted_distance(
    board: &Board,
    from: Square,
    to: Square,
    threat: Option<&ThreatMask>,
) -> Option<u32> {
    if !board.contains(from) || !board.contains(to) {
        return None;
    }
    let mut seen: HashSet<Square> = HashSet::new();
    let mut queue: VecDeque<(Square, u32)> = VecDeque::new();
    queue.push_back((from, 0));
    while let Some((square, distance)) = queue.pop_front() {
        if square == to {
            return Some(distance);
        }
        if !seen.insert(square) {
            continue;
        }
        for next in board.knight_moves(square) {
            if threat.is_some_and(|t| t.contains(next)) {
                continue;
            }
            queue.push_back((next, distance + 1));
        }
    }
    None
}

/// Decomposition answer: the better of the direct threat-avoiding route
/// and the route that captures the bishop first.
pub fn reference_distance(instance: &Instance) -> Option<u32> {
    let board = instance.board();
    let threat = board.bishop_threat(instance.bishop);

    let direct = restricted_distance(&board, instance.start, instance.goal, Some(&threat));
    let Some(to_bishop) =
        restricted_distance(&board, instance.start, instance.bishop, Some(&threat))
    else {
        // The bishop can never be taken, so the direct route is all there is.
        return direct;
    };
    let after_capture = restricted_distance(&board, instance.bishop, instance.goal, None);

    match (direct, after_capture) {
        (None, None) => None,
        (None, Some(after)) => Some(to_bishop + after),
        (Some(direct), None) => Some(direct),
        (Some(direct), Some(after)) => Some(direct.min(to_bishop + after)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instance(size: i32, start: (i32, i32), goal: (i32, i32), bishop: (i32, i32)) -> Instance {
        Instance::new(
            size,
            Square::new(start.0, start.1),
            Square::new(goal.0, goal.1),
            Square::new(bishop.0, bishop.1),
        )
    }

    #[test]
    fn unrestricted_distances_match_known_values() {
        let board = Board::new(8);
        assert_eq!(
            restricted_distance(&board, Square::new(0, 0), Square::new(7, 7), None),
            Some(6)
        );
        assert_eq!(
            restricted_distance(&board, Square::new(0, 0), Square::new(1, 1), None),
            Some(4)
        );
        // The middle of a 3x3 board is knight-unreachable.
        let small = Board::new(3);
        assert_eq!(
            restricted_distance(&small, Square::new(0, 0), Square::new(1, 1), None),
            None
        );
    }

    #[test]
    fn legs_of_the_standard_scenario() {
        let inst = instance(8, (4, 2), (2, 6), (2, 3));
        let board = inst.board();
        let threat = board.bishop_threat(inst.bishop);
        assert_eq!(
            restricted_distance(&board, inst.start, inst.goal, Some(&threat)),
            Some(4)
        );
        assert_eq!(
            restricted_distance(&board, inst.start, inst.bishop, Some(&threat)),
            Some(1)
        );
        assert_eq!(
            restricted_distance(&board, inst.bishop, inst.goal, None),
            Some(3)
        );
        assert_eq!(reference_distance(&inst), Some(4));
    }

    #[test]
    fn capture_route_wins_when_the_goal_is_behind_the_threat() {
        // The goal sits on the bishop's diagonal: no direct route exists,
        // and the answer is the sum of the two legs.
        let inst = instance(8, (0, 0), (0, 1), (2, 3));
        let board = inst.board();
        let threat = board.bishop_threat(inst.bishop);
        assert_eq!(
            restricted_distance(&board, inst.start, inst.goal, Some(&threat)),
            None
        );
        assert_eq!(reference_distance(&inst), Some(7));
    }

    #[test]
    fn solves_the_known_scenarios() {
        assert_eq!(reference_distance(&instance(8, (4, 2), (2, 6), (2, 3))), Some(4));
        assert_eq!(reference_distance(&instance(5, (2, 2), (2, 2), (3, 4))), Some(0));
        assert_eq!(reference_distance(&instance(4, (3, 3), (1, 0), (1, 3))), Some(5));
        assert_eq!(reference_distance(&instance(6, (3, 3), (4, 0), (3, 1))), Some(4));
        assert_eq!(
            reference_distance(&instance(47, (17, 43), (14, 18), (38, 42))),
            Some(28)
        );
    }

    #[test]
    fn unreachable_scenarios_stay_unreachable() {
        assert_eq!(reference_distance(&instance(2, (1, 0), (0, 1), (0, 0))), None);
        assert_eq!(reference_distance(&instance(3, (1, 0), (1, 2), (1, 1))), None);
    }
}
