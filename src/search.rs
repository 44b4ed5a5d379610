//! Unidirectional BFS over the extended state graph.
//!
//! The true search vertex is a square plus a flag recording whether the
//! bishop is still on the board; legality of a move depends on that flag,
//! so a plain grid BFS is not enough. The frontier is strictly FIFO, which
//! is what guarantees the first dequeue of a state carries its shortest
//! distance.

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use log::debug;

use crate::board::Square;
use crate::instance::Instance;

/// A search vertex: where the knight stands and whether the bishop still
/// threatens its diagonals. Once a capture clears the flag no successor
/// ever sets it again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct State {
    pub square: Square,
    pub bishop_alive: bool,
}

impl State {
    pub fn initial(square: Square) -> Self {
        Self {
            square,
            bishop_alive: true,
        }
    }
}

/// Externally set abort signal, polled once per dequeued state.
///
/// Wrap in an `Arc` to share with the thread that sets it.
#[derive(Debug, Default)]
pub struct CancelFlag(AtomicBool);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Caller-owned hooks for one search call.
///
/// The observer is invoked once per newly visited state with the square and
/// the running visited count; it is purely observational and never changes
/// the result. The cancel flag aborts the search with the unreachable
/// outcome.
#[derive(Default)]
pub struct SearchOptions<'a> {
    pub observer: Option<&'a mut dyn FnMut(Square, usize)>,
    pub cancel: Option<&'a CancelFlag>,
}

impl SearchOptions<'_> {
    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancel.is_some_and(CancelFlag::is_cancelled)
    }

    pub(crate) fn notify(&mut self, square: Square, count: usize) {
        if let Some(observer) = self.observer.as_mut() {
            observer(square, count);
        }
    }
}

/// Outcome of one search call.
#[derive(Debug, Clone)]
pub struct SearchReport {
    /// Shortest number of knight moves, or `None` when no legal move
    /// sequence reaches the goal (also the outcome of a cancelled search).
    pub distance: Option<u32>,
    /// States visited before the search concluded.
    pub visited: usize,
    /// Wall-clock time of the call in milliseconds.
    pub time_elapsed_ms: u64,
}

/// Shortest knight path from `instance.start` to `instance.goal`.
///
/// Seeds the frontier with `(start, bishop alive)` at distance 0 and runs a
/// level-order BFS. A popped goal square is accepted whatever its flag; a
/// move into the threat zone is illegal while the bishop lives; landing on
/// the bishop's square captures it and clears the flag for the rest of the
/// path.
pub fn find_distance(instance: &Instance, mut options: SearchOptions<'_>) -> SearchReport {
    let started = Instant::now();
    let board = instance.board();

    // Degenerate input still terminates: an off-board endpoint has no legal
    // state, so there is nothing to expand.
    if !board.contains(instance.start) || !board.contains(instance.goal) {
        return SearchReport {
            distance: None,
            visited: 0,
            time_elapsed_ms: started.elapsed().as_millis() as u64,
        };
    }

    let threat = board.bishop_threat(instance.bishop);
    let mut visited: HashSet<State> = HashSet::new();
    let mut queue: VecDeque<(State, u32)> = VecDeque::new();
    queue.push_back((State::initial(instance.start), 0));

    while let Some((state, distance)) = queue.pop_front() {
        if options.is_cancelled() {
            debug!("search cancelled after {} states", visited.len());
            return SearchReport {
                distance: None,
                visited: visited.len(),
                time_elapsed_ms: started.elapsed().as_millis() as u64,
            };
        }

        if state.square == instance.goal {
            debug!("goal found at distance {} after {} states", distance, visited.len());
            return SearchReport {
                distance: Some(distance),
                visited: visited.len(),
                time_elapsed_ms: started.elapsed().as_millis() as u64,
            };
        }

        // The frontier may hold duplicates; only the first dequeue counts.
        if !visited.insert(state) {
            continue;
        }
        options.notify(state.square, visited.len());

        for to in board.knight_moves(state.square) {
            if state.bishop_alive && threat.contains(to) {
                continue;
            }
            let next = State {
                square: to,
                bishop_alive: state.bishop_alive && to != instance.bishop,
            };
            queue.push_back((next, distance + 1));
        }
    }

    debug!("frontier exhausted after {} states", visited.len());
    SearchReport {
        distance: None,
        visited: visited.len(),
        time_elapsed_ms: started.elapsed().as_millis() as u64,
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

    fn distance(inst: &Instance) -> Option<u32> {
        find_distance(inst, SearchOptions::default()).distance
    }

    #[test]
    fn solves_the_known_scenarios() {
        assert_eq!(distance(&instance(8, (4, 2), (2, 6), (2, 3))), Some(4));
        assert_eq!(distance(&instance(4, (3, 3), (1, 0), (1, 3))), Some(5));
        assert_eq!(distance(&instance(6, (3, 3), (4, 0), (3, 1))), Some(4));
        assert_eq!(distance(&instance(47, (17, 43), (14, 18), (38, 42))), Some(28));
    }

    #[test]
    fn start_equal_to_goal_is_zero_without_expanding() {
        let report = find_distance(&instance(5, (2, 2), (2, 2), (3, 4)), SearchOptions::default());
        assert_eq!(report.distance, Some(0));
        assert_eq!(report.visited, 0);
    }

    #[test]
    fn unreachable_when_the_board_has_no_knight_moves() {
        assert_eq!(distance(&instance(2, (1, 0), (0, 1), (0, 0))), None);
    }

    #[test]
    fn unreachable_when_the_threat_zone_disconnects_the_goal() {
        // Both knight moves out of (1, 0) land on corners the bishop on
        // (1, 1) attacks, and the bishop itself is out of knight range.
        assert_eq!(distance(&instance(3, (1, 0), (1, 2), (1, 1))), None);
    }

    #[test]
    fn degenerate_off_board_input_terminates_unreachable() {
        assert_eq!(distance(&instance(4, (7, 7), (1, 1), (2, 2))), None);
        assert_eq!(distance(&instance(4, (0, 0), (9, 9), (2, 2))), None);
    }

    #[test]
    fn capture_reopens_squares_behind_the_threat() {
        // The goal sits on the bishop's diagonal, so the only way in is to
        // take the bishop first.
        let inst = instance(8, (0, 0), (0, 1), (2, 3));
        assert_eq!(distance(&inst), Some(7));
    }

    #[test]
    fn observer_sees_a_strictly_increasing_bounded_count() {
        let inst = instance(8, (4, 2), (2, 6), (2, 3));
        let mut counts = Vec::new();
        let mut observer = |_sq: Square, n: usize| counts.push(n);
        let report = find_distance(
            &inst,
            SearchOptions {
                observer: Some(&mut observer),
                cancel: None,
            },
        );
        assert_eq!(report.distance, Some(4));
        assert_eq!(counts.len(), report.visited);
        assert!(counts.windows(2).all(|w| w[0] < w[1]));
        // Every square in at most two alive states.
        assert!(counts.last().is_some_and(|&n| n <= 2 * 64));
    }

    #[test]
    fn observer_does_not_change_the_result() {
        let inst = instance(6, (3, 3), (4, 0), (3, 1));
        let mut sink = |_: Square, _: usize| {};
        let with = find_distance(
            &inst,
            SearchOptions {
                observer: Some(&mut sink),
                cancel: None,
            },
        );
        assert_eq!(with.distance, distance(&inst));
    }

    #[test]
    fn a_set_cancel_flag_aborts_immediately() {
        let flag = CancelFlag::new();
        flag.cancel();
        let report = find_distance(
            &instance(8, (4, 2), (2, 6), (2, 3)),
            SearchOptions {
                observer: None,
                cancel: Some(&flag),
            },
        );
        assert_eq!(report.distance, None);
        assert_eq!(report.visited, 0);
    }
}
