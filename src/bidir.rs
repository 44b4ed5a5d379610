//! Bidirectional (meet-in-the-middle) variant of the extended-state BFS.
//!
//! Two frontiers expand toward each other: the forward one walks the same
//! extended state graph as [`crate::search`], the backward one walks its
//! reversed edges from the goal. Reversal moves the threat constraint onto
//! the popped square — no forward move may land on a threatened square
//! while the bishop lives, so a threatened backward state has no
//! predecessors. Capture edges always terminate on the bishop's square
//! with the flag cleared, which means every state the backward search can
//! reach is an alive state and its visited map needs only the square.
//!
//! A meeting of the two maps yields a candidate path length rather than an
//! immediate answer: the frontiers advance one pop at a time and may be on
//! different levels, so the first meeting is not always the best one. Each
//! frontier keeps stepping while its front distance can still beat the
//! best candidate. Forward pops of the goal square are exact by level
//! order and return at once.

use std::collections::{HashMap, VecDeque};
use std::time::Instant;

use log::debug;

use crate::board::Square;
use crate::instance::Instance;
use crate::search::{SearchOptions, SearchReport, State};

fn front_beats(front: Option<u32>, best: Option<u32>) -> bool {
    match (front, best) {
        (None, _) => false,
        (Some(_), None) => true,
        (Some(d), Some(b)) => d < b,
    }
}

fn improve(best: &mut Option<u32>, candidate: u32) {
    if best.map_or(true, |b| candidate < b) {
        *best = Some(candidate);
    }
}

/// Shortest knight path from `instance.start` to `instance.goal`, same
/// contract as [`crate::search::find_distance`].
pub fn find_distance_bidir(instance: &Instance, mut options: SearchOptions<'_>) -> SearchReport {
    let started = Instant::now();
    let board = instance.board();

    if !board.contains(instance.start) || !board.contains(instance.goal) {
        return SearchReport {
            distance: None,
            visited: 0,
            time_elapsed_ms: started.elapsed().as_millis() as u64,
        };
    }

    let threat = board.bishop_threat(instance.bishop);

    let mut forward_seen: HashMap<State, u32> = HashMap::new();
    let mut backward_seen: HashMap<Square, u32> = HashMap::new();
    let mut forward: VecDeque<(State, u32)> = VecDeque::new();
    let mut backward: VecDeque<(Square, u32)> = VecDeque::new();
    forward.push_back((State::initial(instance.start), 0));
    backward.push_back((instance.goal, 0));

    let mut best: Option<u32> = None;
    let mut visited = 0usize;

    let finish = |distance: Option<u32>, visited: usize, started: Instant| SearchReport {
        distance,
        visited,
        time_elapsed_ms: started.elapsed().as_millis() as u64,
    };

    loop {
        let step_forward = front_beats(forward.front().map(|e| e.1), best);
        let step_backward = front_beats(backward.front().map(|e| e.1), best);
        if !step_forward && !step_backward {
            break;
        }

        if step_forward {
            let (state, distance) = forward.pop_front().expect("front checked");
            if options.is_cancelled() {
                debug!("bidirectional search cancelled after {} states", visited);
                return finish(None, visited, started);
            }

            // Exact: the forward frontier is level-ordered over the true
            // state graph, so its first pop of the goal square is optimal.
            if state.square == instance.goal {
                debug!("goal popped forward at distance {} after {} states", distance, visited);
                return finish(Some(distance), visited, started);
            }

            // Meeting check comes before the local skip check; the square
            // may be known to the other side without being expanded here.
            if let Some(&from_goal) = backward_seen.get(&state.square) {
                improve(&mut best, distance + from_goal);
            }

            if !forward_seen.contains_key(&state) {
                forward_seen.insert(state, distance);
                visited += 1;
                options.notify(state.square, visited);

                for to in board.knight_moves(state.square) {
                    if state.bishop_alive && threat.contains(to) {
                        continue;
                    }
                    let next = State {
                        square: to,
                        bishop_alive: state.bishop_alive && to != instance.bishop,
                    };
                    forward.push_back((next, distance + 1));
                }
            }
        }

        if step_backward {
            let (square, distance) = backward.pop_front().expect("front checked");
            if options.is_cancelled() {
                debug!("bidirectional search cancelled after {} states", visited);
                return finish(None, visited, started);
            }

            // A backward pop of the start is only a candidate: the backward
            // search never crosses a capture, so it can overshoot a route
            // that takes the bishop.
            if square == instance.start {
                improve(&mut best, distance);
            }

            // Cross-match accepts the square against either alive flag on
            // the forward side, alive first.
            for bishop_alive in [true, false] {
                if let Some(&from_start) = forward_seen.get(&State {
                    square,
                    bishop_alive,
                }) {
                    improve(&mut best, distance + from_start);
                }
            }

            if !backward_seen.contains_key(&square) {
                backward_seen.insert(square, distance);
                visited += 1;
                options.notify(square, visited);

                // A threatened square cannot be entered while the bishop
                // lives, so it has no predecessors to enqueue.
                if !threat.contains(square) {
                    for from in board.knight_moves(square) {
                        backward.push_back((from, distance + 1));
                    }
                }
            }
        }
    }

    match best {
        Some(d) => debug!("frontiers met at distance {} after {} states", d, visited),
        None => debug!("both frontiers exhausted after {} states", visited),
    }
    finish(best, visited, started)
}
