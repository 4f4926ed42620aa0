//! Determinism harness.
//!
//! A host feeds measured frame times into [`Simulation::advance`], so a
//! recorded session is only worth keeping if the same deltas and commands
//! always land on the same [`Simulation::state_hash`]. The helpers here run
//! a world several times (sequentially, on threads, or through a
//! serialize/deserialize cycle) and compare hashes.
//!
//! World math is fixed-point and entity storage iterates in insertion
//! order, so any mismatch reported here is a real bug.

use std::thread;

use skirmish_core::math::Fixed;
use skirmish_core::replay::Replay;
use skirmish_core::simulation::Simulation;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Final hash of each run.
    pub hashes: Vec<u64>,
    /// Steps taken per run.
    pub frames: u64,
}

impl DeterminismResult {
    fn from_hashes(hashes: Vec<u64>, frames: u64) -> Self {
        Self {
            is_deterministic: hashes.windows(2).all(|w| w[0] == w[1]),
            hashes,
            frames,
        }
    }

    /// Distinct hashes seen; one for a deterministic world.
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that every run agreed.
    ///
    /// # Panics
    ///
    /// Panics with the per-run hashes if they differ.
    pub fn assert_deterministic(&self) {
        assert!(
            self.is_deterministic,
            "{} runs of {} frames produced {} distinct hashes: {:?}",
            self.hashes.len(),
            self.frames,
            self.unique_hashes().len(),
            self.hashes
        );
    }
}

/// Build a state with `setup`, call `step` on it `frames` times, hash it,
/// and repeat `runs` times.
///
/// # Example
///
/// ```
/// use skirmish_test_utils::determinism::verify_determinism;
/// use skirmish_test_utils::fixtures::{demo_world, fixed};
///
/// verify_determinism(
///     3,
///     100,
///     demo_world,
///     |sim| {
///         sim.advance(fixed(16));
///     },
///     |sim| sim.state_hash(),
/// )
/// .assert_deterministic();
/// ```
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    frames: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let hashes = (0..runs)
        .map(|_| {
            let mut state = setup();
            for _ in 0..frames {
                step(&mut state);
            }
            hash(&state)
        })
        .collect();

    DeterminismResult::from_hashes(hashes, frames)
}

/// Play a replay `runs` times from its stored initial state.
///
/// # Panics
///
/// Panics if the initial state cannot be restored.
pub fn verify_replay_determinism(replay: &Replay, runs: usize) -> DeterminismResult {
    verify_determinism(
        runs,
        1,
        || {
            replay
                .restore_initial_state()
                .expect("replay initial state restores")
        },
        |sim| replay.replay_into(sim),
        Simulation::state_hash,
    )
}

/// Run `num_sims` copies of a world on scoped threads and collect final
/// hashes.
///
/// # Panics
///
/// Panics if a worker thread panics.
pub fn run_parallel_simulations<F>(
    setup_fn: F,
    num_sims: usize,
    frames: u64,
    frame_ms: Fixed,
) -> DeterminismResult
where
    F: Fn() -> Simulation + Sync,
{
    let hashes = thread::scope(|s| {
        let handles: Vec<_> = (0..num_sims)
            .map(|_| {
                s.spawn(|| {
                    let mut sim = setup_fn();
                    for _ in 0..frames {
                        sim.advance(frame_ms);
                    }
                    sim.state_hash()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().expect("simulation thread panicked"))
            .collect()
    });

    DeterminismResult::from_hashes(hashes, frames)
}

/// Feed the same frame times to two copies of a world and report the first
/// frame after which their hashes differ.
///
/// `Some(0)` means the initial states already differ.
pub fn find_first_divergence<F>(setup_fn: F, deltas: &[Fixed]) -> Option<usize>
where
    F: Fn() -> Simulation,
{
    let mut left = setup_fn();
    let mut right = setup_fn();

    if left.state_hash() != right.state_hash() {
        return Some(0);
    }

    deltas.iter().enumerate().find_map(|(frame, &delta)| {
        left.advance(delta);
        right.advance(delta);
        (left.state_hash() != right.state_hash()).then_some(frame + 1)
    })
}

/// Advance a world, push it through the snapshot encoding, and check that
/// the restored copy hashes the same and keeps evolving the same.
pub fn verify_serialization_determinism<F>(setup_fn: F, frames: u64, frame_ms: Fixed) -> bool
where
    F: Fn() -> Simulation,
{
    let mut sim = setup_fn();
    for _ in 0..frames {
        sim.advance(frame_ms);
    }

    let Ok(bytes) = sim.serialize() else {
        return false;
    };
    let Ok(mut restored) = Simulation::deserialize(&bytes) else {
        return false;
    };
    if restored.state_hash() != sim.state_hash() {
        return false;
    }

    for _ in 0..frames {
        sim.advance(frame_ms);
        restored.advance(frame_ms);
    }
    restored.state_hash() == sim.state_hash()
}

/// Proptest strategies for simulation inputs.
pub mod strategies {
    use proptest::prelude::*;
    use skirmish_core::math::{Fixed, Vec2Fixed};

    /// A coordinate on the 40x40 map with 1/100 tile resolution.
    pub fn arb_grid_coord() -> impl Strategy<Value = Fixed> {
        (0i32..4000i32).prop_map(|n| Fixed::from_num(n) / Fixed::from_num(100))
    }

    /// A point on the map.
    pub fn arb_grid_position() -> impl Strategy<Value = Vec2Fixed> {
        (arb_grid_coord(), arb_grid_coord()).prop_map(|(x, y)| Vec2Fixed::new(x, y))
    }

    /// A point anywhere in the fixed-point range, far off the map included.
    pub fn arb_any_position() -> impl Strategy<Value = Vec2Fixed> {
        (any::<i32>(), any::<i32>()).prop_map(|(x, y)| Vec2Fixed::from_ints(x, y))
    }

    /// A plausible frame time: 1 to 100 ms.
    pub fn arb_frame_delta() -> impl Strategy<Value = Fixed> {
        (1i32..=100i32).prop_map(Fixed::from_num)
    }

    /// Any frame time, including zero and negative glitches.
    pub fn arb_any_delta() -> impl Strategy<Value = Fixed> {
        (-100i32..=100i32).prop_map(Fixed::from_num)
    }

    /// A run of frame times.
    pub fn arb_frame_sequence(max_len: usize) -> impl Strategy<Value = Vec<Fixed>> {
        proptest::collection::vec(arb_frame_delta(), 1..max_len)
    }

    /// A unit speed between 0.5 and 5 tiles per second.
    pub fn arb_speed() -> impl Strategy<Value = Fixed> {
        (5i32..=50i32).prop_map(|n| Fixed::from_num(n) / Fixed::from_num(10))
    }
}
