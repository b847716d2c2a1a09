#![no_main]

use libfuzzer_sys::fuzz_target;
use unshape_eca::{Budget, EngineConfig, Fetch, PatternSeed, Rule};

// Rule byte, tile size, fuel, then seed cells.
fuzz_target!(|data: &[u8]| {
    let [rule, size, fuel, rest @ ..] = data else {
        return;
    };
    let cells: Vec<bool> = rest.iter().take(64).map(|b| b & 1 == 1).collect();
    let Ok(seed) = PatternSeed::new(vec![false], cells, vec![false]) else {
        return;
    };

    let Ok(mut engine) = EngineConfig::new(Rule::new(*rule))
        .with_tile_size(usize::from(*size % 16) + 1)
        .build()
    else {
        return;
    };
    engine.set_initial_state(seed);

    // Fuel above the dependency depth (at most 25 block-rows here) finishes at
    // least one tile per attempt, so retries converge to the unlimited answer.
    let fuel = u64::from(*fuel) + 26;
    let mut attempts = 0;
    let row = loop {
        match engine.row_segment(-16, 48, 24, &Budget::with_fuel(fuel)) {
            Fetch::Ready(row) => break row,
            Fetch::Pending => attempts += 1,
        }
        assert!(attempts < 10_000, "budgeted row never completed");
    };

    engine.clear_cache();
    match engine.row_segment(-16, 48, 24, &Budget::unlimited()) {
        Fetch::Ready(expected) => assert_eq!(row, expected),
        Fetch::Pending => panic!("unlimited budget returned pending"),
    }
});
