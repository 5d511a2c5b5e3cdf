//! Named structural scenarios for radixtree_core.
//!
//! Each scenario fills a fresh tree and names the canonical dump it must
//! produce. `run_all` executes the table and reports every outcome.

use log::{debug, warn};
use radixtree_core::{Error, RadixTree};

pub struct Scenario {
    pub name: &'static str,
    pub words: &'static [&'static str],
    pub expected: &'static str,
}

macro_rules! scenario {
    ($name:ident, [$($w:expr),* $(,)?], $expected:expr) => {
        Scenario { name: stringify!($name), words: &[$($w),*], expected: $expected }
    };
}

pub const SCENARIOS: &[Scenario] = &[
    scenario!(test_empty_string, [""], ""),
    scenario!(test_add, ["hello"], "hello()"),
    scenario!(test_dupe, ["hello", "hello"], "hello()"),
    scenario!(test_prefix_first, ["hell", "hello"], "hell(,o())"),
    scenario!(test_prefix_last, ["hello", "hell"], "hell(,o())"),
    scenario!(test_hellheck, ["hell", "heck"], "he(ck(),ll())"),
    scenario!(test_2neighbors, ["a", "b"], "a(),b()"),
    scenario!(test_3neighbors, ["a", "c", "b"], "a(),b(),c()"),
    scenario!(test_hehellhello, ["he", "hell", "hello"], "he(,ll(,o()))"),
    scenario!(test_hehellohell, ["he", "hello", "hell"], "he(,ll(,o()))"),
    scenario!(test_hellohellhe, ["hello", "hell", "he"], "he(,ll(,o()))"),
    scenario!(test_hellohehell, ["hello", "he", "hell"], "he(,ll(,o()))"),
    scenario!(test_hellhehello, ["hell", "he", "hello"], "he(,ll(,o()))"),
    scenario!(test_hellhellohe, ["hell", "hello", "he"], "he(,ll(,o()))"),
    scenario!(
        test_urls,
        ["http://foo", "http://foo/bar", "http://baz"],
        "http://(baz(),foo(,/bar()))"
    ),
];

#[derive(Debug)]
pub struct Outcome {
    pub name: &'static str,
    pub expected: &'static str,
    pub got: Result<String, Error>,
}

impl Outcome {
    pub fn passed(&self) -> bool {
        matches!(&self.got, Ok(dump) if dump == self.expected)
    }
}

pub fn run_scenario(scenario: &Scenario) -> Outcome {
    let mut tree = RadixTree::new();
    let got = tree
        .insert_all(scenario.words)
        .map(|_| tree.serialize());
    debug!("{}: {:?}", scenario.name, tree);
    Outcome {
        name: scenario.name,
        expected: scenario.expected,
        got,
    }
}

/// Runs every scenario whose name contains `filter` (all when `None`).
pub fn run_all(filter: Option<&str>) -> Vec<Outcome> {
    SCENARIOS
        .iter()
        .filter(|s| filter.map_or(true, |f| s.name.contains(f)))
        .map(|s| {
            let outcome = run_scenario(s);
            if !outcome.passed() {
                warn!("{} failed: {:?}", s.name, outcome.got);
            }
            outcome
        })
        .collect()
}
