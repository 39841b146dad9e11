//! Common test utilities
#![allow(dead_code)]

use adgraph::{Bindings, Expression, Value};
use std::collections::BTreeMap;

/// Route `log` output through the test harness
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Assert two f64 slices are close within tolerance
///
/// Uses the formula: |a - b| <= atol + rtol * |b|
pub fn assert_allclose_f64(a: &[f64], b: &[f64], rtol: f64, atol: f64, msg: &str) {
    assert_eq!(a.len(), b.len(), "{}: length mismatch", msg);
    for (i, (x, y)) in a.iter().zip(b.iter()).enumerate() {
        let diff = (x - y).abs();
        let tol = atol + rtol * y.abs();
        assert!(
            diff <= tol,
            "{}: element {} differs: {} vs {} (diff={}, tol={})",
            msg,
            i,
            x,
            y,
            diff,
            tol
        );
    }
}

/// Build a forward or reverse variable per name
pub fn vars<const N: usize>(names: [&str; N], mode: adgraph::Mode) -> [Expression; N] {
    names.map(|name| Expression::variable(name, mode))
}

/// Named scalar inputs
pub fn scalars(pairs: &[(&str, f64)]) -> BTreeMap<String, Value> {
    pairs
        .iter()
        .map(|&(name, x)| (name.to_string(), Value::Scalar(x)))
        .collect()
}

/// Central finite difference of `f`'s first output component with respect
/// to scalar input `name`
pub fn finite_difference(f: &Expression, inputs: &BTreeMap<String, Value>, name: &str) -> f64 {
    const H: f64 = 1e-6;
    let shifted = |delta: f64| {
        let mut point = inputs.clone();
        if let Some(Value::Scalar(x)) = point.get_mut(name) {
            *x += delta;
        }
        f.propagate(Bindings::from(point))
            .unwrap()
            .real_part()[0]
    };
    (shifted(H) - shifted(-H)) / (2.0 * H)
}
