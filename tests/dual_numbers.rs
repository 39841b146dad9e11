//! Integration tests for dual-number arithmetic

use adgraph::prelude::*;
use approx::assert_relative_eq;
use std::f64::consts::PI;

#[test]
fn test_primitive_table() {
    let zero = DualNumber::new(0.0, 0.0);
    let one = DualNumber::new(1.0, 0.0);
    let pi = DualNumber::new(PI, 0.0);

    assert_eq!(zero.exp(), DualNumber::new(1.0, 0.0));
    assert_eq!(one.ln(), DualNumber::new(0.0, 0.0));
    // sin(pi) is ~1.2e-16, within the absolute tolerance
    assert_eq!(pi.sin(), DualNumber::new(0.0, 0.0));
    assert_eq!(pi.cos(), DualNumber::new(-1.0, 0.0));
}

#[test]
fn test_tolerant_equality() {
    let a = DualNumber::new(1.0, 2.0);
    assert_eq!(a, DualNumber::new(1.0 + 1e-9, 2.0));
    assert_ne!(a, DualNumber::new(1.001, 2.0));
    assert_ne!(a, DualNumber::new(1.0, 2.001));

    let loose = Tolerance::new(1e-2, 0.0);
    assert!(a.is_close_with(&DualNumber::new(1.001, 2.001), loose));
}

#[test]
fn test_chain_through_composition() {
    // d/dx exp(sin(x)) = cos(x) exp(sin(x))
    let x = DualNumber::variable(0.5);
    let y = x.sin().exp();
    assert_relative_eq!(y.real, 0.5f64.sin().exp(), epsilon = 1e-15);
    assert_relative_eq!(y.dual, 0.5f64.cos() * 0.5f64.sin().exp(), epsilon = 1e-15);
}

#[test]
fn test_quotient_and_power() {
    let x = DualNumber::variable(2.0);
    let q = 1.0 / x;
    assert_relative_eq!(q.dual, -0.25, epsilon = 1e-15);

    let p = x.pow(x);
    // d/dx x^x = x^x (ln x + 1)
    assert_relative_eq!(p.real, 4.0, epsilon = 1e-12);
    assert_relative_eq!(p.dual, 4.0 * (2f64.ln() + 1.0), epsilon = 1e-12);

    let r = 2f64.pow(x);
    assert_relative_eq!(r.dual, 4.0 * 2f64.ln(), epsilon = 1e-12);
}

#[test]
fn test_vector_broadcast() {
    let v = DualVector::new(&[1.0, 2.0, 3.0], &[1.0, 1.0, 1.0]).unwrap();

    let scaled = v.clone() * 2.0;
    assert_eq!(scaled.real(), vec![2.0, 4.0, 6.0]);
    assert_eq!(scaled.dual(), vec![2.0, 2.0, 2.0]);

    let shifted = DualNumber::new(10.0, 1.0) - v.clone();
    assert_eq!(shifted.real(), vec![9.0, 8.0, 7.0]);
    assert_eq!(shifted.dual(), vec![0.0, 0.0, 0.0]);

    let squared = v.checked_mul(&v).unwrap();
    assert_eq!(squared.real(), vec![1.0, 4.0, 9.0]);
    assert_eq!(squared.dual(), vec![2.0, 4.0, 6.0]);
}

#[test]
fn test_vector_length_mismatch() {
    let u = DualVector::constant(&[1.0, 2.0]);
    let v = DualVector::constant(&[1.0, 2.0, 3.0]);

    assert_eq!(u.checked_add(&v), Err(Error::length_mismatch(2, 3)));
    assert!(DualVector::new(&[1.0], &[]).is_err());
}

#[test]
fn test_numeric_lifts_constants() {
    let x = Numeric::from(DualNumber::variable(3.0));

    let sum = x.add(&Numeric::Scalar(1.0)).unwrap();
    assert_eq!(sum, Numeric::Dual(DualNumber::new(4.0, 1.0)));

    let v = Numeric::from(DualVector::new(&[1.0, 2.0], &[1.0, 0.0]).unwrap());
    let prod = v.mul(&Numeric::from(vec![3.0, 4.0])).unwrap();
    assert_eq!(prod.real_part(), vec![3.0, 8.0]);
    assert_eq!(prod.dual_part(), vec![3.0, 0.0]);
}

#[test]
fn test_dual_scalar_with_plain_vector_fails() {
    let x = Numeric::from(DualNumber::variable(1.0));
    let err = x.mul(&Numeric::from(vec![1.0, 2.0])).unwrap_err();
    assert!(matches!(err, Error::UnsupportedOperand { .. }));
}
