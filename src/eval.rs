//! Evaluating expressions: inputs, seeds and results
//!
//! [`Expression::call`] is the single entry point. What it returns depends
//! on the expression's mode and on whether a seed is given:
//!
//! | mode    | seed    | derivatives                                          |
//! |---------|---------|------------------------------------------------------|
//! | forward | given   | [`Derivatives::Directional`]: one dual-part vector   |
//! | forward | absent  | [`Derivatives::Jacobian`]: one column per input component |
//! | reverse | ignored | [`Derivatives::Gradient`]: one adjoint per variable  |

use crate::autograd::{seed_leaf, ForwardContext, ReverseContext};
use crate::error::{Error, Result};
use crate::expr::{Expression, Graph, Mode};
use crate::numeric::{Numeric, Value};
use log::{debug, trace, warn};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Values bound to variable names for one call
///
/// A uniform value applies to every variable the expression references;
/// named bindings apply per variable. Names missing from named input
/// bindings evaluate as `0`, names missing from named seed bindings get a
/// zero seed.
#[derive(Debug, Clone, PartialEq)]
pub enum Bindings {
    /// Same value for every variable
    Uniform(Value),
    /// Value per variable name
    Named(BTreeMap<String, Value>),
}

impl Bindings {
    /// Empty named bindings
    pub fn new() -> Self {
        Self::Named(BTreeMap::new())
    }

    /// Bind `name` to `value`
    ///
    /// Replaces uniform bindings with named ones.
    pub fn with(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut map = match self {
            Self::Named(map) => map,
            Self::Uniform(_) => BTreeMap::new(),
        };
        map.insert(name.into(), value.into());
        Self::Named(map)
    }

    /// Value bound to `name`
    pub fn get(&self, name: &str) -> Option<&Value> {
        match self {
            Self::Uniform(v) => Some(v),
            Self::Named(map) => map.get(name),
        }
    }

    /// Input value for every name in `names`, plus any extra named bindings
    pub fn resolve(&self, names: &BTreeSet<String>) -> BTreeMap<String, Value> {
        match self {
            Self::Uniform(v) => names.iter().map(|n| (n.clone(), v.clone())).collect(),
            Self::Named(map) => {
                let mut resolved = map.clone();
                for name in names {
                    resolved.entry(name.clone()).or_default();
                }
                resolved
            }
        }
    }

    /// Seed value for every resolved input
    pub fn resolve_seed(&self, inputs: &BTreeMap<String, Value>) -> BTreeMap<String, Value> {
        inputs
            .iter()
            .map(|(name, input)| {
                let seed = self
                    .get(name)
                    .cloned()
                    .unwrap_or_else(|| input.zeros_like());
                (name.clone(), seed)
            })
            .collect()
    }
}

impl Default for Bindings {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Value> for Bindings {
    fn from(v: Value) -> Self {
        Self::Uniform(v)
    }
}

impl From<f64> for Bindings {
    fn from(x: f64) -> Self {
        Self::Uniform(Value::Scalar(x))
    }
}

macro_rules! impl_bindings_from_int {
    ($($t:ty),* $(,)?) => {
        $(
            impl From<$t> for Bindings {
                fn from(x: $t) -> Self {
                    Self::Uniform(Value::from(x))
                }
            }
        )*
    };
}

impl_bindings_from_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl From<Vec<f64>> for Bindings {
    fn from(v: Vec<f64>) -> Self {
        Self::Uniform(Value::Vector(v))
    }
}

impl<const N: usize> From<[f64; N]> for Bindings {
    fn from(v: [f64; N]) -> Self {
        Self::Uniform(Value::from(v))
    }
}

impl From<BTreeMap<String, Value>> for Bindings {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Self::Named(map)
    }
}

impl From<HashMap<String, Value>> for Bindings {
    fn from(map: HashMap<String, Value>) -> Self {
        Self::Named(map.into_iter().collect())
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for Bindings
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl<K, V> FromIterator<(K, V)> for Bindings
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::Named(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Derivatives produced by one evaluation
#[derive(Debug, Clone, PartialEq)]
pub enum Derivatives {
    /// Forward mode with an explicit seed: derivative along the seed, one
    /// entry per output component
    Directional(Vec<f64>),
    /// Forward mode without a seed: for each input name, one column per
    /// input component, each holding the derivative of every output
    /// component
    Jacobian(BTreeMap<String, Vec<Vec<f64>>>),
    /// Reverse mode: adjoint of each variable the output depends on
    Gradient(BTreeMap<String, Value>),
}

impl Derivatives {
    /// Directional derivative, if this is one
    pub fn directional(&self) -> Option<&[f64]> {
        match self {
            Self::Directional(d) => Some(d),
            _ => None,
        }
    }

    /// Jacobian columns, if this is one
    pub fn jacobian(&self) -> Option<&BTreeMap<String, Vec<Vec<f64>>>> {
        match self {
            Self::Jacobian(j) => Some(j),
            _ => None,
        }
    }

    /// Gradient, if this is one
    pub fn gradient(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Self::Gradient(g) => Some(g),
            _ => None,
        }
    }
}

/// Output value and derivatives of one expression
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Output components
    pub value: Vec<f64>,
    /// Derivatives of the output
    pub derivatives: Derivatives,
}

impl Evaluation {
    /// Derivatives with respect to `name`, flattened
    ///
    /// Jacobian columns are concatenated in input-component order; for a
    /// scalar output this matches the reverse-mode gradient. Returns `None`
    /// for directional derivatives and for names without an entry.
    pub fn derivative(&self, name: &str) -> Option<Vec<f64>> {
        match &self.derivatives {
            Derivatives::Directional(_) => None,
            Derivatives::Jacobian(j) => j.get(name).map(|cols| cols.concat()),
            Derivatives::Gradient(g) => g.get(name).map(Value::to_vec),
        }
    }
}

fn binding<'a>(map: &'a BTreeMap<String, Value>, name: &str) -> Result<&'a Value> {
    map.get(name)
        .ok_or_else(|| Error::Internal(format!("variable '{name}' has no binding")))
}

fn one_hot(input: &Value, index: usize) -> Value {
    match input {
        Value::Scalar(_) => Value::Scalar(1.0),
        Value::Vector(v) => {
            let mut e = vec![0.0; v.len()];
            e[index] = 1.0;
            Value::Vector(e)
        }
    }
}

fn forward_pass(
    ctx: &mut ForwardContext<'_>,
    inputs: &BTreeMap<String, Value>,
    seeds: &BTreeMap<String, Value>,
) -> Result<()> {
    ctx.clear();
    ctx.evaluate(|name| seed_leaf(name, binding(inputs, name)?, binding(seeds, name)?))
}

fn root_values(ctx: &ForwardContext<'_>) -> Result<Vec<Vec<f64>>> {
    ctx.graph()
        .roots()
        .iter()
        .map(|&root| Ok(ctx.value(root)?.real_part()))
        .collect()
}

fn directional(
    graph: &Graph,
    inputs: &BTreeMap<String, Value>,
    seeds: &BTreeMap<String, Value>,
) -> Result<Vec<Evaluation>> {
    let mut ctx = ForwardContext::new(graph);
    forward_pass(&mut ctx, inputs, seeds)?;
    graph
        .roots()
        .iter()
        .map(|&root| {
            let out = ctx.value(root)?;
            Ok(Evaluation {
                value: out.real_part(),
                derivatives: Derivatives::Directional(out.dual_part()),
            })
        })
        .collect()
}

fn jacobian(graph: &Graph, inputs: &BTreeMap<String, Value>) -> Result<Vec<Evaluation>> {
    let mut ctx = ForwardContext::new(graph);
    let zeros: BTreeMap<String, Value> = inputs
        .iter()
        .map(|(name, input)| (name.clone(), input.zeros_like()))
        .collect();

    let empty: BTreeMap<String, Vec<Vec<f64>>> =
        inputs.keys().map(|name| (name.clone(), Vec::new())).collect();
    let mut columns = vec![empty; graph.roots().len()];
    let mut values = None;

    for (name, input) in inputs {
        for component in 0..input.len() {
            let mut seeds = zeros.clone();
            seeds.insert(name.clone(), one_hot(input, component));

            trace!("forward pass seeded on {name}[{component}]");
            forward_pass(&mut ctx, inputs, &seeds)?;

            for (r, &root) in graph.roots().iter().enumerate() {
                let tangent = ctx.value(root)?.dual_part();
                columns[r].entry(name.clone()).or_default().push(tangent);
            }
            if values.is_none() {
                values = Some(root_values(&ctx)?);
            }
        }
    }

    // No input components to seed: one unseeded pass for the value.
    let values = match values {
        Some(values) => values,
        None => {
            forward_pass(&mut ctx, inputs, &zeros)?;
            root_values(&ctx)?
        }
    };

    Ok(values
        .into_iter()
        .zip(columns)
        .map(|(value, columns)| Evaluation {
            value,
            derivatives: Derivatives::Jacobian(columns),
        })
        .collect())
}

fn gradients(graph: &Graph, inputs: &BTreeMap<String, Value>) -> Result<Vec<Evaluation>> {
    let mut ctx = ReverseContext::new(graph);
    ctx.propagate(|name| Ok(Numeric::from(binding(inputs, name)?.clone())))?;

    graph
        .roots()
        .iter()
        .map(|&root| {
            let gradient = ctx.backward(root)?;
            Ok(Evaluation {
                value: ctx.value(root)?.real_part(),
                derivatives: Derivatives::Gradient(gradient),
            })
        })
        .collect()
}

/// Evaluate every root of `graph` against shared inputs
pub(crate) fn evaluate_graph(
    graph: &Graph,
    inputs: &Bindings,
    seed: Option<&Bindings>,
) -> Result<Vec<Evaluation>> {
    let inputs = inputs.resolve(&graph.leaf_names());
    debug!(
        "evaluating {} mode graph ({} nodes) on {} inputs, seeded: {}",
        graph.mode(),
        graph.len(),
        inputs.len(),
        seed.is_some()
    );

    match graph.mode() {
        Mode::Forward => match seed {
            Some(seed) => directional(graph, &inputs, &seed.resolve_seed(&inputs)),
            None => jacobian(graph, &inputs),
        },
        Mode::Reverse => {
            if seed.is_some() {
                warn!("seed ignored in reverse mode");
            }
            gradients(graph, &inputs)
        }
    }
}

fn root_of(graph: &Graph) -> Result<usize> {
    graph
        .roots()
        .first()
        .copied()
        .ok_or_else(|| Error::Internal("graph has no root".into()))
}

impl Expression {
    /// Evaluate and differentiate
    ///
    /// `inputs` is a scalar or vector applied to every variable, or a
    /// mapping from variable name to value. In forward mode, a `seed` gives
    /// the derivative along that direction; without one the full Jacobian
    /// is assembled from one pass per input component. In reverse mode the
    /// seed is ignored and the gradient of the output is returned.
    ///
    /// # Example
    ///
    /// ```
    /// use adgraph::prelude::*;
    ///
    /// let [a, b, c, d]: [Expression; 4] = Expression::vars(["a", "b", "c", "d"], Mode::Forward)
    ///     .try_into()
    ///     .unwrap();
    /// let f = &a * &b + &c - &d;
    ///
    /// let out = f.call([("a", 1), ("b", 2), ("c", 3), ("d", 4)], None).unwrap();
    /// assert_eq!(out.value, vec![1.0]);
    /// assert_eq!(out.derivative("a"), Some(vec![2.0]));
    /// assert_eq!(out.derivative("d"), Some(vec![-1.0]));
    /// ```
    pub fn call(&self, inputs: impl Into<Bindings>, seed: Option<Bindings>) -> Result<Evaluation> {
        let graph = self.graph()?;
        evaluate_graph(graph, &inputs.into(), seed.as_ref())?
            .into_iter()
            .next()
            .ok_or_else(|| Error::Internal("evaluation produced no output".into()))
    }

    /// [`Expression::call`] without a seed
    pub fn evaluate(&self, inputs: impl Into<Bindings>) -> Result<Evaluation> {
        self.call(inputs, None)
    }

    /// [`Expression::call`] with a seed
    pub fn evaluate_with_seed(
        &self,
        inputs: impl Into<Bindings>,
        seed: impl Into<Bindings>,
    ) -> Result<Evaluation> {
        self.call(inputs, Some(seed.into()))
    }

    /// Single dual-number pass, returning the raw dual result
    ///
    /// Fails with [`Error::MissingSeed`] when `seed` is `None`.
    pub fn forward(&self, inputs: impl Into<Bindings>, seed: Option<Bindings>) -> Result<Numeric> {
        let seed = seed.ok_or(Error::MissingSeed)?;
        let graph = self.graph()?;
        let inputs = inputs.into().resolve(&graph.leaf_names());
        let seeds = seed.resolve_seed(&inputs);

        let mut ctx = ForwardContext::new(graph);
        forward_pass(&mut ctx, &inputs, &seeds)?;
        ctx.value(root_of(graph)?).cloned()
    }

    /// Single plain-value pass, returning the raw output
    pub fn propagate(&self, inputs: impl Into<Bindings>) -> Result<Numeric> {
        let graph = self.graph()?;
        let inputs = inputs.into().resolve(&graph.leaf_names());

        let mut ctx = ForwardContext::new(graph);
        ctx.evaluate(|name| Ok(Numeric::from(binding(&inputs, name)?.clone())))?;
        ctx.value(root_of(graph)?).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dual::DualNumber;

    #[test]
    fn test_resolve_uniform_and_named() {
        let names: BTreeSet<String> = ["a", "b"].iter().map(|s| s.to_string()).collect();

        let uniform = Bindings::from(2.0).resolve(&names);
        assert_eq!(uniform["a"], Value::Scalar(2.0));
        assert_eq!(uniform["b"], Value::Scalar(2.0));

        let named = Bindings::from([("a", 1.0), ("z", 9.0)]).resolve(&names);
        assert_eq!(named.len(), 3);
        assert_eq!(named["b"], Value::Scalar(0.0));
        assert_eq!(named["z"], Value::Scalar(9.0));
    }

    #[test]
    fn test_integer_inputs_of_any_width() {
        assert_eq!(Bindings::from(3_i64), Bindings::from(3.0));
        assert_eq!(Bindings::from(3_u32), Bindings::from(3.0));
        assert_eq!(Bindings::from(3_usize), Bindings::from(3.0));
        assert_eq!(Value::from(-2_i8), Value::Scalar(-2.0));

        let x = Expression::variable("x", Mode::Reverse);
        let out = (&x * &x).evaluate(3_i64).unwrap();
        assert_eq!(out.value, vec![9.0]);
        assert_eq!(out.derivative("x"), Some(vec![6.0]));

        let named = (&x + 1.0).evaluate([("x", 4_u64)]).unwrap();
        assert_eq!(named.value, vec![5.0]);
    }

    #[test]
    fn test_missing_seed_defaults_to_zeros() {
        let inputs: BTreeMap<String, Value> = [
            ("a".to_string(), Value::Scalar(1.0)),
            ("v".to_string(), Value::from([1.0, 2.0])),
        ]
        .into_iter()
        .collect();
        let seeds = Bindings::new().with("a", 1.0).resolve_seed(&inputs);
        assert_eq!(seeds["a"], Value::Scalar(1.0));
        assert_eq!(seeds["v"], Value::from([0.0, 0.0]));
    }

    #[test]
    fn test_one_hot() {
        assert_eq!(one_hot(&Value::from([5.0, 6.0, 7.0]), 1), Value::from([0.0, 1.0, 0.0]));
        assert_eq!(one_hot(&Value::Scalar(5.0), 0), Value::Scalar(1.0));
    }

    #[test]
    fn test_forward_requires_seed() {
        let x = Expression::variable("x", Mode::Forward);
        assert_eq!(x.forward(1.0, None), Err(Error::MissingSeed));

        let d = (&x * 3.0).forward(2.0, Some(Bindings::from(1.0))).unwrap();
        assert_eq!(d, Numeric::Dual(DualNumber::new(6.0, 3.0)));
    }

    #[test]
    fn test_propagate_plain_value() {
        let x = Expression::variable("x", Mode::Reverse);
        let v = (&x - 1.0).propagate([("x", 4.0)]).unwrap();
        assert_eq!(v, Numeric::Scalar(3.0));
    }

    #[test]
    fn test_derivative_flattening() {
        let eval = Evaluation {
            value: vec![0.0],
            derivatives: Derivatives::Jacobian(
                [("a".to_string(), vec![vec![1.0], vec![2.0]])]
                    .into_iter()
                    .collect(),
            ),
        };
        assert_eq!(eval.derivative("a"), Some(vec![1.0, 2.0]));
        assert_eq!(eval.derivative("b"), None);
        assert!(eval.derivatives.gradient().is_none());
    }
}
