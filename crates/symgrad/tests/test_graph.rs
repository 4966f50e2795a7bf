//! Integration tests for graph construction, evaluation and duplication.

use std::collections::HashMap;

use approx::assert_relative_eq;
use symgrad::graph::shape::output_shape;
use symgrad::{Graph, GraphError, Tensor, TensorError, Variable};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn tensor(data: &[f64], shape: &[usize]) -> Tensor {
    Tensor::from_vec(data.to_vec(), shape).unwrap()
}

#[test]
fn test_shape_inference_is_left_biased() {
    init_logger();
    let mut g = Graph::new();
    let s = g.var("s", &[1]).unwrap();
    let m = g.var("m", &[2, 3]).unwrap();

    let left = g.add(&s, &m).unwrap();
    let right = g.add(&m, &s).unwrap();
    assert_eq!(g.shape(&left).unwrap(), vec![2, 3]);
    assert_eq!(g.shape(&right).unwrap(), vec![2, 3]);

    // The rule itself only looks at the left operand.
    assert_eq!(output_shape(Some(&[1]), &[2, 3]), vec![2, 3]);
    assert_eq!(output_shape(Some(&[2, 3]), &[1]), vec![2, 3]);
    assert_eq!(output_shape(Some(&[1, 1]), &[1]), vec![1]);
    assert_eq!(output_shape(Some(&[1]), &[1, 1]), vec![1, 1]);
}

#[test]
fn test_arithmetic_matches_elementwise() {
    init_logger();
    let xs = [1.5, -2.0, 4.0, 0.25];
    let ys = [0.5, 3.0, -8.0, 2.0];
    let mut g = Graph::new();
    let x = g.var_with_value("x", tensor(&xs, &[2, 2])).unwrap();
    let y = g.var_with_value("y", tensor(&ys, &[2, 2])).unwrap();

    type Builder = fn(&mut Graph, &Variable, &Variable) -> Result<Variable, GraphError>;
    let cases: [(Builder, fn(f64, f64) -> f64); 6] = [
        (Graph::add, |a, b| a + b),
        (Graph::sub, |a, b| a - b),
        (Graph::mul, |a, b| a * b),
        (Graph::div, |a, b| a / b),
        (Graph::rsub, |a, b| b - a),
        (Graph::rdiv, |a, b| b / a),
    ];
    for (build, expected) in cases {
        let z = build(&mut g, &x, &y).unwrap();
        let out = g.eval(&z).unwrap();
        assert_eq!(out.shape(), &[2, 2]);
        for ((&got, &a), &b) in out.data().iter().zip(&xs).zip(&ys) {
            assert_relative_eq!(got, expected(a, b));
        }
    }
}

#[test]
fn test_scalar_and_in_place_variants_agree() {
    let mut g = Graph::new();
    let x = g.var_with_value("x", tensor(&[1.0, 2.0, 4.0], &[3])).unwrap();
    let pairs = [
        (g.add_scalar(&x, 2.0).unwrap(), g.addi_scalar(&x, 2.0).unwrap()),
        (g.sub_scalar(&x, 2.0).unwrap(), g.subi_scalar(&x, 2.0).unwrap()),
        (g.mul_scalar(&x, 2.0).unwrap(), g.muli_scalar(&x, 2.0).unwrap()),
        (g.div_scalar(&x, 2.0).unwrap(), g.divi_scalar(&x, 2.0).unwrap()),
        (g.rsub_scalar(&x, 2.0).unwrap(), g.rsubi_scalar(&x, 2.0).unwrap()),
        (g.rdiv_scalar(&x, 2.0).unwrap(), g.rdivi_scalar(&x, 2.0).unwrap()),
    ];
    for (plain, in_place) in &pairs {
        assert_eq!(g.eval(plain).unwrap(), g.eval(in_place).unwrap());
    }
    let rdiv = g.eval(&pairs[5].0).unwrap();
    assert_eq!(rdiv.data(), &[2.0, 1.0, 0.5]);
}

#[test]
fn test_division_by_zero_tensor() {
    let mut g = Graph::new();
    let x = g.var_with_value("x", tensor(&[1.0, 2.0], &[2])).unwrap();
    let zero = g.var_with_value("zero", Tensor::zeros(&[2])).unwrap();
    let q = g.div(&x, &zero).unwrap();
    assert_eq!(
        g.eval(&q),
        Err(GraphError::Tensor(TensorError::DivisionByZero { index: 0 }))
    );
}

#[test]
fn test_eval_is_idempotent() {
    let mut g = Graph::new();
    let x = g.var_with_value("x", tensor(&[0.1, 0.7, -1.3], &[3])).unwrap();
    let a = g.tanh(&x).unwrap();
    let b = g.exp(&a).unwrap();
    let c = g.muli(&b, &x).unwrap();

    let first = g.eval(&c).unwrap();
    let second = g.eval(&c).unwrap();
    let bits = |t: &Tensor| t.data().iter().map(|v| v.to_bits()).collect::<Vec<_>>();
    assert_eq!(bits(&first), bits(&second));

    // Memoized evaluation agrees with staged evaluation.
    let live = g.evaluate(&c).unwrap();
    assert_eq!(bits(&live), bits(&first));
    assert_eq!(bits(&g.evaluate(&c).unwrap()), bits(&first));
}

#[test]
fn test_duplicate_isolates_mutable_state() {
    init_logger();
    let mut g = Graph::new();
    let x = g.var_with_value("x", Tensor::scalar(0.5)).unwrap();
    let y = g.sin(&x).unwrap();
    let nodes = g.len();

    let mut dup = g.duplicate();
    assert_eq!(dup.len(), nodes);
    dup.evaluate(&y).unwrap();
    dup.differentiate(&y).unwrap();
    dup.assign(&x, Tensor::scalar(1.0)).unwrap();

    assert_eq!(g.len(), nodes);
    assert!(g.cached_value(&y).is_none());
    assert!(g.nodes().iter().all(|node| node.gradient().is_none()));
    assert_eq!(g.materialized(&x), Some(&Tensor::scalar(0.5)));
    assert!(dup.len() > nodes);
}

#[test]
fn test_duplicate_copies_memoized_state() {
    let mut g = Graph::new();
    let x = g.var_with_value("x", Tensor::scalar(2.0)).unwrap();
    let y = g.square(&x).unwrap();
    g.evaluate(&y).unwrap();

    let mut dup = g.duplicate();
    assert_eq!(dup.cached_value(&y), Some(&Tensor::scalar(4.0)));
    dup.clear_cache();
    assert!(dup.cached_value(&y).is_none());
    assert_eq!(g.cached_value(&y), Some(&Tensor::scalar(4.0)));
}

#[test]
fn test_shape_mismatch_registers_no_node() {
    let mut g = Graph::new();
    let a = g.var("a", &[2, 3]).unwrap();
    let b = g.var("b", &[4, 5]).unwrap();
    let nodes = g.len();

    assert_eq!(
        g.add(&a, &b),
        Err(GraphError::ShapeMismatch {
            lhs: vec![2, 3],
            rhs: vec![4, 5]
        })
    );
    assert_eq!(g.len(), nodes);
    assert!(g.variable("add(a,b)").is_none());
}

#[test]
fn test_deferred_mismatch_surfaces_at_evaluation() {
    let mut g = Graph::new();
    let p = g.placeholder("p").unwrap();
    let m = g.var("m", &[2, 3]).unwrap();
    let sum = g.add(&p, &m).unwrap();

    g.assign(&p, Tensor::zeros(&[4])).unwrap();
    assert!(matches!(g.shape(&sum), Err(GraphError::ShapeMismatch { .. })));
    assert!(matches!(
        g.eval(&sum),
        Err(GraphError::Tensor(TensorError::BroadcastMismatch { .. }))
    ));
}

#[test]
fn test_function_staging_on_duplicate() {
    let mut g = Graph::new();
    let x = g.var_with_value("x", tensor(&[1.0, 2.0, 3.0], &[3])).unwrap();
    let w = g.var_with_value("w", tensor(&[3.0, 2.0, 1.0], &[3])).unwrap();
    g.define_function("dot", move |g, _| {
        let prod = g.mul(&x, &w)?;
        g.sum(&prod)
    });
    let nodes = g.len();

    let mut staged = g.duplicate();
    let out = g.invoke_function_on("dot", &mut staged).unwrap();
    assert_eq!(staged.evaluate(&out).unwrap().data(), &[10.0]);
    assert_eq!(g.len(), nodes);
}

#[test]
fn test_builder_receives_bindings() {
    let mut g = Graph::new();
    g.var_with_value("bias", Tensor::scalar(0.5)).unwrap();
    let seen: HashMap<String, Tensor> = HashMap::from([("bias".to_string(), Tensor::scalar(0.5))]);
    g.define_function("check", move |g, inputs| {
        assert_eq!(inputs, &seen);
        let bias = g
            .variable("bias")
            .ok_or_else(|| GraphError::UnknownVariable("bias".to_string()))?;
        g.neg(&bias)
    });
    let out = g.invoke_function("check").unwrap();
    assert_eq!(g.eval(&out).unwrap().data(), &[-0.5]);
}

#[test]
fn test_comparison_masks() {
    let mut g = Graph::new();
    let x = g.var_with_value("x", tensor(&[-1.0, 0.0, 2.0], &[3])).unwrap();
    let ne = g.scalar_not_equals(&x, 0.0).unwrap();
    let le = g.scalar_less_than_or_equal(&x, 0.0).unwrap();
    assert_eq!(g.eval(&ne).unwrap().data(), &[1.0, 0.0, 1.0]);
    assert_eq!(g.eval(&le).unwrap().data(), &[1.0, 1.0, 0.0]);
}

#[test]
fn test_matrix_pipeline() {
    let mut g = Graph::new();
    let a = g
        .var_with_value("a", tensor(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]))
        .unwrap();
    let at = g.transpose(&a).unwrap();
    let gram = g.mmul(&a, &at).unwrap();
    let out = g.eval(&gram).unwrap();
    assert_eq!(out.shape(), &[2, 2]);
    // column-major [[35, 44], [44, 56]]
    assert_eq!(out.data(), &[35.0, 44.0, 44.0, 56.0]);
}

#[test]
fn test_deep_chain_builds_and_evaluates() {
    init_logger();
    let depth = 10_000;
    let mut g = Graph::new();
    let x = g.var_with_value("x", Tensor::scalar(0.5)).unwrap();
    let mut cur = x.clone();
    for _ in 0..depth {
        cur = g.sin(&cur).unwrap();
    }
    assert_eq!(g.len(), depth + 1);
    assert_eq!(g.shape(&cur).unwrap(), vec![1]);
    assert!(cur.name().len() < 16);

    let mut expected = 0.5_f64;
    let mut slope = 1.0_f64;
    for _ in 0..depth {
        slope *= expected.cos();
        expected = expected.sin();
    }
    assert_relative_eq!(g.eval(&cur).unwrap().item().unwrap(), expected);

    g.differentiate(&cur).unwrap();
    let dx = g.gradient(&x).unwrap().unwrap();
    assert_relative_eq!(
        g.eval(&dx).unwrap().item().unwrap(),
        slope,
        max_relative = 1e-9
    );
}

#[test]
fn test_deep_chain_over_placeholder() {
    let depth = 2_000;
    let mut g = Graph::new();
    let p = g.placeholder("p").unwrap();
    let mut cur = p.clone();
    for _ in 0..depth {
        cur = g.add_scalar(&cur, 1.0).unwrap();
    }
    assert!(matches!(g.shape(&cur), Err(GraphError::UnresolvedShape { .. })));

    g.assign(&p, tensor(&[0.0, 1.0], &[2])).unwrap();
    assert_eq!(g.shape(&cur).unwrap(), vec![2]);
    assert_eq!(g.eval(&cur).unwrap().data(), &[2_000.0, 2_001.0]);
}

#[test]
fn test_named_results_are_stable_lookup_keys() {
    let mut g = Graph::new();
    let x = g.var_with_value("x", tensor(&[1.0, 2.0], &[2])).unwrap();
    let w = g.var_with_value("w", tensor(&[3.0, 4.0], &[2])).unwrap();
    let prod = g.mul(&x, &w).unwrap();
    g.rename(&prod, "prod").unwrap();
    g.define_function("loss", |g, _| {
        let prod = g
            .variable("prod")
            .ok_or_else(|| GraphError::UnknownVariable("prod".to_string()))?;
        g.apply_op_named("loss", symgrad::Op::Sum, &[&prod])
    });

    let loss = g.invoke_function("loss").unwrap();
    assert_eq!(loss.name(), "loss");
    assert_eq!(g.eval(&loss).unwrap().data(), &[11.0]);

    g.differentiate(&loss).unwrap();
    let dprod = g.get_gradient("prod").unwrap().unwrap();
    assert_eq!(dprod.name(), "prod-grad");
    assert_eq!(g.eval(&dprod).unwrap().data(), &[1.0, 1.0]);

    let renamed = g.rename(&dprod, "dprod").unwrap();
    assert_eq!(g.get_gradient("prod").unwrap(), Some(renamed));
    assert_eq!(
        g.invoke_function("loss"),
        Err(GraphError::DuplicateVariable("loss".to_string()))
    );
}
