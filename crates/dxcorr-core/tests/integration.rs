//! Integration tests for dxcorr-core.
//!
//! These tests run the full pipeline:
//! matrix → pair selection → real diagram → surrogates → p-value diagram.

use dxcorr_core::{
    AnalysisConfig, DiagramKind, DxcError, Execution, PairAnalysis, SeedSchedule,
    SurrogateConfig, SurrogateContext, WindowGeometry, analyze, compute_diagram, generate,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use statrs::statistics::Statistics;

fn white_noise(n: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n).map(|_| rng.random::<f64>() * 2.0 - 1.0).collect()
}

fn config(geometry: WindowGeometry, surrogates: usize, execution: Execution) -> AnalysisConfig {
    AnalysisConfig {
        surrogates,
        execution,
        seeds: SeedSchedule::new(20190401),
        ..AnalysisConfig::new(geometry)
    }
}

#[test]
fn diagram_rows_share_one_width() {
    let a = white_noise(377, 1);
    let b = white_noise(377, 2);
    for (l, w, tau) in [(10, 3, 0), (8, 5, 2), (20, 1, 0), (6, 6, 4)] {
        let g = WindowGeometry::new(l, w, tau).unwrap();
        let d = compute_diagram(&a, &b, &g).unwrap();
        let expected = (377 - l * w) / l - tau;
        assert_eq!(d.rows(), w);
        assert_eq!(d.cols(), expected, "L={l} W={w} tau={tau}");
        assert!(d.iter_rows().all(|r| r.len() == expected));
    }
}

#[test]
fn identical_sequences_are_fully_correlated() {
    // Length 100, L=10, W=3, tau=0.
    let s = white_noise(100, 3);
    let m = vec![s.clone(), s];
    let g = WindowGeometry::new(10, 3, 0).unwrap();

    let real = analyze(&m, 0, 1, config(g, 20, Execution::Sequential), DiagramKind::Correlation)
        .unwrap();
    assert_eq!(real.shape(), (3, 7));
    for &v in real.values() {
        assert!((v - 1.0).abs() < 1e-9, "cell {v}");
    }

    // No surrogate pair reaches perfect correlation, so every cell is
    // maximally significant.
    let p = analyze(&m, 0, 1, config(g, 20, Execution::Sequential), DiagramKind::PValue).unwrap();
    assert_eq!(p.shape(), (3, 7));
    assert!(p.values().iter().all(|&v| (0.0..=0.05).contains(&v)));
}

#[test]
fn independent_sequences_are_not_flagged() {
    // Length 500, L=20, W=2, tau=0, M=100.
    let a = white_noise(500, 4);
    let b = white_noise(500, 5);
    let g = WindowGeometry::new(20, 2, 0).unwrap();
    let analysis =
        PairAnalysis::new(&a, &b, config(g, 100, Execution::Parallel { threads: None })).unwrap();
    let p = analysis.pvalue_diagram().unwrap();

    assert_eq!(p.shape(), (2, 23));
    assert!(p.values().iter().all(|v| (0.0..=1.0).contains(v)));

    let mean = p.values().mean();
    assert!(mean > 0.3 && mean < 0.8, "mean p-value {mean}");
    let small = p.values().iter().filter(|&&v| v < 0.05).count();
    assert!(small <= p.values().len() / 4, "{small} cells below 0.05");
    assert!(p.values().std_dev() > 0.05);
}

#[test]
fn coupled_sequences_are_flagged() {
    let a = white_noise(400, 6);
    let noise = white_noise(400, 7);
    let b: Vec<f64> = a.iter().zip(&noise).map(|(x, e)| x + 0.3 * e).collect();
    let g = WindowGeometry::new(20, 2, 0).unwrap();
    let p = PairAnalysis::new(&a, &b, config(g, 40, Execution::Sequential))
        .unwrap()
        .pvalue_diagram()
        .unwrap();
    assert!(p.values().mean() < 0.05);
}

#[test]
fn parallel_and_sequential_agree() {
    let a = white_noise(300, 8);
    let b = white_noise(300, 9);
    let g = WindowGeometry::new(10, 4, 1).unwrap();
    let seq = PairAnalysis::new(&a, &b, config(g, 24, Execution::Sequential))
        .unwrap()
        .pvalue_diagram()
        .unwrap();
    let par = PairAnalysis::new(&a, &b, config(g, 24, Execution::Parallel { threads: Some(4) }))
        .unwrap()
        .pvalue_diagram()
        .unwrap();
    assert_eq!(seq, par);
}

#[test]
fn surrogates_keep_distribution_and_vary_with_seed() {
    let x = white_noise(256, 10);
    let ctx = SurrogateContext::new(&x);
    let cfg = SurrogateConfig::default();
    let mut sorted = x.clone();
    sorted.sort_by(f64::total_cmp);

    let s1 = generate(&ctx, &cfg, 1);
    let s2 = generate(&ctx, &cfg, 2);
    assert_ne!(s1, s2);
    for s in [s1, s2] {
        let mut t = s.clone();
        t.sort_by(f64::total_cmp);
        assert_eq!(t, sorted);
    }
}

#[test]
fn odd_base_width_is_corrected_before_computation() {
    let g = WindowGeometry::new(11, 3, 0).unwrap();
    assert_eq!(g.base_width(), 10);
    let s = white_noise(100, 11);
    let d = compute_diagram(&s, &s, &g).unwrap();
    assert_eq!(d.shape(), (3, 7));
}

#[test]
fn validation_fails_before_any_computation() {
    let m = vec![white_noise(50, 12), white_noise(50, 13)];
    let g = WindowGeometry::new(10, 5, 0).unwrap();
    let err = analyze(&m, 0, 1, config(g, 10, Execution::Sequential), DiagramKind::PValue)
        .unwrap_err();
    assert!(matches!(err, DxcError::EmptyDiagram { .. }));

    let g = WindowGeometry::new(10, 2, 0).unwrap();
    let err = analyze(&m, 0, 2, config(g, 10, Execution::Sequential), DiagramKind::PValue)
        .unwrap_err();
    assert!(matches!(err, DxcError::ColumnOutOfRange { index: 2, .. }));
}
