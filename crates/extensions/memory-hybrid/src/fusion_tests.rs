use super::*;

fn list(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_rrf_fusion_basic() {
    let vector = list(&["a", "b", "c"]);
    let keyword = list(&["b", "a", "d"]);

    let results = rrf_fusion(&vector, &keyword, &FusionConfig::default());
    assert_eq!(results.len(), 4);

    let a_pos = results.iter().position(|(id, _)| id == "a").unwrap();
    let d_pos = results.iter().position(|(id, _)| id == "d").unwrap();
    assert!(a_pos < d_pos);
}

#[test]
fn test_rrf_fusion_empty_lists() {
    let config = FusionConfig::default();

    assert!(rrf_fusion(&[], &[], &config).is_empty());
    assert_eq!(rrf_fusion(&list(&["a"]), &[], &config).len(), 1);
    assert_eq!(rrf_fusion(&[], &list(&["a"]), &config).len(), 1);
}

#[test]
fn test_rrf_fusion_weights() {
    let vector = list(&["a"]);
    let keyword = list(&["b"]);

    let results = rrf_fusion(&vector, &keyword, &FusionConfig::favor_semantic());
    assert_eq!(results[0].0, "a");
    assert!(results[0].1 > results[1].1);

    let results = rrf_fusion(&vector, &keyword, &FusionConfig::favor_keyword());
    assert_eq!(results[0].0, "b");
}

#[test]
fn test_rrf_score_values() {
    let results = rrf_fusion(&list(&["a"]), &list(&["a"]), &FusionConfig::default());
    assert_eq!(results.len(), 1);
    let expected = 0.5 / 61.0 + 0.5 / 61.0;
    assert!((results[0].1 - expected).abs() < 1e-6);
}

#[test]
fn test_rrf_ties_keep_vector_order_first() {
    let results = rrf_fusion(&list(&["x", "y"]), &list(&["z"]), &FusionConfig::default());
    let order: Vec<_> = results.iter().map(|(id, _)| id.as_str()).collect();
    // "x" and "z" tie at rank 1 in their lists.
    assert_eq!(order, vec!["x", "z", "y"]);
}

#[test]
fn test_rrf_produces_sorted_results() {
    let vector = list(&["a", "b", "c"]);
    let keyword = list(&["d", "e", "f"]);

    let results = rrf_fusion(&vector, &keyword, &FusionConfig::favor_semantic());
    for i in 1..results.len() {
        assert!(results[i - 1].1 >= results[i].1);
    }
}

#[test]
fn test_fusion_config_default() {
    let config = FusionConfig::default();
    assert!((config.alpha - 0.5).abs() < 0.01);
    assert!((config.k - 60.0).abs() < 0.01);
}

#[test]
fn test_with_alpha_clamps() {
    assert_eq!(FusionConfig::with_alpha(1.5).alpha, 1.0);
    assert_eq!(FusionConfig::with_alpha(-0.2).alpha, 0.0);
    assert!((FusionConfig::favor_semantic().alpha - 0.7).abs() < 0.01);
}
