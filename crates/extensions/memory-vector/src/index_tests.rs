use super::*;

fn index_with(vectors: &[[f32; 3]]) -> VectorIndex {
    let index = VectorIndex::new(3);
    for v in vectors {
        index.add(v).unwrap();
    }
    index
}

#[test]
fn test_add_assigns_positions_in_order() {
    let index = VectorIndex::new(3);
    assert_eq!(index.add(&[1.0, 0.0, 0.0]).unwrap(), 0);
    assert_eq!(index.add(&[0.0, 1.0, 0.0]).unwrap(), 1);
    assert_eq!(index.len(), 2);
    assert_eq!(index.get(1).unwrap(), vec![0.0, 1.0, 0.0]);
}

#[test]
fn test_add_dimension_mismatch() {
    let index = VectorIndex::new(3);
    let err = index.add(&[1.0, 0.0]).unwrap_err();
    assert!(matches!(
        err,
        RetrievalError::DimensionMismatch {
            expected: 3,
            actual: 2
        }
    ));
    assert!(index.is_empty());
}

#[test]
fn test_search_orders_by_distance() {
    let index = index_with(&[[0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.7, 0.3, 0.0]]);

    let results = index.search(&[1.0, 0.0, 0.0], 3).unwrap();

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].position, 1);
    assert!(results[0].distance.abs() < 1e-6);
    assert_eq!(results[1].position, 2);
    assert_eq!(results[2].position, 0);
    assert!(results[0].distance <= results[1].distance);
    assert!(results[1].distance <= results[2].distance);
}

#[test]
fn test_search_distance_is_squared() {
    let index = index_with(&[[3.0, 4.0, 0.0]]);
    let results = index.search(&[0.0, 0.0, 0.0], 1).unwrap();
    assert!((results[0].distance - 25.0).abs() < 1e-4);
}

#[test]
fn test_search_ties_prefer_lower_position() {
    let index = VectorIndex::new(3);
    for _ in 0..10 {
        index.add(&[1.0, 0.0, 0.0]).unwrap();
    }

    let results = index.search(&[1.0, 0.0, 0.0], 3).unwrap();
    let positions: Vec<usize> = results.iter().map(|r| r.position).collect();
    assert_eq!(positions, vec![0, 1, 2]);
}

#[test]
fn test_search_fewer_than_k() {
    let index = index_with(&[[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
    let results = index.search(&[1.0, 0.0, 0.0], 10).unwrap();
    assert_eq!(results.len(), 2);
}

#[test]
fn test_search_k_zero() {
    let index = index_with(&[[1.0, 0.0, 0.0]]);
    assert!(index.search(&[1.0, 0.0, 0.0], 0).unwrap().is_empty());
}

#[test]
fn test_search_empty_index() {
    let index = VectorIndex::new(3);
    let results = index.search(&[1.0, 0.0, 0.0], 10).unwrap();
    assert!(results.is_empty());
}

#[test]
fn test_search_dimension_mismatch() {
    let index = index_with(&[[1.0, 0.0, 0.0]]);
    assert!(matches!(
        index.search(&[1.0], 1),
        Err(RetrievalError::DimensionMismatch { .. })
    ));
}

#[test]
fn test_search_k_bound_matches_full_sort() {
    let index = VectorIndex::new(3);
    for i in 0..50 {
        let x = ((i * 37) % 50) as f32;
        index.add(&[x, 1.0, 0.0]).unwrap();
    }

    let top = index.search(&[10.0, 1.0, 0.0], 5).unwrap();
    let all = index.search(&[10.0, 1.0, 0.0], 50).unwrap();
    assert_eq!(top.len(), 5);
    assert_eq!(top, all[..5].to_vec());
}

#[test]
fn test_reset_restarts_positions() {
    let index = index_with(&[[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
    index.reset();
    assert!(index.is_empty());
    assert_eq!(index.add(&[0.0, 0.0, 1.0]).unwrap(), 0);
}

#[test]
fn test_truncate() {
    let index = index_with(&[[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]);
    index.truncate(1);
    assert_eq!(index.len(), 1);
    assert!(index.get(1).is_none());
}

#[test]
fn test_get_out_of_range() {
    let index = index_with(&[[1.0, 0.0, 0.0]]);
    assert!(index.get(1).is_none());
    assert!(index.get(usize::MAX).is_none());
}

#[test]
fn test_from_flat() {
    let index = VectorIndex::from_flat(2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
    assert_eq!(index.len(), 2);
    assert_eq!(index.get(1).unwrap(), vec![3.0, 4.0]);
    assert_eq!(index.to_flat(), vec![1.0, 2.0, 3.0, 4.0]);

    assert!(matches!(
        VectorIndex::from_flat(2, vec![1.0, 2.0, 3.0]),
        Err(RetrievalError::CorruptIndex(_))
    ));
}

#[test]
fn test_search_hit_debug() {
    let hit = SearchHit {
        position: 4,
        distance: 0.25,
    };
    let debug = format!("{:?}", hit);
    assert!(debug.contains("SearchHit"));
    assert!(debug.contains("4"));
}
