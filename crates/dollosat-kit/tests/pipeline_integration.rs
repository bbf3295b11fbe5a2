//! End-to-end tests: compile, build or find an assignment, decode.

use dollosat_format::SampleLine;
use dollosat_kit::witness;
use dollosat_kit::*;

/// 4x4 observation with two false positives and one false negative.
fn noisy_instance() -> Instance {
    let matrix = BitMatrix::from_rows(&[
        [1u8, 1, 0, 0],
        [1, 1, 0, 1],
        [0, 0, 0, 1],
        [0, 1, 1, 1],
    ])
    .unwrap();
    Instance::with_all_losses(matrix, 2, 2).unwrap()
}

fn expected_clustered() -> StateMatrix {
    StateMatrix::from_digits(&[[1u8, 2], [0, 1]]).unwrap()
}

fn noisy_witness(encoding: &Encoding, instance: &Instance) -> Assignment {
    let corrected = witness::expand(&expected_clustered(), &[0, 0, 1, 1], &[0, 0, 1, 1]);
    witness::build(&encoding.map, instance.matrix(), &corrected, &[0, 0, 1, 1], &[0, 0, 1, 1]).unwrap()
}

fn bit_string(assignment: &Assignment) -> String {
    assignment
        .to_literals()
        .iter()
        .map(|&l| if l > 0 { '1' } else { '0' })
        .collect()
}

/// The hand-built witness satisfies every clause and decodes to the 2x2 matrix.
#[test]
fn test_round_trip_4x4() {
    let instance = noisy_instance();
    let encoding = encode(&instance, &EncoderConfig::default()).unwrap();
    let assignment = noisy_witness(&encoding, &instance);

    let map = &encoding.map;
    assert_eq!(assignment.value(map.false_positive(1, 3)), Some(true));
    assert_eq!(assignment.value(map.false_positive(3, 1)), Some(true));
    assert_eq!(assignment.value(map.false_negative(2, 2)), Some(true));
    assert_eq!(assignment.value(map.is_two(0, 2)), Some(true));
    assert_eq!(assignment.value(map.row_assign(2, 1)), Some(true));
    assert_eq!(assignment.value(map.col_pair_equal(0, 1, 3)), Some(true));

    assert_eq!(encoding.formula.evaluate(&assignment), None);

    let decoded = Decoder::new(map, instance.matrix())
        .unwrap()
        .with_allowed_losses(instance.allowed_losses())
        .unwrap()
        .decode(&assignment)
        .unwrap();
    assert_eq!(decoded.matrix, expected_clustered());
    assert_eq!(decoded.row_clusters, vec![0, 0, 1, 1]);
    assert_eq!(decoded.col_clusters, vec![0, 0, 1, 1]);
    assert_eq!(decoded.false_positives, 2);
    assert_eq!(decoded.false_negatives, 1);
    assert_eq!(decoded.corrected.count(CellState::Lost), 4);
}

/// The witness survives both sampler framings.
#[test]
fn test_sampler_lines_decode() {
    let instance = noisy_instance();
    let encoding = encode(&instance, &EncoderConfig::default()).unwrap();
    let assignment = noisy_witness(&encoding, &instance);

    let unigen = SampleLine::parse(1, &format!("v{assignment}:3")).unwrap().unwrap();
    let quick = SampleLine::parse(2, &format!("2: {}", bit_string(&assignment))).unwrap().unwrap();
    assert_eq!(unigen.multiplicity, 3);
    assert_eq!(quick.multiplicity, 2);

    let decoder = Decoder::new(&encoding.map, instance.matrix()).unwrap();
    for sample in [unigen, quick] {
        assert_eq!(decoder.decode_sample(&sample).unwrap().matrix, expected_clustered());
    }
}

/// Failures are per sample and results keep input order.
#[test]
fn test_decode_all_isolates_failures() {
    let instance = noisy_instance();
    let encoding = encode(&instance, &EncoderConfig::default()).unwrap();
    let good = noisy_witness(&encoding, &instance);

    let mut split = good.clone();
    split.set(encoding.map.row_assign(0, 1), true);

    let beyond = format!("1 {} 0", encoding.map.num_vars() + 1);

    let samples = vec![
        SampleLine::parse(1, &good.to_string()).unwrap().unwrap(),
        SampleLine::parse(2, &split.to_string()).unwrap().unwrap(),
        SampleLine::parse(3, &beyond).unwrap().unwrap(),
        SampleLine::parse(4, &good.to_string()).unwrap().unwrap(),
    ];
    let results = Decoder::new(&encoding.map, instance.matrix())
        .unwrap()
        .decode_all(&samples);

    assert_eq!(results.len(), 4);
    assert!(results[0].is_ok());
    assert!(matches!(results[1], Err(Error::InconsistentAssignment(_))));
    assert!(matches!(results[2], Err(Error::AllocatorMappingMismatch(_))));
    assert_eq!(results[3].as_ref().unwrap().matrix, expected_clustered());
}

/// A single row cluster holds the unanimous corrected row.
#[test]
fn test_single_row_cluster() {
    let matrix = BitMatrix::from_rows(&[[1u8, 0, 1], [1, 0, 1], [1, 1, 1]]).unwrap();
    let instance = Instance::with_all_losses(matrix.clone(), 1, 3).unwrap();
    let encoding = encode(&instance, &EncoderConfig::default()).unwrap();

    let at_least_one = encoding.formula.group(ClauseFamily::AtLeastOne).unwrap();
    assert!(at_least_one.clauses[..3].iter().all(|c| c.len() == 1));

    let clustered = StateMatrix::from_digits(&[[1u8, 0, 1]]).unwrap();
    let corrected = witness::expand(&clustered, &[0, 0, 0], &[0, 1, 2]);
    let assignment = witness::build(&encoding.map, &matrix, &corrected, &[0, 0, 0], &[0, 1, 2]).unwrap();
    assert_eq!(encoding.formula.evaluate(&assignment), None);

    let decoded = Decoder::new(&encoding.map, &matrix).unwrap().decode(&assignment).unwrap();
    assert_eq!(decoded.matrix, clustered);
    assert_eq!(decoded.false_positives, 1);

    // Each entry is the majority of its observed column.
    for j in 0..3 {
        let ones = (0..3).filter(|&i| matrix.get(i, j)).count();
        let majority = if ones * 2 > 3 { CellState::Present } else { CellState::Absent };
        assert_eq!(decoded.matrix.get(0, j), majority);
    }
}

/// A single column cluster holds the unanimous corrected column.
#[test]
fn test_single_column_cluster() {
    let matrix = BitMatrix::from_rows(&[[1u8, 1], [0, 0], [1, 0]]).unwrap();
    let instance = Instance::with_all_losses(matrix.clone(), 3, 1).unwrap();
    let encoding = encode(&instance, &EncoderConfig::default()).unwrap();

    let clustered = StateMatrix::from_digits(&[[1u8], [0], [1]]).unwrap();
    let corrected = witness::expand(&clustered, &[0, 1, 2], &[0, 0]);
    let assignment = witness::build(&encoding.map, &matrix, &corrected, &[0, 1, 2], &[0, 0]).unwrap();
    assert_eq!(encoding.formula.evaluate(&assignment), None);

    let decoded = Decoder::new(&encoding.map, &matrix).unwrap().decode(&assignment).unwrap();
    assert_eq!(decoded.matrix, clustered);
    assert_eq!(decoded.col_clusters, vec![0, 0]);
    assert_eq!(decoded.false_negatives, 1);
}

/// A reconstruction that needs two losses of one character is rejected.
#[test]
fn test_non_dollo_witness_falsifies_conflict_clause() {
    let matrix = BitMatrix::from_rows(&[[1u8, 0], [0, 1], [1, 1]]).unwrap();
    let instance = Instance::with_all_losses(matrix.clone(), 3, 2).unwrap();
    let encoding = encode(&instance, &EncoderConfig::default()).unwrap();

    let corrected = StateMatrix::from_digits(&[[1u8, 0], [0, 1], [1, 1]]).unwrap();
    let assignment = witness::build(&encoding.map, &matrix, &corrected, &[0, 1, 2], &[0, 1]).unwrap();
    let falsified = encoding.formula.evaluate(&assignment).unwrap();
    assert_eq!(falsified.family, ClauseFamily::DolloConflict);

    let relaxed = encode(&instance, &EncoderConfig { phylogeny: false }).unwrap();
    assert_eq!(relaxed.formula.evaluate(&assignment), None);
}

/// With no loss-capable column every loss variable is pinned false.
#[test]
fn test_empty_allowed_losses() {
    let matrix = BitMatrix::from_rows(&[[1u8, 0, 1], [0, 1, 1], [1, 1, 0]]).unwrap();
    let instance = Instance::new(matrix, 2, 2, AllowedLosses::none(3)).unwrap();
    let encoding = encode(&instance, &EncoderConfig::default()).unwrap();
    let map = &encoding.map;

    let forbidden = encoding.formula.group(ClauseFamily::ForbiddenState).unwrap();
    for i in 0..3 {
        for j in 0..3 {
            let unit = vec![-(map.is_two(i, j).id() as i64)];
            assert!(forbidden.clauses.contains(&unit));
        }
    }

    // Only the acquired-against-acquired pattern survives: 3 column pairs, 6 row triples.
    let dollo = encoding.formula.group(ClauseFamily::DolloConflict).unwrap();
    assert_eq!(dollo.len(), 3 * 6);
    let lost_vars = map.range(Category::IsTwo);
    assert!(dollo
        .clauses
        .iter()
        .flatten()
        .all(|&lit| !lost_vars.contains(lit.unsigned_abs())));
}

/// The pre-check finds a model for a clusterable matrix and it decodes cleanly.
#[test]
fn test_precheck_then_decode() {
    let matrix = BitMatrix::from_rows(&[
        [1u8, 1, 0, 0],
        [1, 1, 0, 0],
        [0, 0, 1, 1],
        [0, 0, 1, 1],
    ])
    .unwrap();
    let instance = Instance::with_all_losses(matrix, 2, 2).unwrap();
    let encoding = encode(&instance, &EncoderConfig::default()).unwrap();

    let SatResult::Sat(model) = encoding.formula.precheck(&CheckConfig::default()) else {
        panic!("expected a model");
    };
    let assignment = Assignment::from_model(&model);
    assert_eq!(encoding.formula.evaluate(&assignment), None);

    let decoded = Decoder::new(&encoding.map, instance.matrix())
        .unwrap()
        .decode(&assignment)
        .unwrap();
    assert_eq!(decoded.false_positives + decoded.false_negatives, 0);
    assert_eq!(decoded.matrix.count(CellState::Present), 2);
    assert_eq!(decoded.matrix.count(CellState::Absent), 2);
    assert_eq!(decoded.row_clusters[0], decoded.row_clusters[1]);
    assert_ne!(decoded.row_clusters[1], decoded.row_clusters[2]);
}

#[test]
fn test_precheck_budget() {
    let encoding = encode(&noisy_instance(), &EncoderConfig::default()).unwrap();
    let config = CheckConfig {
        max_conflicts: 10,
        max_decisions: 0,
    };
    assert!(matches!(encoding.formula.precheck(&config), SatResult::Unknown(_)));
}

#[test]
fn test_invalid_cluster_counts() {
    let matrix = BitMatrix::from_rows(&[[1u8, 0], [0, 1]]).unwrap();
    assert!(matches!(
        Instance::with_all_losses(matrix.clone(), 3, 1),
        Err(Error::InvalidClusterCount { axis: "row", .. })
    ));
    assert!(matches!(
        Instance::with_all_losses(matrix, 1, 0),
        Err(Error::InvalidClusterCount { axis: "column", .. })
    ));
}

/// A map persisted for one matrix is refused for another.
#[test]
fn test_reloaded_map_checked_against_matrix() {
    let instance = noisy_instance();
    let encoding = encode(&instance, &EncoderConfig::default()).unwrap();
    let json = encoding.map.to_json().unwrap();
    let reloaded = VariableMap::from_json(&json).unwrap();
    assert_eq!(reloaded.to_json().unwrap(), json);

    let other = BitMatrix::from_rows(&[[1u8, 0, 1, 0, 1]]).unwrap();
    assert!(matches!(
        Decoder::new(&reloaded, &other),
        Err(Error::AllocatorMappingMismatch(_))
    ));
}
