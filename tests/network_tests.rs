use ndarray::Array2;
use stacknet::{
    one_hot, Autoencoder, AutoencoderConfig, ClassifierConfig, Error, FineTuneConfig,
    SoftmaxClassifier, StackedNetwork,
};

fn quick_ae_config() -> AutoencoderConfig {
    AutoencoderConfig {
        max_epochs: 15,
        learning_rate: 0.5,
        l2_weight: 0.001,
        sparsity_weight: 0.5,
        sparsity_target: 0.15,
        scale_inputs: true,
    }
}

fn quick_classifier_config() -> ClassifierConfig {
    ClassifierConfig {
        max_epochs: 40,
        learning_rate: 0.5,
        l2_weight: 1e-4,
    }
}

fn toy_matrix(rows: usize, cols: usize) -> Array2<f32> {
    Array2::from_shape_fn((rows, cols), |(i, j)| ((i * cols + j) % 7) as f32 / 7.0)
}

fn toy_labels(rows: usize, classes: usize) -> Array2<f32> {
    let indices: Vec<usize> = (0..rows).map(|i| i % classes).collect();
    one_hot(classes, &indices)
}

#[test]
fn test_classifier_rejects_mismatched_row_counts() {
    let features = toy_matrix(10, 6);
    let labels = toy_labels(8, 3);
    let result = SoftmaxClassifier::train(&features, &labels, &quick_classifier_config(), 1);
    assert!(matches!(
        result,
        Err(Error::DimensionMismatch {
            expected: 10,
            found: 8
        })
    ));
}

#[test]
fn test_classifier_outputs_probability_rows() {
    let features = toy_matrix(12, 6);
    let labels = toy_labels(12, 3);
    let classifier =
        SoftmaxClassifier::train(&features, &labels, &quick_classifier_config(), 5).unwrap();

    let probs = classifier.predict_proba(&features).unwrap();
    assert_eq!(probs.dim(), (12, 3));
    for row in probs.rows() {
        assert!((row.sum() - 1.0).abs() < 1e-5);
        assert!(row.iter().all(|&p| p >= 0.0));
    }
}

#[test]
fn test_stack_rejects_mismatched_stage_dimensions() {
    let ae1 = Autoencoder::train(&toy_matrix(20, 12), 6, &quick_ae_config(), 1).unwrap();
    // wrong input width: 8 instead of ae1's hidden size 6
    let ae2 = Autoencoder::train(&toy_matrix(20, 8), 4, &quick_ae_config(), 2).unwrap();
    let classifier = SoftmaxClassifier::train(
        &toy_matrix(12, 4),
        &toy_labels(12, 3),
        &quick_classifier_config(),
        3,
    )
    .unwrap();

    let result = StackedNetwork::stack(&[&ae1, &ae2], &classifier);
    assert!(matches!(
        result,
        Err(Error::DimensionMismatch {
            expected: 6,
            found: 8
        })
    ));
}

#[test]
fn test_stack_rejects_mismatched_classifier() {
    let ae = Autoencoder::train(&toy_matrix(20, 12), 6, &quick_ae_config(), 1).unwrap();
    // classifier expects 4-wide features, encoder produces 6
    let classifier = SoftmaxClassifier::train(
        &toy_matrix(12, 4),
        &toy_labels(12, 3),
        &quick_classifier_config(),
        3,
    )
    .unwrap();

    let result = StackedNetwork::stack(&[&ae], &classifier);
    assert!(matches!(
        result,
        Err(Error::DimensionMismatch {
            expected: 6,
            found: 4
        })
    ));
}

#[test]
fn test_composed_output_width_equals_class_count() {
    let inputs = toy_matrix(20, 12);
    let ae1 = Autoencoder::train(&inputs, 6, &quick_ae_config(), 1).unwrap();
    let features1 = ae1.encode(&inputs).unwrap();

    let mut config = quick_ae_config();
    config.scale_inputs = false;
    let ae2 = Autoencoder::train(&features1, 4, &config, 2).unwrap();
    let features2 = ae2.encode(&features1).unwrap();

    let labels = toy_labels(20, 3);
    let classifier =
        SoftmaxClassifier::train(&features2, &labels, &quick_classifier_config(), 3).unwrap();

    let network = StackedNetwork::stack(&[&ae1, &ae2], &classifier).unwrap();
    assert_eq!(network.input_size(), 12);
    assert_eq!(network.output_size(), 3);

    let probs = network.forward(&inputs).unwrap();
    assert_eq!(probs.dim(), (20, 3));
    for row in probs.rows() {
        assert!((row.sum() - 1.0).abs() < 1e-5);
    }

    let summary = network.summary();
    assert_eq!(summary.layer_shapes, vec![(12, 6), (6, 4), (4, 3)]);
}

#[test]
fn test_fine_tune_returns_new_network_and_leaves_original_intact() {
    let inputs = toy_matrix(20, 12);
    let labels = toy_labels(20, 3);

    let ae = Autoencoder::train(&inputs, 6, &quick_ae_config(), 1).unwrap();
    let features = ae.encode(&inputs).unwrap();
    let classifier =
        SoftmaxClassifier::train(&features, &labels, &quick_classifier_config(), 2).unwrap();
    let network = StackedNetwork::stack(&[&ae], &classifier).unwrap();

    let before = network.forward(&inputs).unwrap();
    let tune_config = FineTuneConfig {
        max_epochs: 20,
        learning_rate: 0.05,
        batch_size: 5,
    };
    let tuned = network.fine_tune(&inputs, &labels, &tune_config, 9).unwrap();

    // the pre-tune network is a distinct, unchanged value
    let after = network.forward(&inputs).unwrap();
    assert_eq!(before, after);

    // the tuned network actually moved
    assert_ne!(tuned.forward(&inputs).unwrap(), before);
}

#[test]
fn test_fine_tune_rejects_mismatched_labels() {
    let inputs = toy_matrix(20, 12);
    let labels = toy_labels(20, 3);

    let ae = Autoencoder::train(&inputs, 6, &quick_ae_config(), 1).unwrap();
    let features = ae.encode(&inputs).unwrap();
    let classifier =
        SoftmaxClassifier::train(&features, &labels, &quick_classifier_config(), 2).unwrap();
    let network = StackedNetwork::stack(&[&ae], &classifier).unwrap();

    let short_labels = toy_labels(15, 3);
    let result = network.fine_tune(&inputs, &short_labels, &FineTuneConfig::default(), 9);
    assert!(matches!(result, Err(Error::DimensionMismatch { .. })));

    let wide_labels = toy_labels(20, 5);
    let result = network.fine_tune(&inputs, &wide_labels, &FineTuneConfig::default(), 9);
    assert!(matches!(result, Err(Error::DimensionMismatch { .. })));
}

#[test]
fn test_fine_tune_is_reproducible_for_fixed_seed() {
    let inputs = toy_matrix(20, 12);
    let labels = toy_labels(20, 3);

    let ae = Autoencoder::train(&inputs, 6, &quick_ae_config(), 1).unwrap();
    let features = ae.encode(&inputs).unwrap();
    let classifier =
        SoftmaxClassifier::train(&features, &labels, &quick_classifier_config(), 2).unwrap();
    let network = StackedNetwork::stack(&[&ae], &classifier).unwrap();

    let tune_config = FineTuneConfig {
        max_epochs: 20,
        learning_rate: 0.05,
        batch_size: 5,
    };
    let first = network.fine_tune(&inputs, &labels, &tune_config, 4).unwrap();
    let second = network.fine_tune(&inputs, &labels, &tune_config, 4).unwrap();

    assert_eq!(
        first.forward(&inputs).unwrap(),
        second.forward(&inputs).unwrap()
    );
}
