use stacknet::{
    evaluate, Autoencoder, AutoencoderConfig, ClassifierConfig, DigitsDataset, Evaluation,
    FineTuneConfig, SoftmaxClassifier, StackedNetwork,
};

fn first_stage_config() -> AutoencoderConfig {
    AutoencoderConfig {
        max_epochs: 60,
        learning_rate: 0.5,
        l2_weight: 0.001,
        sparsity_weight: 0.5,
        sparsity_target: 0.15,
        scale_inputs: true,
    }
}

fn second_stage_config() -> AutoencoderConfig {
    AutoencoderConfig {
        max_epochs: 60,
        learning_rate: 0.5,
        l2_weight: 0.001,
        sparsity_weight: 0.5,
        sparsity_target: 0.1,
        scale_inputs: false,
    }
}

fn classifier_config() -> ClassifierConfig {
    ClassifierConfig {
        max_epochs: 200,
        learning_rate: 0.5,
        l2_weight: 1e-4,
    }
}

fn tune_config() -> FineTuneConfig {
    FineTuneConfig {
        max_epochs: 60,
        learning_rate: 0.05,
        batch_size: 10,
    }
}

struct PipelineRun {
    network: StackedNetwork,
    tuned: StackedNetwork,
    before: Evaluation,
    after: Evaluation,
}

/// Full walkthrough: load, train two autoencoders layer-wise, train the
/// softmax layer on the deepest features, compose, evaluate, fine-tune
/// end to end, evaluate again.
fn run_pipeline(seed: u64) -> PipelineRun {
    let data = DigitsDataset::synthetic(10, seed);
    let inputs = data.flattened();
    let labels = data.labels.clone();

    let ae1 = Autoencoder::train(&inputs, 20, &first_stage_config(), seed).unwrap();
    let features1 = ae1.encode(&inputs).unwrap();

    let ae2 = Autoencoder::train(&features1, 10, &second_stage_config(), seed + 1).unwrap();
    let features2 = ae2.encode(&features1).unwrap();

    let classifier =
        SoftmaxClassifier::train(&features2, &labels, &classifier_config(), seed + 2).unwrap();

    let network = StackedNetwork::stack(&[&ae1, &ae2], &classifier).unwrap();
    let before = evaluate(&network, &inputs, &labels).unwrap();

    let tuned = network
        .fine_tune(&inputs, &labels, &tune_config(), seed + 3)
        .unwrap();
    let after = evaluate(&tuned, &inputs, &labels).unwrap();

    PipelineRun {
        network,
        tuned,
        before,
        after,
    }
}

#[test]
fn test_end_to_end_pipeline_on_synthetic_digits() {
    let run = run_pipeline(42);

    // 100 images, 10 per class
    assert_eq!(run.before.total(), 100);
    assert_eq!(run.before.confusion.dim(), (10, 10));
    assert!((0.0..=1.0).contains(&run.before.accuracy));

    assert_eq!(run.after.total(), 100);
    assert!((0.0..=1.0).contains(&run.after.accuracy));

    let summary = run.network.summary();
    assert_eq!(summary.input_size, 784);
    assert_eq!(summary.output_size, 10);
    assert_eq!(summary.layer_shapes, vec![(784, 20), (20, 10), (10, 10)]);
}

#[test]
fn test_fine_tuning_does_not_regress_training_accuracy() {
    let run = run_pipeline(42);

    // joint optimization must not be meaningfully worse on its own
    // training data than the greedy layer-wise network
    assert!(
        run.after.accuracy >= run.before.accuracy - 0.1,
        "fine-tuning regressed training accuracy: {} -> {}",
        run.before.accuracy,
        run.after.accuracy
    );
}

#[test]
fn test_pipeline_is_bit_for_bit_reproducible() {
    let first = run_pipeline(7);
    let second = run_pipeline(7);

    assert_eq!(first.before, second.before);
    assert_eq!(first.after, second.after);

    let data = DigitsDataset::synthetic(10, 7);
    let inputs = data.flattened();
    assert_eq!(
        first.network.forward(&inputs).unwrap(),
        second.network.forward(&inputs).unwrap()
    );
    assert_eq!(
        first.tuned.forward(&inputs).unwrap(),
        second.tuned.forward(&inputs).unwrap()
    );
}

#[test]
fn test_predictions_match_confusion_totals() {
    let run = run_pipeline(11);
    let data = DigitsDataset::synthetic(10, 11);
    let inputs = data.flattened();

    let predictions = run.tuned.predict(&inputs).unwrap();
    assert_eq!(predictions.len(), 100);
    assert!(predictions.iter().all(|&class| class < 10));

    // column sums of the confusion matrix count predictions per class
    for class in 0..10 {
        let predicted_count = predictions.iter().filter(|&&p| p == class).count();
        let column_sum: usize = run.after.confusion.column(class).sum();
        assert_eq!(predicted_count, column_sum);
    }
}
