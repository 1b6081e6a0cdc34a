use ndarray::{arr2, Array2};
use rand::rngs::StdRng;
use rand::SeedableRng;

use digitnet::data::load_idx_pair;
use digitnet::train::OptimizerKind;
use digitnet::{initialize_weights, Hyperparameters, Network, Topology, TrainedModel};
use tempfile::tempdir;

#[test]
fn unroll_then_roll_is_bit_identical() {
    let mut rng = StdRng::seed_from_u64(11);
    let topology = Topology::new(6, 4, 3).unwrap();
    let w1 = initialize_weights(6, 4, &mut rng);
    let w2 = initialize_weights(4, 3, &mut rng);

    let params = topology.unroll(&w1, &w2).unwrap();
    assert_eq!(params.len(), 4 * 7 + 3 * 5);
    let (r1, r2) = topology.roll(params.view()).unwrap();
    assert_eq!(r1, w1);
    assert_eq!(r2, w2);
}

#[test]
fn model_file_round_trip() {
    let network = Network::new(
        arr2(&[[0.1, -0.2, 0.3], [0.4, 0.5, -0.6]]),
        arr2(&[[1.0, -1.0, 0.25]]),
    )
    .unwrap();
    let model = TrainedModel::from_network(&network, 0.4);

    let dir = tempdir().unwrap();
    let path = dir.path().join("model.json");
    let path_str = path.to_str().unwrap();
    model.save_json(path_str).unwrap();
    let loaded = TrainedModel::load_json(path_str).unwrap();

    assert_eq!(loaded, model);
    assert_eq!(loaded.network().unwrap(), network);
}

#[test]
fn hyperparameter_file_is_validated() {
    let dir = tempdir().unwrap();
    let good = dir.path().join("good.json");
    std::fs::write(&good, r#"{ "n_hidden": 12, "lambda": 0.0, "seed": 5 }"#).unwrap();
    let hp = Hyperparameters::load_json(good.to_str().unwrap()).unwrap();
    assert_eq!(hp.n_hidden, 12);
    assert_eq!(hp.seed, Some(5));
    assert_eq!(hp.optimizer, OptimizerKind::ConjugateGradient);

    let bad = dir.path().join("bad.json");
    std::fs::write(&bad, r#"{ "lambda": -1.0 }"#).unwrap();
    let result = Hyperparameters::load_json(bad.to_str().unwrap());
    assert!(result.is_err());
}

#[test]
fn idx_files_load_and_normalize() {
    let mut images = vec![0x00, 0x00, 0x08, 0x03];
    images.extend_from_slice(&2u32.to_be_bytes());
    images.extend_from_slice(&1u32.to_be_bytes());
    images.extend_from_slice(&2u32.to_be_bytes());
    images.extend_from_slice(&[0, 255, 51, 102]);
    let mut labels = vec![0x00, 0x00, 0x08, 0x01];
    labels.extend_from_slice(&2u32.to_be_bytes());
    labels.extend_from_slice(&[7, 3]);

    let dir = tempdir().unwrap();
    let image_path = dir.path().join("images.idx3");
    let label_path = dir.path().join("labels.idx1");
    std::fs::write(&image_path, &images).unwrap();
    std::fs::write(&label_path, &labels).unwrap();
    let data = load_idx_pair(&image_path, &label_path).unwrap();

    assert_eq!(data.labels(), &[7, 3]);
    let expected: Array2<f64> = arr2(&[[0.0, 1.0], [0.2, 0.4]]);
    assert_eq!(data.features(), &expected);
}

#[test]
fn missing_idx_file_is_an_io_error() {
    let dir = tempdir().unwrap();
    let result = load_idx_pair(dir.path().join("absent.idx3"), dir.path().join("absent.idx1"));
    assert!(matches!(result, Err(digitnet::NetError::Io(_))));
}
