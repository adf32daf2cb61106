//! Per-symbol direction model: scaler, classifier, artifacts, training.

pub mod artifact;
pub mod classifier;
pub mod scaler;
pub mod train;

pub use artifact::{
    load_pair, pair_exists, ArtifactError, ModelArtifact, ScalerArtifact,
    ARTIFACT_FORMAT_VERSION,
};
pub use classifier::DirectionClassifier;
pub use scaler::StandardScaler;
pub use train::{train_model, TrainError, TrainReport};
