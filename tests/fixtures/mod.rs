//! Parameter sets shared by the integration and e2e suites

/// A submission blob and the field it is expected to be rejected for.
#[derive(Debug, Clone)]
pub struct TrainingFixture {
    pub name: &'static str,
    pub parameters: &'static str,
    /// `None` when the submission must be accepted.
    pub invalid_field: Option<&'static str>,
}

impl TrainingFixture {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(self.parameters).expect("fixture is valid JSON")
    }
}

pub const TRAINING_FIXTURES: &[TrainingFixture] = &[
    TrainingFixture {
        name: "form defaults",
        parameters: r#"{"epochs": 10, "batchSize": 32, "learningRate": 0.001}"#,
        invalid_field: None,
    },
    TrainingFixture {
        name: "random forest",
        parameters: r#"{"modelType": "random_forest", "datasetIds": ["dataset1", "dataset3"], "numTrees": 100, "maxDepth": 10}"#,
        invalid_field: None,
    },
    TrainingFixture {
        name: "neural network",
        parameters: r#"{"modelType": "neural_network", "datasetIds": ["dataset2"], "hiddenLayers": [128, 64], "l1Regularization": 0.0001, "l2Regularization": 0.0001}"#,
        invalid_field: None,
    },
    TrainingFixture {
        name: "empty blob",
        parameters: r#"{}"#,
        invalid_field: None,
    },
    TrainingFixture {
        name: "negative epochs",
        parameters: r#"{"epochs": -1}"#,
        invalid_field: Some("epochs"),
    },
    TrainingFixture {
        name: "too many epochs",
        parameters: r#"{"epochs": 1001, "batchSize": 32}"#,
        invalid_field: Some("epochs"),
    },
    TrainingFixture {
        name: "oversized batch",
        parameters: r#"{"batchSize": 2048}"#,
        invalid_field: Some("batchSize"),
    },
    TrainingFixture {
        name: "learning rate too small",
        parameters: r#"{"learningRate": 0.00001}"#,
        invalid_field: Some("learningRate"),
    },
    TrainingFixture {
        name: "zero trees",
        parameters: r#"{"modelType": "random_forest", "numTrees": 0}"#,
        invalid_field: Some("numTrees"),
    },
    TrainingFixture {
        name: "empty hidden layers",
        parameters: r#"{"modelType": "neural_network", "hiddenLayers": []}"#,
        invalid_field: Some("hiddenLayers"),
    },
    TrainingFixture {
        name: "regularization above one",
        parameters: r#"{"l2Regularization": 1.5}"#,
        invalid_field: Some("l2Regularization"),
    },
    TrainingFixture {
        name: "unsupported model",
        parameters: r#"{"modelType": "svm"}"#,
        invalid_field: Some("modelType"),
    },
];
