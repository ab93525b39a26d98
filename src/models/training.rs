use garde::Validate;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Model families the training backend accepts.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, EnumString, Display, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ModelType {
    #[default]
    LogisticRegression,
    RandomForest,
    NeuralNetwork,
    Xgboost,
}

/// Schema a submitted parameter blob must satisfy.
///
/// Numeric fields are optional; their bounds apply when present. Integer
/// fields also accept whole-number floats such as `10.0`. Keys not listed
/// here are carried through untouched in the stored blob.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TrainingRequest {
    #[serde(default)]
    #[garde(skip)]
    pub model_type: ModelType,

    #[serde(default)]
    #[garde(inner(length(min = 1, max = 128)))]
    pub dataset_ids: Vec<String>,

    #[garde(range(min = 1, max = 1000))]
    #[serde(default, deserialize_with = "whole_number")]
    pub epochs: Option<i64>,

    #[garde(range(min = 1, max = 1024))]
    #[serde(default, deserialize_with = "whole_number")]
    pub batch_size: Option<i64>,

    #[garde(range(min = 0.0001, max = 1.0))]
    pub learning_rate: Option<f64>,

    // Random forest / xgboost
    #[garde(range(min = 1, max = 1000))]
    #[serde(default, deserialize_with = "whole_number")]
    pub num_trees: Option<i64>,

    #[garde(range(min = 1, max = 100))]
    #[serde(default, deserialize_with = "whole_number")]
    pub max_depth: Option<i64>,

    // Neural network
    #[serde(default, deserialize_with = "whole_numbers")]
    #[garde(custom(validate_hidden_layers))]
    pub hidden_layers: Option<Vec<i64>>,

    #[garde(range(min = 0.0, max = 1.0))]
    pub l1_regularization: Option<f64>,

    #[garde(range(min = 0.0, max = 1.0))]
    pub l2_regularization: Option<f64>,
}

const MAX_LAYER_WIDTH: i64 = 4096;

fn to_whole<E: de::Error>(number: serde_json::Number) -> Result<i64, E> {
    if let Some(n) = number.as_i64() {
        return Ok(n);
    }
    match number.as_f64() {
        Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => Ok(f as i64),
        Some(f) => Err(E::invalid_value(de::Unexpected::Float(f), &"a whole number")),
        None => Err(E::invalid_value(de::Unexpected::Other("number"), &"a whole number")),
    }
}

fn whole_number<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<serde_json::Number>::deserialize(deserializer)?
        .map(to_whole)
        .transpose()
}

fn whole_numbers<'de, D>(deserializer: D) -> Result<Option<Vec<i64>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Vec<serde_json::Number>>::deserialize(deserializer)?
        .map(|numbers| numbers.into_iter().map(to_whole).collect())
        .transpose()
}

fn validate_hidden_layers(value: &Option<Vec<i64>>, _ctx: &()) -> garde::Result {
    let Some(layers) = value else {
        return Ok(());
    };
    if layers.is_empty() {
        return Err(garde::Error::new("at least one hidden layer is required"));
    }
    if let Some(width) = layers.iter().find(|w| !(1..=MAX_LAYER_WIDTH).contains(*w)) {
        return Err(garde::Error::new(format!(
            "layer width {width} outside 1..={MAX_LAYER_WIDTH}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> TrainingRequest {
        serde_json::from_value(value).unwrap()
    }

    fn failing_fields(request: &TrainingRequest) -> Vec<String> {
        match request.validate() {
            Ok(()) => Vec::new(),
            Err(report) => report.iter().map(|(path, _)| path.to_string()).collect(),
        }
    }

    #[test]
    fn test_default_form_values_pass() {
        let request = parse(json!({"epochs": 10, "batchSize": 32, "learningRate": 0.001}));
        assert_eq!(request.model_type, ModelType::LogisticRegression);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_negative_epochs_rejected() {
        let request = parse(json!({"epochs": -1}));
        assert_eq!(failing_fields(&request), vec!["epochs".to_string()]);
    }

    #[test]
    fn test_learning_rate_bounds() {
        assert!(parse(json!({"learningRate": 0.0001})).validate().is_ok());
        assert!(parse(json!({"learningRate": 1.0})).validate().is_ok());
        assert_eq!(
            failing_fields(&parse(json!({"learningRate": 0.00001}))),
            vec!["learning_rate".to_string()]
        );
        assert_eq!(
            failing_fields(&parse(json!({"learningRate": 1.5}))),
            vec!["learning_rate".to_string()]
        );
    }

    #[test]
    fn test_forest_parameters() {
        let ok = parse(json!({"modelType": "random_forest", "numTrees": 100, "maxDepth": 10}));
        assert_eq!(ok.model_type, ModelType::RandomForest);
        assert!(ok.validate().is_ok());

        let bad = parse(json!({"modelType": "random_forest", "numTrees": 0, "maxDepth": 101}));
        let mut fields = failing_fields(&bad);
        fields.sort();
        assert_eq!(fields, vec!["max_depth".to_string(), "num_trees".to_string()]);
    }

    #[test]
    fn test_hidden_layers() {
        assert!(parse(json!({"hiddenLayers": [128, 64]})).validate().is_ok());
        assert_eq!(
            failing_fields(&parse(json!({"hiddenLayers": []}))),
            vec!["hidden_layers".to_string()]
        );
        assert_eq!(
            failing_fields(&parse(json!({"hiddenLayers": [128, 0]}))),
            vec!["hidden_layers".to_string()]
        );
    }

    #[test]
    fn test_empty_dataset_id_rejected() {
        let request = parse(json!({"datasetIds": ["dataset1", ""]}));
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_whole_number_floats_accepted() {
        let request = parse(json!({"epochs": 10.0, "batchSize": 32, "hiddenLayers": [128.0, 64]}));
        assert_eq!(request.epochs, Some(10));
        assert_eq!(request.batch_size, Some(32));
        assert_eq!(request.hidden_layers, Some(vec![128, 64]));
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_fractional_epochs_rejected() {
        let err = serde_json::from_value::<TrainingRequest>(json!({"epochs": 10.5})).unwrap_err();
        assert!(err.to_string().contains("whole number"));
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let request = parse(json!({"epochs": 5, "optimizer": "adam"}));
        assert!(request.validate().is_ok());
    }
}
