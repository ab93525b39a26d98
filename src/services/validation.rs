use garde::Validate;
use serde::Serialize;

use crate::models::training::TrainingRequest;

/// One rejected field of a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    /// JSON key as submitted, e.g. `epochs` or `datasetIds[1]`.
    pub field: String,
    pub message: String,
}

/// Submitted parameters failed the training schema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid parameters: {}", summary(.violations))]
pub struct ValidationError {
    pub violations: Vec<FieldViolation>,
}

impl ValidationError {
    fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            violations: vec![FieldViolation {
                field: field.into(),
                message: message.into(),
            }],
        }
    }

    fn from_report(report: garde::Report) -> Self {
        let violations = report
            .iter()
            .map(|(path, error)| FieldViolation {
                field: to_camel_case(&path.to_string()),
                message: error.message().to_string(),
            })
            .collect();
        Self { violations }
    }

    /// Names of the offending fields.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.violations.iter().map(|v| v.field.as_str())
    }
}

fn summary(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| format!("{}: {}", v.field, v.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Check an opaque parameter blob against the training schema.
///
/// Type errors are attributed to the key that caused them by re-reading
/// each key on its own.
pub fn validate_parameters(
    parameters: &serde_json::Value,
) -> Result<TrainingRequest, ValidationError> {
    let Some(object) = parameters.as_object() else {
        return Err(ValidationError::single("parameters", "must be a JSON object"));
    };

    let request: TrainingRequest = match serde_json::from_value(parameters.clone()) {
        Ok(request) => request,
        Err(e) => {
            let violations: Vec<FieldViolation> = object
                .iter()
                .filter_map(|(key, value)| {
                    let mut single = serde_json::Map::new();
                    single.insert(key.clone(), value.clone());
                    serde_json::from_value::<TrainingRequest>(serde_json::Value::Object(single))
                        .err()
                        .map(|err| FieldViolation {
                            field: key.clone(),
                            message: err.to_string(),
                        })
                })
                .collect();

            if violations.is_empty() {
                return Err(ValidationError::single("parameters", e.to_string()));
            }
            return Err(ValidationError { violations });
        }
    };

    request.validate().map_err(ValidationError::from_report)?;
    Ok(request)
}

/// `dataset_ids[1]` -> `datasetIds[1]`
fn to_camel_case(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut upper_next = false;
    for c in path.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::training::ModelType;
    use serde_json::json;

    #[test]
    fn test_valid_parameters() {
        let request =
            validate_parameters(&json!({"epochs": 10, "batchSize": 32, "learningRate": 0.001}))
                .unwrap();
        assert_eq!(request.epochs, Some(10));
        assert_eq!(request.batch_size, Some(32));
        assert_eq!(request.model_type, ModelType::LogisticRegression);
    }

    #[test]
    fn test_negative_epochs_names_field() {
        let err = validate_parameters(&json!({"epochs": -1})).unwrap_err();
        assert_eq!(err.fields().collect::<Vec<_>>(), vec!["epochs"]);
        assert!(err.to_string().contains("epochs"));
    }

    #[test]
    fn test_fields_reported_as_json_keys() {
        let err =
            validate_parameters(&json!({"batchSize": 4096, "learningRate": 2.0})).unwrap_err();
        let mut fields: Vec<&str> = err.fields().collect();
        fields.sort();
        assert_eq!(fields, vec!["batchSize", "learningRate"]);
    }

    #[test]
    fn test_type_error_attributed_to_key() {
        let err = validate_parameters(&json!({"epochs": "ten", "batchSize": 32})).unwrap_err();
        assert_eq!(err.fields().collect::<Vec<_>>(), vec!["epochs"]);
    }

    #[test]
    fn test_integer_fields_accept_whole_floats() {
        let request = validate_parameters(&json!({"epochs": 10.0, "numTrees": 100.0})).unwrap();
        assert_eq!(request.epochs, Some(10));
        assert_eq!(request.num_trees, Some(100));

        let err = validate_parameters(&json!({"epochs": 2.5, "batchSize": 32})).unwrap_err();
        assert_eq!(err.fields().collect::<Vec<_>>(), vec!["epochs"]);
    }

    #[test]
    fn test_unknown_model_type() {
        let err = validate_parameters(&json!({"modelType": "svm"})).unwrap_err();
        assert_eq!(err.fields().collect::<Vec<_>>(), vec!["modelType"]);
    }

    #[test]
    fn test_non_object_rejected() {
        let err = validate_parameters(&json!([1, 2, 3])).unwrap_err();
        assert_eq!(err.fields().collect::<Vec<_>>(), vec!["parameters"]);
    }

    #[test]
    fn test_camel_case() {
        assert_eq!(to_camel_case("epochs"), "epochs");
        assert_eq!(to_camel_case("l1_regularization"), "l1Regularization");
        assert_eq!(to_camel_case("dataset_ids[1]"), "datasetIds[1]");
    }
}
