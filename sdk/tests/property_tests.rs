use proptest::prelude::*;
use sdk::errors::{EngineError, WardenErrorExt};
use sdk::types::ToolInput;

// Error hints are static and never echo the wrapped detail
proptest! {
    #[test]
    fn test_error_user_hint_completeness(error_str in "did:[a-z]{3}:[a-z0-9]{4,12}") {
        let errs = vec![
            EngineError::Config(error_str.clone()),
            EngineError::Reasoner(error_str.clone()),
            EngineError::InvalidPlan(error_str.clone()),
            EngineError::ToolNotFound(error_str.clone()),
            EngineError::ToolError(error_str.clone()),
            EngineError::InvalidToolInput(error_str.clone()),
            EngineError::TrustOracle(error_str.clone()),
        ];

        for err in errs {
            let hint = err.user_hint();
            prop_assert!(!hint.is_empty());
            prop_assert!(!hint.contains(&error_str));
        }
    }
}

// Any JSON object survives wrapping in ToolInput unchanged
proptest! {
    #[test]
    fn test_tool_input_preserves_objects(
        keys in proptest::collection::btree_set("[a-z_]{1,10}", 0..6),
        value in "[ -~]{0,20}",
    ) {
        let mut map = serde_json::Map::new();
        for key in &keys {
            map.insert(key.clone(), serde_json::Value::String(value.clone()));
        }
        let original = serde_json::Value::Object(map);

        let input = ToolInput::from_value(&original);
        for key in &keys {
            prop_assert_eq!(input.param_str(key).unwrap(), value.clone());
        }
        prop_assert_eq!(input.into_value(), original);
    }
}
