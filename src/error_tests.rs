//! Tests for error types

#[cfg(test)]
mod tests {
    use super::super::error::StockyError;

    #[test]
    fn test_reference_not_found() {
        let err = StockyError::ReferenceNotFound("../Json/top_stocks.json".to_string());
        assert!(err.to_string().contains("Reference file not found"));
        assert!(err.to_string().contains("top_stocks.json"));
    }

    #[test]
    fn test_json_error_from_serde() {
        let parse = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: StockyError = parse.into();
        assert!(err.to_string().contains("JSON parsing error"));
    }

    #[test]
    fn test_io_error_from_std() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: StockyError = io.into();
        assert!(err.to_string().contains("IO error"));
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn test_http_status() {
        let err = StockyError::Http { status: 429 };
        let msg = err.to_string();
        assert!(msg.contains("HTTP error"));
        assert!(msg.contains("429"));
    }

    #[test]
    fn test_model_error() {
        let err = StockyError::Model("generation timed out".to_string());
        assert!(err.to_string().contains("Model error"));
    }

    #[test]
    fn test_config_error() {
        let err = StockyError::Config("Unknown LLM provider: foo".to_string());
        assert!(err.to_string().contains("Configuration error"));
    }

    #[test]
    fn test_error_is_debug() {
        let err = StockyError::Parse("bad selector".to_string());
        let debug = format!("{:?}", err);
        assert!(debug.contains("Parse"));
    }

    #[test]
    fn test_error_variants_distinct() {
        let model = StockyError::Model("test".to_string());
        let config = StockyError::Config("test".to_string());

        assert_ne!(model.to_string(), config.to_string());
    }
}
