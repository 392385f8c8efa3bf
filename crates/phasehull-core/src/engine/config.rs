use crate::core::models::composition::Composition;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HullConfig {
    /// Endpoint formulas in the order that defines decomposition priority and endpoint ids.
    pub endpoints: Vec<Composition>,
    /// Rebuild the hull from only the points that lie on a non-vertical facet.
    pub filter_vertical_facets: bool,
}

#[derive(Default)]
pub struct HullConfigBuilder {
    endpoints: Option<Vec<Composition>>,
    filter_vertical_facets: Option<bool>,
}

impl HullConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn endpoints(mut self, endpoints: Vec<Composition>) -> Self {
        self.endpoints = Some(endpoints);
        self
    }
    pub fn endpoint(mut self, endpoint: Composition) -> Self {
        self.endpoints.get_or_insert_with(Vec::new).push(endpoint);
        self
    }
    pub fn filter_vertical_facets(mut self, enabled: bool) -> Self {
        self.filter_vertical_facets = Some(enabled);
        self
    }

    pub fn build(self) -> Result<HullConfig, ConfigError> {
        Ok(HullConfig {
            endpoints: self
                .endpoints
                .ok_or(ConfigError::MissingParameter("endpoints"))?,
            filter_vertical_facets: self.filter_vertical_facets.unwrap_or(true),
        })
    }
}
