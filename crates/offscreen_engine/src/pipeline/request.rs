//! Submissions to the pipeline

use std::sync::Arc;

use crate::render::{RenderError, RenderResult};
use crate::scene::Model;
use crate::viewpoint::{ViewVector, ViewpointStrategy};

/// Which views a submission is rendered from
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ViewSelection {
    /// The strategy of the pipeline configuration
    #[default]
    Configured,
    /// A strategy chosen for this submission
    Strategy(ViewpointStrategy),
    /// Explicit camera views, rendered in order
    Explicit(Vec<ViewVector>),
}

/// A model plus the views to render it from
#[derive(Debug, Clone)]
pub struct RenderRequest {
    /// Model to render
    pub model: Arc<Model>,
    /// Views to render it from
    pub views: ViewSelection,
}

impl RenderRequest {
    /// Request rendering `model` with the configured strategy
    pub fn new(model: impl Into<Arc<Model>>) -> Self {
        Self {
            model: model.into(),
            views: ViewSelection::Configured,
        }
    }

    /// Override the strategy for this request
    pub fn with_strategy(mut self, strategy: ViewpointStrategy) -> Self {
        self.views = ViewSelection::Strategy(strategy);
        self
    }

    /// Render exactly these views
    pub fn with_views(mut self, views: Vec<ViewVector>) -> Self {
        self.views = ViewSelection::Explicit(views);
        self
    }

    /// Identifier of the requested model
    pub fn model_id(&self) -> &str {
        &self.model.id
    }

    /// Reject requests that cannot produce any frame
    pub fn validate(&self) -> RenderResult<()> {
        match &self.views {
            ViewSelection::Explicit(views) if views.is_empty() => Err(RenderError::InvalidInput(
                format!("request for '{}' lists no views", self.model.id),
            )),
            _ => Ok(()),
        }
    }
}

impl From<Model> for RenderRequest {
    fn from(model: Model) -> Self {
        Self::new(model)
    }
}

impl From<Arc<Model>> for RenderRequest {
    fn from(model: Arc<Model>) -> Self {
        Self::new(model)
    }
}
