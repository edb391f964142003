//! Generative endpoint seam.

use crate::error::EndpointError;
use crate::responses::{ModelResponse, ResponsesRequest};

/// A blocking generative endpoint speaking the Responses request shape.
///
/// Each call is a full round-trip; implementations must not retry on their
/// own. Callers that need deadlines configure them on the implementation.
pub trait ResponsesEndpoint {
    fn create(&self, request: &ResponsesRequest) -> Result<ModelResponse, EndpointError>;
}

impl<T: ResponsesEndpoint + ?Sized> ResponsesEndpoint for &T {
    fn create(&self, request: &ResponsesRequest) -> Result<ModelResponse, EndpointError> {
        (**self).create(request)
    }
}

impl<T: ResponsesEndpoint + ?Sized> ResponsesEndpoint for Box<T> {
    fn create(&self, request: &ResponsesRequest) -> Result<ModelResponse, EndpointError> {
        (**self).create(request)
    }
}
