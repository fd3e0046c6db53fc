//! gRPC correlation ID interceptor
use crate::correlation::{new_correlation_id, GRPC_CORRELATION_ID_KEY};
use tonic::metadata::MetadataValue;
use tonic::{service::Interceptor, Request, Status};

/// Client-side interceptor: forwards the id stored in request extensions
/// (or a fresh one) as `correlation-id` metadata.
#[derive(Clone, Default)]
pub struct GrpcCorrelationInjector;

/// Request extension carrying the correlation id into the interceptor
#[derive(Clone, Debug)]
pub struct CorrelationId(pub String);

impl Interceptor for GrpcCorrelationInjector {
    fn call(&mut self, mut req: Request<()>) -> Result<Request<()>, Status> {
        let id = req
            .extensions()
            .get::<CorrelationId>()
            .map(|c| c.0.clone())
            .unwrap_or_else(new_correlation_id);
        let value = MetadataValue::try_from(id.as_str())
            .map_err(|_| Status::internal("failed to set correlation id"))?;
        req.metadata_mut().insert(GRPC_CORRELATION_ID_KEY, value);
        Ok(req)
    }
}

/// Server-side interceptor: keeps an inbound id or assigns one, and stores it
/// in the request extensions for handlers to log.
pub fn ensure_correlation_id(mut req: Request<()>) -> Result<Request<()>, Status> {
    let id = match crate::correlation::from_metadata(req.metadata()) {
        Some(id) => id,
        None => {
            let id = new_correlation_id();
            tracing::debug!(correlation_id = %id, "Assigned correlation id to inbound request");
            id
        }
    };
    let value = MetadataValue::try_from(id.as_str())
        .map_err(|_| Status::internal("failed to set correlation id"))?;
    req.metadata_mut().insert(GRPC_CORRELATION_ID_KEY, value);
    req.extensions_mut().insert(CorrelationId(id));
    Ok(req)
}
