//! # Mock Framework
//!
//! Utilities for testing clients and services in isolation.
//!
//! Use [`create_mock_client`] to get a client and a receiver.
//! Then use helpers like [`expect_update`] or [`expect_create`] to assert the
//! order of requests and script the replies.

use tokio::sync::{mpsc, oneshot};

use crate::actor_framework::{Entity, FrameworkError, ResourceClient, ResourceRequest};

type Reply<T> = oneshot::Sender<Result<T, FrameworkError>>;

/// Creates a mock client and a receiver for asserting requests.
///
/// # Testing Strategy
/// Flows such as checkout only care about *which* requests reach the cache
/// and in what order. Instead of a `ResourceActor`, the client here sends to a
/// channel the test owns, so each request can be inspected and answered
/// (success, failure, delay) deterministically.
pub fn create_mock_client<T: Entity>(buffer_size: usize) -> (ResourceClient<T>, mpsc::Receiver<ResourceRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ResourceClient::new(sender), receiver)
}

/// Helper to verify that the next message is a List request
pub async fn expect_list<T: Entity>(receiver: &mut mpsc::Receiver<ResourceRequest<T>>) -> Option<Reply<Vec<T>>> {
    match receiver.recv().await {
        Some(ResourceRequest::List { respond_to }) => Some(respond_to),
        _ => None,
    }
}

/// Helper to verify that the next message is a Get request
pub async fn expect_get<T: Entity>(receiver: &mut mpsc::Receiver<ResourceRequest<T>>) -> Option<(T::Id, Reply<T>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Get { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Create request
pub async fn expect_create<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::CreatePayload, Reply<T>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Create { payload, respond_to }) => Some((payload, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is an Update request
pub async fn expect_update<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, T::Patch, Reply<T>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Update { id, patch, respond_to }) => Some((id, patch, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Delete request
pub async fn expect_delete<T: Entity>(receiver: &mut mpsc::Receiver<ResourceRequest<T>>) -> Option<(T::Id, Reply<()>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Delete { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::ProductClient;
    use crate::domain::{Product, ProductPatch};

    #[tokio::test]
    async fn test_mock_client() {
        let (inner, mut receiver) = create_mock_client::<Product>(10);
        let client = ProductClient::new(inner);

        // Test Update
        let update_task = tokio::spawn(async move { client.set_stock("p1".to_string(), 4).await });

        let (id, patch, responder) = expect_update(&mut receiver).await.expect("Expected Update request");
        assert_eq!(id, "p1");
        assert_eq!(patch, ProductPatch::quantity(4));
        responder.send(Ok(Product::new("p1", "Tee", 10.0, 4))).unwrap();

        let result = update_task.await.unwrap();
        assert_eq!(result.unwrap().quantity, 4);
    }

    #[tokio::test]
    async fn test_delete_reports_failure() {
        let (inner, mut receiver) = create_mock_client::<Product>(10);
        let client = ProductClient::new(inner);

        let task = tokio::spawn(async move { client.delete_product("p9".to_string()).await });

        let (id, responder) = expect_delete(&mut receiver).await.expect("Expected Delete request");
        assert_eq!(id, "p9");
        responder.send(Err(FrameworkError::ActorDropped)).unwrap();

        assert_eq!(
            task.await.unwrap(),
            Err(crate::product_actor::ProductError::ActorCommunicationError("Actor dropped".into()))
        );
    }

    #[tokio::test]
    async fn test_resync_invalidates_before_listing() {
        let (inner, mut receiver) = create_mock_client::<Product>(10);
        let client = ProductClient::new(inner);

        let task = tokio::spawn(async move { client.resync_products().await });

        match receiver.recv().await {
            Some(ResourceRequest::Invalidate { key }) => assert_eq!(key, crate::actor_framework::QueryKey::List),
            other => panic!("Expected Invalidate, got {other:?}"),
        }
        let responder = expect_list(&mut receiver).await.expect("Expected List request");
        responder.send(Ok(vec![])).unwrap();

        assert_eq!(task.await.unwrap(), Ok(vec![]));
    }
}
