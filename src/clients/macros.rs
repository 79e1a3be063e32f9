/// CRUD and cache methods shared by every resource client.
///
/// `$entity_name_snake` names single-item methods (`get_product`),
/// `$collection_snake` names list methods (`list_products`).
macro_rules! impl_client_methods {
    ($client_name:ident, $entity:ty, $error:ty, $entity_name_snake:ident, $collection_snake:ident) => {
        paste::paste! {
            impl $client_name {
                #[tracing::instrument(skip(self))]
                pub async fn [<list_ $collection_snake>](&self) -> Result<Vec<$entity>, $error> {
                    tracing::debug!("Sending request");
                    self.inner.list().await.map_err(<$error>::from)
                }

                #[tracing::instrument(skip(self))]
                pub async fn [<get_ $entity_name_snake>](&self, id: String) -> Result<$entity, $error> {
                    tracing::debug!("Sending request");
                    self.inner.get(id).await.map_err(<$error>::from)
                }

                #[tracing::instrument(skip(self))]
                pub async fn [<delete_ $entity_name_snake>](&self, id: String) -> Result<(), $error> {
                    tracing::debug!("Sending request");
                    self.inner.delete(id).await.map_err(<$error>::from)
                }

                /// Marks the list stale and reloads it from the server.
                #[tracing::instrument(skip(self))]
                pub async fn [<resync_ $collection_snake>](&self) -> Result<Vec<$entity>, $error> {
                    tracing::debug!("Sending request");
                    self.inner
                        .invalidate($crate::actor_framework::QueryKey::List)
                        .await
                        .map_err(<$error>::from)?;
                    self.inner.list().await.map_err(<$error>::from)
                }

                pub async fn [<$collection_snake _snapshot>](
                    &self,
                ) -> Result<$crate::actor_framework::QuerySnapshot<Vec<$entity>>, $error> {
                    self.inner.list_snapshot().await.map_err(<$error>::from)
                }

                pub fn resource(&self) -> &$crate::actor_framework::ResourceClient<$entity> {
                    &self.inner
                }
            }
        }
    };
}

macro_rules! impl_client_new {
    ($client_name:ident, $entity:ty) => {
        impl $client_name {
            pub fn new(inner: $crate::actor_framework::ResourceClient<$entity>) -> Self {
                Self { inner }
            }
        }
    };
}

macro_rules! impl_basic_client {
    ($client_name:ident, $entity:ty, $error:ty, $entity_name_snake:ident, $collection_snake:ident) => {
        impl_client_new!($client_name, $entity);
        impl_client_methods!($client_name, $entity, $error, $entity_name_snake, $collection_snake);
    };
}
